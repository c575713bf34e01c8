use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "motifweave", version, about = "Procedural motif pattern generator")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export the static pattern as an SVG document.
    Svg(OutArgs),
    /// Dump the generated layout as JSON.
    Layout(OutArgs),
    /// Render an animation as a numbered PNG sequence.
    Frames(FramesArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Pattern config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of motif files (.svg, .png, .jpg, ...).
    #[arg(long)]
    motifs: PathBuf,

    /// Mask reference image; enables masking when given.
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Animation time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct OutArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames.
    #[arg(long)]
    count: u32,

    /// Frames per second; frame `i` is drawn at `t = i / fps`.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Output directory for `frame_00000.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Svg(args) => cmd_svg(args),
        Command::Layout(args) => cmd_layout(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

struct Scene {
    engine: motifweave::Engine,
    config: motifweave::Config,
    layout: motifweave::Layout,
}

fn build_scene(args: &SceneArgs) -> anyhow::Result<Scene> {
    let mut config = match &args.config {
        Some(path) => motifweave::Config::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => motifweave::Config::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let canvas = motifweave::Canvas::new(args.width, args.height)?;
    let mut engine = motifweave::Engine::new(canvas)?;

    let motifs = motifweave::load_motif_dir(&args.motifs)
        .with_context(|| format!("load motifs from '{}'", args.motifs.display()))?;
    if motifs.is_empty() {
        tracing::warn!(dir = %args.motifs.display(), "no motifs found");
    }
    for motif in motifs {
        engine.register_motif(motif);
    }

    if let Some(path) = &args.mask {
        let reference = motifweave::load_motif_file(path)
            .with_context(|| format!("load mask '{}'", path.display()))?;
        if !engine.set_mask_image(reference.drawable().clone()) {
            tracing::warn!(mask = %path.display(), "mask could not be rasterized; ignored");
        }
        config.mask.enabled = true;
    }

    let layout = engine.generate(&config)?;
    Ok(Scene {
        engine,
        config,
        layout,
    })
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_png(path: &Path, frame: &motifweave::FrameRGBA) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut scene = build_scene(&args.scene)?;
    scene
        .engine
        .render(&scene.layout, &scene.config, args.time)?;
    ensure_parent(&args.out)?;
    write_png(&args.out, &scene.engine.frame())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_svg(args: OutArgs) -> anyhow::Result<()> {
    let scene = build_scene(&args.scene)?;
    let doc = scene.engine.export_svg(&scene.layout, &scene.config);
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, doc)
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_layout(args: OutArgs) -> anyhow::Result<()> {
    let scene = build_scene(&args.scene)?;
    let json = serde_json::to_string_pretty(&scene.layout).context("serialize layout")?;
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write layout '{}'", args.out.display()))?;
    eprintln!("wrote {} ({} items)", args.out.display(), scene.layout.len());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("fps must be > 0");
    }
    let mut scene = build_scene(&args.scene)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for i in 0..args.count {
        let t = f64::from(i) / args.fps;
        scene.engine.render(&scene.layout, &scene.config, t)?;
        let path = args.out_dir.join(format!("frame_{i:05}.png"));
        write_png(&path, &scene.engine.frame())?;
    }
    eprintln!("wrote {} frames to {}", args.count, args.out_dir.display());
    Ok(())
}
