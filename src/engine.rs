use crate::{
    export::svg::export_svg,
    foundation::core::Canvas,
    foundation::error::WeaveResult,
    layout::{
        config::Config,
        generator::{Layout, generate},
    },
    mask::sampler::Mask,
    motif::registry::{Drawable, Motif, MotifRegistry},
    render::cpu::{CpuRenderer, FrameRGBA},
};

/// Owns everything the three core operations share: the bound surface, the motif registry and
/// the mask.
///
/// Layouts returned by [`Engine::generate`] are independent values; they stay valid across
/// registry edits (missing motifs are skipped at draw/export time) and canvas resizes.
#[derive(Debug)]
pub struct Engine {
    canvas: Canvas,
    registry: MotifRegistry,
    mask_image: Option<Drawable>,
    mask: Option<Mask>,
    renderer: CpuRenderer,
}

impl Engine {
    /// Engine bound to a `canvas`-sized surface, with no motifs and no mask.
    pub fn new(canvas: Canvas) -> WeaveResult<Self> {
        Ok(Self {
            canvas,
            registry: MotifRegistry::new(),
            mask_image: None,
            mask: None,
            renderer: CpuRenderer::new(canvas)?,
        })
    }

    /// Bound surface size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Registered motifs.
    pub fn registry(&self) -> &MotifRegistry {
        &self.registry
    }

    /// Current mask, if a reference image is set and rasterized successfully.
    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    /// Add or replace a motif. Returns `true` if an existing motif with the same id was replaced.
    pub fn register_motif(&mut self, motif: Motif) -> bool {
        let id = motif.id().to_string();
        let replaced = self.registry.register(motif).is_some();
        if replaced {
            self.renderer.forget_motif(&id);
        }
        tracing::debug!(motif = %id, replaced, "motif registered");
        replaced
    }

    /// Remove a motif. Existing layouts referencing it keep working; the item is skipped.
    pub fn unregister_motif(&mut self, id: &str) -> bool {
        let removed = self.registry.unregister(id).is_some();
        if removed {
            self.renderer.forget_motif(id);
        }
        removed
    }

    /// Set the mask reference image and rasterize it for the current canvas.
    ///
    /// Returns `false` when rasterization failed; generation then runs unmasked.
    pub fn set_mask_image(&mut self, reference: Drawable) -> bool {
        self.mask = Mask::build(&reference, self.canvas);
        self.mask_image = Some(reference);
        self.mask.is_some()
    }

    /// Drop the mask reference image.
    pub fn clear_mask(&mut self) {
        self.mask_image = None;
        self.mask = None;
    }

    /// Rebind to a new canvas size: reallocates the surface and rebuilds the mask.
    pub fn resize(&mut self, canvas: Canvas) -> WeaveResult<()> {
        self.renderer.resize(canvas)?;
        self.canvas = canvas;
        self.mask = self
            .mask_image
            .as_ref()
            .and_then(|img| Mask::build(img, canvas));
        Ok(())
    }

    /// Validate `config` and produce a fresh layout.
    pub fn generate(&self, config: &Config) -> WeaveResult<Layout> {
        config.validate()?;
        Ok(generate(
            config,
            &self.registry,
            self.canvas,
            self.mask.as_ref(),
        ))
    }

    /// [`Engine::generate`] with the seed overridden (a "regenerate" action).
    pub fn generate_with_seed(&self, config: &Config, seed: u64) -> WeaveResult<Layout> {
        let config = Config {
            seed,
            ..config.clone()
        };
        self.generate(&config)
    }

    /// Draw `layout` onto the bound surface at time `t` (seconds).
    pub fn render(&mut self, layout: &Layout, config: &Config, t: f64) -> WeaveResult<()> {
        self.renderer
            .render(layout, &self.registry, config, self.mask.as_ref(), t)
    }

    /// Copy of the last rendered frame.
    pub fn frame(&self) -> FrameRGBA {
        self.renderer.frame()
    }

    /// Standalone SVG document of `layout` at rest, with `config.background`.
    pub fn export_svg(&self, layout: &Layout, config: &Config) -> String {
        export_svg(layout, &self.registry, Some(config.background))
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
