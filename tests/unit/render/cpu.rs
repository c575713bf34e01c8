use std::sync::Arc;

use super::*;
use crate::{
    foundation::core::{Point, Rgba8, Size},
    layout::config::AnimationOpts,
    layout::generator::{Appearance, LayoutItem},
    motif::registry::PreparedImage,
};

fn red_square() -> Motif {
    let mut px = Vec::with_capacity(4 * 4 * 4);
    for _ in 0..16 {
        px.extend_from_slice(&[255, 0, 0, 255]);
    }
    Motif::raster(
        "red",
        PreparedImage {
            width: 4,
            height: 4,
            rgba8_premul: Arc::new(px),
        },
        None,
    )
    .unwrap()
}

fn registry() -> MotifRegistry {
    let mut reg = MotifRegistry::new();
    reg.register(red_square());
    reg
}

fn item(motif: &str, x: f64, y: f64, size: f64) -> LayoutItem {
    LayoutItem {
        id: 0,
        motif_id: motif.to_string(),
        position: Point::new(x, y),
        size: Size::new(size, size),
        angle: 0.0,
        fill: None,
        anim_phase: 0.0,
        anim_speed: 1.0,
        appearance: Appearance::Native,
    }
}

fn layout(items: Vec<LayoutItem>) -> Layout {
    Layout {
        canvas: Canvas::new(32, 32).unwrap(),
        items,
    }
}

fn px(r: &CpuRenderer, x: usize, y: usize) -> [u8; 4] {
    let i = (y * 32 + x) * 4;
    let p = r.pixels();
    [p[i], p[i + 1], p[i + 2], p[i + 3]]
}

#[test]
fn empty_layout_renders_background_only() {
    let mut r = CpuRenderer::new(Canvas::new(32, 32).unwrap()).unwrap();
    let cfg = Config {
        background: Rgba8::rgb(0, 0, 255),
        ..Config::default()
    };
    r.render(&layout(vec![]), &registry(), &cfg, None, 0.0)
        .unwrap();
    assert!(r.pixels().chunks_exact(4).all(|p| p == [0, 0, 255, 255]));
}

#[test]
fn item_is_drawn_centered_on_its_position() {
    let mut r = CpuRenderer::new(Canvas::new(32, 32).unwrap()).unwrap();
    let cfg = Config::default();
    r.render(
        &layout(vec![item("red", 16.0, 16.0, 10.0)]),
        &registry(),
        &cfg,
        None,
        0.0,
    )
    .unwrap();
    let center = px(&r, 16, 16);
    assert!(center[0] > 250 && center[1] < 5 && center[2] < 5, "{center:?}");
    assert_eq!(px(&r, 2, 2), [255, 255, 255, 255]);
    assert_eq!(px(&r, 29, 16), [255, 255, 255, 255]);
}

#[test]
fn rendering_is_idempotent() {
    let mut r = CpuRenderer::new(Canvas::new(32, 32).unwrap()).unwrap();
    let cfg = Config {
        animation: AnimationOpts {
            enabled: true,
            ..AnimationOpts::default()
        },
        ..Config::default()
    };
    let l = layout(vec![item("red", 10.0, 12.0, 8.0)]);
    r.render(&l, &registry(), &cfg, None, 0.75).unwrap();
    let first = r.frame();
    r.render(&l, &registry(), &cfg, None, 0.75).unwrap();
    assert_eq!(first, r.frame());
}

#[test]
fn missing_motif_is_skipped() {
    let mut r = CpuRenderer::new(Canvas::new(32, 32).unwrap()).unwrap();
    let l = layout(vec![item("gone", 16.0, 16.0, 10.0)]);
    r.render(&l, &registry(), &Config::default(), None, 0.0)
        .unwrap();
    assert!(r.pixels().iter().all(|&b| b == 255));
}

#[test]
fn animation_moves_items_over_time() {
    let mut r = CpuRenderer::new(Canvas::new(32, 32).unwrap()).unwrap();
    let cfg = Config {
        animation: AnimationOpts {
            enabled: true,
            amplitude: 6.0,
            speed: 1.0,
        },
        ..Config::default()
    };
    let l = layout(vec![item("red", 16.0, 16.0, 6.0)]);
    r.render(&l, &registry(), &cfg, None, 0.0).unwrap();
    let a = r.frame();
    r.render(&l, &registry(), &cfg, None, 1.5).unwrap();
    assert_ne!(a, r.frame());
}

#[test]
fn disabled_animation_ignores_time() {
    let mut r = CpuRenderer::new(Canvas::new(32, 32).unwrap()).unwrap();
    let l = layout(vec![item("red", 16.0, 16.0, 6.0)]);
    r.render(&l, &registry(), &Config::default(), None, 0.0)
        .unwrap();
    let a = r.frame();
    r.render(&l, &registry(), &Config::default(), None, 3.0)
        .unwrap();
    assert_eq!(a, r.frame());
}

#[test]
fn straight_frame_unpremultiplies() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    let straight = frame.to_straight_rgba8();
    assert_eq!(straight[3], 128);
    assert!((i32::from(straight[0]) - 127).abs() <= 1);
}

#[test]
fn resize_rebinds_surface() {
    let mut r = CpuRenderer::new(Canvas::new(32, 32).unwrap()).unwrap();
    r.resize(Canvas::new(8, 4).unwrap()).unwrap();
    let l = Layout {
        canvas: Canvas::new(8, 4).unwrap(),
        items: vec![],
    };
    r.render(&l, &registry(), &Config::default(), None, 0.0)
        .unwrap();
    let f = r.frame();
    assert_eq!((f.width, f.height, f.data.len()), (8, 4, 8 * 4 * 4));
}
