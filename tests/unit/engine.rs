use std::sync::Arc;

use super::*;
use crate::{
    layout::config::{MaskOpts, PlacementMode},
    motif::registry::PreparedImage,
};

fn solid(id: &str) -> Motif {
    Motif::raster(
        id,
        PreparedImage {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new(vec![0, 0, 0, 255].repeat(4)),
        },
        None,
    )
    .unwrap()
}

/// Opaque black square in the left half, transparent right half.
fn left_half_mask() -> Drawable {
    let mut px = Vec::new();
    for _y in 0..10 {
        for x in 0..10 {
            if x < 5 {
                px.extend_from_slice(&[0, 0, 0, 255]);
            } else {
                px.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    Drawable::Raster(PreparedImage {
        width: 10,
        height: 10,
        rgba8_premul: Arc::new(px),
    })
}

fn engine() -> Engine {
    let mut e = Engine::new(Canvas::new(100, 100).unwrap()).unwrap();
    e.register_motif(solid("a"));
    e.register_motif(solid("b"));
    e
}

#[test]
fn generate_is_seeded() {
    let e = engine();
    let cfg = Config {
        density: 25,
        ..Config::default()
    };
    let a = e.generate(&cfg).unwrap();
    let b = e.generate(&cfg).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
    let c = e.generate_with_seed(&cfg, 99).unwrap();
    assert_ne!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&c).unwrap()
    );
}

#[test]
fn generate_rejects_invalid_config() {
    let e = engine();
    let cfg = Config {
        min_size: 80.0,
        max_size: 10.0,
        ..Config::default()
    };
    assert!(e.generate(&cfg).is_err());
}

#[test]
fn replacing_and_removing_motifs() {
    let mut e = engine();
    assert!(e.register_motif(solid("a")));
    assert!(!e.register_motif(solid("c")));
    assert_eq!(e.registry().len(), 3);
    assert!(e.unregister_motif("c"));
    assert!(!e.unregister_motif("c"));
}

#[test]
fn layouts_survive_motif_removal() {
    let mut e = engine();
    let cfg = Config {
        density: 10,
        ..Config::default()
    };
    let layout = e.generate(&cfg).unwrap();
    e.unregister_motif("a");
    e.unregister_motif("b");
    e.render(&layout, &cfg, 0.0).unwrap();
    assert!(e.frame().data.iter().all(|&b| b == 255));
    let doc = e.export_svg(&layout, &cfg);
    assert!(!doc.contains("<g "));
}

#[test]
fn mask_restricts_random_placement() {
    let mut e = engine();
    assert!(e.set_mask_image(left_half_mask()));
    let cfg = Config {
        density: 40,
        mask: MaskOpts {
            enabled: true,
            ..MaskOpts::default()
        },
        ..Config::default()
    };
    let layout = e.generate(&cfg).unwrap();
    assert!(!layout.is_empty());
    for item in &layout.items {
        assert!(e.mask().unwrap().test(item.position.x, item.position.y));
        assert!(item.position.x < 52.0);
    }
}

#[test]
fn resize_rebuilds_mask_and_clear_removes_it() {
    let mut e = engine();
    e.set_mask_image(left_half_mask());
    e.resize(Canvas::new(40, 20).unwrap()).unwrap();
    let mask = e.mask().unwrap();
    assert_eq!((mask.width(), mask.height()), (40, 20));
    assert_eq!(e.frame().width, 40);

    e.clear_mask();
    assert!(e.mask().is_none());
    let cfg = Config {
        mode: PlacementMode::Grid,
        mask: MaskOpts {
            enabled: true,
            ..MaskOpts::default()
        },
        ..Config::default()
    };
    assert!(!e.generate(&cfg).unwrap().is_empty());
}
