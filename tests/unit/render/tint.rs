use super::*;
use crate::motif::registry::PreparedImage;

fn half_transparent_motif() -> Motif {
    // Left column opaque white, right column fully transparent.
    let px = [
        255u8, 255, 255, 255, 0, 0, 0, 0, //
        255, 255, 255, 255, 0, 0, 0, 0,
    ];
    Motif::raster(
        "half",
        PreparedImage {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new(px.to_vec()),
        },
        None,
    )
    .unwrap()
}

#[test]
fn tint_keeps_alpha_and_replaces_color() {
    let mut px = vec![255u8, 255, 255, 255, 64, 64, 64, 128, 0, 0, 0, 0];
    tint_in_place(&mut px, Rgba8::rgb(255, 0, 0));
    assert_eq!(&px[0..4], &[255, 0, 0, 255]);
    assert_eq!(&px[4..8], &[128, 0, 0, 128]);
    assert_eq!(&px[8..12], &[0, 0, 0, 0]);
}

#[test]
fn tint_scales_alpha_by_color_alpha() {
    let mut px = vec![255u8, 255, 255, 255];
    tint_in_place(&mut px, Rgba8::rgba(0, 0, 255, 128));
    assert_eq!(px, vec![0, 0, 128, 128]);
}

#[test]
fn tinted_surface_has_item_size_and_solid_color() {
    let motif = half_transparent_motif();
    let surface = build_tinted_surface(&motif, Rgba8::rgb(0, 0, 255), 20.0, 10.0).unwrap();
    assert_eq!((surface.width(), surface.height()), (20, 10));

    let pixels = surface.pixels();
    let at = |x: usize, y: usize| &pixels[(y * 20 + x) * 4..(y * 20 + x) * 4 + 4];
    // Deep inside the opaque half.
    let opaque = at(2, 5);
    assert!(opaque[3] > 200);
    assert_eq!(opaque[2], opaque[3]);
    // Deep inside the transparent half.
    assert!(at(18, 5)[3] < 30);
    // No pixel carries any color other than blue.
    assert!(pixels.chunks_exact(4).all(|p| p[0] == 0 && p[1] == 0));
}

#[test]
fn fractional_sizes_round_up_and_degenerate_sizes_fail() {
    let motif = half_transparent_motif();
    let surface = build_tinted_surface(&motif, Rgba8::WHITE, 10.2, 4.5).unwrap();
    assert_eq!((surface.width(), surface.height()), (11, 5));
    assert!(build_tinted_surface(&motif, Rgba8::WHITE, 0.0, 4.0).is_err());
    assert!(build_tinted_surface(&motif, Rgba8::WHITE, f64::NAN, 4.0).is_err());
}
