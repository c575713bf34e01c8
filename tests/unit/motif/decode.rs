use std::io::Cursor;

use super::*;
use crate::motif::registry::MotifKind;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn raster_motif_keeps_encoded_png() {
    let bytes = png_bytes(6, 3, [0, 0, 0, 255]);
    let m = decode_raster_motif("dot", &bytes).unwrap();
    assert_eq!(m.kind(), MotifKind::Raster);
    assert_eq!(m.aspect_ratio(), 2.0);
    let enc = m.encoded().unwrap();
    assert_eq!(enc.mime, "image/png");
    assert_eq!(enc.bytes.len(), bytes.len());
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(decode_raster_motif("x", b"not an image").is_err());
    assert!(parse_svg(br#"<svg"#).is_err());
}

#[test]
fn svg_motif_splits_body_and_view_box() {
    let text = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 12"><path d="M0 0 L24 0 L24 12 Z"/></svg>"#;
    let m = parse_svg_motif("tri", text).unwrap();
    assert_eq!(m.kind(), MotifKind::Vector);
    let src = m.vector_source().unwrap();
    assert_eq!(src.body, r#"<path d="M0 0 L24 0 L24 12 Z"/>"#);
    assert_eq!(src.view_box.to_string(), "0 0 24 12");
    assert!((m.aspect_ratio() - 2.0).abs() < 1e-9);
}

#[test]
fn view_box_falls_back_to_dimensions_then_default() {
    let with_dims = split_svg_source(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="30px" height="10"><rect width="30" height="10"/></svg>"#,
    )
    .unwrap();
    assert_eq!(with_dims.view_box.to_string(), "0 0 30 10");

    let bare = split_svg_source(r#"<svg xmlns="http://www.w3.org/2000/svg"><g/></svg>"#).unwrap();
    assert_eq!(bare.view_box, ViewBox::DEFAULT);
    assert_eq!(bare.body, "<g/>");

    let empty = split_svg_source(r#"<svg width="5" height="5"/>"#).unwrap();
    assert!(empty.body.is_empty());

    assert!(split_svg_source("<svgx></svgx>").is_none());
}

#[test]
fn attribute_values_may_contain_angle_brackets() {
    let src = split_svg_source(
        r#"<svg data-note="a>b" viewBox="0 0 8 8"><circle r="4"/></svg>"#,
    )
    .unwrap();
    assert_eq!(src.view_box.to_string(), "0 0 8 8");
    assert_eq!(src.body, r#"<circle r="4"/>"#);
}
