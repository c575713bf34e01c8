use std::sync::Arc;

use super::*;
use crate::{
    foundation::core::{Canvas, Point, Size},
    layout::generator::Appearance,
    motif::decode::parse_svg_motif,
    motif::registry::PreparedImage,
};

const STAR: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M12 2l3 7h7l-6 4 2 8-6-5-6 5 2-8-6-4h7z"/></svg>"#;

fn registry() -> MotifRegistry {
    let mut reg = MotifRegistry::new();
    reg.register(parse_svg_motif("star", STAR).unwrap());
    reg.register(
        Motif::raster(
            "dot",
            PreparedImage {
                width: 2,
                height: 2,
                rgba8_premul: Arc::new(vec![255u8; 16]),
            },
            None,
        )
        .unwrap(),
    );
    reg
}

fn item(id: u32, motif: &str, x: f64, y: f64) -> LayoutItem {
    LayoutItem {
        id,
        motif_id: motif.to_string(),
        position: Point::new(x, y),
        size: Size::new(20.0, 10.0),
        angle: std::f64::consts::FRAC_PI_2,
        fill: None,
        anim_phase: 1.0,
        anim_speed: 1.1,
        appearance: Appearance::Native,
    }
}

fn layout(items: Vec<LayoutItem>) -> Layout {
    Layout {
        canvas: Canvas::new(200, 100).unwrap(),
        items,
    }
}

#[test]
fn empty_layout_is_a_valid_shell() {
    let doc = export_svg(&layout(vec![]), &registry(), Some(Rgba8::WHITE));
    assert!(doc.starts_with("<svg "));
    assert!(doc.contains(r#"width="200" height="100" viewBox="0 0 200 100""#));
    assert!(doc.contains(r##"<rect x="0" y="0" width="200" height="100" fill="#ffffff"/>"##));
    assert!(doc.trim_end().ends_with("</svg>"));
    assert!(!doc.contains("<g "));
    assert!(usvg::Tree::from_str(&doc, &usvg::Options::default()).is_ok());
}

#[test]
fn vector_item_is_nested_viewport_with_transform() {
    let mut it = item(0, "star", 50.5, 40.25);
    it.fill = Some(Rgba8::rgb(255, 0, 0));
    let doc = export_svg(&layout(vec![it]), &registry(), None);
    assert!(doc.contains(r#"transform="translate(50.5 40.25) rotate(90)""#));
    assert!(doc.contains(
        r##"<svg x="-10" y="-5" width="20" height="10" viewBox="0 0 24 24" preserveAspectRatio="none" fill="#ff0000">"##
    ));
    assert!(doc.contains("<path d="));
    assert!(!doc.contains("<rect"));
}

#[test]
fn raster_item_is_embedded_as_data_uri() {
    let doc = export_svg(&layout(vec![item(0, "dot", 10.0, 10.0)]), &registry(), None);
    assert!(doc.contains(r#"<image x="-10" y="-5" width="20" height="10""#));
    assert!(doc.contains("href=\"data:image/png;base64,"));
    assert!(usvg::Tree::from_str(&doc, &usvg::Options::default()).is_ok());
}

#[test]
fn tinted_raster_keeps_padded_pixel_size() {
    let reg = registry();
    let dot = reg.get("dot").unwrap();
    let mut it = item(0, "dot", 40.0, 30.0);
    it.size = Size::new(20.3, 10.3);
    it.fill = Some(Rgba8::rgb(0, 0, 255));
    it.appearance = Appearance::TintedCache(
        crate::render::tint::build_tinted_surface(dot, Rgba8::rgb(0, 0, 255), 20.3, 10.3).unwrap(),
    );

    let doc = export_svg(&layout(vec![it]), &reg, None);
    assert!(
        doc.contains(r#"<image x="-10.15" y="-5.15" width="21" height="11""#),
        "{doc}"
    );
}

#[test]
fn missing_motifs_are_skipped() {
    let items = vec![
        item(0, "star", 10.0, 10.0),
        item(1, "gone", 20.0, 20.0),
        item(2, "dot", 30.0, 30.0),
    ];
    let doc = export_svg(&layout(items), &registry(), None);
    assert_eq!(doc.matches("<g ").count(), 2);
    assert!(!doc.contains("translate(20 20)"));
}

#[test]
fn export_ignores_animation_state() {
    let a = item(0, "star", 10.0, 10.0);
    let mut b = a.clone();
    b.anim_phase = 3.0;
    b.anim_speed = 0.8;
    assert_eq!(
        export_svg(&layout(vec![a]), &registry(), None),
        export_svg(&layout(vec![b]), &registry(), None)
    );
}

#[test]
fn attribute_escaping() {
    assert_eq!(escape_attr(r#"a&b<"c">'"#), "a&amp;b&lt;&quot;c&quot;&gt;&apos;");
}
