use super::*;

fn solid_image(w: u32, h: u32) -> PreparedImage {
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(vec![255u8; (w * h * 4) as usize]),
    }
}

#[test]
fn raster_motif_aspect_ratio_is_width_over_height() {
    let m = Motif::raster("a", solid_image(40, 20), None).unwrap();
    assert_eq!(m.kind(), MotifKind::Raster);
    assert_eq!(m.aspect_ratio(), 2.0);
    assert!(m.vector_source().is_none());
}

#[test]
fn degenerate_motifs_are_rejected() {
    assert!(Motif::raster("a", solid_image(0, 20), None).is_err());
    assert!(Motif::raster(" ", solid_image(4, 4), None).is_err());
}

#[test]
fn register_replaces_and_unregister_removes() {
    let mut reg = MotifRegistry::new();
    assert!(reg.is_empty());
    assert!(
        reg.register(Motif::raster("b", solid_image(4, 4), None).unwrap())
            .is_none()
    );
    assert!(
        reg.register(Motif::raster("a", solid_image(4, 8), None).unwrap())
            .is_none()
    );
    let replaced = reg.register(Motif::raster("b", solid_image(8, 4), None).unwrap());
    assert_eq!(replaced.unwrap().aspect_ratio(), 1.0);
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(reg.get("b").unwrap().aspect_ratio(), 2.0);

    assert!(reg.unregister("a").is_some());
    assert!(!reg.contains("a"));
    assert!(reg.unregister("a").is_none());
}

#[test]
fn view_box_parse_and_display() {
    let vb = ViewBox::parse("0, 0 24 24").unwrap();
    assert_eq!(vb.w, 24.0);
    assert_eq!(vb.to_string(), "0 0 24 24");
    assert_eq!(ViewBox::parse("0 0 1.5 2").unwrap().to_string(), "0 0 1.5 2");
    assert!(ViewBox::parse("0 0 24").is_none());
    assert!(ViewBox::parse("0 0 0 24").is_none());
    assert!(ViewBox::parse("a b c d").is_none());
    assert_eq!(ViewBox::DEFAULT.to_string(), "0 0 100 100");
}
