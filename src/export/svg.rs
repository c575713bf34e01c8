use std::fmt::Write as _;

use base64::Engine as _;
use image::ImageEncoder as _;

use crate::{
    foundation::core::Rgba8,
    foundation::error::{WeaveError, WeaveResult},
    foundation::math::{fmt_num, unpremul_u8},
    layout::generator::{Layout, LayoutItem},
    motif::registry::{Drawable, Motif, MotifRegistry},
};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Serialize `layout` as a standalone SVG document matching a static (`t = 0`, no animation)
/// render.
///
/// Vector motifs are inlined as nested `<svg>` viewports; raster motifs become `<image>`
/// elements with `data:` URIs. Items whose motif is missing from `registry` are skipped.
#[tracing::instrument(skip_all, fields(items = layout.items.len()))]
pub fn export_svg(layout: &Layout, registry: &MotifRegistry, background: Option<Rgba8>) -> String {
    let (w, h) = (layout.canvas.width_f64(), layout.canvas.height_f64());
    let mut out = String::with_capacity(256 + layout.items.len() * 256);
    let _ = write!(
        out,
        r#"<svg xmlns="{SVG_NS}" xmlns:xlink="{XLINK_NS}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(w),
        h = fmt_num(h),
    );
    out.push('\n');
    if let Some(bg) = background {
        let _ = write!(
            out,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}""#,
            fmt_num(w),
            fmt_num(h),
            bg.to_hex_rgb()
        );
        if bg.a < 255 {
            let _ = write!(out, r#" fill-opacity="{}""#, fmt_num(f64::from(bg.a) / 255.0));
        }
        out.push_str("/>\n");
    }

    let mut skipped = 0usize;
    for item in &layout.items {
        let Some(motif) = registry.get(&item.motif_id) else {
            skipped += 1;
            continue;
        };
        match write_item(&mut out, item, motif) {
            Ok(()) => {}
            Err(e) => {
                skipped += 1;
                tracing::warn!(item = item.id, error = %e, "item not exported");
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "items not exported");
    }

    out.push_str("</svg>\n");
    out
}

fn write_item(out: &mut String, item: &LayoutItem, motif: &Motif) -> WeaveResult<()> {
    let (w, h) = (item.size.width, item.size.height);
    let (x, y) = (-w / 2.0, -h / 2.0);

    // Render the inner element first so a failing item leaves no half-open group behind.
    let inner = match motif.vector_source() {
        Some(src) => {
            let mut s = format!(
                r#"<svg x="{}" y="{}" width="{}" height="{}" viewBox="{}" preserveAspectRatio="none""#,
                fmt_num(x),
                fmt_num(y),
                fmt_num(w),
                fmt_num(h),
                src.view_box
            );
            if let Some(fill) = item.fill {
                let _ = write!(s, r#" fill="{}""#, fill.to_hex_rgb());
                if fill.a < 255 {
                    let _ = write!(s, r#" fill-opacity="{}""#, fmt_num(f64::from(fill.a) / 255.0));
                }
            }
            let _ = write!(s, ">{}</svg>", src.body);
            s
        }
        None => {
            let href = raster_href(item, motif)?;
            // A tinted cache is padded to whole pixels and drawn unscaled from the item's corner.
            let (iw, ih) = match item.appearance.tinted() {
                Some(s) => (f64::from(s.width()), f64::from(s.height())),
                None => (w, h),
            };
            format!(
                r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" href="{href}" xlink:href="{href}"/>"#,
                fmt_num(x),
                fmt_num(y),
                fmt_num(iw),
                fmt_num(ih),
            )
        }
    };

    let _ = writeln!(
        out,
        r#"<g data-motif="{}" transform="translate({} {}) rotate({})">{inner}</g>"#,
        escape_attr(motif.id()),
        fmt_num(item.position.x),
        fmt_num(item.position.y),
        fmt_num(item.angle.to_degrees()),
    );
    Ok(())
}

/// `data:` URI for a raster item: the tinted cache when the item carries one, else the original
/// encoded bytes, else a PNG re-encode of the decoded pixels.
fn raster_href(item: &LayoutItem, motif: &Motif) -> WeaveResult<String> {
    if let Some(surface) = item.appearance.tinted() {
        let png = encode_png_premul(surface.pixels(), surface.width(), surface.height())?;
        return Ok(data_uri("image/png", &png));
    }
    if let Some(enc) = motif.encoded() {
        return Ok(data_uri(&enc.mime, enc.bytes.as_slice()));
    }
    match motif.drawable() {
        Drawable::Raster(img) => {
            let png = encode_png_premul(img.rgba8_premul.as_slice(), img.width, img.height)?;
            Ok(data_uri("image/png", &png))
        }
        Drawable::Vector(_) => Err(WeaveError::render(format!(
            "vector motif '{}' has no retained source",
            motif.id()
        ))),
    }
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        escape_attr(mime),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn encode_png_premul(premul: &[u8], width: u32, height: u32) -> WeaveResult<Vec<u8>> {
    let mut straight = premul.to_vec();
    for px in straight.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = unpremul_u8(px[0], a);
        px[1] = unpremul_u8(px[1], a);
        px[2] = unpremul_u8(px[2], a);
    }
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(&straight, width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| WeaveError::render(format!("png encode: {e}")))?;
    Ok(buf)
}

pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/svg.rs"]
mod tests;
