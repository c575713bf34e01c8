use std::sync::{Arc, OnceLock};

use anyhow::Context;

use crate::{
    foundation::error::{WeaveError, WeaveResult},
    motif::registry::{EncodedImage, Motif, PreparedImage, PreparedSvg, VectorSource, ViewBox},
};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> WeaveResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(WeaveError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a prepared `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> WeaveResult<PreparedSvg> {
    let opts = usvg::Options {
        fontdb: svg_fontdb(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

fn svg_fontdb() -> Arc<usvg::fontdb::Database> {
    static DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    })
    .clone()
}

/// Decode a bitmap motif, keeping the encoded bytes for vector export.
pub fn decode_raster_motif(id: impl Into<String>, bytes: &[u8]) -> WeaveResult<Motif> {
    let id = id.into();
    let image = decode_image(bytes).map_err(|e| {
        WeaveError::decode(format!("raster motif '{id}': {e}"))
    })?;
    let encoded = image::guess_format(bytes).ok().map(|f| EncodedImage {
        mime: f.to_mime_type().to_string(),
        bytes: Arc::new(bytes.to_vec()),
    });
    Motif::raster(id, image, encoded)
}

/// Parse an SVG motif: a `usvg` tree for rendering plus the inline body and view box for export.
pub fn parse_svg_motif(id: impl Into<String>, text: &str) -> WeaveResult<Motif> {
    let id = id.into();
    let svg = parse_svg(text.as_bytes())
        .map_err(|e| WeaveError::decode(format!("svg motif '{id}': {e}")))?;
    let source = split_svg_source(text)
        .ok_or_else(|| WeaveError::decode(format!("svg motif '{id}': no <svg> root element")))?;
    Motif::vector(id, svg, source)
}

/// Split raw SVG markup into the inner body and root view box.
///
/// The view box comes from the root `viewBox` attribute, else `0 0 width height` when both
/// dimensions are explicit, else [`ViewBox::DEFAULT`].
pub fn split_svg_source(text: &str) -> Option<VectorSource> {
    let start = find_svg_open(text)?;
    let tag_end = find_tag_end(text, start)?;
    let tag = &text[start..=tag_end];
    let self_closing = tag.ends_with("/>");

    let body = if self_closing {
        String::new()
    } else {
        let close = text.rfind("</svg>").filter(|&c| c > tag_end)?;
        text[tag_end + 1..close].trim().to_string()
    };

    let attrs = parse_attrs(tag);
    let attr = |name: &str| {
        attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    };
    let view_box = attr("viewBox")
        .and_then(ViewBox::parse)
        .or_else(|| {
            let w = attr("width").and_then(parse_length)?;
            let h = attr("height").and_then(parse_length)?;
            Some(ViewBox {
                x: 0.0,
                y: 0.0,
                w,
                h,
            })
        })
        .unwrap_or(ViewBox::DEFAULT);

    Some(VectorSource { body, view_box })
}

fn find_svg_open(text: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = text[from..].find("<svg") {
        let at = from + rel;
        match text[at + 4..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(at),
            _ => from = at + 4,
        }
    }
    None
}

fn find_tag_end(text: &str, start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

fn parse_attrs(tag: &str) -> Vec<(&str, String)> {
    let inner = tag
        .trim_start_matches("<svg")
        .trim_end_matches('>')
        .trim_end_matches('/');
    let mut out = Vec::new();
    let mut rest = inner;
    while let Some(eq) = rest.find('=') {
        let name = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let Some(q) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(close) = after[1..].find(q) else {
            break;
        };
        let name = name.rsplit(char::is_whitespace).next().unwrap_or(name);
        out.push((name, after[1..1 + close].to_string()));
        rest = &after[close + 2..];
    }
    out
}

fn parse_length(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_suffix("px").unwrap_or(s);
    let v = s.parse::<f64>().ok()?;
    (v.is_finite() && v > 0.0).then_some(v)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motif/decode.rs"]
mod tests;
