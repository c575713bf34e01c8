use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::{WeaveError, WeaveResult},
    motif::{
        decode::{decode_raster_motif, parse_svg_motif},
        registry::Motif,
    },
};

const RASTER_EXTS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Load one motif file. `.svg` becomes a vector motif, known bitmap extensions a raster motif.
/// The id is the file stem.
pub fn load_motif_file(path: &Path) -> WeaveResult<Motif> {
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            WeaveError::validation(format!("motif path '{}' has no file stem", path.display()))
        })?
        .to_string();
    let ext = extension_lower(path).unwrap_or_default();

    if ext == "svg" {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read svg motif '{}'", path.display()))?;
        return parse_svg_motif(id, &text);
    }
    if RASTER_EXTS.contains(&ext.as_str()) {
        let bytes =
            std::fs::read(path).with_context(|| format!("read motif '{}'", path.display()))?;
        return decode_raster_motif(id, &bytes);
    }
    Err(WeaveError::validation(format!(
        "unsupported motif file '{}'",
        path.display()
    )))
}

/// Load every supported motif file in `dir`, in file-name order. Unsupported files are skipped.
pub fn load_motif_dir(dir: &Path) -> WeaveResult<Vec<Motif>> {
    let rd =
        std::fs::read_dir(dir).with_context(|| format!("read motif dir '{}'", dir.display()))?;

    let mut paths = Vec::new();
    for entry in rd {
        let path = entry.context("read motif dir entry")?.path();
        if !path.is_file() {
            continue;
        }
        match extension_lower(&path) {
            Some(ext) if ext == "svg" || RASTER_EXTS.contains(&ext.as_str()) => paths.push(path),
            _ => tracing::debug!(path = %path.display(), "skipping non-motif file"),
        }
    }
    paths.sort();

    paths.iter().map(|p| load_motif_file(p)).collect()
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

#[cfg(test)]
#[path = "../../tests/unit/motif/load.rs"]
mod tests;
