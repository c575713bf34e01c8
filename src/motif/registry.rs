use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::foundation::{
    error::{WeaveError, WeaveResult},
    math::fmt_num,
};

#[derive(Clone, Debug)]
/// Decoded raster motif in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Parsed SVG motif ready for rasterization.
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

#[derive(Clone, Debug)]
/// The drawable handle behind a motif.
pub enum Drawable {
    /// Bitmap motif.
    Raster(PreparedImage),
    /// Vector motif.
    Vector(PreparedSvg),
}

impl Drawable {
    /// Intrinsic size in pixels (SVG user units for vectors).
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            Drawable::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Drawable::Vector(svg) => {
                let s = svg.tree.size();
                (f64::from(s.width()), f64::from(s.height()))
            }
        }
    }
}

/// Motif flavor, used by the exporter to choose between inline vector bodies and image refs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MotifKind {
    /// SVG-sourced motif.
    Vector,
    /// Bitmap-sourced motif.
    Raster,
}

/// SVG `viewBox` rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    /// Min x.
    pub x: f64,
    /// Min y.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl ViewBox {
    /// Fallback for SVGs with neither a `viewBox` nor explicit dimensions.
    pub const DEFAULT: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 100.0,
        h: 100.0,
    };

    /// Parse `"x y w h"` (whitespace and/or comma separated).
    pub fn parse(s: &str) -> Option<Self> {
        let nums = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;
        let [x, y, w, h] = nums.as_slice() else {
            return None;
        };
        if ![*x, *y, *w, *h].iter().all(|v| v.is_finite()) || *w <= 0.0 || *h <= 0.0 {
            return None;
        }
        Some(Self {
            x: *x,
            y: *y,
            w: *w,
            h: *h,
        })
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            fmt_num(self.x),
            fmt_num(self.y),
            fmt_num(self.w),
            fmt_num(self.h)
        )
    }
}

/// Inline SVG source retained for vector export.
#[derive(Clone, Debug)]
pub struct VectorSource {
    /// Markup between the root `<svg>` open and close tags.
    pub body: String,
    /// Root view box.
    pub view_box: ViewBox,
}

/// Original encoded bytes of a raster motif, embedded as a data URI on export.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// Encoded file bytes.
    pub bytes: Arc<Vec<u8>>,
}

/// A registered drawable element. Immutable once registered.
#[derive(Clone, Debug)]
pub struct Motif {
    id: String,
    drawable: Drawable,
    aspect_ratio: f64,
    vector: Option<VectorSource>,
    encoded: Option<EncodedImage>,
}

impl Motif {
    /// Build a raster motif. `encoded` keeps the source bytes for export.
    pub fn raster(
        id: impl Into<String>,
        image: PreparedImage,
        encoded: Option<EncodedImage>,
    ) -> WeaveResult<Self> {
        Self::new(id.into(), Drawable::Raster(image), None, encoded)
    }

    /// Build a vector motif from a parsed tree plus its inline source.
    pub fn vector(
        id: impl Into<String>,
        svg: PreparedSvg,
        source: VectorSource,
    ) -> WeaveResult<Self> {
        Self::new(id.into(), Drawable::Vector(svg), Some(source), None)
    }

    fn new(
        id: String,
        drawable: Drawable,
        vector: Option<VectorSource>,
        encoded: Option<EncodedImage>,
    ) -> WeaveResult<Self> {
        if id.trim().is_empty() {
            return Err(WeaveError::validation("motif id must be non-empty"));
        }
        let (w, h) = drawable.intrinsic_size();
        let aspect_ratio = w / h;
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(WeaveError::validation(format!(
                "motif '{id}' has degenerate size {w}x{h}"
            )));
        }
        Ok(Self {
            id,
            drawable,
            aspect_ratio,
            vector,
            encoded,
        })
    }

    /// Registry key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Vector or raster.
    pub fn kind(&self) -> MotifKind {
        match self.drawable {
            Drawable::Raster(_) => MotifKind::Raster,
            Drawable::Vector(_) => MotifKind::Vector,
        }
    }

    /// Decoded drawable.
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    /// Width / height.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Inline SVG body + view box, for vector motifs.
    pub fn vector_source(&self) -> Option<&VectorSource> {
        self.vector.as_ref()
    }

    /// Original encoded bytes, for raster motifs loaded from files.
    pub fn encoded(&self) -> Option<&EncodedImage> {
        self.encoded.as_ref()
    }
}

/// The set of available motifs keyed by id.
///
/// Iteration is ordered by id so uniform picks are reproducible for a given seed.
#[derive(Clone, Debug, Default)]
pub struct MotifRegistry {
    motifs: BTreeMap<String, Arc<Motif>>,
}

impl MotifRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `motif`, returning the motif it replaced (if any).
    pub fn register(&mut self, motif: Motif) -> Option<Arc<Motif>> {
        let id = motif.id.clone();
        let replaced = self.motifs.insert(id.clone(), Arc::new(motif));
        if replaced.is_some() {
            tracing::debug!(motif = %id, "replaced registered motif");
        }
        replaced
    }

    /// Remove the motif registered under `id`.
    pub fn unregister(&mut self, id: &str) -> Option<Arc<Motif>> {
        self.motifs.remove(id)
    }

    /// Lookup by id.
    pub fn get(&self, id: &str) -> Option<&Arc<Motif>> {
        self.motifs.get(id)
    }

    /// `true` if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.motifs.contains_key(id)
    }

    /// Number of registered motifs.
    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    /// `true` if no motifs are registered.
    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    /// Motifs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Motif>> {
        self.motifs.values()
    }

    /// Registered ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.motifs.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motif/registry.rs"]
mod tests;
