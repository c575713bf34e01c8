use std::sync::Arc;

use crate::{
    foundation::core::{Affine, Canvas},
    foundation::error::WeaveResult,
    foundation::math::unpremul_u8,
    motif::registry::Drawable,
    render::raster::{ImagePaint, paint_for_drawable, render_offscreen},
};

/// Fraction of the shorter canvas side the reference image is fitted into.
const FIT_FRACTION: f64 = 0.9;
/// Pixels with alpha at or below this are outside the mask.
const ALPHA_THRESHOLD: u8 = 50;
/// Pixels with mean RGB at or above this are outside the mask.
const LUMINANCE_THRESHOLD: f64 = 200.0;

/// Pixel-presence test over canvas coordinates, rasterized from a reference image.
///
/// A mask is tied to the canvas size it was built for; rebuild it on resize.
#[derive(Clone)]
pub struct Mask {
    width: u32,
    height: u32,
    /// Straight-alpha RGBA8, row-major.
    rgba: Arc<Vec<u8>>,
    preview: ImagePaint,
}

impl std::fmt::Debug for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mask")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Mask {
    /// Fit `reference` ("contain") into 90% of the shorter canvas side, center it, and rasterize
    /// onto a canvas-sized buffer.
    ///
    /// Returns `None` when rasterization is impossible (zero-size canvas, oversized canvas,
    /// degenerate image); callers then treat the canvas as unmasked.
    pub fn build(reference: &Drawable, canvas: Canvas) -> Option<Self> {
        match Self::try_build(reference, canvas) {
            Ok(mask) => mask,
            Err(e) => {
                tracing::warn!(error = %e, "mask rasterization failed; masking disabled");
                None
            }
        }
    }

    fn try_build(reference: &Drawable, canvas: Canvas) -> WeaveResult<Option<Self>> {
        if canvas.is_empty() {
            tracing::warn!("mask requested for empty canvas; masking disabled");
            return Ok(None);
        }
        let (cw, ch) = canvas.to_u16()?;
        let (iw, ih) = reference.intrinsic_size();
        if !(iw > 0.0 && ih > 0.0) {
            return Ok(None);
        }

        let fit = canvas.width_f64().min(canvas.height_f64()) * FIT_FRACTION;
        let scale = (fit / iw).min(fit / ih);
        let (dw, dh) = (iw * scale, ih * scale);
        let ox = (canvas.width_f64() - dw) / 2.0;
        let oy = (canvas.height_f64() - dh) / 2.0;

        let paint = paint_for_drawable(reference, dw, dh)?;
        let pixmap = render_offscreen(cw, ch, |ctx| {
            paint.fill(ctx, Affine::translate((ox, oy)), dw, dh);
        });

        let mut rgba = pixmap.data_as_u8_slice().to_vec();
        for px in rgba.chunks_exact_mut(4) {
            let a = px[3];
            px[0] = unpremul_u8(px[0], a);
            px[1] = unpremul_u8(px[1], a);
            px[2] = unpremul_u8(px[2], a);
        }

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            "built mask"
        );
        Ok(Some(Self {
            width: canvas.width,
            height: canvas.height,
            rgba: Arc::new(rgba),
            preview: ImagePaint::from_pixmap(pixmap),
        }))
    }

    /// Build a mask directly from straight-alpha canvas-sized pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        let mut premul = rgba.clone();
        for px in premul.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * a + 127) / 255) as u8;
            }
        }
        let pixmap =
            crate::render::raster::pixmap_from_premul_bytes(&premul, width, height).ok()?;
        Some(Self {
            width,
            height,
            rgba: Arc::new(rgba),
            preview: ImagePaint::from_pixmap(pixmap),
        })
    }

    /// Canvas width the mask was built for.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height the mask was built for.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` iff `(x, y)` lies on the canvas and the pixel there is opaque enough
    /// (alpha > 50) and dark enough (mean of R, G, B < 200).
    pub fn test(&self, x: f64, y: f64) -> bool {
        if !(x >= 0.0 && y >= 0.0) {
            return false;
        }
        let (xi, yi) = (x.floor(), y.floor());
        if xi >= f64::from(self.width) || yi >= f64::from(self.height) {
            return false;
        }
        let idx = ((yi as usize) * (self.width as usize) + (xi as usize)) * 4;
        let px = &self.rgba[idx..idx + 4];
        let luminance = (f64::from(px[0]) + f64::from(px[1]) + f64::from(px[2])) / 3.0;
        px[3] > ALPHA_THRESHOLD && luminance < LUMINANCE_THRESHOLD
    }

    pub(crate) fn preview(&self) -> &ImagePaint {
        &self.preview
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/sampler.rs"]
mod tests;
