use std::sync::Arc;

use crate::{
    foundation::core::{Affine, Rgba8},
    foundation::error::WeaveResult,
    foundation::math::mul_div255_u8,
    motif::registry::Motif,
    render::raster::{ImagePaint, paint_for_drawable, render_offscreen, target_px},
};

/// A motif prerendered at item size and recolored to a solid fill.
///
/// Built once per item at generation time; the render loop only blits it.
#[derive(Clone)]
pub struct TintedSurface {
    paint: ImagePaint,
}

impl std::fmt::Debug for TintedSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TintedSurface")
            .field("width", &self.paint.w)
            .field("height", &self.paint.h)
            .field("pixmap_ptr", &Arc::as_ptr(&self.paint.pixmap))
            .finish()
    }
}

impl TintedSurface {
    /// Pixel width of the cached raster.
    pub fn width(&self) -> u32 {
        self.paint.w
    }

    /// Pixel height of the cached raster.
    pub fn height(&self) -> u32 {
        self.paint.h
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.paint.pixmap.data_as_u8_slice()
    }

    pub(crate) fn image_paint(&self) -> &ImagePaint {
        &self.paint
    }
}

/// Draw `motif` scaled to `(w, h)` onto a fresh offscreen surface, then replace the color of
/// every pixel with `color` while keeping the drawn alpha.
///
/// The surface is `ceil(w) x ceil(h)` pixels with the motif occupying `(0, 0, w, h)`.
pub fn build_tinted_surface(
    motif: &Motif,
    color: Rgba8,
    w: f64,
    h: f64,
) -> WeaveResult<TintedSurface> {
    let pw = target_px(w)?;
    let ph = target_px(h)?;
    let source = paint_for_drawable(motif.drawable(), w, h)?;
    let mut pixmap = render_offscreen(pw as u16, ph as u16, |ctx| {
        source.fill(ctx, Affine::IDENTITY, w, h);
    });

    tint_in_place(pixmap.data_as_u8_slice_mut(), color);
    Ok(TintedSurface {
        paint: ImagePaint::from_pixmap(pixmap),
    })
}

/// Source-in recolor over premultiplied RGBA8: `a' = a * color.a`, `rgb' = color.rgb * a'`.
pub(crate) fn tint_in_place(rgba8_premul: &mut [u8], color: Rgba8) {
    for px in rgba8_premul.chunks_exact_mut(4) {
        let a = mul_div255_u8(u16::from(px[3]), u16::from(color.a));
        px[0] = mul_div255_u8(u16::from(color.r), u16::from(a));
        px[1] = mul_div255_u8(u16::from(color.g), u16::from(a));
        px[2] = mul_div255_u8(u16::from(color.b), u16::from(a));
        px[3] = a;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/tint.rs"]
mod tests;
