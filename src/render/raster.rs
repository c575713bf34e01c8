use std::sync::Arc;

use crate::{
    foundation::core::Affine,
    foundation::error::{WeaveError, WeaveResult},
    motif::registry::{Drawable, PreparedImage},
};

/// Largest offscreen raster we allocate for a single motif.
const MAX_DIM: u32 = 8_192;

/// A CPU image paint together with its pixel dimensions.
#[derive(Clone)]
pub(crate) struct ImagePaint {
    pub(crate) pixmap: Arc<vello_cpu::Pixmap>,
    pub(crate) w: u32,
    pub(crate) h: u32,
}

impl ImagePaint {
    pub(crate) fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        let (w, h) = (u32::from(pixmap.width()), u32::from(pixmap.height()));
        Self {
            pixmap: Arc::new(pixmap),
            w,
            h,
        }
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(self.pixmap.clone()),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }

    /// Draw the paint stretched over the local rect `(0, 0, w, h)` under `transform`.
    pub(crate) fn fill(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        transform: Affine,
        w: f64,
        h: f64,
    ) {
        let sx = w / f64::from(self.w);
        let sy = h / f64::from(self.h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(
            transform * Affine::scale_non_uniform(sx, sy),
        ));
        ctx.set_paint(self.paint());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.w),
            f64::from(self.h),
        ));
    }
}

/// Pixel size for an offscreen raster covering `v` logical units.
pub(crate) fn target_px(v: f64) -> WeaveResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(WeaveError::render(format!("invalid raster extent {v}")));
    }
    let px = (v.ceil() as u32).max(1);
    if px > MAX_DIM {
        return Err(WeaveError::render(format!(
            "raster extent too large: {px} (max {MAX_DIM})"
        )));
    }
    Ok(px)
}

/// Paint for a decoded bitmap at its native resolution.
pub(crate) fn paint_for_image(img: &PreparedImage) -> WeaveResult<ImagePaint> {
    let pixmap = pixmap_from_premul_bytes(img.rgba8_premul.as_slice(), img.width, img.height)?;
    Ok(ImagePaint::from_pixmap(pixmap))
}

/// Paint for `drawable` suitable for drawing at `(w, h)` logical units.
///
/// Bitmaps are returned at native resolution and scaled at draw time; vectors are rasterized
/// directly at the target pixel size so they stay crisp.
pub(crate) fn paint_for_drawable(drawable: &Drawable, w: f64, h: f64) -> WeaveResult<ImagePaint> {
    match drawable {
        Drawable::Raster(img) => paint_for_image(img),
        Drawable::Vector(svg) => {
            let pw = target_px(w)?;
            let ph = target_px(h)?;
            let bytes = rasterize_svg_to_premul_rgba8(&svg.tree, pw, ph)?;
            Ok(ImagePaint::from_pixmap(pixmap_from_premul_bytes(
                &bytes, pw, ph,
            )?))
        }
    }
}

/// Rasterize an SVG tree stretched to exactly `width x height` pixels.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> WeaveResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| WeaveError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

/// Render the content of a fresh `width x height` context into a new pixmap.
pub(crate) fn render_offscreen(
    width: u16,
    height: u16,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) -> vello_cpu::Pixmap {
    let mut ctx = vello_cpu::RenderContext::new(width, height);
    draw(&mut ctx);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> WeaveResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| WeaveError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| WeaveError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(WeaveError::render("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba_premul: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba_premul);
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}
