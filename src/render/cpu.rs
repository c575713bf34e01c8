use std::collections::HashMap;

use crate::{
    foundation::core::{Affine, Canvas},
    foundation::error::WeaveResult,
    foundation::math::unpremul_u8,
    layout::{config::Config, generator::Layout},
    mask::sampler::Mask,
    motif::registry::{Drawable, Motif, MotifRegistry},
    render::{
        anim::anim_offsets,
        raster::{ImagePaint, clear_pixmap, paint_for_image, paint_for_drawable, target_px},
    },
};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data, as expected by PNG encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = px[3];
                px[0] = unpremul_u8(px[0], a);
                px[1] = unpremul_u8(px[1], a);
                px[2] = unpremul_u8(px[2], a);
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SvgRasterKey {
    motif: String,
    width: u32,
    height: u32,
}

/// CPU renderer bound to one output surface.
///
/// Caches native motif paints across frames: bitmaps per motif, SVG rasters per
/// `(motif, pixel size)`. SVG rasters not drawn in the latest frame are evicted.
pub struct CpuRenderer {
    canvas: Canvas,
    surface: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    image_cache: HashMap<String, ImagePaint>,
    svg_cache: HashMap<SvgRasterKey, (ImagePaint, u64)>,
    frame_no: u64,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("canvas", &self.canvas)
            .field("image_cache", &self.image_cache.len())
            .field("svg_cache", &self.svg_cache.len())
            .finish_non_exhaustive()
    }
}

impl CpuRenderer {
    /// Allocate a renderer for `canvas`.
    pub fn new(canvas: Canvas) -> WeaveResult<Self> {
        let (w, h) = canvas.to_u16()?;
        Ok(Self {
            canvas,
            surface: vello_cpu::Pixmap::new(w, h),
            ctx: None,
            image_cache: HashMap::new(),
            svg_cache: HashMap::new(),
            frame_no: 0,
        })
    }

    /// Bound surface size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Rebind to a surface of a new size. Content is cleared.
    pub fn resize(&mut self, canvas: Canvas) -> WeaveResult<()> {
        let (w, h) = canvas.to_u16()?;
        self.canvas = canvas;
        self.surface = vello_cpu::Pixmap::new(w, h);
        self.ctx = None;
        Ok(())
    }

    /// Drop cached paints for motif `id` (call after replacing or removing it).
    pub fn forget_motif(&mut self, id: &str) {
        self.image_cache.remove(id);
        self.svg_cache.retain(|k, _| k.motif != id);
    }

    /// Draw `layout` at time `t` (seconds).
    ///
    /// Clears to the background, optionally draws the mask preview, then each item centered at
    /// its (animated) position. Items whose motif is no longer registered are skipped. Item
    /// state is never mutated, so identical inputs give identical pixels.
    #[tracing::instrument(skip_all, fields(items = layout.items.len(), t = t))]
    pub fn render(
        &mut self,
        layout: &Layout,
        registry: &MotifRegistry,
        config: &Config,
        mask: Option<&Mask>,
        t: f64,
    ) -> WeaveResult<()> {
        let (w16, h16) = self.canvas.to_u16()?;
        self.frame_no = self.frame_no.wrapping_add(1);
        self.image_cache.retain(|id, _| registry.contains(id));

        let bg = config.background;
        clear_pixmap(&mut self.surface, bg.to_premul());

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w16 && ctx.height() == h16 => ctx,
            _ => vello_cpu::RenderContext::new(w16, h16),
        };
        ctx.reset();

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            self.canvas.width_f64(),
            self.canvas.height_f64(),
        ));

        if config.mask.enabled
            && config.mask.show_outline
            && let Some(mask) = mask
        {
            let preview = mask.preview();
            ctx.push_opacity_layer(config.mask.outline_opacity);
            preview.fill(
                &mut ctx,
                Affine::IDENTITY,
                f64::from(mask.width()),
                f64::from(mask.height()),
            );
            ctx.pop_layer();
        }

        let mut skipped = 0usize;
        for item in &layout.items {
            let Some(motif) = registry.get(&item.motif_id) else {
                skipped += 1;
                continue;
            };
            let off = anim_offsets(item, &config.animation, t);
            let (w, h) = (item.size.width, item.size.height);
            let transform = Affine::translate((item.position.x + off.dx, item.position.y + off.dy))
                * Affine::rotate(item.angle + off.drot)
                * Affine::translate((-w / 2.0, -h / 2.0));

            if let Some(tinted) = item.appearance.tinted() {
                let p = tinted.image_paint();
                p.fill(&mut ctx, transform, f64::from(p.w), f64::from(p.h));
                continue;
            }
            match self.native_paint(motif, w, h) {
                Ok(p) => p.fill(&mut ctx, transform, w, h),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(item = item.id, error = %e, "item skipped");
                }
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "items not drawn");
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut self.surface);
        self.ctx = Some(ctx);

        let frame_no = self.frame_no;
        self.svg_cache.retain(|_, (_, used)| *used == frame_no);
        Ok(())
    }

    /// Premultiplied RGBA8 of the last rendered frame.
    pub fn pixels(&self) -> &[u8] {
        self.surface.data_as_u8_slice()
    }

    /// Copy of the last rendered frame.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixels().to_vec(),
            premultiplied: true,
        }
    }

    fn native_paint(&mut self, motif: &Motif, w: f64, h: f64) -> WeaveResult<ImagePaint> {
        match motif.drawable() {
            Drawable::Raster(img) => {
                if let Some(p) = self.image_cache.get(motif.id()) {
                    return Ok(p.clone());
                }
                let p = paint_for_image(img)?;
                self.image_cache.insert(motif.id().to_string(), p.clone());
                Ok(p)
            }
            Drawable::Vector(_) => {
                let key = SvgRasterKey {
                    motif: motif.id().to_string(),
                    width: target_px(w)?,
                    height: target_px(h)?,
                };
                if let Some((p, used)) = self.svg_cache.get_mut(&key) {
                    *used = self.frame_no;
                    return Ok(p.clone());
                }
                let p = paint_for_drawable(motif.drawable(), w, h)?;
                self.svg_cache.insert(key, (p.clone(), self.frame_no));
                Ok(p)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
