use std::{f64::consts::FRAC_PI_2, sync::Arc};

use rayon::prelude::*;

use crate::{
    foundation::core::{Canvas, Point, Rgba8, Size},
    foundation::math::Rng64,
    layout::config::{Config, MAX_DENSITY, PlacementMode, RotationPolicy},
    mask::sampler::Mask,
    motif::registry::{Motif, MotifRegistry},
    render::tint::{TintedSurface, build_tinted_surface},
};

/// Random-mode attempts allowed per requested item.
const ATTEMPTS_PER_ITEM: usize = 50;
/// Overlap radius as a fraction of half the item's larger side.
const OVERLAP_RADIUS_FACTOR: f64 = 0.8;
/// Grids with more cells than this are treated as degenerate.
const MAX_GRID_CELLS: usize = 1 << 20;

/// How an item is drawn.
#[derive(Clone, Debug, Default)]
pub enum Appearance {
    /// The motif's own drawable scaled to the item size.
    #[default]
    Native,
    /// A prerendered, recolored copy at item size.
    TintedCache(TintedSurface),
}

impl Appearance {
    /// The tinted cache, if any.
    pub fn tinted(&self) -> Option<&TintedSurface> {
        match self {
            Appearance::Native => None,
            Appearance::TintedCache(s) => Some(s),
        }
    }
}

impl serde::Serialize for Appearance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(match self {
            Appearance::Native => "native",
            Appearance::TintedCache(_) => "tinted",
        })
    }
}

/// One placed motif instance.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LayoutItem {
    /// Index of the item within its layout.
    pub id: u32,
    /// Registry key of the motif drawn by this item.
    pub motif_id: String,
    /// Center position in canvas pixels.
    pub position: Point,
    /// Drawn width/height; both > 0.
    pub size: Size,
    /// Rotation in radians.
    pub angle: f64,
    /// Palette fill, when color application is enabled.
    pub fill: Option<Rgba8>,
    /// Animation phase in `[0, 2π)`.
    pub anim_phase: f64,
    /// Per-item animation speed multiplier in `[0.8, 1.2]`.
    pub anim_speed: f64,
    /// Native drawable or tinted cache.
    pub appearance: Appearance,
}

impl LayoutItem {
    /// Conservative circle radius used for overlap prevention.
    pub fn overlap_radius(&self) -> f64 {
        overlap_radius(self.size)
    }
}

/// The result of one generation: an ordered, immutable list of placed items.
///
/// Layouts hold no reference back to the engine or registry.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Layout {
    /// Canvas the layout was generated for.
    pub canvas: Canvas,
    /// Items in draw order.
    pub items: Vec<LayoutItem>,
}

impl Layout {
    /// Empty layout for `canvas`.
    pub fn empty(canvas: Canvas) -> Self {
        Self {
            canvas,
            items: Vec::new(),
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when no items were placed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Placement before animation/color attributes are assigned.
struct Placement {
    motif: Arc<Motif>,
    position: Point,
    size: Size,
    angle: f64,
}

/// Generate a fresh layout.
///
/// `mask` is consulted only when `config.mask.enabled`; a missing mask means "unmasked".
/// Never fails: an empty registry, degenerate grid pitch or exhausted attempt budget all yield a
/// shorter (possibly empty) layout.
#[tracing::instrument(skip(config, registry, mask), fields(mode = ?config.mode, motifs = registry.len()))]
pub fn generate(
    config: &Config,
    registry: &MotifRegistry,
    canvas: Canvas,
    mask: Option<&Mask>,
) -> Layout {
    let motifs: Vec<Arc<Motif>> = registry.iter().cloned().collect();
    if motifs.is_empty() {
        return Layout::empty(canvas);
    }
    let mask = mask.filter(|_| config.mask.enabled);
    let mut rng = Rng64::new(config.seed);

    let placements = match config.mode {
        PlacementMode::Grid => place_grid(config, &motifs, canvas, mask, &mut rng),
        PlacementMode::Random => place_random(config, &motifs, canvas, mask, &mut rng),
    };

    let mut items: Vec<(LayoutItem, Arc<Motif>)> = placements
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let anim_phase = rng.angle();
            let anim_speed = rng.range_f64(0.8, 1.2);
            let fill = config
                .colors_items()
                .then(|| config.palette[rng.index(config.palette.len())]);
            let item = LayoutItem {
                id: i as u32,
                motif_id: p.motif.id().to_string(),
                position: p.position,
                size: p.size,
                angle: p.angle,
                fill,
                anim_phase,
                anim_speed,
                appearance: Appearance::Native,
            };
            (item, p.motif)
        })
        .collect();

    items.par_iter_mut().for_each(|(item, motif)| {
        let Some(color) = item.fill else {
            return;
        };
        match build_tinted_surface(motif, color, item.size.width, item.size.height) {
            Ok(surface) => item.appearance = Appearance::TintedCache(surface),
            Err(e) => tracing::warn!(
                item = item.id,
                motif = %item.motif_id,
                error = %e,
                "tinted cache build failed; item renders natively"
            ),
        }
    });

    tracing::debug!(items = items.len(), "generated layout");
    Layout {
        canvas,
        items: items.into_iter().map(|(item, _)| item).collect(),
    }
}

fn place_grid(
    config: &Config,
    motifs: &[Arc<Motif>],
    canvas: Canvas,
    mask: Option<&Mask>,
    rng: &mut Rng64,
) -> Vec<Placement> {
    let step = config.max_size + config.grid_gap;
    if !(step > 0.0) || !(config.max_size > 0.0) {
        tracing::debug!(step, "degenerate grid pitch; empty layout");
        return Vec::new();
    }

    let (cols, rows) = grid_dims(canvas, step);
    if cols.saturating_mul(rows) > MAX_GRID_CELLS {
        tracing::warn!(cols, rows, "grid too dense; empty layout");
        return Vec::new();
    }
    let origin = grid_origin(canvas, step, cols, rows);

    let mut out = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let center = Point::new(
                origin.x + col as f64 * step,
                origin.y + row as f64 * step,
            );
            if mask.is_some_and(|m| !m.test(center.x, center.y)) {
                continue;
            }
            let motif = motifs[rng.index(motifs.len())].clone();
            let angle = match config.rotation {
                RotationPolicy::Randomized => rng.index(4) as f64 * FRAC_PI_2,
                RotationPolicy::Fixed => 0.0,
            };
            let size = Size::new(config.max_size, config.max_size / motif.aspect_ratio());
            out.push(Placement {
                motif,
                position: center,
                size,
                angle,
            });
        }
    }
    out
}

/// Column and row counts: one more than needed to span the canvas so edges stay covered.
pub(crate) fn grid_dims(canvas: Canvas, step: f64) -> (usize, usize) {
    let cols = (canvas.width_f64() / step).ceil() as usize + 1;
    let rows = (canvas.height_f64() / step).ceil() as usize + 1;
    (cols, rows)
}

/// Center of cell `(0, 0)`, chosen so the grid overhangs both edges equally.
pub(crate) fn grid_origin(canvas: Canvas, step: f64, cols: usize, rows: usize) -> Point {
    let span_x = (cols.saturating_sub(1)) as f64 * step;
    let span_y = (rows.saturating_sub(1)) as f64 * step;
    Point::new(
        (canvas.width_f64() - span_x) / 2.0,
        (canvas.height_f64() - span_y) / 2.0,
    )
}

fn place_random(
    config: &Config,
    motifs: &[Arc<Motif>],
    canvas: Canvas,
    mask: Option<&Mask>,
    rng: &mut Rng64,
) -> Vec<Placement> {
    let target = random_target(config.density) as usize;
    let budget = target.saturating_mul(ATTEMPTS_PER_ITEM);
    let mut out: Vec<Placement> = Vec::with_capacity(target);
    let mut attempts = 0usize;

    while out.len() < target && attempts < budget {
        attempts += 1;

        let position = Point::new(
            rng.next_f64_01() * canvas.width_f64(),
            rng.next_f64_01() * canvas.height_f64(),
        );
        if mask.is_some_and(|m| !m.test(position.x, position.y)) {
            continue;
        }

        let motif = &motifs[rng.index(motifs.len())];
        let width = rng.range_f64(config.min_size, config.max_size);
        let size = Size::new(width, width / motif.aspect_ratio());
        if !(size.width > 0.0 && size.height > 0.0) {
            continue;
        }

        if config.prevent_overlap {
            let r = overlap_radius(size);
            let collides = out
                .iter()
                .any(|p| p.position.distance(position) < r + overlap_radius(p.size));
            if collides {
                continue;
            }
        }

        let angle = match config.rotation {
            RotationPolicy::Randomized => rng.angle(),
            RotationPolicy::Fixed => 0.0,
        };
        out.push(Placement {
            motif: motif.clone(),
            position,
            size,
            angle,
        });
    }

    if out.len() < target {
        tracing::debug!(
            placed = out.len(),
            requested = target,
            attempts,
            "attempt budget exhausted"
        );
    }
    out
}

/// Random-mode item count, clamped for configs that skipped validation.
pub(crate) fn random_target(density: u32) -> u32 {
    if density > MAX_DENSITY {
        tracing::warn!(density, max = MAX_DENSITY, "density clamped");
        return MAX_DENSITY;
    }
    density
}

fn overlap_radius(size: Size) -> f64 {
    OVERLAP_RADIUS_FACTOR * size.width.max(size.height) / 2.0
}

#[cfg(test)]
#[path = "../../tests/unit/layout/generator.rs"]
mod tests;
