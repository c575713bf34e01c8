//! Motifweave is a procedural 2D pattern-layout engine.
//!
//! Given a set of motifs (SVG icons or bitmaps) and a declarative [`Config`], it:
//!
//! - computes a [`Layout`] of placed items (random scatter with optional overlap rejection, or a
//!   centered grid), optionally constrained to the dark opaque region of a [`Mask`] image
//! - renders the layout onto a CPU surface at any animation time `t`
//! - serializes the static pose to a standalone SVG document
//!
//! The [`Engine`] owns the bound surface, the [`MotifRegistry`] and the mask. Layouts are
//! plain values with no back-reference to the engine.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod engine;
pub(crate) mod export;
pub(crate) mod layout;
pub(crate) mod mask;
pub(crate) mod motif;
pub(crate) mod render;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Size, Vec2};
pub use crate::foundation::error::{WeaveError, WeaveResult};
pub use crate::foundation::math::Rng64;

pub use crate::engine::Engine;
pub use crate::export::svg::export_svg;
pub use crate::layout::config::{AnimationOpts, Config, MaskOpts, PlacementMode, RotationPolicy};
pub use crate::layout::generator::{Appearance, Layout, LayoutItem, generate};
pub use crate::mask::sampler::Mask;
pub use crate::motif::decode::{
    decode_image, decode_raster_motif, parse_svg, parse_svg_motif, split_svg_source,
};
pub use crate::motif::load::{load_motif_dir, load_motif_file};
pub use crate::motif::registry::{
    Drawable, EncodedImage, Motif, MotifKind, MotifRegistry, PreparedImage, PreparedSvg,
    VectorSource, ViewBox,
};
pub use crate::render::anim::{AnimOffsets, anim_offsets};
pub use crate::render::cpu::{CpuRenderer, FrameRGBA};
pub use crate::render::tint::{TintedSurface, build_tinted_surface};
