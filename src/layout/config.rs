use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{WeaveError, WeaveResult},
};

/// Largest random-mode item count accepted.
pub(crate) const MAX_DENSITY: u32 = 100_000;

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Placement algorithm.
pub enum PlacementMode {
    /// Rejection-sampled scatter of `density` items.
    #[default]
    Random,
    /// Regular grid with pitch `max_size + grid_gap`.
    Grid,
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Item rotation policy.
pub enum RotationPolicy {
    /// Every item has angle 0.
    Fixed,
    /// Free angle in random mode, quarter turns in grid mode.
    #[default]
    Randomized,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Region-constraint options.
pub struct MaskOpts {
    /// Constrain placement to the mask's active region.
    pub enabled: bool,
    /// Draw the mask reference faintly beneath the items.
    pub show_outline: bool,
    /// Opacity of the outline preview in `[0, 1]`.
    pub outline_opacity: f32,
}

impl Default for MaskOpts {
    fn default() -> Self {
        Self {
            enabled: false,
            show_outline: false,
            outline_opacity: 0.15,
        }
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Per-frame float animation.
pub struct AnimationOpts {
    /// Apply animation offsets when rendering.
    pub enabled: bool,
    /// Vertical drift amplitude in pixels (horizontal drift is half of it).
    pub amplitude: f64,
    /// Angular speed multiplier applied to the timestamp (seconds).
    pub speed: f64,
}

impl Default for AnimationOpts {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude: 10.0,
            speed: 1.0,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Declarative layout + render configuration.
///
/// Configurations are plain values owned by the host; the engine never keeps one beyond a call.
/// Every field has a default, so partial JSON documents are accepted.
pub struct Config {
    /// Placement algorithm.
    pub mode: PlacementMode,
    /// Requested item count in random mode.
    pub density: u32,
    /// Extra spacing between grid cells (may be negative to overlap).
    pub grid_gap: f64,
    /// Lower bound for item width in random mode.
    pub min_size: f64,
    /// Upper bound for item width in random mode; fixed item width in grid mode.
    pub max_size: f64,
    /// Rotation policy.
    pub rotation: RotationPolicy,
    /// Palette to draw item fills from.
    pub palette: Vec<Rgba8>,
    /// Recolor items with a random palette entry instead of their native colors.
    pub apply_color: bool,
    /// Reject random-mode candidates that overlap already placed items.
    pub prevent_overlap: bool,
    /// Mask options.
    pub mask: MaskOpts,
    /// Animation options.
    pub animation: AnimationOpts,
    /// Solid background the renderer clears to.
    pub background: Rgba8,
    /// Seed for placement randomness.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: PlacementMode::Random,
            density: 50,
            grid_gap: 10.0,
            min_size: 20.0,
            max_size: 60.0,
            rotation: RotationPolicy::Randomized,
            palette: Vec::new(),
            apply_color: false,
            prevent_overlap: false,
            mask: MaskOpts::default(),
            animation: AnimationOpts::default(),
            background: Rgba8::WHITE,
            seed: 1,
        }
    }
}

impl Config {
    /// Parse a JSON configuration document.
    pub fn from_json_str(s: &str) -> WeaveResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        Ok(cfg)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: &Path) -> WeaveResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Pretty JSON representation.
    pub fn to_json_pretty(&self) -> WeaveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `true` when items should receive a palette fill.
    pub fn colors_items(&self) -> bool {
        self.apply_color && !self.palette.is_empty()
    }

    /// Validate numeric invariants.
    ///
    /// Degenerate-but-finite settings (zero density, non-positive grid pitch) are accepted; they
    /// simply produce an empty layout.
    pub fn validate(&self) -> WeaveResult<()> {
        if self.density > MAX_DENSITY {
            return Err(WeaveError::validation(format!(
                "density must be <= {MAX_DENSITY}"
            )));
        }
        for (name, v) in [("min_size", self.min_size), ("max_size", self.max_size)] {
            if !v.is_finite() || v < 0.0 {
                return Err(WeaveError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.min_size > self.max_size {
            return Err(WeaveError::validation("min_size must be <= max_size"));
        }
        if !self.grid_gap.is_finite() {
            return Err(WeaveError::validation("grid_gap must be finite"));
        }
        if !self.animation.amplitude.is_finite() || !self.animation.speed.is_finite() {
            return Err(WeaveError::validation(
                "animation amplitude/speed must be finite",
            ));
        }
        if !(0.0..=1.0).contains(&self.mask.outline_opacity) {
            return Err(WeaveError::validation(
                "mask outline_opacity must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/config.rs"]
mod tests;
