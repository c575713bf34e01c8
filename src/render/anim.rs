use crate::layout::{config::AnimationOpts, generator::LayoutItem};

/// Per-frame displacement applied on top of an item's static pose.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimOffsets {
    /// Horizontal offset in pixels.
    pub dx: f64,
    /// Vertical offset in pixels.
    pub dy: f64,
    /// Extra rotation in radians.
    pub drot: f64,
}

/// Float offsets for `item` at time `t` (seconds). All zero when animation is disabled.
pub fn anim_offsets(item: &LayoutItem, anim: &AnimationOpts, t: f64) -> AnimOffsets {
    if !anim.enabled {
        return AnimOffsets::default();
    }
    let base = t * anim.speed * item.anim_speed;
    AnimOffsets {
        dx: 0.5 * anim.amplitude * (base * 0.7 + item.anim_phase).cos(),
        dy: anim.amplitude * (base + item.anim_phase).sin(),
        drot: 0.05 * (base * 0.5).sin(),
    }
}
