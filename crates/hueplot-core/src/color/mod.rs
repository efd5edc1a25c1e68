//! Color-space conversions and the non-uniform hue bar remapping.

mod hsv;
mod procreate;

pub use hsv::{hsv_to_rgb, hsv_to_rgb256, rgb_to_hsv};
pub use procreate::{bar_position_from_hue, hue_from_bar_position};

/// Linear interpolation between `x` and `y` by ratio `r`.
pub fn mix(x: f32, y: f32, r: f32) -> f32 {
    (1.0 - r) * x + r * y
}
