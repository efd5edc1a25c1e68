//! Hueplot Core — domain layer for the HSV density picker.
//!
//! This crate contains the color-space math, histogram reduction, and
//! picker interaction logic. No GPU or framework dependencies.

pub mod color;
pub mod histogram;
pub mod image;
pub mod picker;

// Re-exports for convenience.
pub use color::{hsv_to_rgb, hsv_to_rgb256, rgb_to_hsv};
pub use histogram::{HueHistogram, SvEntry};
pub use image::PickerImage;
pub use picker::PickerController;
