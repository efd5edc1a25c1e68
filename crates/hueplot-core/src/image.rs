//! Image input adapter for the picker pipeline.
//!
//! Decoding and resizing live behind this boundary; the rest of the core
//! only ever sees width, height, and random pixel access.

use image::imageops::FilterType;

/// Target size for the shorter image side after load-time normalization.
const NORMALIZED_SIDE: u32 = 1000;

/// A decoded image held as 8-bit RGB, no alpha.
#[derive(Debug, Clone)]
pub struct PickerImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Row-major pixel data.
    pub pixels: Vec<[u8; 3]>,
}

impl PickerImage {
    /// Build an image from raw row-major RGB data.
    ///
    /// Returns `None` when the pixel count does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + (x as usize))
            .copied()
    }
}

/// Decode image bytes and normalize them for histogram sampling.
///
/// The shorter side is scaled to 1000 px (aspect preserved) and the result
/// is converted to 8-bit RGB, matching what the analyzer samples from.
pub fn load_from_bytes(bytes: &[u8]) -> Result<PickerImage, ImageLoadError> {
    let img = image::load_from_memory(bytes).map_err(ImageLoadError::Decode)?;
    let (w, h) = (img.width(), img.height());

    let img = if w > h {
        let new_w = ((w as f64) * (NORMALIZED_SIDE as f64) / (h as f64)).round() as u32;
        img.resize_exact(new_w.max(1), NORMALIZED_SIDE, FilterType::Triangle)
    } else {
        let new_h = ((h as f64) * (NORMALIZED_SIDE as f64) / (w as f64)).round() as u32;
        img.resize_exact(NORMALIZED_SIDE, new_h.max(1), FilterType::Triangle)
    };

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels: Vec<[u8; 3]> = rgb.pixels().map(|p| [p.0[0], p.0[1], p.0[2]]).collect();

    tracing::debug!(width, height, "image loaded for analysis");

    Ok(PickerImage {
        width,
        height,
        pixels,
    })
}

/// Errors that can occur during image loading.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rejects_mismatched_lengths() {
        assert!(PickerImage::from_raw(2, 2, vec![[0, 0, 0]; 3]).is_none());
        assert!(PickerImage::from_raw(2, 2, vec![[0, 0, 0]; 4]).is_some());
    }

    #[test]
    fn test_pixel_access_in_and_out_of_bounds() {
        let image = PickerImage::from_raw(
            2,
            1,
            vec![[10, 20, 30], [40, 50, 60]],
        )
        .unwrap();
        assert_eq!(image.pixel(0, 0), Some([10, 20, 30]));
        assert_eq!(image.pixel(1, 0), Some([40, 50, 60]));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.pixel(0, 1), None);
    }
}
