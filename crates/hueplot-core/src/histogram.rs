//! Hue-bucketed saturation/value density histogram.
//!
//! Reduces an image into 100 hue buckets, each holding the distinct
//! quantized (saturation, value) pairs seen in that hue range together
//! with how many grid samples landed on each pair.

use serde::{Deserialize, Serialize};

use crate::color::rgb_to_hsv;
use crate::image::PickerImage;

/// Number of discrete hue buckets; also the saturation/value quantization.
pub const HUE_BIN_COUNT: usize = 100;

/// Grid stride in pixels for histogram sampling, in both axes.
pub const SAMPLE_STEP: u32 = 10;

/// One distinct quantized (saturation, value) cell within a hue bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvEntry {
    /// Saturation quantized to `floor(s * 100) / 100`.
    pub saturation: f32,
    /// Value quantized to `floor(v * 100) / 100`.
    pub value: f32,
    /// Number of grid samples that landed on this cell.
    pub count: u32,
}

/// Density histogram over 100 hue buckets.
///
/// Each bucket's entries are sorted by descending count after
/// construction. An image with zero samples produces a histogram whose
/// buckets are all empty; downstream consumers treat that as all-zero
/// density rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HueHistogram {
    buckets: Vec<Vec<SvEntry>>,
}

impl HueHistogram {
    /// An empty histogram with all 100 buckets present but unpopulated.
    pub fn empty() -> Self {
        Self {
            buckets: vec![Vec::new(); HUE_BIN_COUNT],
        }
    }

    /// Build the histogram by sampling `image` on a fixed stride grid.
    ///
    /// Sampling every 10th pixel in both axes trades density resolution
    /// for construction speed. Each sample is normalized, converted to
    /// HSV, quantized, and merged into its hue bucket via a linear scan
    /// over that bucket's existing entries.
    pub fn build(image: &PickerImage) -> Self {
        let mut histogram = Self::empty();

        let mut y = 0;
        while y < image.height {
            let mut x = 0;
            while x < image.width {
                if let Some(rgb) = image.pixel(x, y) {
                    histogram.accumulate(rgb);
                }
                x += SAMPLE_STEP;
            }
            y += SAMPLE_STEP;
        }

        // Sort each bucket by descending count.
        for bucket in &mut histogram.buckets {
            bucket.sort_by(|a, b| b.count.cmp(&a.count));
        }

        histogram
    }

    fn accumulate(&mut self, rgb: [u8; 3]) {
        let normalized = [
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        ];
        let [h, s, v] = rgb_to_hsv(normalized);

        let bins = HUE_BIN_COUNT as f32;
        let hue_bin = ((h * bins).floor() as usize).min(HUE_BIN_COUNT - 1);
        let s = (s * bins).floor() / bins;
        let v = (v * bins).floor() / bins;

        let bucket = &mut self.buckets[hue_bin];
        // TODO: replace the linear scan with a map keyed by packed
        // (s_index * 100 + v_index) if finer quantization is ever needed.
        for entry in bucket.iter_mut() {
            if entry.saturation == s && entry.value == v {
                entry.count += 1;
                return;
            }
        }
        bucket.push(SvEntry {
            saturation: s,
            value: v,
            count: 1,
        });
    }

    /// Entries for one hue bucket, sorted by descending count.
    ///
    /// Out-of-range indices yield an empty slice.
    pub fn bucket(&self, index: usize) -> &[SvEntry] {
        self.buckets.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total sample count in one bucket.
    pub fn bucket_count(&self, index: usize) -> u64 {
        self.bucket(index).iter().map(|e| e.count as u64).sum()
    }

    /// Total sample count across all buckets.
    pub fn total_count(&self) -> u64 {
        (0..HUE_BIN_COUNT).map(|i| self.bucket_count(i)).sum()
    }
}
