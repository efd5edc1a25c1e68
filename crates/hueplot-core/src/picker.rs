//! Picker interaction state and per-frame uniform array construction.
//!
//! The controller tracks the hovered/pinned pixel color and the hue bar
//! drag gesture, and reduces the histogram into the fixed-size vec4
//! arrays the plane and bar shaders consume.

use crate::color::{hue_from_bar_position, rgb_to_hsv};
use crate::histogram::{HUE_BIN_COUNT, HueHistogram};
use crate::image::PickerImage;

/// Snap distance to the parent hue while dragging the hue bar.
pub const HUE_SNAP_EPSILON: f32 = 0.01;

/// Fixed capacity of the saturation/value plane uniform array.
pub const SV_CENTER_SLOTS: usize = 512;

/// Hue bar drag gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    DraggingHue,
}

/// Interaction state for one analyzed image.
///
/// All methods are synchronous and cheap; a pointer drag invokes them
/// once per move event.
#[derive(Debug, Clone)]
pub struct PickerController {
    drag: DragState,
    current_hsv: [f32; 3],
    hovering_rgb: Option<[f32; 3]>,
    pinned_rgb: Option<[f32; 3]>,
}

impl Default for PickerController {
    fn default() -> Self {
        Self::new()
    }
}

impl PickerController {
    pub fn new() -> Self {
        Self {
            drag: DragState::Idle,
            current_hsv: [0.0, 1.0, 1.0],
            hovering_rgb: None,
            pinned_rgb: None,
        }
    }

    /// The color currently under inspection: hover first, else the pin.
    pub fn current_rgb(&self) -> Option<[f32; 3]> {
        self.hovering_rgb.or(self.pinned_rgb)
    }

    /// HSV of the picked pixel, if any. This is the snap target while
    /// dragging the hue bar.
    pub fn parent_hsv(&self) -> Option<[f32; 3]> {
        self.current_rgb().map(rgb_to_hsv)
    }

    /// HSV selection driving the plane/bar rendering.
    pub fn current_hsv(&self) -> [f32; 3] {
        self.current_hsv
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    // ── Image pointer interaction ───────────────────────────────────

    /// Handle a pointer move/down over the displayed image.
    ///
    /// `(x, y)` is the pointer position within a `display_width` ×
    /// `display_height` view of the image. Positions outside the view or
    /// lookups that miss the image grid are "no sample": the previous
    /// hover/pin state is preserved. A primary-button press pins the
    /// sampled color.
    ///
    /// Returns `true` when the selection changed and the visualization
    /// should be re-rendered.
    pub fn image_pointer_move(
        &mut self,
        image: &PickerImage,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        primary_pressed: bool,
    ) -> bool {
        if x < 0.0 || x > display_width || y < 0.0 || y > display_height {
            return false;
        }
        if display_width <= 0.0 || display_height <= 0.0 {
            return false;
        }

        let px = ((x / display_width) * image.width as f32).floor();
        let py = ((y / display_height) * image.height as f32).floor();
        if !px.is_finite() || !py.is_finite() || px < 0.0 || py < 0.0 {
            return false;
        }

        let Some(rgb) = image.pixel(px as u32, py as u32) else {
            return false;
        };

        let normalized = [
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        ];
        self.hovering_rgb = Some(normalized);
        if primary_pressed {
            self.pinned_rgb = Some(normalized);
        }
        self.current_hsv = rgb_to_hsv(normalized);
        true
    }

    /// Pointer left the image: clear the hover but keep the pin.
    pub fn image_pointer_leave(&mut self) -> bool {
        let changed = self.hovering_rgb.is_some();
        self.hovering_rgb = None;
        if let Some(pinned) = self.pinned_rgb {
            self.current_hsv = rgb_to_hsv(pinned);
        }
        changed
    }

    // ── Hue bar interaction ─────────────────────────────────────────

    /// Pointer down over the hue bar or its thumb starts the drag.
    pub fn bar_pointer_down(&mut self) {
        self.drag = DragState::DraggingHue;
    }

    /// Pointer up ends the drag.
    pub fn bar_pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Handle a pointer move at horizontal offset `x` over a bar of
    /// `bar_width` pixels.
    ///
    /// Ignored unless a drag is active. The bar position maps to a hue
    /// through the inverse Procreate curve; a result within
    /// [`HUE_SNAP_EPSILON`] of the parent hue snaps exactly onto it so
    /// the selection aligns with the picked pixel instead of near-missing.
    ///
    /// Returns `true` when the hue changed.
    pub fn bar_pointer_move(&mut self, x: f32, bar_width: f32) -> bool {
        if self.drag != DragState::DraggingHue || bar_width <= 0.0 {
            return false;
        }

        let mut hue = hue_from_bar_position((x / bar_width).clamp(0.0, 1.0));

        if let Some(parent) = self.parent_hsv()
            && (parent[0] - hue).abs() < HUE_SNAP_EPSILON
        {
            hue = parent[0];
        }

        let changed = self.current_hsv[0] != hue;
        self.current_hsv[0] = hue;
        changed
    }

    // ── Uniform array construction ──────────────────────────────────

    /// Scalar parameters for the plane shader: selected hue in slot 0.
    pub fn plane_params(&self) -> [f32; 4] {
        [self.current_hsv[0], 0.0, 0.0, 0.0]
    }

    /// The 512-slot `uCenters` array for the saturation/value plane.
    ///
    /// Slots carry (saturation, value, count / total × 10000, 0) from the
    /// selected hue bucket's sorted entries; unused slots hold the
    /// (-1, -1, 0, 0) "no sample" sentinel. A zero total yields all-zero
    /// densities rather than NaN.
    pub fn sv_plane_centers(&self, histogram: &HueHistogram) -> Vec<[f32; 4]> {
        let total = histogram.total_count();
        let hue_index =
            ((self.current_hsv[0] * HUE_BIN_COUNT as f32).floor() as usize).min(HUE_BIN_COUNT - 1);
        let entries = histogram.bucket(hue_index);

        let mut centers = Vec::with_capacity(SV_CENTER_SLOTS);
        for i in 0..SV_CENTER_SLOTS {
            if let Some(entry) = entries.get(i) {
                let density = if total == 0 {
                    0.0
                } else {
                    (entry.count as f32 / total as f32) * 10000.0
                };
                centers.push([entry.saturation, entry.value, density, 0.0]);
            } else {
                centers.push([-1.0, -1.0, 0.0, 0.0]);
            }
        }
        centers
    }

    /// The 100-slot `uCenters` array for the hue bar.
    ///
    /// Slots carry (bucket_index / 100, bucket_total / total × 100, 0, 0).
    pub fn hue_bar_centers(&self, histogram: &HueHistogram) -> Vec<[f32; 4]> {
        let total = histogram.total_count();

        (0..HUE_BIN_COUNT)
            .map(|i| {
                let density = if total == 0 {
                    0.0
                } else {
                    (histogram.bucket_count(i) as f32 / total as f32) * 100.0
                };
                [i as f32 / HUE_BIN_COUNT as f32, density, 0.0, 0.0]
            })
            .collect()
    }

    /// Format the current color as `#RRGGBB`, or `#000000` when nothing
    /// is selected.
    pub fn hex_code(&self) -> String {
        format_hex(self.current_rgb())
    }

    /// Floored readout of the current color's HSV: (degrees 0–359,
    /// saturation percent, value percent). Black when nothing is selected.
    pub fn hsv_display(&self) -> (u32, u32, u32) {
        let hsv = self.parent_hsv().unwrap_or([0.0, 0.0, 0.0]);
        (
            ((hsv[0] * 360.0).floor() as i64).clamp(0, 359) as u32,
            ((hsv[1] * 100.0).floor() as i64).clamp(0, 100) as u32,
            ((hsv[2] * 100.0).floor() as i64).clamp(0, 100) as u32,
        )
    }

    /// Floored 0–255 readout of the current color's RGB channels. Black
    /// when nothing is selected.
    pub fn rgb_display(&self) -> [u8; 3] {
        let rgb = self.current_rgb().unwrap_or([0.0; 3]);
        [
            channel_255(rgb[0]),
            channel_255(rgb[1]),
            channel_255(rgb[2]),
        ]
    }
}

/// `floor(v * 255)` clamped into a channel byte.
fn channel_255(v: f32) -> u8 {
    ((v * 255.0).floor() as i64).clamp(0, 255) as u8
}

/// `#RRGGBB` formatting: uppercase, `floor(v * 255)` clamped per channel.
pub fn format_hex(rgb: Option<[f32; 3]>) -> String {
    let Some(rgb) = rgb else {
        return "#000000".to_string();
    };
    format!(
        "#{:02X}{:02X}{:02X}",
        channel_255(rgb[0]),
        channel_255(rgb[1]),
        channel_255(rgb[2])
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::bar_position_from_hue;

    fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> PickerImage {
        PickerImage::from_raw(width, height, vec![rgb; (width * height) as usize]).unwrap()
    }

    fn controller_with_parent(rgb: [f32; 3]) -> PickerController {
        let mut controller = PickerController::new();
        controller.hovering_rgb = Some(rgb);
        controller.current_hsv = rgb_to_hsv(rgb);
        controller
    }

    #[test]
    fn test_hue_snaps_to_parent_within_epsilon() {
        // Cyan: hue exactly 0.5.
        let mut controller = controller_with_parent([0.0, 1.0, 1.0]);
        controller.bar_pointer_down();

        // A bar position whose hue lands at ~0.505 must snap to 0.5.
        let x = bar_position_from_hue(0.505) * 200.0;
        controller.bar_pointer_move(x, 200.0);
        assert_eq!(controller.current_hsv()[0], 0.5);
    }

    #[test]
    fn test_hue_does_not_snap_outside_epsilon() {
        let mut controller = controller_with_parent([0.0, 1.0, 1.0]);
        controller.bar_pointer_down();

        let x = bar_position_from_hue(0.52) * 200.0;
        controller.bar_pointer_move(x, 200.0);
        let hue = controller.current_hsv()[0];
        assert!((hue - 0.52).abs() < 1e-3);
        assert_ne!(hue, 0.5);
    }

    #[test]
    fn test_bar_move_ignored_when_idle() {
        let mut controller = PickerController::new();
        assert!(!controller.bar_pointer_move(100.0, 200.0));
        assert_eq!(controller.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_drag_state_transitions() {
        let mut controller = PickerController::new();
        controller.bar_pointer_down();
        assert_eq!(controller.drag_state(), DragState::DraggingHue);
        controller.bar_pointer_up();
        assert_eq!(controller.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_bar_position_clamps_to_unit_range() {
        let mut controller = PickerController::new();
        controller.bar_pointer_down();
        controller.bar_pointer_move(-50.0, 200.0);
        assert_eq!(controller.current_hsv()[0], 0.0);
        controller.bar_pointer_move(500.0, 200.0);
        assert!((controller.current_hsv()[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_image_hover_and_pin() {
        let image = solid_image(10, 10, [255, 0, 0]);
        let mut controller = PickerController::new();

        assert!(controller.image_pointer_move(&image, 5.0, 5.0, 10.0, 10.0, false));
        assert_eq!(controller.current_rgb(), Some([1.0, 0.0, 0.0]));
        assert!(controller.pinned_rgb.is_none());

        assert!(controller.image_pointer_move(&image, 5.0, 5.0, 10.0, 10.0, true));
        assert!(controller.pinned_rgb.is_some());

        // Leaving clears the hover but the pin still supplies the color.
        controller.image_pointer_leave();
        assert_eq!(controller.current_rgb(), Some([1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_nan_pointer_coordinates_preserve_state() {
        let image = solid_image(10, 10, [0, 0, 255]);
        let mut controller = PickerController::new();
        controller.image_pointer_move(&image, 5.0, 5.0, 10.0, 10.0, true);

        // NaN comparisons are all false, so NaN passes the bounds checks;
        // it must still be rejected as "no sample".
        assert!(!controller.image_pointer_move(&image, f32::NAN, 5.0, 10.0, 10.0, false));
        assert!(!controller.image_pointer_move(&image, 5.0, f32::NAN, 10.0, 10.0, false));

        assert_eq!(controller.current_rgb(), Some([0.0, 0.0, 1.0]));
        assert!(controller.pinned_rgb.is_some());
        assert_eq!(controller.current_hsv(), rgb_to_hsv([0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_out_of_bounds_pointer_preserves_state() {
        let image = solid_image(10, 10, [0, 255, 0]);
        let mut controller = PickerController::new();
        controller.image_pointer_move(&image, 5.0, 5.0, 10.0, 10.0, false);

        assert!(!controller.image_pointer_move(&image, 50.0, 5.0, 10.0, 10.0, false));
        assert_eq!(controller.current_rgb(), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_sv_plane_centers_padding_and_density() {
        let image = solid_image(30, 30, [255, 0, 0]);
        let histogram = HueHistogram::build(&image);
        let controller = controller_with_parent([1.0, 0.0, 0.0]);

        let centers = controller.sv_plane_centers(&histogram);
        assert_eq!(centers.len(), SV_CENTER_SLOTS);

        // One populated slot holding all of the density mass.
        assert_eq!(centers[0][0], 1.0);
        assert_eq!(centers[0][1], 1.0);
        assert!((centers[0][2] - 10000.0).abs() < 1e-2);

        // Everything else is the sentinel.
        for slot in &centers[1..] {
            assert_eq!(*slot, [-1.0, -1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_hue_bar_centers_layout() {
        let image = solid_image(30, 30, [255, 0, 0]);
        let histogram = HueHistogram::build(&image);
        let controller = PickerController::new();

        let centers = controller.hue_bar_centers(&histogram);
        assert_eq!(centers.len(), HUE_BIN_COUNT);
        assert_eq!(centers[7][0], 0.07);
        assert!((centers[0][1] - 100.0).abs() < 1e-3);
        assert_eq!(centers[50][1], 0.0);
    }

    #[test]
    fn test_empty_histogram_normalizes_to_zero() {
        let histogram = HueHistogram::empty();
        let controller = PickerController::new();

        for slot in controller.sv_plane_centers(&histogram) {
            assert!(slot[2] == 0.0 && slot[2].is_finite());
        }
        for slot in controller.hue_bar_centers(&histogram) {
            assert!(slot[1] == 0.0 && slot[1].is_finite());
        }
    }

    #[test]
    fn test_hex_formatting_contract() {
        assert_eq!(format_hex(None), "#000000");
        assert_eq!(format_hex(Some([1.0, 0.0, 0.0])), "#FF0000");
        assert_eq!(format_hex(Some([0.5, 0.25, 1.0])), "#7F3FFF");
        // Out-of-range channels clamp rather than wrap.
        assert_eq!(format_hex(Some([2.0, -1.0, 0.0])), "#FF0000");
    }

    #[test]
    fn test_display_readout_floors_channels() {
        let mut controller = PickerController::new();
        assert_eq!(controller.hsv_display(), (0, 0, 0));
        assert_eq!(controller.rgb_display(), [0, 0, 0]);

        // Cyan: hue 0.5 maps to 180 degrees exactly.
        controller.hovering_rgb = Some([0.0, 1.0, 1.0]);
        assert_eq!(controller.hsv_display(), (180, 100, 100));
        assert_eq!(controller.rgb_display(), [0, 255, 255]);

        // Mid gray: fractional channels floor, never round up.
        controller.hovering_rgb = Some([0.5, 0.5, 0.5]);
        assert_eq!(controller.hsv_display(), (0, 0, 50));
        assert_eq!(controller.rgb_display(), [127, 127, 127]);
    }
}
