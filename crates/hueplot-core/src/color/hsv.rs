//! RGB ↔ HSV conversions.
//!
//! All channels are normalized floats in `[0, 1]`. Hue wraps modulo 1.
//! Both directions are total functions: the achromatic and black cases
//! are guarded so no conversion ever divides by zero.

/// Convert a normalized RGB triple to HSV.
///
/// `value = max(r, g, b)`, `saturation = (max - min) / max` (0 for black),
/// hue from the standard channel-specific sector formula, divided by 6 to
/// land in `[0, 1]`. Achromatic inputs (`max == min`) yield hue 0.
pub fn rgb_to_hsv(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    let mut h = 0.0;
    let mut s = 0.0;
    let v = max;

    let d = max - min;

    if max != 0.0 {
        s = d / max;

        if max == min {
            h = 0.0; // achromatic (gray)
        } else {
            if max == r {
                h = (g - b) / d + if g < b { 6.0 } else { 0.0 };
            } else if max == g {
                h = (b - r) / d + 2.0;
            } else if max == b {
                h = (r - g) / d + 4.0;
            }

            h /= 6.0;
        }
    }

    [h, s, v]
}

/// Convert an HSV triple to normalized RGB.
///
/// Uses the classic sector-index (`i = floor(hue * 6)`) and fractional
/// remainder decomposition into six `(v, t, p)`-style cases. A saturation
/// of 0 yields achromatic gray `(v, v, v)`.
pub fn hsv_to_rgb(hsv: [f32; 3]) -> [f32; 3] {
    let [h, s, v] = hsv;
    let mut rgb = [v, v, v];

    if s > 0.0 {
        let h6 = h * 6.0;
        let i = h6.floor();
        let f = h6 - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        rgb = match i as i32 {
            0 => [v, t, p],
            1 => [q, v, p],
            2 => [p, v, t],
            3 => [p, q, v],
            4 => [t, p, v],
            _ => [v, p, q],
        };
    }

    rgb
}

/// [`hsv_to_rgb`] with channels scaled to the `[0, 255]` range.
///
/// The caller rounds or truncates as needed.
pub fn hsv_to_rgb256(hsv: [f32; 3]) -> [f32; 3] {
    let rgb = hsv_to_rgb(hsv);
    [rgb[0] * 255.0, rgb[1] * 255.0, rgb[2] * 255.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_triple_eq(a: [f32; 3], b: [f32; 3]) {
        for i in 0..3 {
            assert!(
                (a[i] - b[i]).abs() < EPSILON,
                "channel {i}: {a:?} != {b:?}"
            );
        }
    }

    #[test]
    fn test_rgb_to_hsv_black_and_white() {
        assert_triple_eq(rgb_to_hsv([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
        assert_triple_eq(rgb_to_hsv([1.0, 1.0, 1.0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rgb_to_hsv_primaries() {
        assert_triple_eq(rgb_to_hsv([1.0, 0.0, 0.0]), [0.0, 1.0, 1.0]);
        assert_triple_eq(rgb_to_hsv([0.0, 1.0, 0.0]), [1.0 / 3.0, 1.0, 1.0]);
        assert_triple_eq(rgb_to_hsv([0.0, 0.0, 1.0]), [2.0 / 3.0, 1.0, 1.0]);
    }

    #[test]
    fn test_hsv_to_rgb_zero_saturation_is_gray() {
        assert_triple_eq(hsv_to_rgb([0.37, 0.0, 0.6]), [0.6, 0.6, 0.6]);
    }

    #[test]
    fn test_hsv_roundtrip_preserves_values() {
        let colors = [
            [0.8, 0.2, 0.1],
            [0.1, 0.9, 0.3],
            [0.25, 0.25, 0.75],
            [0.5, 0.5, 0.5],
            [1.0, 0.0, 1.0],
            [0.01, 0.02, 0.03],
        ];
        for c in colors {
            let back = hsv_to_rgb(rgb_to_hsv(c));
            assert_triple_eq(back, c);
        }
    }

    #[test]
    fn test_hsv_to_rgb256_scales_channels() {
        let rgb = hsv_to_rgb256([0.0, 1.0, 1.0]);
        assert_triple_eq(rgb, [255.0, 0.0, 0.0]);
    }
}
