//! Piecewise-linear hue remapping matching Procreate's hue bar spacing.
//!
//! Procreate's picker stretches the red–magenta hue range and compresses
//! the greens, so a linear bar position does not map linearly to hue.
//! The forward and inverse mappings below are exact functional inverses
//! of each other (within floating-point tolerance).

use super::mix;

fn hue_degree_from_bar_degree(deg: f32) -> f32 {
    if (0.0..120.0).contains(&deg) {
        mix(0.0, 60.0, deg / 120.0)
    } else if (120.0..210.0).contains(&deg) {
        mix(60.0, 180.0, (deg - 120.0) / 90.0)
    } else if (210.0..330.0).contains(&deg) {
        mix(180.0, 300.0, (deg - 210.0) / 120.0)
    } else {
        mix(300.0, 360.0, (deg - 330.0) / 30.0)
    }
}

/// Map a linear bar position in `[0, 1]` to a hue in `[0, 1]`.
pub fn hue_from_bar_position(barpos: f32) -> f32 {
    hue_degree_from_bar_degree(barpos * 360.0) / 360.0
}

fn bar_degree_from_hue_degree(pdeg: f32) -> f32 {
    if (0.0..60.0).contains(&pdeg) {
        mix(0.0, 120.0, pdeg / 60.0)
    } else if (60.0..180.0).contains(&pdeg) {
        mix(120.0, 210.0, (pdeg - 60.0) / 120.0)
    } else if (180.0..300.0).contains(&pdeg) {
        mix(210.0, 330.0, (pdeg - 180.0) / 120.0)
    } else {
        mix(330.0, 360.0, (pdeg - 300.0) / 60.0)
    }
}

/// Map a hue in `[0, 1]` to its bar position in `[0, 1]`.
pub fn bar_position_from_hue(hue: f32) -> f32 {
    bar_degree_from_hue_degree(hue * 360.0) / 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_bar_mapping_segment_boundaries() {
        // Segment targets in degree space: 120° of bar covers 60° of hue,
        // then 90° covers 120°, 120° covers 120°, and 30° covers 60°.
        let cases = [
            (0.0, 0.0),
            (120.0 / 360.0, 60.0 / 360.0),
            (210.0 / 360.0, 180.0 / 360.0),
            (330.0 / 360.0, 300.0 / 360.0),
        ];
        for (bar, hue) in cases {
            assert!(
                (hue_from_bar_position(bar) - hue).abs() < EPSILON,
                "bar {bar} should map to hue {hue}"
            );
            assert!(
                (bar_position_from_hue(hue) - bar).abs() < EPSILON,
                "hue {hue} should map to bar {bar}"
            );
        }
    }

    #[test]
    fn test_bar_mapping_roundtrip_is_identity() {
        for i in 0..=100 {
            let p = i as f32 / 100.0;
            let back = bar_position_from_hue(hue_from_bar_position(p));
            assert!(
                (back - p).abs() < EPSILON,
                "roundtrip failed for {p}: back={back}"
            );
        }
    }

    #[test]
    fn test_bar_mapping_stretches_reds() {
        // A third of the bar is still inside the first 60° of hue.
        assert!(hue_from_bar_position(0.3) < 60.0 / 360.0);
    }
}
