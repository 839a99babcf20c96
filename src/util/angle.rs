//! Yaw helpers for heading smoothing.

use std::f32::consts::{PI, TAU};

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn normalize(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Shift `target` by a full turn, if needed, so that moving from `current`
/// to it goes the short way round. Both inputs are expected in `[0, 2π)`.
#[must_use]
pub fn shortest_target(current: f32, target: f32) -> f32 {
    let diff = target - current;
    if diff > PI {
        target - TAU
    } else if diff < -PI {
        target + TAU
    } else {
        target
    }
}

/// Linear interpolation between two scalars.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_both_directions() {
        assert!((normalize(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
        assert!((normalize(5.0 * PI) - PI).abs() < 1e-4);
        let n = normalize(-1e-9);
        assert!((0.0..TAU).contains(&n));
    }

    #[test]
    fn shortest_target_never_exceeds_half_turn() {
        let steps = 24;
        for i in 0..steps {
            for j in 0..steps {
                let a = TAU * i as f32 / steps as f32;
                let b = TAU * j as f32 / steps as f32;
                let t = shortest_target(a, b);
                assert!((t - a).abs() <= PI + 1e-5, "{a} -> {b} gave {t}");
            }
        }
    }

    #[test]
    fn crossing_zero_goes_short_way() {
        let t = shortest_target(0.1, TAU - 0.1);
        assert!((t - -0.1).abs() < 1e-5);
    }
}
