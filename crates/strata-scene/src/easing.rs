//! Easing curves applied to tween progress

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing curve applied to a tween's normalized progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineInOut,
}

impl Easing {
    /// Map progress `t` (clamped to `0..=1`) through the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let p = t - 1.0;
                p * p * p + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let p = 2.0 * t - 2.0;
                    0.5 * p * p * p + 1.0
                }
            }
            Easing::SineInOut => 0.5 * (1.0 - (PI * t).cos()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Easing::Linear)]
    #[test_case(Easing::QuadIn)]
    #[test_case(Easing::QuadOut)]
    #[test_case(Easing::QuadInOut)]
    #[test_case(Easing::CubicIn)]
    #[test_case(Easing::CubicOut)]
    #[test_case(Easing::CubicInOut)]
    #[test_case(Easing::SineInOut)]
    fn endpoints_are_fixed(easing: Easing) {
        assert!(easing.apply(0.0).abs() < 1e-6);
        assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
    }

    #[test_case(Easing::QuadInOut)]
    #[test_case(Easing::CubicInOut)]
    #[test_case(Easing::SineInOut)]
    fn symmetric_curves_pass_through_midpoint(easing: Easing) {
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(3.0), 1.0);
    }

    #[test]
    fn ease_in_starts_slower_than_linear() {
        assert!(Easing::QuadIn.apply(0.25) < 0.25);
        assert!(Easing::QuadOut.apply(0.25) > 0.25);
    }
}
