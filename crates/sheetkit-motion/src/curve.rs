#![forbid(unsafe_code)]

//! Interpolation curves for timed motion.

/// Easing curve applied to the normalized progress of a timed animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Curve {
    /// Linear interpolation.
    Linear,
    /// Decelerating cubic; good for entrances.
    #[default]
    EaseOut,
    /// Accelerating cubic; good for exits.
    EaseIn,
    /// Cubic S-curve.
    EaseInOut,
    /// Ease-out with a slight overshoot before settling.
    Back,
}

impl Curve {
    /// Map progress `t` (clamped to `[0, 1]`) through the curve.
    ///
    /// `apply(0.0) == 0.0` and `apply(1.0) == 1.0` for every curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let t_minus_1 = t - 1.0;
                1.0 + c3 * t_minus_1 * t_minus_1 * t_minus_1 + c1 * t_minus_1 * t_minus_1
            }
        }
    }

    /// Whether the curve can leave `[0, 1]` mid-flight.
    pub fn can_overshoot(self) -> bool {
        matches!(self, Self::Back)
    }
}
