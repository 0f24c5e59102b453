#![forbid(unsafe_code)]

//! Tunable constants for sheet choreography.
//!
//! Every number the engine uses to decide or animate lives here, so hosts can
//! adjust feel without touching the state machine. With the `policy-config`
//! feature, tuning can be loaded from TOML or JSON files.
//!
//! # Example
//!
//! ```ignore
//! let tuning = SheetTuning::default()
//!     .commit_threshold(0.3)
//!     .keyboard_cap(180.0);
//! tuning.validate()?;
//! ```

use std::fmt;
use std::time::Duration;

use sheetkit_motion::{Curve, SpringParams};

use crate::height::DEFAULT_HEIGHT_FRACTION;

/// Errors from tuning validation or loading.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// A parameter lies outside its valid range.
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// The spring parameters are not physically valid.
    InvalidSpring,
    /// A tuning file could not be read.
    Io(String),
    /// A tuning file could not be parsed.
    Parse(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} = {value} is outside [{min}, {max}]"),
            Self::InvalidSpring => write!(f, "spring needs finite positive stiffness and mass"),
            Self::Io(msg) => write!(f, "failed to read tuning: {msg}"),
            Self::Parse(msg) => write!(f, "failed to parse tuning: {msg}"),
        }
    }
}

impl std::error::Error for TuningError {}

/// Choreography and gesture constants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetTuning {
    /// Spring used for entrance, spring-back, step re-entry and height changes.
    pub spring: SpringParams,
    /// Slide-out duration when closing.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub exit_duration: Duration,
    /// Curve for the slide-out.
    pub exit_curve: Curve,
    /// Backdrop fade-in duration when opening.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub fade_in_duration: Duration,
    /// Backdrop fade-out duration after the slide-out.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub fade_out_duration: Duration,
    /// Curve for both backdrop fades.
    pub fade_curve: Curve,
    /// Fraction of panel height a released drag must exceed to dismiss.
    pub commit_threshold: f64,
    /// Share of the keyboard height used as container lift.
    pub keyboard_factor: f64,
    /// Upper bound on the container lift.
    pub keyboard_cap: f64,
    /// Default lift animation duration when the keyboard event carries none.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub keyboard_duration: Duration,
    /// Fraction of the screen used when no height is requested.
    pub default_height_fraction: f64,
    /// Travel before a touch is classified as a drag.
    pub touch_slop: f64,
    /// Slide-out duration of a step transition.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub step_exit_duration: Duration,
    /// Pause off-screen between slide-out and re-entry of a step transition.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub step_hold: Duration,
}

impl Default for SheetTuning {
    fn default() -> Self {
        Self {
            spring: SpringParams::SHEET,
            exit_duration: Duration::from_millis(300),
            exit_curve: Curve::EaseInOut,
            fade_in_duration: Duration::from_millis(200),
            fade_out_duration: Duration::from_millis(200),
            fade_curve: Curve::EaseOut,
            commit_threshold: 0.2,
            keyboard_factor: 0.9,
            keyboard_cap: 220.0,
            keyboard_duration: Duration::from_millis(250),
            default_height_fraction: DEFAULT_HEIGHT_FRACTION,
            touch_slop: 8.0,
            step_exit_duration: Duration::from_millis(300),
            step_hold: Duration::from_millis(50),
        }
    }
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), TuningError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl SheetTuning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every parameter against its valid range.
    pub fn validate(&self) -> Result<(), TuningError> {
        if !self.spring.is_valid() {
            return Err(TuningError::InvalidSpring);
        }
        check("commit_threshold", self.commit_threshold, 0.0, 1.0)?;
        check("keyboard_factor", self.keyboard_factor, 0.0, 1.0)?;
        check("keyboard_cap", self.keyboard_cap, 0.0, f64::MAX)?;
        check(
            "default_height_fraction",
            self.default_height_fraction,
            0.05,
            1.0,
        )?;
        check("touch_slop", self.touch_slop, 0.0, 200.0)?;
        Ok(())
    }

    /// Pull every parameter into the range `validate` accepts.
    ///
    /// Non-finite values fall back to their defaults; an invalid spring is
    /// replaced by the default spring.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        let spring = if self.spring.is_valid() {
            self.spring
        } else {
            defaults.spring
        };
        Self {
            spring,
            commit_threshold: finite(self.commit_threshold, defaults.commit_threshold)
                .clamp(0.0, 1.0),
            keyboard_factor: finite(self.keyboard_factor, defaults.keyboard_factor).clamp(0.0, 1.0),
            keyboard_cap: finite(self.keyboard_cap, defaults.keyboard_cap).max(0.0),
            default_height_fraction: finite(
                self.default_height_fraction,
                defaults.default_height_fraction,
            )
            .clamp(0.05, 1.0),
            touch_slop: finite(self.touch_slop, defaults.touch_slop).clamp(0.0, 200.0),
            ..self
        }
    }

    /// Set the spring parameters.
    pub fn spring(mut self, spring: SpringParams) -> Self {
        self.spring = spring;
        self
    }

    /// Set the close slide-out duration.
    pub fn exit_duration(mut self, duration: Duration) -> Self {
        self.exit_duration = duration;
        self
    }

    /// Set the backdrop fade durations.
    pub fn fade_durations(mut self, fade_in: Duration, fade_out: Duration) -> Self {
        self.fade_in_duration = fade_in;
        self.fade_out_duration = fade_out;
        self
    }

    /// Set the drag commit threshold (clamped to `[0, 1]`).
    pub fn commit_threshold(mut self, threshold: f64) -> Self {
        self.commit_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the keyboard lift factor (clamped to `[0, 1]`).
    pub fn keyboard_factor(mut self, factor: f64) -> Self {
        self.keyboard_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Set the keyboard lift cap (negative values become zero).
    pub fn keyboard_cap(mut self, cap: f64) -> Self {
        self.keyboard_cap = cap.max(0.0);
        self
    }

    /// Set the default height fraction (clamped to `[0.05, 1]`).
    pub fn default_height_fraction(mut self, fraction: f64) -> Self {
        self.default_height_fraction = fraction.clamp(0.05, 1.0);
        self
    }

    /// Set the touch slop.
    pub fn touch_slop(mut self, slop: f64) -> Self {
        self.touch_slop = slop.max(0.0);
        self
    }

    /// Set the step transition slide-out and hold durations.
    pub fn step_timing(mut self, exit: Duration, hold: Duration) -> Self {
        self.step_exit_duration = exit;
        self.step_hold = hold;
        self
    }

    /// Zero every duration; springs still settle physically.
    pub fn instant() -> Self {
        Self {
            exit_duration: Duration::ZERO,
            fade_in_duration: Duration::ZERO,
            fade_out_duration: Duration::ZERO,
            keyboard_duration: Duration::ZERO,
            step_exit_duration: Duration::ZERO,
            step_hold: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(feature = "policy-config")]
impl SheetTuning {
    /// Parse tuning from TOML and validate it.
    pub fn from_toml_str(input: &str) -> Result<Self, TuningError> {
        let tuning: Self = toml::from_str(input).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse tuning from JSON and validate it.
    pub fn from_json_str(input: &str) -> Result<Self, TuningError> {
        let tuning: Self =
            serde_json::from_str(input).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| TuningError::Io(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&input),
            _ => Self::from_toml_str(&input),
        }
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
