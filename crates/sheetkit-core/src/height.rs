#![forbid(unsafe_code)]

//! Panel height requests and their resolution against the screen.
//!
//! # Failure Modes
//!
//! | Input | Behavior |
//! |-------|----------|
//! | Absent, empty, `"auto"` | default fraction of the screen (85%) |
//! | Zero, negative, non-finite | default fraction of the screen |
//! | Larger than the screen | capped at the screen height |
//! | Unparseable string | [`HeightParseError`] |

use std::fmt;
use std::str::FromStr;

/// Fraction of the screen used when no usable height is requested.
pub const DEFAULT_HEIGHT_FRACTION: f64 = 0.85;

/// Screen geometry the sheet is laid out against.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub height: f64,
}

impl Viewport {
    pub const fn new(height: f64) -> Self {
        Self { height }
    }

    /// Height usable for layout; zero when the reported height is unusable.
    pub fn usable_height(self) -> f64 {
        if self.height.is_finite() && self.height > 0.0 {
            self.height
        } else {
            0.0
        }
    }
}

/// Requested panel height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SheetHeight {
    /// Use the default fraction of the screen.
    #[default]
    Auto,
    /// Absolute height in logical pixels.
    Absolute(f64),
    /// Percentage of the screen height, e.g. `50.0` for half.
    Percent(f64),
}

impl SheetHeight {
    /// Resolve to an absolute panel height.
    pub fn resolve(self, viewport: Viewport, default_fraction: f64) -> f64 {
        let screen = viewport.usable_height();
        let fallback = screen * default_fraction.clamp(0.0, 1.0);
        match self {
            Self::Auto => fallback,
            Self::Absolute(px) if px.is_finite() && px > 0.0 => px.min(screen),
            Self::Percent(pct) if pct.is_finite() && pct > 0.0 => screen * pct.min(100.0) / 100.0,
            Self::Absolute(_) | Self::Percent(_) => fallback,
        }
    }
}

impl From<f64> for SheetHeight {
    fn from(px: f64) -> Self {
        Self::Absolute(px)
    }
}

impl From<Option<f64>> for SheetHeight {
    fn from(px: Option<f64>) -> Self {
        px.map_or(Self::Auto, Self::Absolute)
    }
}

/// A height string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightParseError {
    input: String,
}

impl HeightParseError {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for HeightParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid sheet height '{}': expected a number, 'N%' or 'auto'",
            self.input
        )
    }
}

impl std::error::Error for HeightParseError {}

impl FromStr for SheetHeight {
    type Err = HeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let err = || HeightParseError {
            input: s.to_string(),
        };
        if let Some(pct) = trimmed.strip_suffix('%') {
            let value: f64 = pct.trim().parse().map_err(|_| err())?;
            return if value.is_finite() {
                Ok(Self::Percent(value))
            } else {
                Err(err())
            };
        }
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
        let value: f64 = number.parse().map_err(|_| err())?;
        if value.is_finite() {
            Ok(Self::Absolute(value))
        } else {
            Err(err())
        }
    }
}
