#![forbid(unsafe_code)]

//! Motion values, animation descriptors and write-ownership tokens.
//!
//! Every [`MotionKey`] has exactly one writer at a time, described by
//! [`Ownership`]. Handing a value to a new writer bumps a generation
//! counter, so handles and tokens held by the previous writer go stale and
//! are rejected by the driver.

use std::fmt;
use std::time::Duration;

use crate::curve::Curve;
use crate::spring::SpringParams;

/// Named scalar animated by the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MotionKey {
    /// Distance the panel is pushed below its open position.
    VerticalOffset,
    /// Backdrop opacity in `[0, 1]`.
    OverlayOpacity,
    /// Height of the panel.
    PanelHeight,
    /// Additive lift applied to the outer container while the soft keyboard is up.
    KeyboardShift,
}

impl MotionKey {
    /// Number of motion keys.
    pub const COUNT: usize = 4;

    /// All keys in storage order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::VerticalOffset,
        Self::OverlayOpacity,
        Self::PanelHeight,
        Self::KeyboardShift,
    ];

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::VerticalOffset => 0,
            Self::OverlayOpacity => 1,
            Self::PanelHeight => 2,
            Self::KeyboardShift => 3,
        }
    }

    /// Stable name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::VerticalOffset => "vertical_offset",
            Self::OverlayOpacity => "overlay_opacity",
            Self::PanelHeight => "panel_height",
            Self::KeyboardShift => "keyboard_shift",
        }
    }
}

impl fmt::Display for MotionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a value travels to its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionKind {
    /// Physically modelled motion that settles asymptotically.
    Spring {
        params: SpringParams,
        /// Starting velocity; `None` inherits the value's current velocity.
        initial_velocity: Option<f64>,
    },
    /// Fixed-duration interpolation along a curve.
    Timed { duration: Duration, curve: Curve },
    /// Keep the value where it is for a fixed duration.
    Hold { duration: Duration },
}

/// An animation request: where to go and how.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDescriptor {
    pub kind: MotionKind,
    pub target: f64,
}

impl MotionDescriptor {
    /// Spring toward `target`, inheriting the current velocity.
    pub fn spring(target: f64, params: SpringParams) -> Self {
        Self {
            kind: MotionKind::Spring {
                params,
                initial_velocity: None,
            },
            target,
        }
    }

    /// Spring toward `target` starting at `velocity`.
    pub fn spring_with_velocity(target: f64, params: SpringParams, velocity: f64) -> Self {
        Self {
            kind: MotionKind::Spring {
                params,
                initial_velocity: Some(velocity),
            },
            target,
        }
    }

    /// Timed interpolation toward `target`.
    pub fn timed(target: f64, duration: Duration, curve: Curve) -> Self {
        Self {
            kind: MotionKind::Timed { duration, curve },
            target,
        }
    }

    /// Hold the current value for `duration`. The target is filled in by the driver.
    pub fn hold(duration: Duration) -> Self {
        Self {
            kind: MotionKind::Hold { duration },
            target: f64::NAN,
        }
    }
}

/// Identifies one animation run on one value.
///
/// Handles are compared by generation; a handle whose generation no longer
/// matches the value's current owner is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle {
    key: MotionKey,
    generation: u64,
}

impl AnimationHandle {
    pub(crate) fn new(key: MotionKey, generation: u64) -> Self {
        Self { key, generation }
    }

    /// The value this animation writes.
    pub fn key(&self) -> MotionKey {
        self.key
    }

    /// Ownership generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Exclusive write access held by an active gesture.
///
/// Neither `Clone` nor `Copy`: exactly one gesture can hold it,
/// and releasing consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct GestureToken {
    key: MotionKey,
    generation: u64,
}

impl GestureToken {
    pub(crate) fn new(key: MotionKey, generation: u64) -> Self {
        Self { key, generation }
    }

    /// The value this gesture writes.
    pub fn key(&self) -> MotionKey {
        self.key
    }

    /// Ownership generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Who may currently write a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Nobody; the value rests.
    Idle,
    /// An animation run owns the value.
    Animation(AnimationHandle),
    /// A gesture owns the value; the number is the token generation.
    Gesture(u64),
}

impl Ownership {
    #[inline]
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    #[inline]
    pub fn is_gesture(self) -> bool {
        matches!(self, Self::Gesture(_))
    }

    #[inline]
    pub fn is_animation(self) -> bool {
        matches!(self, Self::Animation(_))
    }
}

/// Snapshot of one motion value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionValue {
    pub key: MotionKey,
    pub value: f64,
    pub velocity: f64,
    /// Target of the in-flight animation, if any.
    pub target: Option<f64>,
    pub ownership: Ownership,
}
