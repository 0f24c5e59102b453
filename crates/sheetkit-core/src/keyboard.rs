#![forbid(unsafe_code)]

//! Soft-keyboard avoidance.
//!
//! The keyboard lift is animated on its own motion value
//! ([`MotionKey::KeyboardShift`]) and added to the container position, so it
//! composes with whatever the presentation controller is doing to the
//! vertical offset.

use std::time::Duration;

use sheetkit_motion::{AnimationDriver, Curve, MotionDescriptor, MotionKey};

use crate::tuning::SheetTuning;

/// Keyboard signal from the host platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyboardEvent {
    /// The keyboard appeared (or changed height). `duration` mirrors the
    /// platform's own keyboard animation when known.
    Show {
        height: f64,
        duration: Option<Duration>,
    },
    Hide {
        duration: Option<Duration>,
    },
}

impl KeyboardEvent {
    pub fn show(height: f64) -> Self {
        Self::Show {
            height,
            duration: None,
        }
    }

    pub fn hide() -> Self {
        Self::Hide { duration: None }
    }
}

/// Container lift for a keyboard of `keyboard_height`.
///
/// Zero when the host compensates itself; otherwise
/// `min(keyboard_height × factor, cap)`.
pub fn keyboard_shift(keyboard_height: f64, host_compensates: bool, tuning: &SheetTuning) -> f64 {
    if host_compensates || !keyboard_height.is_finite() || keyboard_height <= 0.0 {
        return 0.0;
    }
    (keyboard_height * tuning.keyboard_factor).min(tuning.keyboard_cap)
}

/// Tracks keyboard visibility and animates the container lift.
#[derive(Debug, Clone, Default)]
pub struct KeyboardCoordinator {
    visible: bool,
    keyboard_height: f64,
    shift_target: f64,
}

impl KeyboardCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keyboard signal. Returns the new target lift.
    pub fn handle(
        &mut self,
        driver: &mut AnimationDriver,
        event: KeyboardEvent,
        host_compensates: bool,
        tuning: &SheetTuning,
    ) -> f64 {
        match event {
            KeyboardEvent::Show { height, duration } => {
                self.visible = true;
                self.keyboard_height = height.max(0.0);
                let target = keyboard_shift(height, host_compensates, tuning);
                self.animate(driver, target, duration.unwrap_or(tuning.keyboard_duration));
            }
            KeyboardEvent::Hide { duration } => {
                self.visible = false;
                self.keyboard_height = 0.0;
                self.animate(driver, 0.0, duration.unwrap_or(tuning.keyboard_duration));
            }
        }
        self.shift_target
    }

    /// Re-evaluate the lift after the host's compensation preference changed.
    pub fn refresh(&mut self, driver: &mut AnimationDriver, host_compensates: bool, tuning: &SheetTuning) {
        if !self.visible {
            return;
        }
        let target = keyboard_shift(self.keyboard_height, host_compensates, tuning);
        if target != self.shift_target {
            self.animate(driver, target, tuning.keyboard_duration);
        }
    }

    fn animate(&mut self, driver: &mut AnimationDriver, target: f64, duration: Duration) {
        self.shift_target = target;
        tracing::debug!(target, visible = self.visible, "keyboard shift");
        driver.start(
            MotionKey::KeyboardShift,
            MotionDescriptor::timed(target, duration, Curve::EaseOut),
        );
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn keyboard_height(&self) -> f64 {
        self.keyboard_height
    }

    pub fn shift_target(&self) -> f64 {
        self.shift_target
    }
}
