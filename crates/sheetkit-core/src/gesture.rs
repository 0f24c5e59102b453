#![forbid(unsafe_code)]

//! Drag recognition and the per-drag gesture session.
//!
//! A touch goes through [`GestureRecognizer`] first: it stays pending until
//! it travels past the touch slop, then it is either claimed (vertically
//! dominant and allowed) or rejected for the rest of the touch, leaving
//! horizontal content inside the sheet interactive.
//!
//! A claimed touch becomes a [`GestureSession`], which holds the only
//! [`GestureToken`] for the vertical offset and writes it directly on every
//! move. The session is consumed on release or cancel.
//!
//! # Invariants
//!
//! - While a session exists, the offset is within `[0, panel_height]`.
//! - Upward travel past the open position is ignored.
//! - Dropping the session without releasing leaves a stale token; the
//!   controller always releases or cancels explicitly.

use std::time::Duration;

use sheetkit_motion::{AnimationDriver, GestureToken, MotionError, MotionKey};

/// Weight of the newest sample in the smoothed velocity.
const VELOCITY_SMOOTHING: f64 = 0.8;

/// One pointer position. `time` is measured from any host-chosen epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub time: Duration,
}

impl PointerSample {
    pub fn new(x: f64, y: f64, time: Duration) -> Self {
        Self { x, y, time }
    }
}

/// Pointer input routed to the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PointerSample),
    Move(PointerSample),
    Up(PointerSample),
    Cancel,
}

/// Result of classifying a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recognition {
    /// No touch is in progress.
    Ignored,
    /// Still inside the touch slop.
    Pending,
    /// Claim the touch as a drag starting at `origin`.
    Claim { origin: PointerSample },
    /// The touch belongs to someone else.
    Rejected,
    /// Already claimed; route to the session.
    Tracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Phase {
    #[default]
    Idle,
    Pending {
        origin: PointerSample,
    },
    Rejected,
    Tracking,
}

/// Decides whether a touch becomes a sheet drag.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    phase: Phase,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new touch began.
    pub fn pointer_down(&mut self, origin: PointerSample) {
        self.phase = Phase::Pending { origin };
    }

    /// Classify a move. `allowed` reflects draggable/keyboard/state gating at
    /// the moment the slop is crossed.
    pub fn classify(&mut self, sample: PointerSample, slop: f64, allowed: bool) -> Recognition {
        match self.phase {
            Phase::Idle => Recognition::Ignored,
            Phase::Rejected => Recognition::Rejected,
            Phase::Tracking => Recognition::Tracking,
            Phase::Pending { origin } => {
                let dx = sample.x - origin.x;
                let dy = sample.y - origin.y;
                if dx.hypot(dy) <= slop {
                    return Recognition::Pending;
                }
                if allowed && dy.abs() > dx.abs() {
                    self.phase = Phase::Tracking;
                    Recognition::Claim { origin }
                } else {
                    self.phase = Phase::Rejected;
                    Recognition::Rejected
                }
            }
        }
    }

    /// The touch ended or was cancelled.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, Phase::Tracking)
    }
}

/// Outcome of ending a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    /// Offset at release.
    pub offset: f64,
    /// Smoothed finger velocity at release (px/s, positive = downward).
    pub velocity: f64,
    /// Whether the drag dismisses the sheet.
    pub commit: bool,
}

/// Whether a release at `offset` dismisses a panel of `panel_height`.
pub fn should_commit(offset: f64, panel_height: f64, threshold: f64) -> bool {
    panel_height > 0.0 && offset > threshold * panel_height
}

/// State of one active drag.
#[derive(Debug)]
pub struct GestureSession {
    token: GestureToken,
    origin: PointerSample,
    last: PointerSample,
    start_offset: f64,
    cumulative_delta: f64,
    velocity: f64,
}

impl GestureSession {
    /// Claim the vertical offset from whatever animation owns it.
    pub fn begin(driver: &mut AnimationDriver, origin: PointerSample) -> Self {
        let start_offset = driver.value(MotionKey::VerticalOffset);
        let token = driver.claim_for_gesture(MotionKey::VerticalOffset);
        Self {
            token,
            origin,
            last: origin,
            start_offset,
            cumulative_delta: 0.0,
            velocity: 0.0,
        }
    }

    /// Offset this session would write for `panel_height`.
    pub fn offset_for(&self, panel_height: f64) -> f64 {
        (self.start_offset + self.cumulative_delta).clamp(0.0, panel_height.max(0.0))
    }

    /// Apply a move and write the clamped offset.
    pub fn update(
        &mut self,
        driver: &mut AnimationDriver,
        sample: PointerSample,
        panel_height: f64,
    ) -> Result<f64, MotionError> {
        if let Some(dt) = sample.time.checked_sub(self.last.time)
            && !dt.is_zero()
        {
            let instant = (sample.y - self.last.y) / dt.as_secs_f64();
            self.velocity =
                VELOCITY_SMOOTHING * instant + (1.0 - VELOCITY_SMOOTHING) * self.velocity;
        }
        self.last = sample;
        self.cumulative_delta = sample.y - self.origin.y;

        let offset = self.offset_for(panel_height);
        driver.write_gesture(&self.token, offset)?;
        Ok(offset)
    }

    /// Rewrite the offset against a new `panel_height`.
    pub fn reclamp(
        &self,
        driver: &mut AnimationDriver,
        panel_height: f64,
    ) -> Result<f64, MotionError> {
        let offset = self.offset_for(panel_height);
        driver.write_gesture(&self.token, offset)?;
        Ok(offset)
    }

    /// End the drag, applying the commit rule.
    pub fn release(self, driver: &mut AnimationDriver, panel_height: f64, threshold: f64) -> Release {
        let offset = driver.value(MotionKey::VerticalOffset);
        let commit = should_commit(offset, panel_height, threshold);
        self.finish(driver, offset, commit)
    }

    /// Abort the drag without committing.
    pub fn cancel(self, driver: &mut AnimationDriver) -> Release {
        let offset = driver.value(MotionKey::VerticalOffset);
        self.finish(driver, offset, false)
    }

    fn finish(self, driver: &mut AnimationDriver, offset: f64, commit: bool) -> Release {
        // Only motion toward the open position carries into a spring-back.
        let carried = if commit || offset <= 0.0 {
            0.0
        } else {
            self.velocity.min(0.0)
        };
        driver.set_gesture_velocity(&self.token, carried);
        if !driver.release_gesture(self.token) {
            tracing::warn!("gesture released after losing offset ownership");
        }
        Release {
            offset,
            velocity: self.velocity,
            commit,
        }
    }

    pub fn start_offset(&self) -> f64 {
        self.start_offset
    }

    pub fn cumulative_delta(&self) -> f64 {
        self.cumulative_delta
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64, ms: u64) -> PointerSample {
        PointerSample::new(x, y, Duration::from_millis(ms))
    }

    #[test]
    fn recognizer_waits_for_slop() {
        let mut r = GestureRecognizer::new();
        r.pointer_down(at(100.0, 100.0, 0));
        assert_eq!(r.classify(at(102.0, 105.0, 10), 8.0, true), Recognition::Pending);
        assert!(matches!(
            r.classify(at(102.0, 130.0, 20), 8.0, true),
            Recognition::Claim { .. }
        ));
        assert!(r.is_tracking());
        assert_eq!(r.classify(at(102.0, 160.0, 30), 8.0, true), Recognition::Tracking);
    }

    #[test]
    fn horizontal_touch_is_rejected_for_its_lifetime() {
        let mut r = GestureRecognizer::new();
        r.pointer_down(at(0.0, 0.0, 0));
        assert_eq!(r.classify(at(40.0, 10.0, 10), 8.0, true), Recognition::Rejected);
        assert_eq!(r.classify(at(40.0, 200.0, 20), 8.0, true), Recognition::Rejected);
        r.reset();
        assert_eq!(r.classify(at(0.0, 50.0, 30), 8.0, true), Recognition::Ignored);
    }

    #[test]
    fn disallowed_touch_is_rejected() {
        let mut r = GestureRecognizer::new();
        r.pointer_down(at(0.0, 0.0, 0));
        assert_eq!(r.classify(at(0.0, 40.0, 10), 8.0, false), Recognition::Rejected);
    }

    #[test]
    fn session_clamps_to_panel() {
        let mut driver = AnimationDriver::new();
        driver.set(MotionKey::VerticalOffset, 0.0);
        let mut s = GestureSession::begin(&mut driver, at(0.0, 100.0, 0));

        assert_eq!(s.update(&mut driver, at(0.0, 50.0, 16), 400.0).unwrap(), 0.0);
        assert_eq!(s.update(&mut driver, at(0.0, 250.0, 32), 400.0).unwrap(), 150.0);
        assert_eq!(s.update(&mut driver, at(0.0, 900.0, 48), 400.0).unwrap(), 400.0);
        assert_eq!(driver.value(MotionKey::VerticalOffset), 400.0);
        s.cancel(&mut driver);
    }

    #[test]
    fn reclamp_pulls_offset_into_shrunken_panel() {
        let mut driver = AnimationDriver::new();
        driver.set(MotionKey::VerticalOffset, 0.0);
        let mut s = GestureSession::begin(&mut driver, at(0.0, 0.0, 0));
        s.update(&mut driver, at(0.0, 300.0, 16), 400.0).unwrap();

        assert_eq!(s.reclamp(&mut driver, 200.0).unwrap(), 200.0);
        assert_eq!(driver.value(MotionKey::VerticalOffset), 200.0);
        // Growing back restores the finger position.
        assert_eq!(s.reclamp(&mut driver, 400.0).unwrap(), 300.0);
        s.cancel(&mut driver);
    }

    #[test]
    fn session_starts_from_current_offset() {
        let mut driver = AnimationDriver::new();
        driver.set(MotionKey::VerticalOffset, 120.0);
        let mut s = GestureSession::begin(&mut driver, at(0.0, 0.0, 0));
        assert_eq!(s.start_offset(), 120.0);
        assert_eq!(s.update(&mut driver, at(0.0, -20.0, 16), 400.0).unwrap(), 100.0);
        s.cancel(&mut driver);
    }

    #[test]
    fn release_applies_commit_rule() {
        let mut driver = AnimationDriver::new();
        let mut s = GestureSession::begin(&mut driver, at(0.0, 0.0, 0));
        s.update(&mut driver, at(0.0, 80.0, 16), 400.0).unwrap();
        let r = s.release(&mut driver, 400.0, 0.2);
        assert_eq!(r.offset, 80.0);
        assert!(!r.commit, "exactly at the threshold springs back");
        assert!(driver.ownership(MotionKey::VerticalOffset).is_idle());

        let mut s = GestureSession::begin(&mut driver, at(0.0, 0.0, 100));
        s.update(&mut driver, at(0.0, 81.0, 116), 400.0).unwrap();
        assert!(s.release(&mut driver, 400.0, 0.2).commit);
    }

    #[test]
    fn velocity_tracks_finger() {
        let mut driver = AnimationDriver::new();
        let mut s = GestureSession::begin(&mut driver, at(0.0, 0.0, 0));
        for i in 1..=5u64 {
            s.update(&mut driver, at(0.0, i as f64 * 10.0, i * 10), 1000.0)
                .unwrap();
        }
        assert!((s.velocity() - 1000.0).abs() < 1.0);
        s.cancel(&mut driver);
    }

    #[test]
    fn preempted_session_reports_stale_write() {
        let mut driver = AnimationDriver::new();
        let mut s = GestureSession::begin(&mut driver, at(0.0, 0.0, 0));
        driver.set(MotionKey::VerticalOffset, 0.0);
        assert!(s.update(&mut driver, at(0.0, 30.0, 16), 400.0).is_err());
    }

    #[test]
    fn commit_needs_positive_height() {
        assert!(!should_commit(10.0, 0.0, 0.2));
        assert!(should_commit(0.21, 1.0, 0.2));
    }
}
