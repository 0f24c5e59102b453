#![forbid(unsafe_code)]

//! Presentation clock adapter.
//!
//! Hosts that receive display-refresh timestamps feed them to a
//! [`FrameClock`] to obtain the frame delta passed to
//! [`AnimationDriver::advance`](crate::AnimationDriver::advance).

use std::time::Duration;

use web_time::Instant;

/// Turns successive frame timestamps into frame deltas.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a frame at `now` and return the time since the previous one.
    ///
    /// The first frame yields `Duration::ZERO`. Timestamps that go backwards
    /// also yield zero.
    pub fn frame(&mut self, now: Instant) -> Duration {
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        self.frames += 1;
        delta
    }

    /// Register a frame at the current instant.
    pub fn frame_now(&mut self) -> Duration {
        self.frame(Instant::now())
    }

    /// Number of frames seen.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Forget the previous timestamp, e.g. after the host was suspended.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
