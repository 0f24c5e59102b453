#![forbid(unsafe_code)]

//! Step-change choreography for wizard sheets.
//!
//! When the hosted wizard advances while the sheet is open, the panel slides
//! fully off-screen, pauses, swaps the displayed step while hidden, then
//! springs back in. The sequence is an explicit list of phases, each gated on
//! the completion of its own animation handle, so a teardown between phases
//! simply drops the sequence.
//!
//! ```text
//! Exiting ──▶ Holding ──▶ Snapping ──▶ Entering ──▶ done
//! (timed)     (hold)      (jump-cut,   (spring)
//!                          swap step,
//!                          one frame)
//! ```

use std::time::Duration;

use sheetkit_motion::{
    AnimationDriver, AnimationHandle, Completion, Curve, MotionDescriptor, MotionKey,
};

use crate::tuning::SheetTuning;

/// Phase of an in-flight step transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// Sliding the panel fully off-screen.
    Exiting,
    /// Pausing off-screen.
    Holding,
    /// Jump-cutting the offset to the hidden position and swapping content.
    Snapping,
    /// Springing back to the open position.
    Entering,
}

impl StepPhase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exiting => "exiting",
            Self::Holding => "holding",
            Self::Snapping => "snapping",
            Self::Entering => "entering",
        }
    }
}

/// How an observed step index relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepChange {
    /// First observation; never animated.
    Initial,
    Unchanged,
    Changed { from: Option<u32>, to: Option<u32> },
}

/// Result of feeding a completion to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepProgress {
    /// Not ours.
    Ignored,
    /// Moved to the given phase.
    Advanced(StepPhase),
    /// The panel is back in the open position.
    Finished,
}

/// Watches the host's step index and plays the re-entrance sequence.
#[derive(Debug, Clone, Default)]
pub struct StepTransitionCoordinator {
    observed: Option<u32>,
    displayed: Option<u32>,
    initialized: bool,
    active: Option<(StepPhase, AnimationHandle)>,
    cycles: u64,
}

impl StepTransitionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the host's current step.
    pub fn observe(&mut self, step: Option<u32>) -> StepChange {
        if !self.initialized {
            self.initialized = true;
            self.observed = step;
            self.displayed = step;
            return StepChange::Initial;
        }
        if self.observed == step {
            return StepChange::Unchanged;
        }
        let from = self.observed;
        self.observed = step;
        StepChange::Changed { from, to: step }
    }

    /// Apply the observed step without any motion.
    pub fn apply_silently(&mut self) {
        self.displayed = self.observed;
    }

    /// Start the sequence: slide the offset to `panel_height`.
    pub fn begin(&mut self, driver: &mut AnimationDriver, panel_height: f64, tuning: &SheetTuning) {
        let handle = driver.start(
            MotionKey::VerticalOffset,
            MotionDescriptor::timed(panel_height, tuning.step_exit_duration, Curve::EaseInOut),
        );
        self.enter_phase(StepPhase::Exiting, handle);
    }

    /// Feed a completion from the driver.
    pub fn on_completion(
        &mut self,
        driver: &mut AnimationDriver,
        completion: Completion,
        panel_height: f64,
        tuning: &SheetTuning,
    ) -> StepProgress {
        let Some((phase, handle)) = self.active else {
            return StepProgress::Ignored;
        };
        if completion.handle != handle {
            return StepProgress::Ignored;
        }
        if !completion.finished() {
            // Our run was revoked by someone else; the owner of the revocation
            // is responsible for the state change.
            tracing::debug!(phase = phase.name(), "step transition revoked");
            self.abandon();
            return StepProgress::Ignored;
        }

        match phase {
            StepPhase::Exiting => {
                let hold = driver.start(
                    MotionKey::VerticalOffset,
                    MotionDescriptor::hold(tuning.step_hold),
                );
                self.enter_phase(StepPhase::Holding, hold);
                StepProgress::Advanced(StepPhase::Holding)
            }
            StepPhase::Holding => {
                driver.set(MotionKey::VerticalOffset, panel_height);
                self.displayed = self.observed;
                // Zero-length hold: the snapped frame is presented before re-entry.
                let snap = driver.start(
                    MotionKey::VerticalOffset,
                    MotionDescriptor::hold(Duration::ZERO),
                );
                self.enter_phase(StepPhase::Snapping, snap);
                StepProgress::Advanced(StepPhase::Snapping)
            }
            StepPhase::Snapping => {
                let enter = driver.start(
                    MotionKey::VerticalOffset,
                    MotionDescriptor::spring(0.0, tuning.spring),
                );
                self.enter_phase(StepPhase::Entering, enter);
                StepProgress::Advanced(StepPhase::Entering)
            }
            StepPhase::Entering => {
                self.active = None;
                self.cycles += 1;
                tracing::debug!(cycles = self.cycles, "step transition finished");
                StepProgress::Finished
            }
        }
    }

    /// Drop any in-flight sequence and show the latest step.
    ///
    /// Returns `true` if a sequence was running.
    pub fn abandon(&mut self) -> bool {
        self.displayed = self.observed;
        self.active.take().is_some()
    }

    fn enter_phase(&mut self, phase: StepPhase, handle: AnimationHandle) {
        tracing::debug!(phase = phase.name(), "step phase");
        self.active = Some((phase, handle));
    }

    /// Current phase, if a sequence is running.
    pub fn phase(&self) -> Option<StepPhase> {
        self.active.map(|(phase, _)| phase)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Step the content should currently show.
    pub fn displayed(&self) -> Option<u32> {
        self.displayed
    }

    /// Latest step reported by the host.
    pub fn observed(&self) -> Option<u32> {
        self.observed
    }

    /// Completed sequences since creation.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f64 = 500.0;

    fn drive(
        coordinator: &mut StepTransitionCoordinator,
        driver: &mut AnimationDriver,
        tuning: &SheetTuning,
    ) -> Vec<StepProgress> {
        let mut seen = Vec::new();
        for _ in 0..1000 {
            driver.advance(Duration::from_millis(16));
            for c in driver.drain_completions() {
                let p = coordinator.on_completion(driver, c, H, tuning);
                if p != StepProgress::Ignored {
                    seen.push(p);
                }
            }
            if !coordinator.is_active() {
                break;
            }
        }
        seen
    }

    #[test]
    fn first_observation_is_not_a_change() {
        let mut c = StepTransitionCoordinator::new();
        assert_eq!(c.observe(Some(1)), StepChange::Initial);
        assert_eq!(c.displayed(), Some(1));
        assert_eq!(c.observe(Some(1)), StepChange::Unchanged);
        assert_eq!(
            c.observe(Some(2)),
            StepChange::Changed {
                from: Some(1),
                to: Some(2)
            }
        );
    }

    #[test]
    fn full_sequence_runs_phases_in_order() {
        let tuning = SheetTuning::default();
        let mut driver = AnimationDriver::new();
        let mut c = StepTransitionCoordinator::new();
        c.observe(Some(1));
        c.observe(Some(2));

        c.begin(&mut driver, H, &tuning);
        assert_eq!(c.phase(), Some(StepPhase::Exiting));
        assert_eq!(c.displayed(), Some(1), "content swaps only while hidden");

        let seen = drive(&mut c, &mut driver, &tuning);
        assert_eq!(
            seen,
            vec![
                StepProgress::Advanced(StepPhase::Holding),
                StepProgress::Advanced(StepPhase::Snapping),
                StepProgress::Advanced(StepPhase::Entering),
                StepProgress::Finished,
            ]
        );
        assert_eq!(c.displayed(), Some(2));
        assert_eq!(c.cycles(), 1);
        assert_eq!(driver.value(MotionKey::VerticalOffset), 0.0);
    }

    #[test]
    fn offset_is_hidden_when_content_swaps() {
        let tuning = SheetTuning::default();
        let mut driver = AnimationDriver::new();
        let mut c = StepTransitionCoordinator::new();
        c.observe(Some(1));
        c.observe(Some(2));
        c.begin(&mut driver, H, &tuning);

        for _ in 0..200 {
            driver.advance(Duration::from_millis(16));
            for comp in driver.drain_completions() {
                let before = c.displayed();
                c.on_completion(&mut driver, comp, H, &tuning);
                if before != c.displayed() {
                    assert_eq!(driver.value(MotionKey::VerticalOffset), H);
                    return;
                }
            }
        }
        panic!("content never swapped");
    }

    #[test]
    fn later_step_change_is_picked_up_mid_sequence() {
        let tuning = SheetTuning::default();
        let mut driver = AnimationDriver::new();
        let mut c = StepTransitionCoordinator::new();
        c.observe(Some(1));
        c.observe(Some(2));
        c.begin(&mut driver, H, &tuning);
        driver.advance(Duration::from_millis(100));
        c.observe(Some(3));

        drive(&mut c, &mut driver, &tuning);
        assert_eq!(c.displayed(), Some(3));
        assert_eq!(c.cycles(), 1);
    }

    #[test]
    fn revoked_run_abandons_sequence() {
        let tuning = SheetTuning::default();
        let mut driver = AnimationDriver::new();
        let mut c = StepTransitionCoordinator::new();
        c.observe(Some(1));
        c.observe(Some(2));
        c.begin(&mut driver, H, &tuning);

        let _token = driver.claim_for_gesture(MotionKey::VerticalOffset);
        for comp in driver.drain_completions() {
            assert_eq!(
                c.on_completion(&mut driver, comp, H, &tuning),
                StepProgress::Ignored
            );
        }
        assert!(!c.is_active());
        assert_eq!(c.displayed(), Some(2));
        assert_eq!(c.cycles(), 0);
    }

    #[test]
    fn snapping_is_held_for_one_frame_at_hidden_offset() {
        let tuning = SheetTuning::default();
        let mut driver = AnimationDriver::new();
        let mut c = StepTransitionCoordinator::new();
        c.observe(Some(1));
        c.observe(Some(2));
        c.begin(&mut driver, H, &tuning);

        let mut frames = 0;
        while c.phase() != Some(StepPhase::Snapping) {
            driver.advance(Duration::from_millis(16));
            for comp in driver.drain_completions() {
                c.on_completion(&mut driver, comp, H, &tuning);
            }
            frames += 1;
            assert!(frames < 100, "never reached the snap");
        }
        assert_eq!(driver.value(MotionKey::VerticalOffset), H);
        assert_eq!(c.displayed(), Some(2));

        driver.advance(Duration::from_millis(16));
        for comp in driver.drain_completions() {
            c.on_completion(&mut driver, comp, H, &tuning);
        }
        assert_eq!(c.phase(), Some(StepPhase::Entering));
    }

    #[test]
    fn silent_apply_swaps_without_motion() {
        let mut c = StepTransitionCoordinator::new();
        c.observe(Some(1));
        c.observe(Some(4));
        c.apply_silently();
        assert_eq!(c.displayed(), Some(4));
        assert!(!c.is_active());
    }
}
