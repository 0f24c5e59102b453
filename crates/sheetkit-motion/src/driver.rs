#![forbid(unsafe_code)]

//! Animation driver: runs spring and timed motion on named values.
//!
//! The driver is advanced by the presentation clock ([`AnimationDriver::advance`])
//! and reports finished or cancelled runs through a completion queue. The
//! logic path drains that queue ([`AnimationDriver::drain_completions`]) and
//! only then makes dependent decisions; it never inspects elapsed time.
//!
//! # Invariants
//!
//! - Each value has exactly one writer: idle, one animation run, or one gesture.
//! - Starting a run, setting a value, or claiming it for a gesture revokes
//!   the previous writer and queues a `Cancelled` completion for a revoked run.
//! - Every started run produces exactly one completion.
//! - A finished run leaves the value exactly on its target.
//!
//! # Failure Modes
//!
//! - Writes through a revoked [`GestureToken`] return [`MotionError::StaleGesture`].
//! - Non-finite targets are replaced by the current value.
//! - Zero-duration timed runs finish on the next `advance`.

use std::collections::VecDeque;
use std::time::Duration;

use crate::curve::Curve;
use crate::error::MotionError;
use crate::spring::{SpringParams, SpringState};
use crate::value::{
    AnimationHandle, GestureToken, MotionDescriptor, MotionKey, MotionKind, MotionValue, Ownership,
};

/// How an animation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Reached its target.
    Finished,
    /// Revoked by a newer writer before reaching its target.
    Cancelled,
}

/// Queued notification that a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub handle: AnimationHandle,
    pub outcome: CompletionOutcome,
}

impl Completion {
    #[inline]
    pub fn finished(&self) -> bool {
        self.outcome == CompletionOutcome::Finished
    }

    /// Value the run was animating.
    #[inline]
    pub fn key(&self) -> MotionKey {
        self.handle.key()
    }
}

#[derive(Debug, Clone)]
enum RunMotion {
    Spring {
        params: SpringParams,
        state: SpringState,
    },
    Timed {
        from: f64,
        duration: Duration,
        curve: Curve,
        elapsed: Duration,
    },
    Hold {
        duration: Duration,
        elapsed: Duration,
    },
}

#[derive(Debug, Clone)]
struct Run {
    handle: AnimationHandle,
    target: f64,
    motion: RunMotion,
}

impl Run {
    /// Step the run; returns the new value, velocity and whether it finished.
    fn step(&mut self, current: f64, dt: Duration) -> (f64, f64, bool) {
        match &mut self.motion {
            RunMotion::Spring { params, state } => {
                let done = state.step(self.target, params, dt);
                (state.position, state.velocity, done)
            }
            RunMotion::Timed {
                from,
                duration,
                curve,
                elapsed,
            } => {
                *elapsed = elapsed.saturating_add(dt);
                if *elapsed >= *duration {
                    return (self.target, 0.0, true);
                }
                let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
                let value = *from + (self.target - *from) * curve.apply(progress);
                let secs = dt.as_secs_f64();
                let velocity = if secs > 0.0 {
                    (value - current) / secs
                } else {
                    0.0
                };
                (value, velocity, false)
            }
            RunMotion::Hold { duration, elapsed } => {
                *elapsed = elapsed.saturating_add(dt);
                (self.target, 0.0, *elapsed >= *duration)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Writer {
    Idle,
    Animation(Run),
    Gesture(u64),
}

#[derive(Debug, Clone)]
struct Slot {
    value: f64,
    velocity: f64,
    writer: Writer,
}

impl Slot {
    const fn new() -> Self {
        Self {
            value: 0.0,
            velocity: 0.0,
            writer: Writer::Idle,
        }
    }
}

/// Owns every [`MotionKey`] value and its single writer.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    slots: [Slot; MotionKey::COUNT],
    generation: u64,
    completions: VecDeque<Completion>,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    /// Create a driver with every value at zero and idle.
    pub fn new() -> Self {
        Self {
            slots: [const { Slot::new() }; MotionKey::COUNT],
            generation: 0,
            completions: VecDeque::new(),
        }
    }

    fn slot(&self, key: MotionKey) -> &Slot {
        &self.slots[key.index()]
    }

    fn slot_mut(&mut self, key: MotionKey) -> &mut Slot {
        &mut self.slots[key.index()]
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Drop the current writer of `key`, queueing a cancellation for a run.
    fn revoke(&mut self, key: MotionKey) -> bool {
        let slot = self.slot_mut(key);
        match std::mem::replace(&mut slot.writer, Writer::Idle) {
            Writer::Animation(run) => {
                tracing::trace!(value = %key, generation = run.handle.generation(), "animation cancelled");
                self.completions.push_back(Completion {
                    handle: run.handle,
                    outcome: CompletionOutcome::Cancelled,
                });
                true
            }
            Writer::Gesture(generation) => {
                tracing::trace!(value = %key, generation, "gesture ownership revoked");
                true
            }
            Writer::Idle => false,
        }
    }

    /// Start an animation on `key`, cancelling whatever owned it.
    pub fn start(&mut self, key: MotionKey, descriptor: MotionDescriptor) -> AnimationHandle {
        self.revoke(key);
        let generation = self.next_generation();
        let handle = AnimationHandle::new(key, generation);
        let slot = self.slot_mut(key);
        let target = if descriptor.target.is_finite() {
            descriptor.target
        } else {
            slot.value
        };

        let motion = match descriptor.kind {
            MotionKind::Spring {
                params,
                initial_velocity,
            } => {
                let velocity = initial_velocity.unwrap_or(slot.velocity);
                RunMotion::Spring {
                    params,
                    state: SpringState::new(slot.value, velocity),
                }
            }
            MotionKind::Timed { duration, curve } => RunMotion::Timed {
                from: slot.value,
                duration,
                curve,
                elapsed: Duration::ZERO,
            },
            MotionKind::Hold { duration } => RunMotion::Hold {
                duration,
                elapsed: Duration::ZERO,
            },
        };

        tracing::trace!(
            value = %key,
            generation,
            from = slot.value,
            target,
            "animation started"
        );
        slot.writer = Writer::Animation(Run {
            handle,
            target,
            motion,
        });
        handle
    }

    /// Jump-cut `key` to `value`, cancelling any writer.
    pub fn set(&mut self, key: MotionKey, value: f64) {
        self.revoke(key);
        let slot = self.slot_mut(key);
        if value.is_finite() {
            slot.value = value;
        }
        slot.velocity = 0.0;
    }

    /// Cancel the animation on `key`, if any. Gesture ownership is untouched.
    pub fn cancel(&mut self, key: MotionKey) -> bool {
        if matches!(self.slot(key).writer, Writer::Animation(_)) {
            self.revoke(key)
        } else {
            false
        }
    }

    /// Cancel every animation and revoke every gesture.
    pub fn cancel_all(&mut self) {
        for key in MotionKey::ALL {
            self.revoke(key);
        }
    }

    /// Hand `key` to a gesture, pre-empting any animation on it.
    pub fn claim_for_gesture(&mut self, key: MotionKey) -> GestureToken {
        self.revoke(key);
        let generation = self.next_generation();
        let slot = self.slot_mut(key);
        slot.writer = Writer::Gesture(generation);
        slot.velocity = 0.0;
        tracing::trace!(value = %key, generation, "gesture claimed value");
        GestureToken::new(key, generation)
    }

    /// Write `value` through a gesture token.
    pub fn write_gesture(&mut self, token: &GestureToken, value: f64) -> Result<(), MotionError> {
        let key = token.key();
        if !value.is_finite() {
            return Err(MotionError::NonFinite { key });
        }
        let slot = self.slot_mut(key);
        match slot.writer {
            Writer::Gesture(generation) if generation == token.generation() => {
                slot.value = value;
                Ok(())
            }
            _ => Err(MotionError::StaleGesture {
                key,
                generation: token.generation(),
            }),
        }
    }

    /// Give up gesture ownership. Returns `false` if the token was already stale.
    pub fn release_gesture(&mut self, token: GestureToken) -> bool {
        let slot = self.slot_mut(token.key());
        match slot.writer {
            Writer::Gesture(generation) if generation == token.generation() => {
                slot.writer = Writer::Idle;
                true
            }
            _ => false,
        }
    }

    /// Record the gesture's tracked velocity so a following spring can inherit it.
    pub fn set_gesture_velocity(&mut self, token: &GestureToken, velocity: f64) {
        let slot = self.slot_mut(token.key());
        if matches!(slot.writer, Writer::Gesture(g) if g == token.generation())
            && velocity.is_finite()
        {
            slot.velocity = velocity;
        }
    }

    /// Advance every running animation by `dt` of presentation time.
    pub fn advance(&mut self, dt: Duration) {
        for key in MotionKey::ALL {
            let slot = &mut self.slots[key.index()];
            let Writer::Animation(run) = &mut slot.writer else {
                continue;
            };
            let (value, velocity, done) = run.step(slot.value, dt);
            slot.value = value;
            slot.velocity = velocity;
            if done {
                let handle = run.handle;
                slot.writer = Writer::Idle;
                slot.velocity = 0.0;
                tracing::trace!(value = %key, generation = handle.generation(), at = value, "animation finished");
                self.completions.push_back(Completion {
                    handle,
                    outcome: CompletionOutcome::Finished,
                });
            }
        }
    }

    /// Take every queued completion, oldest first.
    pub fn drain_completions(&mut self) -> Vec<Completion> {
        self.completions.drain(..).collect()
    }

    /// Whether completions are waiting for the logic path.
    pub fn has_pending_completions(&self) -> bool {
        !self.completions.is_empty()
    }

    /// Current value of `key`.
    #[inline]
    pub fn value(&self, key: MotionKey) -> f64 {
        self.slot(key).value
    }

    /// Current velocity of `key`.
    #[inline]
    pub fn velocity(&self, key: MotionKey) -> f64 {
        self.slot(key).velocity
    }

    /// Current writer of `key`.
    pub fn ownership(&self, key: MotionKey) -> Ownership {
        match &self.slot(key).writer {
            Writer::Idle => Ownership::Idle,
            Writer::Animation(run) => Ownership::Animation(run.handle),
            Writer::Gesture(generation) => Ownership::Gesture(*generation),
        }
    }

    /// Target of the run in flight on `key`.
    pub fn target(&self, key: MotionKey) -> Option<f64> {
        match &self.slot(key).writer {
            Writer::Animation(run) => Some(run.target),
            _ => None,
        }
    }

    /// Whether `handle` still owns its value.
    pub fn is_current(&self, handle: AnimationHandle) -> bool {
        matches!(&self.slot(handle.key()).writer, Writer::Animation(run) if run.handle == handle)
    }

    /// Whether an animation is running on `key`.
    pub fn is_animating(&self, key: MotionKey) -> bool {
        matches!(self.slot(key).writer, Writer::Animation(_))
    }

    /// No animation in flight and nothing left to deliver.
    pub fn is_quiescent(&self) -> bool {
        self.completions.is_empty()
            && MotionKey::ALL
                .iter()
                .all(|key| !matches!(self.slot(*key).writer, Writer::Animation(_)))
    }

    /// Snapshot of `key`.
    pub fn snapshot(&self, key: MotionKey) -> MotionValue {
        let slot = self.slot(key);
        MotionValue {
            key,
            value: slot.value,
            velocity: slot.velocity,
            target: self.target(key),
            ownership: self.ownership(key),
        }
    }
}
