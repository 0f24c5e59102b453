#![forbid(unsafe_code)]

//! Single-writer motion values for sheetkit.
//!
//! This crate provides:
//! - [`AnimationDriver`] running spring, timed and hold motion on named values
//! - [`Ownership`] tokens guaranteeing one writer per value (animation or gesture)
//! - [`Curve`] easing for timed motion and [`SpringParams`] for springs
//! - [`FrameClock`] to derive frame deltas from display timestamps

pub mod clock;
pub mod curve;
pub mod driver;
pub mod error;
pub mod spring;
pub mod value;

pub use clock::FrameClock;
pub use curve::Curve;
pub use driver::{AnimationDriver, Completion, CompletionOutcome};
pub use error::MotionError;
pub use spring::{SpringParams, SpringState};
pub use value::{
    AnimationHandle, GestureToken, MotionDescriptor, MotionKey, MotionKind, MotionValue, Ownership,
};
