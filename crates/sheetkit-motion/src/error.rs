#![forbid(unsafe_code)]

use std::fmt;

use crate::value::MotionKey;

/// Errors from motion value writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// The gesture token was revoked by a newer owner.
    StaleGesture { key: MotionKey, generation: u64 },
    /// A non-finite value was written.
    NonFinite { key: MotionKey },
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleGesture { key, generation } => {
                write!(f, "gesture token {generation} no longer owns {key}")
            }
            Self::NonFinite { key } => write!(f, "non-finite write to {key}"),
        }
    }
}

impl std::error::Error for MotionError {}
