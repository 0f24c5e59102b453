#![forbid(unsafe_code)]

//! Headless bottom-sheet engine.
//!
//! # Role in sheetkit
//! `sheetkit-core` decides *what* the sheet does: it owns the presentation
//! state machine, turns pointer input into drags, replays the step-change
//! choreography and lifts the panel above the soft keyboard. The motion
//! itself runs on `sheetkit-motion`; rendering is left to the host, which
//! reads a [`SheetFrame`] each frame.
//!
//! # Primary responsibilities
//! - **SheetController**: the state machine and its close notification.
//! - **GestureSession**: drag recognition, clamping and the commit rule.
//! - **StepTransitionCoordinator**: slide out, swap, spring back in.
//! - **KeyboardCoordinator**: keyboard-driven container lift.
//! - **SheetHandle**: imperative, re-entrancy-guarded close.
//!
//! # How it fits in the system
//! The host feeds events on its logic path and calls
//! [`SheetController::advance`] from its frame clock. Animation completions
//! are queued by the driver and applied by
//! [`SheetController::process_completions`], so state never races the clock.

pub mod config;
pub mod controller;
pub mod frame;
pub mod gesture;
pub mod handle;
pub mod height;
pub mod keyboard;
pub mod sheet;
pub mod state;
pub mod step;
pub mod tuning;

pub use config::{SheetConfig, StepInfo};
pub use controller::SheetController;
pub use frame::SheetFrame;
pub use gesture::{
    GestureRecognizer, GestureSession, PointerEvent, PointerSample, Recognition, Release,
    should_commit,
};
pub use handle::{CloseRequest, SheetHandle};
pub use height::{DEFAULT_HEIGHT_FRACTION, HeightParseError, SheetHeight, Viewport};
pub use keyboard::{KeyboardCoordinator, KeyboardEvent, keyboard_shift};
pub use sheet::{Sheet, SheetView};
pub use state::{SheetState, Transition, Trigger};
pub use step::{StepChange, StepPhase, StepProgress, StepTransitionCoordinator};
pub use tuning::{SheetTuning, TuningError};
