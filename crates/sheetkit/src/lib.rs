#![forbid(unsafe_code)]

//! sheetkit: a headless, draggable, multi-step bottom sheet.
//!
//! Most hosts only need the [`prelude`]:
//!
//! ```ignore
//! use sheetkit::prelude::*;
//!
//! let mut sheet = SheetController::new(
//!     SheetConfig::new().height("50%".parse::<SheetHeight>()?),
//!     SheetTuning::default(),
//!     Viewport::new(800.0),
//! )
//! .on_close(|| println!("closed"));
//!
//! sheet.set_visible(true);
//! loop {
//!     sheet.tick(frame_delta);
//!     draw(sheet.frame());
//! }
//! ```

pub use sheetkit_core as core;
pub use sheetkit_motion as motion;

pub use sheetkit_core::{
    CloseRequest, KeyboardEvent, PointerEvent, PointerSample, Sheet, SheetConfig,
    SheetController, SheetFrame, SheetHandle, SheetHeight, SheetState, SheetTuning, SheetView,
    StepPhase, Viewport,
};
pub use sheetkit_motion::{Curve, FrameClock, SpringParams};

/// Everything a host typically touches.
pub mod prelude {
    pub use sheetkit_core::{
        CloseRequest, KeyboardEvent, PointerEvent, PointerSample, Sheet, SheetConfig,
        SheetController, SheetFrame, SheetHandle, SheetHeight, SheetState, SheetTuning, Viewport,
    };
    pub use sheetkit_motion::{Curve, FrameClock, SpringParams};
}
