#![forbid(unsafe_code)]

//! Sheet presentation states and the triggers that move between them.

use std::fmt;

/// Presentation state of the sheet.
///
/// State machine: Closed → Opening → Open ⇄ {Dragging, StepTransitioning}
/// → ClosingByDrag / ClosingByRequest → Closed. `Unmounted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SheetState {
    /// Fully hidden; nothing rendered.
    #[default]
    Closed,
    /// Entrance animation in flight.
    Opening,
    /// Fully presented and at rest (a spring-back may still be settling).
    Open,
    /// A gesture owns the vertical offset.
    Dragging,
    /// Dismissal committed by a drag release.
    ClosingByDrag,
    /// Dismissal requested by the host or the imperative handle.
    ClosingByRequest,
    /// Replaying the step-change choreography.
    StepTransitioning,
    /// The component was torn down.
    Unmounted,
}

impl SheetState {
    /// Whether the sheet should be rendered.
    #[inline]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Closed | Self::Unmounted)
    }

    #[inline]
    pub fn is_closing(self) -> bool {
        matches!(self, Self::ClosingByDrag | Self::ClosingByRequest)
    }

    /// Closed or Open: the only states the machine rests in.
    #[inline]
    pub fn is_resting(self) -> bool {
        matches!(self, Self::Closed | Self::Open)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Dragging => "dragging",
            Self::ClosingByDrag => "closing_by_drag",
            Self::ClosingByRequest => "closing_by_request",
            Self::StepTransitioning => "step_transitioning",
            Self::Unmounted => "unmounted",
        }
    }
}

impl fmt::Display for SheetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a transition happened. Used for logging and the transition log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    OpenIntent,
    CloseIntent,
    HandleClose,
    BackdropPress,
    EntranceComplete,
    DragStart,
    DragRelease,
    DragCancel,
    StepChange,
    StepComplete,
    ExitComplete,
    Unmount,
}

impl Trigger {
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenIntent => "open_intent",
            Self::CloseIntent => "close_intent",
            Self::HandleClose => "handle_close",
            Self::BackdropPress => "backdrop_press",
            Self::EntranceComplete => "entrance_complete",
            Self::DragStart => "drag_start",
            Self::DragRelease => "drag_release",
            Self::DragCancel => "drag_cancel",
            Self::StepChange => "step_change",
            Self::StepComplete => "step_complete",
            Self::ExitComplete => "exit_complete",
            Self::Unmount => "unmount",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SheetState,
    pub to: SheetState,
    pub trigger: Trigger,
}
