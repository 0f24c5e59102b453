#![forbid(unsafe_code)]

//! Per-invocation host configuration.

use crate::height::SheetHeight;

/// Wizard position forwarded to the step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepInfo {
    /// 1-based current step.
    pub current: u32,
    pub total: u32,
}

impl StepInfo {
    pub fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    /// Completed share of the wizard in `[0, 1]`.
    pub fn progress(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (f64::from(self.current) / f64::from(self.total)).clamp(0.0, 1.0)
    }
}

/// Host input supplied fresh on every invocation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetConfig {
    pub height: SheetHeight,
    pub draggable: bool,
    pub step: Option<StepInfo>,
    /// The host compensates for the keyboard itself (e.g. by scrolling).
    pub keyboard_compensation: bool,
    pub close_on_backdrop: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            height: SheetHeight::Auto,
            draggable: true,
            step: None,
            keyboard_compensation: false,
            close_on_backdrop: true,
        }
    }
}

impl SheetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(mut self, height: impl Into<SheetHeight>) -> Self {
        self.height = height.into();
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn step(mut self, current: u32, total: u32) -> Self {
        self.step = Some(StepInfo::new(current, total));
        self
    }

    pub fn without_steps(mut self) -> Self {
        self.step = None;
        self
    }

    pub fn keyboard_compensation(mut self, enabled: bool) -> Self {
        self.keyboard_compensation = enabled;
        self
    }

    pub fn close_on_backdrop(mut self, close: bool) -> Self {
        self.close_on_backdrop = close;
        self
    }

    /// Current step index, if this sheet hosts a wizard.
    pub fn current_step(&self) -> Option<u32> {
        self.step.map(|s| s.current)
    }
}
