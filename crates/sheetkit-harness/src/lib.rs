#![forbid(unsafe_code)]

//! Deterministic scenario runner for sheetkit.
//!
//! [`ScenarioRunner`] plays the host: it owns a [`SheetController`], counts
//! close notifications, and drives a fixed 16ms presentation clock. Pointer
//! samples are stamped from the same clock, so every run is reproducible.
//!
//! ```ignore
//! let mut run = ScenarioRunner::with_height(SheetHeight::Absolute(400.0), 800.0);
//! run.open_and_settle();
//! run.drag_fraction(0.25);
//! run.release();
//! assert!(run.settle());
//! assert_eq!(run.closes(), 1);
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use sheetkit_core::{
    KeyboardEvent, PointerEvent, PointerSample, SheetConfig, SheetController, SheetFrame,
    SheetHeight, SheetState, SheetTuning, Viewport,
};

/// Fixed presentation frame.
pub const FRAME: Duration = Duration::from_millis(16);

/// Upper bound on frames spent waiting for a settle.
pub const SETTLE_FRAMES: u32 = 1_000;

/// Horizontal position used for scripted touches.
const TOUCH_X: f64 = 200.0;

/// Scripted host around one controller.
#[derive(Debug)]
pub struct ScenarioRunner {
    controller: SheetController,
    closes: Rc<Cell<u32>>,
    now: Duration,
    frames: u64,
    touch_y: Option<f64>,
    origin_y: f64,
}

impl ScenarioRunner {
    pub fn new(config: SheetConfig, tuning: SheetTuning, viewport: Viewport) -> Self {
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let controller = SheetController::new(config, tuning, viewport)
            .on_close(move || counter.set(counter.get() + 1));
        Self {
            controller,
            closes,
            now: Duration::ZERO,
            frames: 0,
            touch_y: None,
            origin_y: 100.0,
        }
    }

    /// Default tuning with the given height request and screen.
    pub fn with_height(height: SheetHeight, screen: f64) -> Self {
        Self::new(
            SheetConfig::new().height(height),
            SheetTuning::default(),
            Viewport::new(screen),
        )
    }

    pub fn controller(&self) -> &SheetController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SheetController {
        &mut self.controller
    }

    /// Close notifications observed by the host.
    pub fn closes(&self) -> u32 {
        self.closes.get()
    }

    pub fn state(&self) -> SheetState {
        self.controller.state()
    }

    pub fn snapshot(&self) -> SheetFrame {
        self.controller.frame()
    }

    pub fn offset(&self) -> f64 {
        self.controller.frame().vertical_offset
    }

    pub fn panel_height(&self) -> f64 {
        self.controller.panel_height()
    }

    /// Elapsed scripted time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one presentation frame and apply its completions.
    pub fn frame(&mut self) {
        self.now += FRAME;
        self.frames += 1;
        self.controller.tick(FRAME);
    }

    /// Run frames covering at least `duration`.
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.now + duration;
        while self.now < end {
            self.frame();
        }
    }

    /// Run until the controller rests. Returns `false` if it never did.
    pub fn settle(&mut self) -> bool {
        for _ in 0..SETTLE_FRAMES {
            if self.controller.is_settled() {
                return true;
            }
            self.frame();
        }
        self.controller.is_settled()
    }

    pub fn open(&mut self) {
        self.controller.set_visible(true);
    }

    pub fn close(&mut self) {
        self.controller.set_visible(false);
    }

    /// Open and wait for `Open`.
    pub fn open_and_settle(&mut self) {
        self.open();
        let settled = self.settle();
        debug_assert!(settled, "entrance never settled");
        tracing::debug!(frames = self.frames, "scenario open");
    }

    fn sample(&self, y: f64) -> PointerSample {
        PointerSample::new(TOUCH_X, y, self.now)
    }

    /// Put a finger down at the scripted origin.
    pub fn press(&mut self) {
        self.touch_y = Some(self.origin_y);
        let sample = self.sample(self.origin_y);
        self.controller.pointer(PointerEvent::Down(sample));
    }

    /// Move the finger to `delta` below where it went down, in four
    /// frame-spaced moves.
    pub fn drag_by(&mut self, delta: f64) {
        if self.touch_y.is_none() {
            self.press();
        }
        let from = self.touch_y.unwrap_or(self.origin_y);
        let to = self.origin_y + delta;
        for i in 1..=4 {
            let y = from + (to - from) * f64::from(i) / 4.0;
            self.frame();
            let sample = self.sample(y);
            self.controller.pointer(PointerEvent::Move(sample));
        }
        self.touch_y = Some(to);
    }

    /// Drag by a fraction of the resolved panel height.
    pub fn drag_fraction(&mut self, fraction: f64) {
        let delta = fraction * self.panel_height();
        self.drag_by(delta);
    }

    /// Lift the finger where it is.
    pub fn release(&mut self) {
        if let Some(y) = self.touch_y.take() {
            let sample = self.sample(y);
            self.controller.pointer(PointerEvent::Up(sample));
        }
    }

    /// The platform took the touch away.
    pub fn cancel_touch(&mut self) {
        self.touch_y = None;
        self.controller.pointer(PointerEvent::Cancel);
    }

    pub fn keyboard(&mut self, event: KeyboardEvent) {
        self.controller.keyboard(event);
    }

    pub fn update_config(&mut self, config: SheetConfig) {
        self.controller.update_config(config);
    }

    /// States entered so far, in order.
    pub fn visited(&self) -> Vec<SheetState> {
        self.controller.transitions().map(|t| t.to).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_clock_is_fixed_step() {
        let mut run = ScenarioRunner::with_height(SheetHeight::Auto, 800.0);
        run.run_for(Duration::from_millis(100));
        assert_eq!(run.frames(), 7);
        assert_eq!(run.now(), FRAME * 7);
    }

    #[test]
    fn closed_sheet_is_settled() {
        let mut run = ScenarioRunner::with_height(SheetHeight::Auto, 800.0);
        assert!(run.settle());
        assert_eq!(run.frames(), 0);
    }

    #[test]
    fn drag_follows_finger() {
        let mut run = ScenarioRunner::with_height(SheetHeight::Absolute(400.0), 800.0);
        run.open_and_settle();
        run.drag_by(120.0);
        assert_eq!(run.state(), SheetState::Dragging);
        assert_eq!(run.offset(), 120.0);
        run.cancel_touch();
        assert_eq!(run.state(), SheetState::Open);
    }
}
