#![forbid(unsafe_code)]

//! Presentation controller: the sheet's state machine.
//!
//! The controller owns the [`AnimationDriver`] and every coordinator, and is
//! the only place [`SheetState`] changes. Host input (visibility, pointer,
//! keyboard, configuration) and animation completions are both handled on the
//! logic path; the presentation clock only calls [`SheetController::advance`].
//!
//! ```text
//!            open                 entrance done
//!  Closed ─────────▶ Opening ───────────────────▶ Open ◀──────────────┐
//!    ▲                  │ close                  │  │ drag     │ step  │
//!    │                  ▼                        │  ▼          ▼       │
//!    │ exit done   ClosingByRequest ◀── close ───┘ Dragging  StepTransitioning
//!    └──────────── ClosingByDrag ◀──── commit ───────┘           (done)┘
//! ```
//!
//! # Invariants
//!
//! 1. The close notification fires exactly once per Closed arrival.
//! 2. While closing, further close requests are no-ops.
//! 3. Only the active gesture writes the vertical offset while Dragging.
//! 4. Transitions never depend on elapsed time, only on completions.
//!
//! # Failure Modes
//!
//! - Events after [`SheetController::unmount`] are ignored.
//! - A drag write rejected by the driver is logged and dropped.
//! - A cancelled completion for a gating handle counts as done, so the
//!   machine never waits on a run that was revoked.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use sheetkit_motion::{AnimationDriver, AnimationHandle, Completion, MotionDescriptor, MotionKey};

use crate::config::SheetConfig;
use crate::frame::SheetFrame;
use crate::gesture::{GestureRecognizer, GestureSession, PointerEvent, PointerSample, Recognition};
use crate::handle::{CloseRequest, HandleShared, SheetHandle};
use crate::height::Viewport;
use crate::keyboard::{KeyboardCoordinator, KeyboardEvent};
use crate::state::{SheetState, Transition, Trigger};
use crate::step::{StepChange, StepPhase, StepProgress, StepTransitionCoordinator};
use crate::tuning::SheetTuning;

/// Transitions kept for inspection.
const TRANSITION_LOG_CAPACITY: usize = 64;

/// Animation the current state is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Idle,
    Entrance {
        offset: Option<AnimationHandle>,
        opacity: Option<AnimationHandle>,
    },
    ExitSlide(AnimationHandle),
    ExitFade(AnimationHandle),
}

/// Headless bottom-sheet engine.
pub struct SheetController {
    driver: AnimationDriver,
    state: SheetState,
    config: SheetConfig,
    tuning: SheetTuning,
    viewport: Viewport,
    panel_height: f64,
    recognizer: GestureRecognizer,
    session: Option<GestureSession>,
    steps: StepTransitionCoordinator,
    keyboard: KeyboardCoordinator,
    shared: Rc<HandleShared>,
    pending: Pending,
    deferred_close: Option<Trigger>,
    reopen_latched: bool,
    visible: bool,
    on_close: Option<Box<dyn FnMut()>>,
    close_count: u64,
    transitions: VecDeque<Transition>,
}

impl fmt::Debug for SheetController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetController")
            .field("state", &self.state)
            .field("panel_height", &self.panel_height)
            .field("pending", &self.pending)
            .field("dragging", &self.session.is_some())
            .field("close_count", &self.close_count)
            .finish_non_exhaustive()
    }
}

impl SheetController {
    /// Mount a sheet. Motion values start at their closed defaults.
    ///
    /// Out-of-range tuning is logged and clamped into range.
    pub fn new(config: SheetConfig, tuning: SheetTuning, viewport: Viewport) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(err) => {
                tracing::warn!(%err, "invalid tuning; clamping");
                tuning.sanitized()
            }
        };
        let panel_height = config
            .height
            .resolve(viewport, tuning.default_height_fraction);
        let mut driver = AnimationDriver::new();
        driver.set(MotionKey::VerticalOffset, panel_height);
        driver.set(MotionKey::PanelHeight, panel_height);
        driver.set(MotionKey::OverlayOpacity, 0.0);
        driver.set(MotionKey::KeyboardShift, 0.0);

        let mut steps = StepTransitionCoordinator::new();
        steps.observe(config.current_step());

        tracing::debug!(panel_height, "sheet mounted");
        Self {
            driver,
            state: SheetState::Closed,
            config,
            tuning,
            viewport,
            panel_height,
            recognizer: GestureRecognizer::new(),
            session: None,
            steps,
            keyboard: KeyboardCoordinator::new(),
            shared: HandleShared::new(),
            pending: Pending::Idle,
            deferred_close: None,
            reopen_latched: false,
            visible: false,
            on_close: None,
            close_count: 0,
            transitions: VecDeque::with_capacity(TRANSITION_LOG_CAPACITY),
        }
    }

    /// Register the close notification.
    pub fn on_close(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    /// Replace the close notification.
    pub fn set_on_close(&mut self, callback: impl FnMut() + 'static) {
        self.on_close = Some(Box::new(callback));
    }

    fn is_unmounted(&self) -> bool {
        self.state == SheetState::Unmounted
    }

    // --- host input -----------------------------------------------------

    /// Apply the host's visibility flag. Only changes act.
    pub fn set_visible(&mut self, visible: bool) {
        if self.is_unmounted() {
            return;
        }
        self.pump_handle();
        if visible == self.visible {
            return;
        }
        if visible {
            self.open_intent();
        } else {
            self.close_intent(Trigger::CloseIntent);
        }
    }

    /// Apply a fresh host configuration.
    pub fn update_config(&mut self, config: SheetConfig) {
        if self.is_unmounted() {
            return;
        }
        self.pump_handle();
        let compensation_changed = config.keyboard_compensation != self.config.keyboard_compensation;
        let step = config.current_step();
        self.config = config;

        self.retarget_height();
        if compensation_changed {
            self.keyboard
                .refresh(&mut self.driver, self.config.keyboard_compensation, &self.tuning);
        }
        if let StepChange::Changed { from, to } = self.steps.observe(step) {
            tracing::debug!(?from, ?to, state = self.state.name(), "step changed");
            match self.state {
                SheetState::Open => self.begin_step_transition(),
                // Exiting and Holding pick the new step up at the snap.
                SheetState::StepTransitioning
                    if matches!(
                        self.steps.phase(),
                        Some(StepPhase::Exiting | StepPhase::Holding)
                    ) => {}
                _ => self.steps.apply_silently(),
            }
        }
    }

    /// The screen geometry changed.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.is_unmounted() {
            return;
        }
        self.pump_handle();
        self.viewport = viewport;
        self.retarget_height();
    }

    /// Route a pointer event.
    pub fn pointer(&mut self, event: PointerEvent) {
        if self.is_unmounted() {
            return;
        }
        self.pump_handle();
        match event {
            PointerEvent::Down(sample) => {
                if self.state.is_visible() && self.session.is_none() {
                    self.recognizer.pointer_down(sample);
                }
            }
            PointerEvent::Move(sample) => {
                let allowed = self.drag_allowed();
                match self.recognizer.classify(sample, self.tuning.touch_slop, allowed) {
                    Recognition::Claim { origin } => {
                        self.begin_drag(origin);
                        self.drag_move(sample);
                    }
                    Recognition::Tracking => self.drag_move(sample),
                    Recognition::Ignored | Recognition::Pending | Recognition::Rejected => {}
                }
            }
            PointerEvent::Up(sample) => {
                if self.session.is_some() {
                    self.drag_move(sample);
                    self.end_drag(true);
                }
                self.recognizer.reset();
            }
            PointerEvent::Cancel => {
                self.end_drag(false);
                self.recognizer.reset();
            }
        }
    }

    /// Route a soft-keyboard signal.
    pub fn keyboard(&mut self, event: KeyboardEvent) {
        if self.is_unmounted() {
            return;
        }
        self.pump_handle();
        if matches!(event, KeyboardEvent::Show { .. }) && self.session.is_some() {
            self.end_drag(false);
            self.recognizer.reset();
        }
        self.keyboard
            .handle(&mut self.driver, event, self.config.keyboard_compensation, &self.tuning);
    }

    /// The backdrop outside the panel was pressed.
    pub fn backdrop_pressed(&mut self) -> CloseRequest {
        if self.is_unmounted() {
            return CloseRequest::Detached;
        }
        self.pump_handle();
        if !self.config.close_on_backdrop {
            return CloseRequest::Disabled;
        }
        self.close_intent(Trigger::BackdropPress)
    }

    /// Close with the exit animation, respecting the re-entrancy guard.
    pub fn close_with_animation(&mut self) -> CloseRequest {
        if self.is_unmounted() {
            return CloseRequest::Detached;
        }
        self.pump_handle();
        self.close_intent(Trigger::HandleClose)
    }

    /// Cloneable handle for closing from outside the controller.
    pub fn handle(&self) -> SheetHandle {
        SheetHandle::new(Rc::clone(&self.shared))
    }

    // --- clock ----------------------------------------------------------

    /// Advance animations by one presentation frame.
    pub fn advance(&mut self, dt: Duration) {
        if self.is_unmounted() {
            return;
        }
        self.driver.advance(dt);
    }

    /// Apply queued completions and handle requests.
    pub fn process_completions(&mut self) {
        if self.is_unmounted() {
            return;
        }
        self.pump_handle();
        while self.driver.has_pending_completions() {
            for completion in self.driver.drain_completions() {
                self.on_completion(completion);
                if self.is_unmounted() {
                    return;
                }
            }
        }
    }

    /// `advance` then `process_completions`.
    pub fn tick(&mut self, dt: Duration) {
        self.advance(dt);
        self.process_completions();
    }

    /// Tear down. Terminal; every in-flight animation is cancelled.
    pub fn unmount(&mut self) {
        if self.is_unmounted() {
            return;
        }
        self.session = None;
        self.recognizer.reset();
        self.steps.abandon();
        self.driver.cancel_all();
        let dropped = self.driver.drain_completions().len();
        self.pending = Pending::Idle;
        self.deferred_close = None;
        self.reopen_latched = false;
        self.shared.set_closing(false);
        self.shared.detach();
        tracing::debug!(dropped, "sheet unmounted");
        self.transition(SheetState::Unmounted, Trigger::Unmount);
    }

    // --- intents --------------------------------------------------------

    fn pump_handle(&mut self) {
        if self.shared.take_request() {
            let result = self.close_intent(Trigger::HandleClose);
            tracing::debug!(?result, "handle close applied");
        }
    }

    fn open_intent(&mut self) {
        self.visible = true;
        match self.state {
            SheetState::Closed => self.start_entrance(),
            SheetState::ClosingByDrag | SheetState::ClosingByRequest => {
                tracing::debug!("open latched until closed");
                self.reopen_latched = true;
            }
            SheetState::Dragging => {
                if self.deferred_close.take().is_some() {
                    self.shared.set_closing(false);
                }
            }
            _ => {}
        }
    }

    fn close_intent(&mut self, trigger: Trigger) -> CloseRequest {
        self.visible = false;
        match self.state {
            SheetState::Closed | SheetState::Unmounted => {
                self.reopen_latched = false;
                CloseRequest::NotOpen
            }
            SheetState::ClosingByDrag | SheetState::ClosingByRequest => {
                self.reopen_latched = false;
                CloseRequest::AlreadyClosing
            }
            SheetState::Dragging => {
                if self.deferred_close.is_some() {
                    return CloseRequest::AlreadyClosing;
                }
                tracing::debug!(trigger = trigger.name(), "close deferred until release");
                self.deferred_close = Some(trigger);
                self.shared.set_closing(true);
                CloseRequest::Deferred
            }
            SheetState::Opening | SheetState::Open | SheetState::StepTransitioning => {
                self.steps.abandon();
                self.begin_exit(SheetState::ClosingByRequest, trigger);
                CloseRequest::Started
            }
        }
    }

    // --- choreography ---------------------------------------------------

    fn start_entrance(&mut self) {
        let h = self.panel_height;
        self.driver.set(MotionKey::PanelHeight, h);
        self.driver.set(MotionKey::VerticalOffset, h);
        self.driver.set(MotionKey::OverlayOpacity, 0.0);
        let offset = self.driver.start(
            MotionKey::VerticalOffset,
            MotionDescriptor::spring(0.0, self.tuning.spring),
        );
        let opacity = self.driver.start(
            MotionKey::OverlayOpacity,
            MotionDescriptor::timed(1.0, self.tuning.fade_in_duration, self.tuning.fade_curve),
        );
        self.pending = Pending::Entrance {
            offset: Some(offset),
            opacity: Some(opacity),
        };
        self.transition(SheetState::Opening, Trigger::OpenIntent);
    }

    fn begin_exit(&mut self, to: SheetState, trigger: Trigger) {
        self.shared.set_closing(true);
        self.visible = false;
        self.deferred_close = None;
        self.driver.cancel(MotionKey::OverlayOpacity);
        let slide = self.driver.start(
            MotionKey::VerticalOffset,
            MotionDescriptor::timed(
                self.panel_height,
                self.tuning.exit_duration,
                self.tuning.exit_curve,
            ),
        );
        self.pending = Pending::ExitSlide(slide);
        self.transition(to, trigger);
    }

    fn finish_close(&mut self) {
        let h = self.panel_height;
        self.pending = Pending::Idle;
        self.driver.set(MotionKey::VerticalOffset, h);
        self.driver.set(MotionKey::PanelHeight, h);
        self.driver.set(MotionKey::OverlayOpacity, 0.0);
        self.steps.apply_silently();
        self.deferred_close = None;
        self.shared.set_closing(false);
        self.visible = false;
        self.transition(SheetState::Closed, Trigger::ExitComplete);

        self.close_count += 1;
        tracing::debug!(close_count = self.close_count, "close notification");
        if let Some(callback) = self.on_close.as_mut() {
            callback();
        }

        if std::mem::take(&mut self.reopen_latched) && !self.is_unmounted() {
            self.visible = true;
            self.start_entrance();
        }
    }

    fn begin_step_transition(&mut self) {
        self.pending = Pending::Idle;
        self.steps
            .begin(&mut self.driver, self.panel_height, &self.tuning);
        self.transition(SheetState::StepTransitioning, Trigger::StepChange);
    }

    fn retarget_height(&mut self) {
        let h = self
            .config
            .height
            .resolve(self.viewport, self.tuning.default_height_fraction);
        if h == self.panel_height {
            return;
        }
        tracing::debug!(from = self.panel_height, to = h, "panel height retarget");
        self.panel_height = h;
        if let Some(session) = self.session.as_ref()
            && let Err(err) = session.reclamp(&mut self.driver, h)
        {
            tracing::warn!(%err, "drag reclamp rejected");
        }
        if self.state == SheetState::Closed {
            self.driver.set(MotionKey::PanelHeight, h);
            self.driver.set(MotionKey::VerticalOffset, h);
        } else {
            self.driver.start(
                MotionKey::PanelHeight,
                MotionDescriptor::spring(h, self.tuning.spring),
            );
        }
    }

    // --- drag -----------------------------------------------------------

    fn drag_allowed(&self) -> bool {
        self.config.draggable
            && !self.keyboard.is_visible()
            && matches!(
                self.state,
                SheetState::Opening | SheetState::Open | SheetState::StepTransitioning
            )
    }

    fn begin_drag(&mut self, origin: PointerSample) {
        if self.steps.abandon() {
            tracing::debug!("step transition pre-empted by drag");
        }
        self.pending = Pending::Idle;
        self.session = Some(GestureSession::begin(&mut self.driver, origin));
        self.transition(SheetState::Dragging, Trigger::DragStart);
    }

    fn drag_move(&mut self, sample: PointerSample) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(err) = session.update(&mut self.driver, sample, self.panel_height) {
            tracing::warn!(%err, "drag write rejected");
        }
    }

    fn end_drag(&mut self, released: bool) {
        let Some(session) = self.session.take() else {
            return;
        };
        let release = if released {
            session.release(
                &mut self.driver,
                self.panel_height,
                self.tuning.commit_threshold,
            )
        } else {
            session.cancel(&mut self.driver)
        };
        tracing::debug!(
            offset = release.offset,
            velocity = release.velocity,
            commit = release.commit,
            "drag ended"
        );

        if release.commit {
            self.begin_exit(SheetState::ClosingByDrag, Trigger::DragRelease);
        } else if let Some(trigger) = self.deferred_close.take() {
            self.begin_exit(SheetState::ClosingByRequest, trigger);
        } else {
            self.driver.start(
                MotionKey::VerticalOffset,
                MotionDescriptor::spring(0.0, self.tuning.spring),
            );
            let trigger = if released {
                Trigger::DragRelease
            } else {
                Trigger::DragCancel
            };
            self.transition(SheetState::Open, trigger);
        }
    }

    // --- completions ----------------------------------------------------

    fn on_completion(&mut self, completion: Completion) {
        if self.steps.is_active() {
            match self.steps.on_completion(
                &mut self.driver,
                completion,
                self.panel_height,
                &self.tuning,
            ) {
                StepProgress::Ignored => {
                    // Revoked mid-sequence: the panel is wherever it stopped.
                    if !self.steps.is_active() && self.state == SheetState::StepTransitioning {
                        self.transition(SheetState::Open, Trigger::StepComplete);
                        return;
                    }
                }
                StepProgress::Advanced(_) => return,
                StepProgress::Finished => {
                    if self.state == SheetState::StepTransitioning {
                        self.transition(SheetState::Open, Trigger::StepComplete);
                    }
                    return;
                }
            }
        }

        let handle = completion.handle;
        match self.pending {
            Pending::Entrance { offset, opacity } => {
                let offset = offset.filter(|h| *h != handle);
                let opacity = opacity.filter(|h| *h != handle);
                if offset.is_none() && opacity.is_none() {
                    self.pending = Pending::Idle;
                    if self.state == SheetState::Opening {
                        self.transition(SheetState::Open, Trigger::EntranceComplete);
                    }
                } else {
                    self.pending = Pending::Entrance { offset, opacity };
                }
            }
            Pending::ExitSlide(slide) if slide == handle => {
                let fade = self.driver.start(
                    MotionKey::OverlayOpacity,
                    MotionDescriptor::timed(
                        0.0,
                        self.tuning.fade_out_duration,
                        self.tuning.fade_curve,
                    ),
                );
                self.pending = Pending::ExitFade(fade);
            }
            Pending::ExitFade(fade) if fade == handle => self.finish_close(),
            _ => {
                tracing::trace!(
                    value = %completion.key(),
                    generation = handle.generation(),
                    outcome = ?completion.outcome,
                    "completion not gating"
                );
            }
        }
    }

    fn transition(&mut self, to: SheetState, trigger: Trigger) {
        let from = self.state;
        if from == to {
            return;
        }
        tracing::debug!(
            from = from.name(),
            to = to.name(),
            trigger = trigger.name(),
            "sheet transition"
        );
        self.state = to;
        if self.transitions.len() == TRANSITION_LOG_CAPACITY {
            self.transitions.pop_front();
        }
        self.transitions.push_back(Transition { from, to, trigger });
    }

    // --- queries --------------------------------------------------------

    pub fn state(&self) -> SheetState {
        self.state
    }

    /// Resolved panel height the sheet is heading to.
    pub fn panel_height(&self) -> f64 {
        self.panel_height
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn tuning(&self) -> &SheetTuning {
        &self.tuning
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    /// Close notifications delivered so far.
    pub fn close_count(&self) -> u64 {
        self.close_count
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a close is in progress or deferred until the drag ends.
    pub fn is_closing(&self) -> bool {
        self.shared.is_closing()
    }

    /// Step transition cycles completed.
    pub fn step_cycles(&self) -> u64 {
        self.steps.cycles()
    }

    /// Recent transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.transitions.back().copied()
    }

    /// Resting and nothing left to animate.
    pub fn is_settled(&self) -> bool {
        self.state.is_resting() && self.driver.is_quiescent() && self.session.is_none()
    }

    /// Snapshot for the renderer.
    pub fn frame(&self) -> SheetFrame {
        let offset = self.driver.value(MotionKey::VerticalOffset);
        let shift = self.driver.value(MotionKey::KeyboardShift);
        let step = self.config.step;
        SheetFrame {
            state: self.state,
            visible: self.state.is_visible(),
            container_translate_y: offset - shift,
            vertical_offset: offset,
            overlay_opacity: self.driver.value(MotionKey::OverlayOpacity),
            panel_height: self.driver.value(MotionKey::PanelHeight),
            keyboard_shift: shift,
            displayed_step: self.steps.displayed(),
            total_steps: step.map(|s| s.total),
            step_progress: step.map(|s| s.progress()),
            step_phase: self.steps.phase(),
        }
    }
}

impl Drop for SheetController {
    fn drop(&mut self) {
        self.shared.detach();
    }
}
