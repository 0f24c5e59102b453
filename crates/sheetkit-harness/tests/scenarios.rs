#![forbid(unsafe_code)]

//! End-to-end scenarios: height resolution, drag outcomes, keyboard lift and
//! the close notification contract.

use std::time::Duration;

use sheetkit_core::{
    CloseRequest, KeyboardEvent, SheetConfig, SheetHeight, SheetState, SheetTuning, Viewport,
};
use sheetkit_harness::{FRAME, ScenarioRunner};
use sheetkit_motion::MotionKey;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn open_sheet(height: f64) -> ScenarioRunner {
    let mut run = ScenarioRunner::with_height(SheetHeight::Absolute(height), 800.0);
    run.open_and_settle();
    assert_eq!(run.state(), SheetState::Open);
    run
}

// ============================================================================
// Height resolution
// ============================================================================

#[test]
fn absent_height_uses_default_fraction() {
    for screen in [800.0, 1000.0, 640.0] {
        let run = ScenarioRunner::with_height(SheetHeight::Auto, screen);
        assert!(approx(run.panel_height(), 0.85 * screen));
    }
}

#[test]
fn zero_height_uses_default_fraction() {
    let run = ScenarioRunner::with_height(SheetHeight::Absolute(0.0), 1000.0);
    assert!(approx(run.panel_height(), 850.0));
    let run = ScenarioRunner::with_height(SheetHeight::from(None), 1000.0);
    assert!(approx(run.panel_height(), 850.0));
}

#[test]
fn percent_height_scales_screen() {
    let half: SheetHeight = "50%".parse().unwrap();
    let run = ScenarioRunner::with_height(half, 800.0);
    assert!(approx(run.panel_height(), 400.0));
}

#[test]
fn oversize_heights_are_capped() {
    let run = ScenarioRunner::with_height(SheetHeight::Absolute(2000.0), 800.0);
    assert_eq!(run.panel_height(), 800.0);
    let run = ScenarioRunner::with_height(SheetHeight::Percent(150.0), 800.0);
    assert_eq!(run.panel_height(), 800.0);
}

#[test]
fn viewport_change_retargets_open_sheet() {
    let mut run = ScenarioRunner::with_height(SheetHeight::Percent(50.0), 800.0);
    run.open_and_settle();
    run.controller_mut().set_viewport(Viewport::new(1000.0));
    assert_eq!(run.panel_height(), 500.0);
    assert!(run.settle());
    assert_eq!(run.snapshot().panel_height, 500.0);
    assert_eq!(run.state(), SheetState::Open);
}

// ============================================================================
// Drag release
// ============================================================================

#[test]
fn short_drag_springs_back_open() {
    let mut run = open_sheet(400.0);
    run.drag_fraction(0.15);
    assert!(approx(run.offset(), 60.0));
    run.release();
    assert_eq!(run.state(), SheetState::Open);
    assert!(run.settle());
    assert_eq!(run.offset(), 0.0);
    assert_eq!(run.closes(), 0);
}

#[test]
fn drag_exactly_at_threshold_springs_back() {
    let mut run = open_sheet(400.0);
    run.drag_by(80.0);
    run.release();
    assert_eq!(run.state(), SheetState::Open);
    assert!(run.settle());
    assert_eq!(run.closes(), 0);
}

#[test]
fn long_drag_dismisses_once() {
    let mut run = open_sheet(400.0);
    run.drag_fraction(0.25);
    run.release();
    assert_eq!(run.state(), SheetState::ClosingByDrag);
    assert!(run.settle());
    assert_eq!(run.state(), SheetState::Closed);
    assert_eq!(run.closes(), 1);
    let frame = run.snapshot();
    assert_eq!(frame.vertical_offset, 400.0);
    assert_eq!(frame.overlay_opacity, 0.0);
    assert!(!frame.visible);
}

#[test]
fn drag_past_panel_clamps() {
    let mut run = open_sheet(400.0);
    run.drag_by(900.0);
    assert_eq!(run.offset(), 400.0);
    run.drag_by(-300.0);
    assert_eq!(run.offset(), 0.0);
    run.release();
    assert!(run.settle());
    assert_eq!(run.closes(), 0);
}

#[test]
fn height_shrink_mid_drag_reclamps_offset() {
    let mut run = open_sheet(400.0);
    run.drag_by(300.0);
    assert_eq!(run.offset(), 300.0);
    run.update_config(SheetConfig::new().height(200.0));
    assert_eq!(run.state(), SheetState::Dragging);
    assert_eq!(run.offset(), 200.0);
    for _ in 0..10 {
        run.frame();
        let offset = run.offset();
        assert!((0.0..=200.0).contains(&offset), "offset {offset} escaped");
    }
    run.release();
    assert_eq!(run.state(), SheetState::ClosingByDrag);
    assert!(run.settle());
    assert_eq!(run.closes(), 1);
}

#[test]
fn height_growth_mid_drag_follows_finger() {
    let mut run = open_sheet(200.0);
    run.drag_by(150.0);
    run.update_config(SheetConfig::new().height(400.0));
    assert_eq!(run.offset(), 150.0);
    run.drag_by(30.0);
    run.release();
    assert_eq!(run.state(), SheetState::Open);
    assert!(run.settle());
    assert_eq!(run.offset(), 0.0);
}

#[test]
fn drag_during_entrance_takes_ownership() {
    let mut run = ScenarioRunner::with_height(SheetHeight::Absolute(400.0), 800.0);
    run.open();
    run.run_for(Duration::from_millis(64));
    assert_eq!(run.state(), SheetState::Opening);
    run.drag_by(40.0);
    assert_eq!(run.state(), SheetState::Dragging);
    assert!(
        run.controller()
            .driver()
            .ownership(MotionKey::VerticalOffset)
            .is_gesture()
    );
    // Frames during the drag must not move the offset.
    let held = run.offset();
    run.frame();
    run.frame();
    assert_eq!(run.offset(), held);
    assert!((0.0..=400.0).contains(&held));
    run.release();
    assert!(run.settle());
}

#[test]
fn drag_disabled_sheet_ignores_touches() {
    let mut run = ScenarioRunner::new(
        SheetConfig::new().height(400.0).draggable(false),
        SheetTuning::default(),
        Viewport::new(800.0),
    );
    run.open_and_settle();
    run.drag_by(300.0);
    assert_eq!(run.state(), SheetState::Open);
    assert_eq!(run.offset(), 0.0);
}

#[test]
fn horizontal_swipe_is_left_to_content() {
    use sheetkit_core::{PointerEvent, PointerSample};

    let mut run = open_sheet(400.0);
    let t = run.now();
    let c = run.controller_mut();
    c.pointer(PointerEvent::Down(PointerSample::new(0.0, 100.0, t)));
    c.pointer(PointerEvent::Move(PointerSample::new(60.0, 110.0, t + FRAME)));
    c.pointer(PointerEvent::Move(PointerSample::new(60.0, 300.0, t + FRAME * 2)));
    assert_eq!(c.state(), SheetState::Open);
    assert_eq!(c.frame().vertical_offset, 0.0);
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn keyboard_lift_is_capped_and_reverts() {
    let mut run = open_sheet(400.0);
    run.keyboard(KeyboardEvent::show(300.0));
    assert!(run.settle());
    assert_eq!(run.snapshot().keyboard_shift, 220.0);
    assert_eq!(run.snapshot().container_translate_y, -220.0);

    run.keyboard(KeyboardEvent::hide());
    assert!(run.settle());
    assert_eq!(run.snapshot().keyboard_shift, 0.0);
}

#[test]
fn host_compensation_disables_lift() {
    let mut run = ScenarioRunner::new(
        SheetConfig::new().keyboard_compensation(true),
        SheetTuning::default(),
        Viewport::new(800.0),
    );
    run.open_and_settle();
    run.keyboard(KeyboardEvent::show(300.0));
    assert!(run.settle());
    assert_eq!(run.snapshot().keyboard_shift, 0.0);
}

#[test]
fn keyboard_lift_takes_its_own_time() {
    let mut run = open_sheet(400.0);
    run.keyboard(KeyboardEvent::show(200.0));
    run.run_for(Duration::from_millis(112));
    let mid = run.snapshot().keyboard_shift;
    assert!(mid > 0.0 && mid < 180.0, "mid-flight lift {mid}");
    run.run_for(Duration::from_millis(200));
    assert_eq!(run.snapshot().keyboard_shift, 180.0);
}

// ============================================================================
// Close notification and handle
// ============================================================================

#[test]
fn double_handle_close_notifies_once() {
    let mut run = open_sheet(400.0);
    let handle = run.controller().handle();
    assert_eq!(handle.close_with_animation(), CloseRequest::Queued);
    assert_eq!(handle.close_with_animation(), CloseRequest::AlreadyClosing);
    run.frame();
    assert_eq!(handle.close_with_animation(), CloseRequest::AlreadyClosing);
    assert!(run.settle());
    assert_eq!(run.closes(), 1);
    assert_eq!(run.state(), SheetState::Closed);
}

#[test]
fn mixed_close_sources_notify_once() {
    let mut run = open_sheet(400.0);
    let handle = run.controller().handle();
    run.close();
    assert_eq!(run.controller_mut().backdrop_pressed(), CloseRequest::AlreadyClosing);
    assert_eq!(handle.close_with_animation(), CloseRequest::AlreadyClosing);
    assert!(run.settle());
    assert_eq!(run.closes(), 1);
}

#[test]
fn handle_close_after_closed_is_inert() {
    let mut run = open_sheet(400.0);
    run.close();
    assert!(run.settle());
    let handle = run.controller().handle();
    assert_eq!(handle.close_with_animation(), CloseRequest::Queued);
    run.frame();
    assert!(!handle.is_closing());
    assert_eq!(run.closes(), 1);
}

#[test]
fn reopen_after_close_works() {
    let mut run = open_sheet(400.0);
    run.close();
    assert!(run.settle());
    run.open_and_settle();
    assert_eq!(run.state(), SheetState::Open);
    run.close();
    assert!(run.settle());
    assert_eq!(run.closes(), 2);
}

#[test]
fn exit_sequences_slide_before_fade() {
    let mut run = open_sheet(400.0);
    run.close();
    let mut slide_done_at = None;
    let mut fade_started_at = None;
    for _ in 0..200 {
        run.frame();
        let f = run.snapshot();
        if slide_done_at.is_none() && f.vertical_offset == 400.0 {
            slide_done_at = Some(run.frames());
        }
        if fade_started_at.is_none() && f.overlay_opacity < 1.0 {
            fade_started_at = Some(run.frames());
        }
        if run.state() == SheetState::Closed {
            break;
        }
    }
    let (Some(slide), Some(fade)) = (slide_done_at, fade_started_at) else {
        panic!("exit never completed");
    };
    assert!(fade >= slide);
}
