#![forbid(unsafe_code)]

//! Per-frame snapshot consumed by the renderer.

use crate::state::SheetState;
use crate::step::StepPhase;

/// Everything a renderer needs to draw the sheet for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetFrame {
    pub state: SheetState,
    /// Whether anything should be drawn at all.
    pub visible: bool,
    /// Final container translation: offset minus keyboard lift.
    pub container_translate_y: f64,
    pub vertical_offset: f64,
    pub overlay_opacity: f64,
    pub panel_height: f64,
    pub keyboard_shift: f64,
    /// Step the content should show (lags the host during a transition).
    pub displayed_step: Option<u32>,
    pub total_steps: Option<u32>,
    /// Step indicator fill in `[0, 1]`.
    pub step_progress: Option<f64>,
    pub step_phase: Option<StepPhase>,
}

impl SheetFrame {
    /// Opacity clamped for compositing (springs never drive it, but timed
    /// runs with overshooting curves may).
    pub fn backdrop_alpha(&self) -> f64 {
        if self.visible {
            self.overlay_opacity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Share of the panel currently on screen in `[0, 1]`.
    pub fn presented_fraction(&self) -> f64 {
        if !self.visible || self.panel_height <= 0.0 {
            return 0.0;
        }
        (1.0 - self.vertical_offset / self.panel_height).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(state: SheetState, offset: f64, opacity: f64) -> SheetFrame {
        SheetFrame {
            state,
            visible: state.is_visible(),
            container_translate_y: offset,
            vertical_offset: offset,
            overlay_opacity: opacity,
            panel_height: 400.0,
            keyboard_shift: 0.0,
            displayed_step: None,
            total_steps: None,
            step_progress: None,
            step_phase: None,
        }
    }

    #[test]
    fn hidden_frame_draws_nothing() {
        let f = frame(SheetState::Closed, 400.0, 0.7);
        assert_eq!(f.backdrop_alpha(), 0.0);
        assert_eq!(f.presented_fraction(), 0.0);
    }

    #[test]
    fn presented_fraction_tracks_offset() {
        assert_eq!(frame(SheetState::Open, 0.0, 1.0).presented_fraction(), 1.0);
        assert_eq!(frame(SheetState::Dragging, 100.0, 1.0).presented_fraction(), 0.75);
        assert_eq!(frame(SheetState::Open, 0.0, 1.2).backdrop_alpha(), 1.0);
    }
}
