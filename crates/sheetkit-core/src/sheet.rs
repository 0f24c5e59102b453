#![forbid(unsafe_code)]

//! A controller paired with the content it presents.
//!
//! The engine never inspects the content; [`Sheet::view`] hands the renderer
//! the content together with the current frame, and nothing while closed.

use crate::controller::SheetController;
use crate::frame::SheetFrame;

/// Content hosted by a sheet.
#[derive(Debug)]
pub struct Sheet<C> {
    controller: SheetController,
    content: C,
}

/// What to draw for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SheetView<'a, C> {
    pub frame: SheetFrame,
    pub content: &'a C,
}

impl<C> Sheet<C> {
    pub fn new(content: C, controller: SheetController) -> Self {
        Self {
            controller,
            content,
        }
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Swap the hosted content, returning the old one.
    pub fn replace_content(&mut self, content: C) -> C {
        std::mem::replace(&mut self.content, content)
    }

    pub fn controller(&self) -> &SheetController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SheetController {
        &mut self.controller
    }

    /// Frame and content to render, or `None` when nothing is shown.
    pub fn view(&self) -> Option<SheetView<'_, C>> {
        let frame = self.controller.frame();
        frame.visible.then_some(SheetView {
            frame,
            content: &self.content,
        })
    }

    pub fn into_parts(self) -> (SheetController, C) {
        (self.controller, self.content)
    }
}
