#![forbid(unsafe_code)]

//! Imperative close handle.
//!
//! A [`SheetHandle`] lets a caller dismiss the sheet once some action has
//! resolved, without toggling the visibility flag. Requests are queued and
//! applied by the controller on its next event or frame, so they always run
//! on the logic path.
//!
//! # Invariants
//!
//! 1. While a close is requested or in progress, further requests are no-ops.
//! 2. After the controller is unmounted or dropped, requests are rejected.

use std::cell::Cell;
use std::rc::Rc;

/// Result of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    /// The exit animation started.
    Started,
    /// Queued for the controller's next logic-path turn.
    Queued,
    /// A drag is in progress; the close happens on release.
    Deferred,
    /// A close is already requested or running.
    AlreadyClosing,
    /// The sheet is closed; nothing to do.
    NotOpen,
    /// Backdrop dismissal is turned off for this sheet.
    Disabled,
    /// The controller is gone.
    Detached,
}

impl CloseRequest {
    /// Whether this request will lead to a close.
    pub fn accepted(self) -> bool {
        matches!(self, Self::Started | Self::Queued | Self::Deferred)
    }
}

/// State shared between the controller and its handles.
#[derive(Debug)]
pub(crate) struct HandleShared {
    requested: Cell<bool>,
    closing: Cell<bool>,
    mounted: Cell<bool>,
}

impl HandleShared {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            requested: Cell::new(false),
            closing: Cell::new(false),
            mounted: Cell::new(true),
        })
    }

    /// Take a queued request.
    pub(crate) fn take_request(&self) -> bool {
        self.requested.replace(false)
    }

    pub(crate) fn set_closing(&self, closing: bool) {
        self.closing.set(closing);
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.closing.get()
    }

    pub(crate) fn detach(&self) {
        self.mounted.set(false);
        self.requested.set(false);
    }
}

/// Cloneable facade exposing `close_with_animation`.
#[derive(Debug, Clone)]
pub struct SheetHandle {
    shared: Rc<HandleShared>,
}

impl SheetHandle {
    pub(crate) fn new(shared: Rc<HandleShared>) -> Self {
        Self { shared }
    }

    /// Ask the sheet to play its exit animation and close.
    pub fn close_with_animation(&self) -> CloseRequest {
        if !self.shared.mounted.get() {
            return CloseRequest::Detached;
        }
        if self.shared.closing.get() || self.shared.requested.get() {
            return CloseRequest::AlreadyClosing;
        }
        self.shared.requested.set(true);
        CloseRequest::Queued
    }

    /// Whether a close is requested or running.
    pub fn is_closing(&self) -> bool {
        self.shared.closing.get() || self.shared.requested.get()
    }

    /// Whether the controller is still alive.
    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_request_is_noop() {
        let shared = HandleShared::new();
        let handle = SheetHandle::new(Rc::clone(&shared));
        assert_eq!(handle.close_with_animation(), CloseRequest::Queued);
        assert_eq!(handle.close_with_animation(), CloseRequest::AlreadyClosing);
        assert!(handle.is_closing());
        assert!(shared.take_request());
        assert!(!shared.take_request());
    }

    #[test]
    fn clones_share_guard() {
        let shared = HandleShared::new();
        let a = SheetHandle::new(Rc::clone(&shared));
        let b = a.clone();
        assert!(a.close_with_animation().accepted());
        assert!(!b.close_with_animation().accepted());
    }

    #[test]
    fn closing_flag_blocks_requests() {
        let shared = HandleShared::new();
        let handle = SheetHandle::new(Rc::clone(&shared));
        shared.set_closing(true);
        assert_eq!(handle.close_with_animation(), CloseRequest::AlreadyClosing);
        shared.set_closing(false);
        assert_eq!(handle.close_with_animation(), CloseRequest::Queued);
    }

    #[test]
    fn detached_handle_rejects() {
        let shared = HandleShared::new();
        let handle = SheetHandle::new(Rc::clone(&shared));
        shared.detach();
        assert!(!handle.is_mounted());
        assert_eq!(handle.close_with_animation(), CloseRequest::Detached);
    }
}
