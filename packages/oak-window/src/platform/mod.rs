//! Contracts for the windowing toolkit the controller runs on.
//!
//! The controller never creates or renders native surfaces itself. A toolkit
//! binding implements these traits and hands them over through
//! [`crate::Host`]. All calls happen on the toolkit's single event-loop
//! thread, so implementations use interior mutability and take `&self`.
//!
//! Implementations must not deliver native events synchronously from inside
//! one of these calls; events are dispatched from the event loop as discrete
//! callbacks.

#[cfg(test)]
pub(crate) mod mock;

use std::rc::Rc;

use serde_json::Value;

use crate::intercept::EventInterceptor;
use crate::options::NativeConfig;

/// Native window identity. Unique per process for the window's lifetime.
pub type WindowId = u32;

/// Rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A connected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    pub id: u32,
    /// Usable area, excluding menu bars and docks.
    pub work_area: Rect,
}

/// Creates native windows.
pub trait WindowProvider {
    /// Create a window with its content surface. Creation is synchronous.
    fn acquire(&self, config: &NativeConfig) -> Rc<dyn NativeWindow>;
}

/// A top-level native window.
pub trait NativeWindow {
    fn id(&self) -> WindowId;
    fn show(&self);
    fn hide(&self);
    fn focus(&self);
    fn is_focused(&self) -> bool;
    /// Request the window to close. The window reports completion by emitting
    /// `closed` later.
    fn close(&self);
    fn contents(&self) -> Rc<dyn ContentSurface>;
    /// Install the hook run for every event emitted by the window or its
    /// content surface, before the toolkit's own listeners.
    fn set_interceptor(&self, interceptor: Rc<dyn EventInterceptor>);
}

/// The content surface (web view) inside a window.
pub trait ContentSurface {
    fn load_url(&self, url: &str);
    fn reload(&self);
    fn reload_ignoring_cache(&self);
    /// The URL currently committed, after redirects.
    fn url(&self) -> String;
    /// Post a named message with arguments to the page.
    fn send(&self, channel: &str, args: &[Value]);
    fn is_devtools_opened(&self) -> bool;
    fn open_devtools(&self);
    fn close_devtools(&self);
}

/// Enumerates displays.
pub trait DisplayProvider {
    fn displays(&self) -> Vec<Display>;
}

/// Process-wide keyboard accelerator table.
pub trait ShortcutRegistry {
    /// Returns `false` when the accelerator is taken or invalid.
    fn register(&self, accelerator: &str, handler: Box<dyn Fn()>) -> bool;
    fn unregister(&self, accelerator: &str);
}
