use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::WindowError;
use crate::events::{
    self, Event, EventEmitter, ListenerId, Location, LocationChange, SessionChange,
};
use crate::host::{is_host_allowed, Host};
use crate::intercept::{is_transport_event, Dispatch, EventInterceptor, EventOrigin};
use crate::options::{self, ResolvedOptions, WindowOptions};
use crate::platform::{ContentSurface, NativeWindow, ShortcutRegistry, WindowId};
use crate::router::{ControlRouter, ControlTarget};
use crate::session::{SessionId, SessionTracker};

/// Accelerator that reloads the focused window when `shortcut.reload` is set.
pub const RELOAD_ACCELERATOR: &str = "CommandOrControl+Shift+R";
/// Accelerator that closes the focused window when `shortcut.quit` is set.
pub const QUIT_ACCELERATOR: &str = "CommandOrControl+Shift+X";
/// Content channel carrying the `scripts` payload on every dom-ready.
pub const SCRIPTS_CHANNEL: &str = "_scriptsToInject";

/// Invoked by [`WindowController::ready`], with `None` on success.
pub type ReadyCallback = Box<dyn FnMut(Option<WindowError>)>;

/// Controller for one native window.
///
/// Owns the native window, tracks the navigation session, republishes native
/// events on its own stream and answers control messages sent by its own
/// page. Cloning yields another handle to the same controller; dropping the
/// last handle closes the window.
///
/// Once the native window reports `closed` the controller becomes inert:
/// every operation is a no-op and native events are no longer forwarded.
#[derive(Clone)]
pub struct WindowController {
    inner: Rc<WindowInner>,
}

impl WindowController {
    /// Create the native window and load the configured URL.
    pub fn new(host: &Host, options: WindowOptions) -> Self {
        Self::build(host, options, None)
    }

    /// Like [`WindowController::new`], with a callback run on every `ready()`.
    pub fn with_ready_callback<F>(host: &Host, options: WindowOptions, on_ready: F) -> Self
    where
        F: FnMut(Option<WindowError>) + 'static,
    {
        Self::build(host, options, Some(Box::new(on_ready)))
    }

    fn build(host: &Host, options: WindowOptions, on_ready: Option<ReadyCallback>) -> Self {
        let session = SessionTracker::new();
        let displays = host.displays.displays();
        let options = options::resolve(&options, &displays);

        let native = host.windows.acquire(&options.native_config());
        let id = native.id();
        info!(
            event = "window.created",
            id,
            width = options.width,
            height = options.height,
            display = options.display,
            session = %session.current()
        );

        let inner = Rc::new(WindowInner {
            id,
            events: EventEmitter::new(options.max_listeners),
            options,
            session,
            native: RefCell::new(Some(native.clone())),
            ready_callback: RefCell::new(on_ready),
            router: RefCell::new(None),
            shortcuts: host.shortcuts.clone(),
            registered_shortcuts: RefCell::new(Vec::new()),
        });

        native.set_interceptor(Rc::new(Interception {
            window: Rc::downgrade(&inner),
        }));
        inner.register_shortcuts();
        *inner.router.borrow_mut() = Some(ControlRouter::attach(
            &host.channel,
            id,
            Rc::downgrade(&inner),
        ));
        inner.load(None);

        Self { inner }
    }

    // ---- Accessors ----

    /// Identity used to match control messages, fixed for the window's life.
    pub fn id(&self) -> WindowId {
        self.inner.id
    }

    pub fn session(&self) -> SessionId {
        self.inner.session.current()
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.inner.options
    }

    /// URL currently committed in the content surface.
    pub fn url(&self) -> Option<String> {
        self.inner.contents().map(|c| c.url())
    }

    pub fn is_focused(&self) -> bool {
        self.inner.is_focused()
    }

    /// Whether the native window is gone.
    pub fn is_closed(&self) -> bool {
        self.inner.native().is_none()
    }

    // ---- Event stream ----

    /// Listen for `name` on the public stream (`"*"` for every event).
    pub fn on<F>(&self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        self.inner.events.on(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    /// Publish an event on this window's stream. Returns the number of
    /// listeners notified.
    pub fn emit(&self, name: &str, data: Value) -> usize {
        self.inner.events.emit(name, data)
    }

    // ---- Navigation ----

    /// Load `url`, or the configured URL when `None`. Does not start a new
    /// session.
    pub fn load(&self, url: Option<&str>) -> &Self {
        self.inner.load(url);
        self
    }

    /// Start a new session and navigate to `url`, then emit `location`.
    pub fn navigate(&self, url: &str) -> &Self {
        self.inner.navigate(url);
        self
    }

    /// Start a new session and reload, then emit `reload`.
    pub fn reload(&self, use_cache: bool) -> &Self {
        self.inner.reload(use_cache);
        self
    }

    /// Emit `ready` and run the ready callback.
    pub fn ready(&self) -> &Self {
        self.inner.ready();
        self
    }

    // ---- Content ----

    /// Post a named message to the page.
    pub fn send(&self, name: &str, args: &[Value]) -> Result<&Self, WindowError> {
        self.inner.send(name, args)?;
        Ok(self)
    }

    /// Open the debugging surface, or close it if it is open.
    pub fn toggle_debug(&self) -> &Self {
        self.inner.toggle_debug();
        self
    }

    // ---- Window control ----

    pub fn hide(&self) -> &Self {
        self.inner.hide();
        self
    }

    pub fn show(&self) -> &Self {
        self.inner.show();
        self
    }

    pub fn focus(&self) -> &Self {
        self.inner.focus();
        self
    }

    /// Ask the native window to close. The controller turns inert when the
    /// window reports `closed`.
    pub fn close(&self) -> &Self {
        self.inner.close();
        self
    }
}

// ── Controller state ───────────────────────────────────────────

struct WindowInner {
    id: WindowId,
    options: ResolvedOptions,
    session: SessionTracker,
    events: EventEmitter,
    /// `None` once the native window is destroyed.
    native: RefCell<Option<Rc<dyn NativeWindow>>>,
    ready_callback: RefCell<Option<ReadyCallback>>,
    router: RefCell<Option<ControlRouter>>,
    shortcuts: Rc<dyn ShortcutRegistry>,
    registered_shortcuts: RefCell<Vec<&'static str>>,
}

impl WindowInner {
    /// The native window, if still alive. Never held borrowed across calls
    /// into the native layer.
    fn native(&self) -> Option<Rc<dyn NativeWindow>> {
        self.native.borrow().clone()
    }

    fn contents(&self) -> Option<Rc<dyn ContentSurface>> {
        self.native().map(|n| n.contents())
    }

    fn inert(&self, op: &'static str) {
        debug!(event = "window.inert_call", op, id = self.id);
    }

    fn is_focused(&self) -> bool {
        self.native().map_or(false, |n| n.is_focused())
    }

    /// Refuse `url` if it is outside `allowed_hosts`, emitting
    /// `navigation-blocked`.
    fn permits(&self, url: &str) -> bool {
        if is_host_allowed(&self.options.allowed_hosts, url) {
            return true;
        }
        warn!(event = "window.navigation_blocked", id = self.id, url);
        self.events
            .emit(events::NAVIGATION_BLOCKED, serde_json::json!({ "url": url }));
        false
    }

    fn load(&self, url: Option<&str>) {
        let Some(url) = url.or(self.options.url.as_deref()) else {
            warn!(event = "window.load_skipped", id = self.id, reason = "no url");
            return;
        };
        let Some(contents) = self.contents() else {
            return self.inert("load");
        };
        if !self.permits(url) {
            return;
        }
        debug!(event = "window.load_started", id = self.id, url);
        contents.load_url(url);
    }

    fn navigate(&self, url: &str) {
        let Some(contents) = self.contents() else {
            return self.inert("navigate");
        };
        if !self.permits(url) {
            return;
        }

        let old = Location {
            url: contents.url(),
            session: self.session.current(),
        };
        let session = self.session.renew();
        info!(
            event = "window.navigate_started",
            id = self.id,
            url,
            old_session = %old.session,
            session = %session
        );
        contents.load_url(url);

        let new = Location {
            url: contents.url(),
            session,
        };
        self.events
            .emit(events::LOCATION, payload(&LocationChange { old, new }));
    }

    fn reload(&self, use_cache: bool) {
        let Some(contents) = self.contents() else {
            return self.inert("reload");
        };

        let old = self.session.current();
        let new = self.session.renew();
        info!(
            event = "window.reload_started",
            id = self.id,
            use_cache,
            old_session = %old,
            session = %new
        );
        if use_cache {
            contents.reload();
        } else {
            contents.reload_ignoring_cache();
        }
        self.events
            .emit(events::RELOAD, payload(&SessionChange { old, new }));
    }

    fn ready(&self) {
        info!(event = "window.ready", id = self.id);
        self.events.emit(events::READY, Value::Null);

        // Taken out for the call so the callback may use the controller.
        let callback = self.ready_callback.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback(None);
            let mut slot = self.ready_callback.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }

    fn send(&self, name: &str, args: &[Value]) -> Result<(), WindowError> {
        if name.is_empty() {
            return Err(WindowError::missing_event_name());
        }
        match self.contents() {
            Some(contents) => contents.send(name, args),
            None => self.inert("send"),
        }
        Ok(())
    }

    fn toggle_debug(&self) {
        let Some(contents) = self.contents() else {
            return self.inert("toggle_debug");
        };
        if contents.is_devtools_opened() {
            contents.close_devtools();
        } else {
            contents.open_devtools();
        }
    }

    fn hide(&self) {
        match self.native() {
            Some(native) => native.hide(),
            None => self.inert("hide"),
        }
    }

    fn show(&self) {
        match self.native() {
            Some(native) => native.show(),
            None => self.inert("show"),
        }
    }

    fn focus(&self) {
        match self.native() {
            Some(native) => native.focus(),
            None => self.inert("focus"),
        }
    }

    fn close(&self) {
        match self.native() {
            Some(native) => native.close(),
            None => self.inert("close"),
        }
    }

    // ---- Native events ----

    /// Republish, log, run the controller's own handling, then tell the
    /// native layer whether to deliver the event to its listeners.
    fn on_native_event(&self, origin: EventOrigin, name: &str, data: &Value) -> Dispatch {
        let attached = self.native.borrow().is_some();

        if !is_transport_event(name) {
            self.events.emit(name, data.clone());
        }
        debug!(
            event = "window.native_event",
            category = origin.as_str(),
            name,
            data = %data,
            id = self.id
        );

        if !attached {
            return Dispatch::Skip;
        }
        match (origin, name) {
            (EventOrigin::Instance, events::CLOSED) => self.teardown(),
            (EventOrigin::Instance, events::READY_TO_SHOW) if self.options.debugger => {
                self.toggle_debug()
            }
            (EventOrigin::Contents, events::DOM_READY) => self.deliver_scripts(),
            _ => {}
        }
        Dispatch::Forward
    }

    fn deliver_scripts(&self) {
        let scripts = payload(&self.options.scripts);
        // Neither name is empty, so these cannot fail.
        let _ = self.send(SCRIPTS_CHANNEL, &[scripts]);
        let _ = self.send(events::DOM_READY, &[]);
    }

    /// Drop the native window and every process-wide registration.
    fn teardown(&self) {
        if self.native.borrow_mut().take().is_none() {
            return;
        }
        let router = self.router.borrow_mut().take();
        drop(router);
        self.unregister_shortcuts();
        info!(event = "window.closed", id = self.id, session = %self.session.current());
    }

    // ---- Shortcuts ----

    fn register_shortcuts(self: &Rc<Self>) {
        let shortcut = self.options.shortcut;
        if shortcut.reload {
            self.register_shortcut(RELOAD_ACCELERATOR, |w| w.reload(true));
        }
        if shortcut.quit {
            self.register_shortcut(QUIT_ACCELERATOR, |w| w.close());
        }
    }

    fn register_shortcut(self: &Rc<Self>, accelerator: &'static str, action: fn(&WindowInner)) {
        let window = Rc::downgrade(self);
        let handler = move || {
            if let Some(window) = window.upgrade() {
                // Only the focused window reacts to a global accelerator.
                if window.is_focused() {
                    action(&window);
                }
            }
        };
        if self.shortcuts.register(accelerator, Box::new(handler)) {
            self.registered_shortcuts.borrow_mut().push(accelerator);
        } else {
            warn!(event = "window.shortcut_register_failed", id = self.id, accelerator);
        }
    }

    fn unregister_shortcuts(&self) {
        let accelerators = std::mem::take(&mut *self.registered_shortcuts.borrow_mut());
        for accelerator in accelerators {
            self.shortcuts.unregister(accelerator);
        }
    }
}

impl ControlTarget for WindowInner {
    fn emit_event(&self, name: &str, data: Value) {
        self.events.emit(name, data);
    }

    fn navigate(&self, url: &str) {
        WindowInner::navigate(self, url);
    }

    fn reload(&self, use_cache: bool) {
        WindowInner::reload(self, use_cache);
    }

    fn toggle_debug(&self) {
        WindowInner::toggle_debug(self);
    }

    fn hide(&self) {
        WindowInner::hide(self);
    }

    fn show(&self) {
        WindowInner::show(self);
    }

    fn focus(&self) {
        WindowInner::focus(self);
    }

    fn close(&self) {
        WindowInner::close(self);
    }

    fn ready(&self) {
        WindowInner::ready(self);
    }
}

/// Closes a still-open window when the last controller handle goes away.
impl Drop for WindowInner {
    fn drop(&mut self) {
        if let Some(native) = self.native.get_mut().take() {
            native.close();
        }
        self.unregister_shortcuts();
    }
}

/// Interceptor installed on the native window. Holds the controller weakly so
/// the native layer never keeps it alive.
struct Interception {
    window: Weak<WindowInner>,
}

impl EventInterceptor for Interception {
    fn intercept(&self, origin: EventOrigin, name: &str, data: &Value) -> Dispatch {
        match self.window.upgrade() {
            Some(window) => window.on_native_event(origin, name, data),
            None => Dispatch::Forward,
        }
    }
}

fn payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
