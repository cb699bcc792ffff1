//! In-memory toolkit used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::channel::ControlChannel;
use crate::host::Host;
use crate::intercept::{Dispatch, EventInterceptor, EventOrigin};
use crate::options::NativeConfig;
use crate::platform::{
    ContentSurface, Display, DisplayProvider, NativeWindow, Rect, ShortcutRegistry, WindowId,
    WindowProvider,
};

/// A call the controller made into the native layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    Show,
    Hide,
    Focus,
    Close,
    LoadUrl(String),
    Reload,
    ReloadIgnoringCache,
    Send(String, Vec<Value>),
    OpenDevTools,
    CloseDevTools,
}

type CallLog = Rc<RefCell<Vec<NativeCall>>>;

pub struct FakeWindow {
    id: WindowId,
    pub config: NativeConfig,
    calls: CallLog,
    focused: Cell<bool>,
    interceptor: RefCell<Option<Rc<dyn EventInterceptor>>>,
    forwarded: RefCell<Vec<(EventOrigin, String, Value)>>,
    contents: Rc<FakeContents>,
}

impl FakeWindow {
    fn new(id: WindowId, config: NativeConfig) -> Self {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        Self {
            id,
            config,
            calls: calls.clone(),
            focused: Cell::new(false),
            interceptor: RefCell::new(None),
            forwarded: RefCell::new(Vec::new()),
            contents: Rc::new(FakeContents {
                calls,
                url: RefCell::new(String::new()),
                redirects: RefCell::new(HashMap::new()),
                devtools: Cell::new(false),
                observer: RefCell::new(None),
            }),
        }
    }

    /// Emit a native event the way the toolkit would: interceptor first, then
    /// the toolkit's own listeners.
    pub fn emit(&self, origin: EventOrigin, name: &str, data: Value) -> Dispatch {
        let interceptor = self.interceptor.borrow().clone();
        let dispatch = match interceptor {
            Some(hook) => hook.intercept(origin, name, &data),
            None => Dispatch::Forward,
        };
        if dispatch == Dispatch::Forward {
            self.forwarded
                .borrow_mut()
                .push((origin, name.to_string(), data));
        }
        dispatch
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Events delivered to the toolkit's own listeners.
    pub fn forwarded(&self) -> Vec<(EventOrigin, String, Value)> {
        self.forwarded.borrow().clone()
    }

    pub fn has_interceptor(&self) -> bool {
        self.interceptor.borrow().is_some()
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.set(focused);
    }

    pub fn fake_contents(&self) -> &FakeContents {
        &self.contents
    }
}

impl NativeWindow for FakeWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn show(&self) {
        self.calls.borrow_mut().push(NativeCall::Show);
    }

    fn hide(&self) {
        self.calls.borrow_mut().push(NativeCall::Hide);
    }

    fn focus(&self) {
        self.calls.borrow_mut().push(NativeCall::Focus);
    }

    fn is_focused(&self) -> bool {
        self.focused.get()
    }

    fn close(&self) {
        self.calls.borrow_mut().push(NativeCall::Close);
    }

    fn contents(&self) -> Rc<dyn ContentSurface> {
        self.contents.clone()
    }

    fn set_interceptor(&self, interceptor: Rc<dyn EventInterceptor>) {
        *self.interceptor.borrow_mut() = Some(interceptor);
    }
}

pub struct FakeContents {
    calls: CallLog,
    url: RefCell<String>,
    redirects: RefCell<HashMap<String, String>>,
    devtools: Cell<bool>,
    observer: RefCell<Option<Rc<dyn Fn(&NativeCall)>>>,
}

impl FakeContents {
    /// Run `observer` inside every content call, after it is logged and
    /// before it takes effect.
    pub fn observe(&self, observer: impl Fn(&NativeCall) + 'static) {
        *self.observer.borrow_mut() = Some(Rc::new(observer));
    }

    fn record(&self, call: NativeCall) {
        self.calls.borrow_mut().push(call.clone());
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            observer(&call);
        }
    }

    /// Make loads of `from` commit `to` instead.
    pub fn redirect(&self, from: &str, to: &str) {
        self.redirects
            .borrow_mut()
            .insert(from.to_string(), to.to_string());
    }
}

impl ContentSurface for FakeContents {
    fn load_url(&self, url: &str) {
        self.record(NativeCall::LoadUrl(url.to_string()));
        let committed = self
            .redirects
            .borrow()
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        *self.url.borrow_mut() = committed;
    }

    fn reload(&self) {
        self.record(NativeCall::Reload);
    }

    fn reload_ignoring_cache(&self) {
        self.record(NativeCall::ReloadIgnoringCache);
    }

    fn url(&self) -> String {
        self.url.borrow().clone()
    }

    fn send(&self, channel: &str, args: &[Value]) {
        self.record(NativeCall::Send(channel.to_string(), args.to_vec()));
    }

    fn is_devtools_opened(&self) -> bool {
        self.devtools.get()
    }

    fn open_devtools(&self) {
        self.devtools.set(true);
        self.record(NativeCall::OpenDevTools);
    }

    fn close_devtools(&self) {
        self.devtools.set(false);
        self.record(NativeCall::CloseDevTools);
    }
}

pub struct FakeProvider {
    next_id: Cell<WindowId>,
    created: RefCell<Vec<Rc<FakeWindow>>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            created: RefCell::new(Vec::new()),
        }
    }

    pub fn last(&self) -> Rc<FakeWindow> {
        let created = self.created.borrow();
        created[created.len() - 1].clone()
    }
}

impl WindowProvider for FakeProvider {
    fn acquire(&self, config: &NativeConfig) -> Rc<dyn NativeWindow> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let window = Rc::new(FakeWindow::new(id, config.clone()));
        self.created.borrow_mut().push(window.clone());
        window
    }
}

pub struct FakeDisplays(pub Vec<Display>);

impl DisplayProvider for FakeDisplays {
    fn displays(&self) -> Vec<Display> {
        self.0.clone()
    }
}

pub struct FakeShortcuts {
    handlers: RefCell<HashMap<String, Rc<dyn Fn()>>>,
}

impl FakeShortcuts {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
        }
    }

    pub fn is_registered(&self, accelerator: &str) -> bool {
        self.handlers.borrow().contains_key(accelerator)
    }

    /// Press the accelerator. Returns `false` when nothing is registered.
    pub fn trigger(&self, accelerator: &str) -> bool {
        let handler = self.handlers.borrow().get(accelerator).cloned();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl ShortcutRegistry for FakeShortcuts {
    fn register(&self, accelerator: &str, handler: Box<dyn Fn()>) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        if handlers.contains_key(accelerator) {
            return false;
        }
        handlers.insert(accelerator.to_string(), Rc::from(handler));
        true
    }

    fn unregister(&self, accelerator: &str) {
        self.handlers.borrow_mut().remove(accelerator);
    }
}

pub fn two_displays() -> Vec<Display> {
    vec![
        Display {
            id: 1,
            work_area: Rect {
                x: 0,
                y: 25,
                width: 1920,
                height: 1055,
            },
        },
        Display {
            id: 2,
            work_area: Rect {
                x: 1920,
                y: 0,
                width: 1280,
                height: 1024,
            },
        },
    ]
}

/// A host backed entirely by fakes, plus handles to inspect them.
pub struct FakeHost {
    pub host: Host,
    pub provider: Rc<FakeProvider>,
    pub shortcuts: Rc<FakeShortcuts>,
    pub channel: ControlChannel,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::with_displays(two_displays())
    }

    pub fn with_displays(displays: Vec<Display>) -> Self {
        let provider = Rc::new(FakeProvider::new());
        let shortcuts = Rc::new(FakeShortcuts::new());
        let channel = ControlChannel::new();
        let host = Host {
            windows: provider.clone(),
            displays: Rc::new(FakeDisplays(displays)),
            shortcuts: shortcuts.clone(),
            channel: channel.clone(),
        };
        Self {
            host,
            provider,
            shortcuts,
            channel,
        }
    }
}
