use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::platform::WindowId;

/// Control message kinds understood by a window controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Republish `(name, data)` on the window's public event stream.
    WindowEvent,
    /// Navigate to a URL.
    Location,
    /// Reload, optionally bypassing the cache.
    Reload,
    /// Toggle the debugging surface.
    Debug,
    Hide,
    Show,
    Focus,
    Close,
    /// The page signals it finished bootstrapping.
    Ready,
}

impl ControlKind {
    pub const ALL: [ControlKind; 9] = [
        ControlKind::WindowEvent,
        ControlKind::Location,
        ControlKind::Reload,
        ControlKind::Debug,
        ControlKind::Hide,
        ControlKind::Show,
        ControlKind::Focus,
        ControlKind::Close,
        ControlKind::Ready,
    ];

    /// Channel name on the wire.
    pub fn channel(&self) -> &'static str {
        match self {
            ControlKind::WindowEvent => "_window",
            ControlKind::Location => "_location",
            ControlKind::Reload => "_reload",
            ControlKind::Debug => "_debug",
            ControlKind::Hide => "_hide",
            ControlKind::Show => "_show",
            ControlKind::Focus => "_focus",
            ControlKind::Close => "_close",
            ControlKind::Ready => "_ready",
        }
    }

    pub fn from_channel(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.channel() == name)
    }
}

/// Envelope of a message on the control channel.
///
/// `sender` is stamped by the transport with the identity of the window whose
/// page sent the message; pages cannot choose it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub kind: String,
    pub sender: WindowId,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl ControlMessage {
    pub fn new(kind: ControlKind, sender: WindowId, args: Vec<Value>) -> Self {
        Self {
            kind: kind.channel().to_string(),
            sender,
            args,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&ControlMessage)>;

struct Subscription {
    id: SubscriptionId,
    kind: String,
    handler: Handler,
}

#[derive(Default)]
struct ChannelInner {
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

/// Publish/subscribe bus shared by every window in the process.
///
/// Every subscriber of a kind sees every message of that kind, whichever
/// window sent it; receivers filter by `sender` themselves. Cloning yields
/// another handle to the same bus.
#[derive(Clone, Default)]
pub struct ControlChannel {
    inner: Rc<ChannelInner>,
}

impl ControlChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&ControlMessage) + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.subscriptions.borrow_mut().push(Subscription {
            id,
            kind: kind.to_string(),
            handler: Rc::new(handler),
        });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.inner.subscriptions.borrow_mut();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    pub fn subscriber_count(&self, kind: &str) -> usize {
        self.inner
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    /// Deliver `message` to every subscriber of its kind. Returns the number
    /// of handlers invoked. Messages of unknown kinds are dropped.
    pub fn publish(&self, message: &ControlMessage) -> usize {
        let handlers: Vec<Handler> = self
            .inner
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == message.kind)
            .map(|s| s.handler.clone())
            .collect();
        for handler in &handlers {
            handler(message);
        }
        handlers.len()
    }

    /// Shorthand for publishing a message of a known kind.
    pub fn send(&self, kind: ControlKind, sender: WindowId, args: Vec<Value>) -> usize {
        self.publish(&ControlMessage::new(kind, sender, args))
    }
}
