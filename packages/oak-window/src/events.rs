use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::session::SessionId;

// ── Event names ────────────────────────────────────────────────

/// Emitted after `navigate()`, payload [`LocationChange`].
pub const LOCATION: &str = "location";
/// Emitted after `reload()`, payload [`SessionChange`].
pub const RELOAD: &str = "reload";
pub const READY: &str = "ready";
/// Emitted when a navigation target is outside `allowed_hosts`, payload `{url}`.
pub const NAVIGATION_BLOCKED: &str = "navigation-blocked";

pub const CLOSED: &str = "closed";
pub const READY_TO_SHOW: &str = "ready-to-show";
pub const DOM_READY: &str = "dom-ready";
pub const UNRESPONSIVE: &str = "unresponsive";
pub const RESPONSIVE: &str = "responsive";
pub const CRASHED: &str = "crashed";

/// Listening on this name receives every event.
pub const WILDCARD: &str = "*";

// ── Payloads ───────────────────────────────────────────────────

/// An event on a controller's public stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub data: Value,
}

impl Event {
    /// Decode the payload into one of the typed event structs.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

/// Where a window was, and under which session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub url: String,
    pub session: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChange {
    pub old: Location,
    pub new: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionChange {
    pub old: SessionId,
    pub new: SessionId,
}

// ── Emitter ────────────────────────────────────────────────────

/// Handle returned by [`EventEmitter::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Event)>;

struct Registration {
    id: ListenerId,
    name: String,
    listener: Listener,
}

/// Named-event fan-out for one controller.
///
/// Listeners may call back into the controller (and emit further events)
/// while being notified; the registration table is never borrowed during a
/// callback. Nested emits are delivered immediately, including to the
/// listener whose callback caused them, so a listener that unconditionally
/// re-emits its own event recurses.
pub struct EventEmitter {
    registrations: RefCell<Vec<Registration>>,
    next_id: Cell<u64>,
    max_listeners: usize,
}

impl EventEmitter {
    pub fn new(max_listeners: usize) -> Self {
        Self {
            registrations: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            max_listeners,
        }
    }

    /// Register `listener` for `name` (or [`WILDCARD`]).
    ///
    /// Going past the listener cap only logs a warning; the listener is
    /// still added.
    pub fn on<F>(&self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let mut registrations = self.registrations.borrow_mut();
        if registrations.len() == self.max_listeners {
            warn!(
                event = "events.listener_limit_exceeded",
                limit = self.max_listeners,
                "possible listener leak"
            );
        }
        registrations.push(Registration {
            id,
            name: name.into(),
            listener: Rc::new(listener),
        });
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.borrow_mut();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    /// Number of listeners registered for exactly `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| r.name == name)
            .count()
    }

    /// Notify every listener of `name` and every wildcard listener, in
    /// registration order. Returns how many were notified.
    pub fn emit(&self, name: &str, data: Value) -> usize {
        let targets: Vec<Listener> = self
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.name == name || r.name == WILDCARD)
            .map(|r| r.listener.clone())
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let event = Event {
            name: name.to_string(),
            data,
        };
        for listener in &targets {
            listener(&event);
        }
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(emitter: &EventEmitter, name: &str) -> Rc<RefCell<Vec<Event>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        emitter.on(name, move |e: &Event| sink.borrow_mut().push(e.clone()));
        seen
    }

    #[test]
    fn test_emit_reaches_named_listener_only() {
        let emitter = EventEmitter::new(10);
        let ready = recorder(&emitter, READY);
        let closed = recorder(&emitter, CLOSED);

        assert_eq!(emitter.emit(READY, json!({"ok": true})), 1);

        assert_eq!(ready.borrow().len(), 1);
        assert_eq!(ready.borrow()[0].data, json!({"ok": true}));
        assert!(closed.borrow().is_empty());
    }

    #[test]
    fn test_wildcard_sees_everything() {
        let emitter = EventEmitter::new(10);
        let all = recorder(&emitter, WILDCARD);
        emitter.emit("a", Value::Null);
        emitter.emit("b", json!(1));
        let names: Vec<String> = all.borrow().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_off_removes_listener() {
        let emitter = EventEmitter::new(10);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = emitter.on(READY, move |_: &Event| c.set(c.get() + 1));
        emitter.emit(READY, Value::Null);
        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        emitter.emit(READY, Value::Null);
        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listener_count(READY), 0);
    }

    #[test]
    fn test_listener_may_register_and_emit_during_callback() {
        let emitter = Rc::new(EventEmitter::new(10));
        let inner = emitter.clone();
        let nested = Rc::new(Cell::new(0));
        let n = nested.clone();
        emitter.on("outer", move |_: &Event| {
            let n = n.clone();
            inner.on("inner", move |_: &Event| n.set(n.get() + 1));
            inner.emit("inner", Value::Null);
        });
        emitter.emit("outer", Value::Null);
        assert_eq!(nested.get(), 1);
    }

    #[test]
    fn test_nested_emit_reaches_running_listener() {
        let emitter = Rc::new(EventEmitter::new(10));
        let inner = emitter.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        emitter.on(WILDCARD, move |e: &Event| {
            sink.borrow_mut().push(e.name.clone());
            if e.name == CRASHED {
                inner.emit(RELOAD, Value::Null);
            }
        });
        emitter.emit(CRASHED, Value::Null);
        assert_eq!(*seen.borrow(), vec![CRASHED, RELOAD]);
    }

    #[test]
    fn test_listener_cap_is_soft() {
        let emitter = EventEmitter::new(1);
        emitter.on(READY, |_: &Event| {});
        emitter.on(READY, |_: &Event| {});
        assert_eq!(emitter.emit(READY, Value::Null), 2);
    }

    #[test]
    fn test_typed_payload() {
        let change = SessionChange {
            old: SessionId::generate(),
            new: SessionId::generate(),
        };
        let event = Event {
            name: RELOAD.to_string(),
            data: serde_json::to_value(change).unwrap(),
        };
        assert_eq!(event.payload::<SessionChange>().unwrap(), change);
    }
}
