use serde_json::Value;

/// Which native surface emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// The top-level window.
    Instance,
    /// The content surface hosted inside the window.
    Contents,
}

impl EventOrigin {
    /// Log category for events from this surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOrigin::Instance => "instance",
            EventOrigin::Contents => "contents",
        }
    }
}

/// What the native layer should do with an event after interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Deliver the event to the native layer's own listeners.
    Forward,
    /// Drop it; the owning window is gone.
    Skip,
}

/// Hook the native layer runs for every event it emits, before its own
/// listeners.
///
/// Implementations must not assume the event reached any native listener yet.
/// The returned [`Dispatch`] decides whether it will.
pub trait EventInterceptor {
    fn intercept(&self, origin: EventOrigin, name: &str, data: &Value) -> Dispatch;
}

/// Whether `name` is transport-channel plumbing (`ipc-message`,
/// `ipc-message-sync`, ...) rather than a lifecycle or content event.
pub fn is_transport_event(name: &str) -> bool {
    name.contains("ipc")
}
