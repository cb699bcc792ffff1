use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque token identifying one navigation epoch of a window.
///
/// Late-arriving events carry the session they were produced under, so
/// observers can compare tokens to discard results of superseded navigations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Holds the current session of one window.
#[derive(Debug)]
pub struct SessionTracker {
    current: Cell<SessionId>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            current: Cell::new(SessionId::generate()),
        }
    }

    pub fn current(&self) -> SessionId {
        self.current.get()
    }

    /// Replace the current session with a newly generated one and return it.
    pub fn renew(&self) -> SessionId {
        let next = SessionId::generate();
        self.current.set(next);
        next
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
