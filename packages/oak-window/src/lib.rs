//! Controller for a single toolkit-hosted application window.
//!
//! A [`WindowController`] owns one native window and its content surface. It
//! tags every navigation and reload with a fresh [`SessionId`], republishes
//! the toolkit's native events on its own [`events::EventEmitter`], and obeys
//! control messages on a process-wide [`ControlChannel`] only when they were
//! sent by its own page.
//!
//! The toolkit itself is reached through the traits in [`platform`], bundled
//! in a [`Host`].

pub mod channel;
pub mod error;
pub mod events;
pub mod host;
pub mod intercept;
pub mod logging;
pub mod options;
pub mod platform;
pub mod router;
pub mod session;
mod window;

pub use channel::{ControlChannel, ControlKind, ControlMessage};
pub use error::WindowError;
pub use events::{Event, ListenerId, Location, LocationChange, SessionChange};
pub use host::Host;
pub use intercept::{Dispatch, EventInterceptor, EventOrigin};
pub use options::{ResolvedOptions, ShortcutOptions, WindowOptions};
pub use platform::WindowId;
pub use session::SessionId;
pub use window::{
    ReadyCallback, WindowController, QUIT_ACCELERATOR, RELOAD_ACCELERATOR, SCRIPTS_CHANNEL,
};
