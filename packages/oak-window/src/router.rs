use std::rc::Weak;

use serde_json::Value;
use tracing::{debug, warn};

use crate::channel::{ControlChannel, ControlKind, ControlMessage, SubscriptionId};
use crate::error::WindowError;
use crate::platform::WindowId;

/// Operations reachable from the control channel.
pub trait ControlTarget {
    fn emit_event(&self, name: &str, data: Value);
    fn navigate(&self, url: &str);
    fn reload(&self, use_cache: bool);
    fn toggle_debug(&self);
    fn hide(&self);
    fn show(&self);
    fn focus(&self);
    fn close(&self);
    fn ready(&self);
}

/// Whether a message on the shared channel is addressed to `identity`.
pub fn accepts(identity: WindowId, message: &ControlMessage) -> bool {
    message.sender == identity
}

/// Decode `args` for `kind` and invoke the matching operation on `target`.
pub fn dispatch<T: ControlTarget + ?Sized>(
    target: &T,
    kind: ControlKind,
    args: &[Value],
) -> Result<(), WindowError> {
    match kind {
        ControlKind::WindowEvent => {
            let name = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(kind, "expected an event name"))?;
            // Several payload arguments travel together as one array.
            let data = match &args[1..] {
                [] => Value::Null,
                [data] => data.clone(),
                rest => Value::Array(rest.to_vec()),
            };
            target.emit_event(name, data);
        }
        ControlKind::Location => {
            let url = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(kind, "expected a URL string"))?;
            target.navigate(url);
        }
        ControlKind::Reload => {
            let use_cache = match args.first() {
                None | Some(Value::Null) => true,
                Some(Value::Bool(b)) => *b,
                Some(_) => return Err(malformed(kind, "expected a boolean cache flag")),
            };
            target.reload(use_cache);
        }
        ControlKind::Debug => target.toggle_debug(),
        ControlKind::Hide => target.hide(),
        ControlKind::Show => target.show(),
        ControlKind::Focus => target.focus(),
        ControlKind::Close => target.close(),
        ControlKind::Ready => target.ready(),
    }
    Ok(())
}

fn malformed(kind: ControlKind, reason: &str) -> WindowError {
    WindowError::MalformedMessage {
        kind: kind.channel(),
        reason: reason.to_string(),
    }
}

/// One window's subscriptions on the shared control channel.
///
/// Messages from other windows are dropped without a trace; they are
/// expected traffic on a shared bus. Subscriptions end when the router is
/// detached or dropped.
pub struct ControlRouter {
    channel: ControlChannel,
    identity: WindowId,
    subscriptions: Vec<SubscriptionId>,
}

impl ControlRouter {
    /// Subscribe to every [`ControlKind`] on behalf of `target`.
    pub fn attach<T>(channel: &ControlChannel, identity: WindowId, target: Weak<T>) -> Self
    where
        T: ControlTarget + 'static,
    {
        let subscriptions = ControlKind::ALL
            .into_iter()
            .map(|kind| {
                let target = target.clone();
                channel.subscribe(kind.channel(), move |message: &ControlMessage| {
                    if !accepts(identity, message) {
                        return;
                    }
                    let Some(target) = target.upgrade() else {
                        return;
                    };
                    debug!(
                        event = "router.message_accepted",
                        kind = kind.channel(),
                        id = identity
                    );
                    if let Err(e) = dispatch(&*target, kind, &message.args) {
                        warn!(
                            event = "router.message_rejected",
                            id = identity,
                            error = %e,
                            error_code = e.error_code()
                        );
                    }
                })
            })
            .collect();

        Self {
            channel: channel.clone(),
            identity,
            subscriptions,
        }
    }

    pub fn identity(&self) -> WindowId {
        self.identity
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Remove every subscription. Idempotent.
    pub fn detach(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.channel.unsubscribe(id);
        }
    }
}

impl Drop for ControlRouter {
    fn drop(&mut self) {
        self.detach();
    }
}
