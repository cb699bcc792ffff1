use std::rc::Rc;

use crate::channel::ControlChannel;
use crate::platform::{DisplayProvider, ShortcutRegistry, WindowProvider};

/// The toolkit services a controller is built on.
///
/// One `Host` is normally shared by every window in the process; `channel` in
/// particular must be the same bus for all of them.
#[derive(Clone)]
pub struct Host {
    pub windows: Rc<dyn WindowProvider>,
    pub displays: Rc<dyn DisplayProvider>,
    pub shortcuts: Rc<dyn ShortcutRegistry>,
    pub channel: ControlChannel,
}

// ── Navigation host restriction ────────────────────────────────

/// Check if `url` may be loaded given a window's `allowed_hosts` patterns.
/// Returns `true` if:
///   - `allowed_hosts` is empty (allow all)
///   - the URL is an internal `about:` URL
///   - the URL's host matches one of the patterns
///
/// Pattern matching (case-insensitive):
///   - Exact: `"example.com"` matches only `example.com`
///   - Wildcard: `"*.example.com"` matches `sub.example.com`,
///     `a.b.example.com`, AND `example.com` itself
pub fn is_host_allowed(allowed_hosts: &[String], url: &str) -> bool {
    if allowed_hosts.is_empty() {
        return true;
    }
    let parsed = match url::Url::parse(url.trim()) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    if parsed.scheme() == "about" {
        return true;
    }
    // Hosts come back lowercased from the parser.
    let host = match parsed.host_str() {
        Some(host) => host,
        None => return false,
    };
    allowed_hosts.iter().any(|pattern| {
        let p = pattern.to_lowercase();
        match p.strip_prefix('*') {
            Some(suffix) => {
                host.ends_with(suffix)
                    || suffix
                        .strip_prefix('.')
                        .map_or(false, |bare| host == bare)
            }
            None => host == p,
        }
    })
}
