use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::WindowError;
use crate::platform::Display;

pub const DEFAULT_TITLE: &str = "OAK";
pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 768;
pub const DEFAULT_BACKGROUND: &str = "#000000";
/// Soft cap on public-stream listeners before a warning is logged.
pub const DEFAULT_MAX_LISTENERS: usize = 500;

/// Caller-supplied window options. Every field is optional; unset fields take
/// the defaults documented on [`ResolvedOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowOptions {
    /// URL loaded at construction and by `load()` without an argument.
    pub url: Option<String>,
    /// Window title. Default: "OAK"
    pub title: Option<String>,
    /// User agent applied by the provider. Default: "Oak/<version>"
    pub user_agent: Option<String>,
    /// Window icon path.
    pub icon: Option<PathBuf>,
    /// Preload script path for the content surface.
    pub preload: Option<PathBuf>,
    /// "WIDTHxHEIGHT". Overrides width/height and turns fullscreen and kiosk off.
    pub size: Option<String>,
    /// Index of the target display. Out-of-range indexes fall back to 0.
    pub display: Option<usize>,
    /// Inner width. Default: 1024
    pub width: Option<u32>,
    /// Inner height. Default: 768
    pub height: Option<u32>,
    /// X position in screen coordinates. Default: 0
    pub x: Option<i32>,
    /// Y position in screen coordinates. Default: 0
    pub y: Option<i32>,
    /// Background color. Default: "#000000"
    pub background: Option<String>,
    /// Size the window to the display work area. Default: true
    pub fullscreen: Option<bool>,
    /// Default: true
    pub kiosk: Option<bool>,
    /// Always on top. Default: true
    pub ontop: Option<bool>,
    /// Show window decorations. Default: false
    pub frame: Option<bool>,
    /// Initially visible. Default: true
    pub show: Option<bool>,
    /// Node integration in the content surface. Default: false
    pub node: Option<bool>,
    /// Disable web security and allow insecure content. Default: false
    pub insecure: Option<bool>,
    /// Open the debugging surface once the window is ready to show. Default: false
    pub debugger: Option<bool>,
    /// Default: true
    pub enable_larger_than_screen: Option<bool>,
    pub shortcut: Option<ShortcutOptions>,
    /// Script payloads pushed to the content surface on every dom-ready.
    pub scripts: Option<Vec<String>>,
    /// Default: 500
    pub max_listeners: Option<usize>,
    /// Host patterns navigation is restricted to (`example.com`,
    /// `*.example.com`). Empty or unset allows every host.
    pub allowed_hosts: Option<Vec<String>>,
}

impl WindowOptions {
    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, WindowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse options from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, WindowError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Global accelerators that act on the window while it has focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutOptions {
    pub reload: bool,
    pub quit: bool,
}

/// Fully-populated options, fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub url: Option<String>,
    pub title: String,
    pub user_agent: String,
    pub icon: Option<PathBuf>,
    pub preload: Option<PathBuf>,
    /// Resolved display index (always valid when displays exist).
    pub display: usize,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub background: String,
    pub fullscreen: bool,
    pub kiosk: bool,
    pub ontop: bool,
    pub frame: bool,
    pub show: bool,
    pub node: bool,
    pub insecure: bool,
    pub debugger: bool,
    pub enable_larger_than_screen: bool,
    pub shortcut: ShortcutOptions,
    pub scripts: Vec<String>,
    pub max_listeners: usize,
    pub allowed_hosts: Vec<String>,
}

impl ResolvedOptions {
    /// Settings handed to the window provider at acquisition.
    pub fn native_config(&self) -> NativeConfig {
        NativeConfig {
            title: self.title.clone(),
            icon: self.icon.clone(),
            user_agent: self.user_agent.clone(),
            width: self.width,
            height: self.height,
            x: self.x,
            y: self.y,
            has_shadow: false,
            always_on_top: self.ontop,
            background_color: self.background.clone(),
            frame: self.frame,
            kiosk: self.kiosk,
            show: self.show,
            enable_larger_than_screen: self.enable_larger_than_screen,
            web_preferences: WebPreferences {
                node_integration: self.node,
                node_integration_in_worker: self.node,
                web_security: !self.insecure,
                allow_running_insecure_content: self.insecure,
                devtools: true,
                preload: self.preload.clone(),
            },
        }
    }
}

/// Window construction settings passed to [`crate::platform::WindowProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct NativeConfig {
    pub title: String,
    pub icon: Option<PathBuf>,
    pub user_agent: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub has_shadow: bool,
    pub always_on_top: bool,
    pub background_color: String,
    pub frame: bool,
    pub kiosk: bool,
    pub show: bool,
    pub enable_larger_than_screen: bool,
    pub web_preferences: WebPreferences,
}

/// Security-relevant settings of the content surface.
#[derive(Debug, Clone, PartialEq)]
pub struct WebPreferences {
    pub node_integration: bool,
    pub node_integration_in_worker: bool,
    pub web_security: bool,
    pub allow_running_insecure_content: bool,
    pub devtools: bool,
    pub preload: Option<PathBuf>,
}

pub fn default_user_agent() -> String {
    format!("Oak/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a "WIDTHxHEIGHT" string such as `"800x600"`.
pub fn parse_size(value: &str) -> Result<(u32, u32), WindowError> {
    let invalid = || WindowError::InvalidSize {
        value: value.to_string(),
    };
    let (w, h) = value
        .trim()
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

/// Merge caller options over the defaults.
///
/// Never fails: a malformed `size` is ignored, an out-of-range `display`
/// falls back to display 0, and with no displays at all fullscreen keeps the
/// configured dimensions.
pub fn resolve(options: &WindowOptions, displays: &[Display]) -> ResolvedOptions {
    let mut fullscreen = options.fullscreen.unwrap_or(true);
    let mut kiosk = options.kiosk.unwrap_or(true);
    let mut width = options.width.unwrap_or(DEFAULT_WIDTH);
    let mut height = options.height.unwrap_or(DEFAULT_HEIGHT);

    if let Some(ref size) = options.size {
        match parse_size(size) {
            Ok((w, h)) => {
                width = w;
                height = h;
                fullscreen = false;
                kiosk = false;
            }
            Err(e) => {
                warn!(event = "options.size_ignored", size = %size, error = %e);
            }
        }
    }

    let requested = options.display.unwrap_or(0);
    let display = if requested < displays.len() {
        requested
    } else {
        if !displays.is_empty() {
            warn!(
                event = "options.display_out_of_range",
                requested,
                available = displays.len()
            );
        }
        0
    };

    if fullscreen {
        match displays.get(display) {
            Some(d) => {
                width = d.work_area.width;
                height = d.work_area.height;
            }
            None => warn!(event = "options.no_displays", width, height),
        }
    }

    ResolvedOptions {
        url: options.url.clone(),
        title: options
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        user_agent: options
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent),
        icon: options.icon.clone(),
        preload: options.preload.clone(),
        display,
        width,
        height,
        x: options.x.unwrap_or(0),
        y: options.y.unwrap_or(0),
        background: options
            .background
            .clone()
            .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
        fullscreen,
        kiosk,
        ontop: options.ontop.unwrap_or(true),
        frame: options.frame.unwrap_or(false),
        show: options.show.unwrap_or(true),
        node: options.node.unwrap_or(false),
        insecure: options.insecure.unwrap_or(false),
        debugger: options.debugger.unwrap_or(false),
        enable_larger_than_screen: options.enable_larger_than_screen.unwrap_or(true),
        shortcut: options.shortcut.unwrap_or_default(),
        scripts: options.scripts.clone().unwrap_or_default(),
        max_listeners: options.max_listeners.unwrap_or(DEFAULT_MAX_LISTENERS),
        allowed_hosts: options.allowed_hosts.clone().unwrap_or_default(),
    }
}
