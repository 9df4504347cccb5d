use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zengine_rpc::EventHandler;

/// API version sent with `znHttp` calls.
pub const ZENGINE_API_VERSION: &str = "1";

/// How long a host notification stays on screen by default.
pub const DEFAULT_MESSAGE_DURATION: Duration = Duration::from_millis(4000);

/// Style of a host notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Info,
    Saved,
    Warning,
    Error,
}

/// Plugin content size in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropdownSide {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// Options for a host-rendered dropdown.
///
/// `events` maps host event names to handlers; only the names cross the
/// frame boundary.
#[derive(Clone)]
pub struct DropdownOptions {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
    pub width: u32,
    pub height: u32,
    pub side: DropdownSide,
    pub context: Option<Value>,
    pub src: Option<String>,
    pub events: BTreeMap<String, EventHandler>,
    pub extra: Map<String, Value>,
}

impl Default for DropdownOptions {
    fn default() -> Self {
        Self {
            top: 0,
            right: 0,
            bottom: 0,
            left: 0,
            width: 400,
            height: 300,
            side: DropdownSide::Bottom,
            context: None,
            src: None,
            events: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

impl DropdownOptions {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// Register a handler for a host event raised while the dropdown is open.
    pub fn on(mut self, event: impl Into<String>, handler: EventHandler) -> Self {
        self.events.insert(event.into(), handler);
        self
    }

    pub(crate) fn to_wire(&self) -> DropdownWire<'_> {
        DropdownWire {
            top: self.top,
            right: self.right,
            bottom: self.bottom,
            left: self.left,
            width: self.width,
            height: self.height,
            side: self.side,
            context: self.context.as_ref(),
            src: self.src.as_deref(),
            events: self.events.keys().map(String::as_str).collect(),
            extra: &self.extra,
        }
    }
}

impl fmt::Debug for DropdownOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownOptions")
            .field("top", &self.top)
            .field("right", &self.right)
            .field("bottom", &self.bottom)
            .field("left", &self.left)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("side", &self.side)
            .field("context", &self.context)
            .field("src", &self.src)
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .field("extra", &self.extra)
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct DropdownWire<'a> {
    top: i32,
    right: i32,
    bottom: i32,
    left: i32,
    width: u32,
    height: u32,
    side: DropdownSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<&'a str>,
    events: Vec<&'a str>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}
