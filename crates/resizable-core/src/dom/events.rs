//! Pointer and drag events delivered through the document.

use super::DomError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event kinds understood by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    DragStart,
}

impl EventKind {
    /// All kinds, for name lookup.
    pub const ALL: [EventKind; 7] = [
        EventKind::MouseDown,
        EventKind::MouseMove,
        EventKind::MouseUp,
        EventKind::TouchStart,
        EventKind::TouchMove,
        EventKind::TouchEnd,
        EventKind::DragStart,
    ];

    /// DOM event name.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::MouseDown => "mousedown",
            EventKind::MouseMove => "mousemove",
            EventKind::MouseUp => "mouseup",
            EventKind::TouchStart => "touchstart",
            EventKind::TouchMove => "touchmove",
            EventKind::TouchEnd => "touchend",
            EventKind::DragStart => "dragstart",
        }
    }

    /// Check if this is a touch event.
    pub fn is_touch(self) -> bool {
        matches!(self, EventKind::TouchStart | EventKind::TouchMove | EventKind::TouchEnd)
    }

    /// Parse a space-separated list of event names, e.g. `"mousedown touchstart"`.
    pub fn parse_list(names: &str) -> Result<Vec<EventKind>, DomError> {
        names.split_whitespace().map(str::parse::<EventKind>).collect()
    }
}

impl FromStr for EventKind {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DomError::UnknownEvent(s.to_string()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    /// Touch identifier assigned by the platform.
    pub identifier: i64,
    /// Position in client coordinates.
    pub client: Point,
}

impl Touch {
    /// Create a touch point.
    pub fn new(identifier: i64, client: Point) -> Self {
        Self { identifier, client }
    }
}

/// An event travelling through the document.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Pointer position in client coordinates (mouse events).
    pub client: Point,
    /// Touch points still on the event target (touch events).
    pub target_touches: Vec<Touch>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create a mouse event at a client position.
    pub fn mouse(kind: EventKind, client: Point) -> Self {
        Self {
            kind,
            client,
            target_touches: Vec::new(),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create a touch event. `client` mirrors the first touch, if any.
    pub fn touch(kind: EventKind, target_touches: Vec<Touch>) -> Self {
        let client = target_touches.first().map(|t| t.client).unwrap_or(Point::ZERO);
        Self {
            kind,
            client,
            target_touches,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create a native `dragstart` event.
    pub fn drag_start() -> Self {
        Self::mouse(EventKind::DragStart, Point::ZERO)
    }

    /// Suppress the host's default handling.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop the event from reaching further targets.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
