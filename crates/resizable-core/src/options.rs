//! Resize configuration: defaults, JSON patches and shallow merging.

use crate::dom::NodeId;
use crate::handles::MovementAxis;
use crate::host::ResizeHost;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Default minimum width in pixels.
pub const DEFAULT_MIN_WIDTH: f64 = 50.0;
/// Default minimum height in pixels.
pub const DEFAULT_MIN_HEIGHT: f64 = 50.0;
/// Default prefix for auto-created handle classes.
pub const DEFAULT_HANDLE_CLASS_PREFIX: &str = "handle";

/// Configuration errors, raised when a controller is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No target element configured")]
    MissingTarget,
    #[error("Target {0:?} does not exist in the document")]
    TargetNotFound(NodeId),
    #[error("Target {0:?} is not an element")]
    TargetNotElement(NodeId),
    #[error("Minimum {axis} must be a positive number, got {value}")]
    InvalidMinimum { axis: &'static str, value: f64 },
    #[error("Invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Compass direction of a handle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All handle slots, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Lowercase name, used in class names and attributes.
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::NorthEast => "northeast",
            Direction::East => "east",
            Direction::SouthEast => "southeast",
            Direction::South => "south",
            Direction::SouthWest => "southwest",
            Direction::West => "west",
            Direction::NorthWest => "northwest",
        }
    }

    /// Position in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The dimension(s) a handle in this slot may change.
    pub fn axis(self) -> MovementAxis {
        match self {
            Direction::North | Direction::South => MovementAxis::Vertical,
            Direction::East | Direction::West => MovementAxis::Horizontal,
            _ => MovementAxis::Both,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a handle slot is configured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "HandleSpecRepr")]
pub enum HandleSpec {
    /// No handle for this slot.
    #[default]
    Disabled,
    /// Create a handle element and append it to the target.
    AutoCreate,
    /// Use the first descendant of the target matching this selector.
    Selector(String),
    /// Use an existing element as-is.
    Element(NodeId),
}

impl HandleSpec {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, HandleSpec::Disabled)
    }
}

/// JSON form: `false`, `true` or a selector string.
#[derive(Deserialize)]
#[serde(untagged)]
enum HandleSpecRepr {
    Flag(bool),
    Selector(String),
}

impl From<HandleSpecRepr> for HandleSpec {
    fn from(repr: HandleSpecRepr) -> Self {
        match repr {
            HandleSpecRepr::Flag(true) => HandleSpec::AutoCreate,
            HandleSpecRepr::Flag(false) => HandleSpec::Disabled,
            HandleSpecRepr::Selector(selector) => HandleSpec::Selector(selector),
        }
    }
}

impl From<bool> for HandleSpec {
    fn from(enabled: bool) -> Self {
        if enabled {
            HandleSpec::AutoCreate
        } else {
            HandleSpec::Disabled
        }
    }
}

impl From<&str> for HandleSpec {
    fn from(selector: &str) -> Self {
        HandleSpec::Selector(selector.to_string())
    }
}

impl From<String> for HandleSpec {
    fn from(selector: String) -> Self {
        HandleSpec::Selector(selector)
    }
}

impl From<NodeId> for HandleSpec {
    fn from(element: NodeId) -> Self {
        HandleSpec::Element(element)
    }
}

/// One [`HandleSpec`] per direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleSlots {
    slots: [HandleSpec; 8],
}

impl Default for HandleSlots {
    /// East, south-east and south handles are auto-created; the rest are off.
    fn default() -> Self {
        let mut slots = Self::none();
        slots.set(Direction::East, HandleSpec::AutoCreate);
        slots.set(Direction::SouthEast, HandleSpec::AutoCreate);
        slots.set(Direction::South, HandleSpec::AutoCreate);
        slots
    }
}

impl HandleSlots {
    /// Every slot disabled.
    pub fn none() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    pub fn get(&self, direction: Direction) -> &HandleSpec {
        &self.slots[direction.index()]
    }

    pub fn set(&mut self, direction: Direction, spec: HandleSpec) {
        self.slots[direction.index()] = spec;
    }

    /// Slots in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &HandleSpec)> {
        Direction::ALL.into_iter().zip(self.slots.iter())
    }

    /// Number of enabled slots.
    pub fn enabled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_enabled()).count()
    }
}

/// Fully resolved resize configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOptions {
    /// Element being resized. Required.
    pub target: Option<NodeId>,
    /// Width floor in pixels.
    pub min_width: f64,
    /// Height floor in pixels.
    pub min_height: f64,
    /// Prefix for auto-created handle classes (`{prefix}-{direction}`).
    pub handle_class_prefix: String,
    /// Handle configuration per direction.
    pub handles: HandleSlots,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            target: None,
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            handle_class_prefix: DEFAULT_HANDLE_CLASS_PREFIX.to_string(),
            handles: HandleSlots::default(),
        }
    }
}

impl ResizeOptions {
    /// Defaults with a target.
    pub fn for_target(target: NodeId) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// Set both minimums.
    pub fn with_min_size(mut self, min_width: f64, min_height: f64) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    /// Configure one handle slot.
    pub fn with_handle(mut self, direction: Direction, spec: impl Into<HandleSpec>) -> Self {
        self.handles.set(direction, spec.into());
        self
    }

    /// Replace every handle slot.
    pub fn with_handles(mut self, handles: HandleSlots) -> Self {
        self.handles = handles;
        self
    }

    /// Set the handle class prefix.
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.handle_class_prefix = prefix.into();
        self
    }

    /// Shallow merge: every field present in `patch` overrides `defaults`.
    /// Handle slots are merged slot by slot. Neither input is modified.
    pub fn merged(defaults: &ResizeOptions, patch: &ResizeOptionsPatch) -> ResizeOptions {
        let mut merged = defaults.clone();
        if let Some(target) = patch.target {
            merged.target = Some(target);
        }
        if let Some(min_width) = patch.min_width {
            merged.min_width = min_width;
        }
        if let Some(min_height) = patch.min_height {
            merged.min_height = min_height;
        }
        if let Some(prefix) = &patch.handle_class_prefix {
            merged.handle_class_prefix = prefix.clone();
        }
        for (&direction, spec) in &patch.handles {
            merged.handles.set(direction, spec.clone());
        }
        merged
    }

    /// Parse a JSON patch and merge it over the defaults.
    pub fn from_json(json: &str) -> Result<ResizeOptions, ConfigError> {
        let patch: ResizeOptionsPatch = serde_json::from_str(json)?;
        Ok(Self::merged(&Self::default(), &patch))
    }

    /// Check the configuration on its own and return the target.
    pub fn validate(&self) -> Result<NodeId, ConfigError> {
        let target = self.target.ok_or(ConfigError::MissingTarget)?;
        for (axis, value) in [("width", self.min_width), ("height", self.min_height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidMinimum { axis, value });
            }
        }
        Ok(target)
    }

    /// Check the configuration against a host document and return the target.
    pub fn validate_in<H: ResizeHost>(&self, host: &H) -> Result<NodeId, ConfigError> {
        let target = self.validate()?;
        host.check_target(target)?;
        Ok(target)
    }
}

/// Caller-supplied overrides; absent fields keep their defaults.
///
/// Deserializes from JSON such as
/// `{"min_width": 80, "handles": {"west": true, "east": false, "south": ".grip"}}`.
/// The target cannot come from JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeOptionsPatch {
    #[serde(skip)]
    pub target: Option<NodeId>,
    #[serde(default)]
    pub min_width: Option<f64>,
    #[serde(default)]
    pub min_height: Option<f64>,
    #[serde(default)]
    pub handle_class_prefix: Option<String>,
    #[serde(default)]
    pub handles: BTreeMap<Direction, HandleSpec>,
}

impl ResizeOptionsPatch {
    /// Set the target.
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }
}
