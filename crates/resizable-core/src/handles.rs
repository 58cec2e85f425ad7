//! Handle definitions and resolution of handle slots to elements.

use crate::dom::{DomError, NodeId};
use crate::host::ResizeHost;
use crate::options::{Direction, HandleSpec};

/// Tag of auto-created handle elements.
pub const HANDLE_TAG: &str = "div";

/// The dimension(s) a handle is allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementAxis {
    /// Width only (east/west edges).
    Horizontal,
    /// Height only (north/south edges).
    Vertical,
    /// Width and height (corners).
    Both,
}

impl MovementAxis {
    pub fn allows_horizontal(self) -> bool {
        matches!(self, MovementAxis::Horizontal | MovementAxis::Both)
    }

    pub fn allows_vertical(self) -> bool {
        matches!(self, MovementAxis::Vertical | MovementAxis::Both)
    }
}

/// A bound handle, as exposed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleInfo {
    /// Slot the handle fills.
    pub direction: Direction,
    /// Element receiving pointer-down events.
    pub element: NodeId,
    /// Dimension(s) the handle changes.
    pub axis: MovementAxis,
    /// Whether the controller created the element itself.
    pub auto_created: bool,
}

/// A handle slot resolved to a concrete element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHandle {
    pub element: NodeId,
    pub auto_created: bool,
}

/// Class given to an auto-created handle: `{prefix}-{direction}`.
pub fn handle_class(prefix: &str, direction: Direction) -> String {
    format!("{}-{}", prefix, direction.name())
}

/// Resolve a handle slot to an element.
///
/// Returns `Ok(None)` when the slot is disabled or cannot be resolved; a
/// selector matching nothing and an element reference that cannot receive
/// listeners both skip the slot without error.
pub fn resolve_handle<H: ResizeHost>(
    host: &mut H,
    target: NodeId,
    direction: Direction,
    spec: &HandleSpec,
    class_prefix: &str,
) -> Result<Option<ResolvedHandle>, DomError> {
    let resolved = match spec {
        HandleSpec::Disabled => None,
        HandleSpec::AutoCreate => {
            let class = handle_class(class_prefix, direction);
            let element = host.append_handle(target, HANDLE_TAG, &class, direction.name())?;
            Some(ResolvedHandle {
                element,
                auto_created: true,
            })
        }
        HandleSpec::Selector(selector) => match host.find_handle(target, selector) {
            Ok(Some(element)) => Some(ResolvedHandle {
                element,
                auto_created: false,
            }),
            Ok(None) => {
                log::debug!(
                    "No element matches {:?} for the {} handle; skipping",
                    selector,
                    direction
                );
                None
            }
            Err(e) => {
                log::warn!("Cannot look up {:?} for the {} handle: {}", selector, direction, e);
                None
            }
        },
        HandleSpec::Element(element) => {
            if host.can_listen(*element) {
                Some(ResolvedHandle {
                    element: *element,
                    auto_created: false,
                })
            } else {
                log::debug!(
                    "{:?} cannot receive listeners; skipping the {} handle",
                    element,
                    direction
                );
                None
            }
        }
    };
    Ok(resolved)
}
