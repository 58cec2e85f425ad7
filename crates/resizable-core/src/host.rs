//! The host document a resize controller runs against.
//!
//! [`ResizeHost`] covers the handful of DOM operations the controller needs.
//! [`Document`] implements it headlessly for native builds and tests; on
//! `wasm32` the `web` module implements it over the page DOM.

use crate::dom::{Document, DomError, DomEvent, EventKind, EventTarget, ListenerHandle, NodeId};
use crate::options::ConfigError;
use kurbo::Size;
use std::fmt;

/// DOM operations used by the resize controller.
///
/// Elements are addressed by [`NodeId`]. Listeners receive the host itself
/// so they can mutate the document while an event is being dispatched.
pub trait ResizeHost: fmt::Debug + Sized + 'static {
    /// Removal handle for one [`ResizeHost::listen`] call.
    type Registration: fmt::Debug + 'static;

    /// The document element. It carries the no-user-select class during a drag.
    fn root_element(&self) -> NodeId;

    /// Check that `target` is an element that can be resized.
    fn check_target(&self, target: NodeId) -> Result<(), ConfigError>;

    /// Check if `node` can receive event listeners.
    fn can_listen(&self, node: NodeId) -> bool;

    /// Create a `tag` element with one class and one bare attribute and
    /// append it as the last child of `parent`.
    fn append_handle(
        &mut self,
        parent: NodeId,
        tag: &str,
        class: &str,
        attribute: &str,
    ) -> Result<NodeId, DomError>;

    /// First descendant of `scope` matching a CSS selector.
    fn find_handle(&mut self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError>;

    /// Remove an element from its parent. Returns `true` if it was attached.
    fn remove_element(&mut self, node: NodeId) -> bool;

    /// Add a class. Returns `true` if it was not already present.
    fn add_class(&mut self, node: NodeId, class: &str) -> bool;

    /// Remove a class. Returns `true` if it was present.
    fn remove_class(&mut self, node: NodeId, class: &str) -> bool;

    /// Rendered (client) width and height.
    fn client_size(&self, node: NodeId) -> Size;

    /// Apply an inline width in pixels.
    fn set_width(&mut self, node: NodeId, width: f64);

    /// Apply an inline height in pixels.
    fn set_height(&mut self, node: NodeId, height: f64);

    /// Cancel native `dragstart` gestures on `node`.
    fn cancel_native_drag(&mut self, node: NodeId);

    /// Register `listener` on `target` for every kind in `kinds`.
    fn listen(
        &mut self,
        target: EventTarget,
        kinds: &[EventKind],
        listener: impl Fn(&mut Self, &mut DomEvent) + 'static,
    ) -> Result<Self::Registration, DomError>;

    /// Remove a registration. Returns `true` if anything was still registered.
    fn unlisten(&mut self, registration: Self::Registration) -> bool;
}

impl ResizeHost for Document {
    type Registration = ListenerHandle;

    fn root_element(&self) -> NodeId {
        self.root()
    }

    fn check_target(&self, target: NodeId) -> Result<(), ConfigError> {
        if !self.exists(target) {
            return Err(ConfigError::TargetNotFound(target));
        }
        if !self.is_element(target) {
            return Err(ConfigError::TargetNotElement(target));
        }
        Ok(())
    }

    fn can_listen(&self, node: NodeId) -> bool {
        self.is_element(node)
    }

    fn append_handle(
        &mut self,
        parent: NodeId,
        tag: &str,
        class: &str,
        attribute: &str,
    ) -> Result<NodeId, DomError> {
        let element = self.create_element(tag);
        Document::add_class(self, element, class);
        self.set_attribute(element, attribute, "");
        self.append_child(parent, element)?;
        Ok(element)
    }

    fn find_handle(&mut self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector(scope, selector)?)
    }

    fn remove_element(&mut self, node: NodeId) -> bool {
        self.detach(node)
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        Document::add_class(self, node, class)
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        Document::remove_class(self, node, class)
    }

    fn client_size(&self, node: NodeId) -> Size {
        self.size(node)
    }

    fn set_width(&mut self, node: NodeId, width: f64) {
        self.set_style_width(node, width);
    }

    fn set_height(&mut self, node: NodeId, height: f64) {
        self.set_style_height(node, height);
    }

    fn cancel_native_drag(&mut self, node: NodeId) {
        self.disable_native_drag(node);
    }

    fn listen(
        &mut self,
        target: EventTarget,
        kinds: &[EventKind],
        listener: impl Fn(&mut Self, &mut DomEvent) + 'static,
    ) -> Result<ListenerHandle, DomError> {
        match target {
            EventTarget::Document => Ok(self.add_document_listener(kinds, listener)),
            EventTarget::Node(id) => self.add_listener(id, kinds, listener),
        }
    }

    fn unlisten(&mut self, registration: ListenerHandle) -> bool {
        registration.remove(self)
    }
}
