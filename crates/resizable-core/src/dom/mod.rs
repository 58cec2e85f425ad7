//! Headless element tree with listener registration and event dispatch.
//!
//! The headless [`ResizeHost`](crate::host::ResizeHost): an arena of element
//! and text nodes with class lists, attributes and a rendered size, plus
//! DOM-style listeners keyed by target and event kind. Native builds and
//! tests drive the resize controller through it.

mod events;
mod listeners;
mod selector;

pub use events::{DomEvent, EventKind, Touch};
pub use listeners::{EventTarget, Listener, ListenerHandle, ListenerId};
pub use selector::{Selector, SelectorError};

use kurbo::Size;
use listeners::ListenerRegistry;
use thiserror::Error;

/// DOM operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Unknown event name: {0}")]
    UnknownEvent(String),
    #[error("Node {0:?} does not exist in this document")]
    NoSuchNode(NodeId),
    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("Node {0:?} cannot receive event listeners")]
    NotAnEventTarget(NodeId),
    #[error("Cannot insert {child:?} under {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("Invalid selector: {0}")]
    InvalidSelector(#[from] SelectorError),
    #[error("Host DOM error: {0}")]
    Host(String),
}

/// Identifier of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a tag name.
    Element { tag: String },
    /// A text node. Text nodes never receive listeners.
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    size: Size,
    style_width: Option<f64>,
    style_height: Option<f64>,
    native_drag_disabled: bool,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: Vec::new(),
            size: Size::ZERO,
            style_width: None,
            style_height: None,
            native_drag_disabled: false,
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

/// A headless document: node arena, root element and listener registry.
///
/// Nodes are never freed; [`Document::detach`] only unlinks them from their
/// parent, so a [`NodeId`] stays valid for the document's lifetime.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    pub(crate) listeners: ListenerRegistry,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing `<html><body></body></html>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            listeners: ListenerRegistry::default(),
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.link(root, body);
        doc.root = root;
        doc.body = body;
        doc
    }

    /// The document element (`<html>`).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0).filter(|n| n.is_element())
    }

    /// Check if the id refers to a node of this document.
    pub fn exists(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Check if the node is an element (and therefore an event target).
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(NodeData::is_element)
    }

    /// Get the node kind.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    /// Get the tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Check if `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Check if the node is attached under the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, id)
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.exists(child) {
            return Err(DomError::NoSuchNode(child));
        }
        if !self.exists(parent) {
            return Err(DomError::NoSuchNode(parent));
        }
        if !self.is_element(parent) || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach(child);
        self.link(parent, child);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Unlink a node from its parent. Returns `true` if it had one.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
        true
    }

    /// Add a class to an element. Returns `true` if it was not already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.element_mut(id) {
            Some(node) if !node.classes.iter().any(|c| c == class) => {
                node.classes.push(class.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove a class from an element. Returns `true` if it was present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(node) = self.element_mut(id) else {
            return false;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        node.classes.len() != before
    }

    /// Check if an element carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Classes of an element, in insertion order.
    pub fn classes(&self, id: NodeId) -> &[String] {
        self.node(id).map(|n| n.classes.as_slice()).unwrap_or(&[])
    }

    /// Set an attribute on an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.element_mut(id) else {
            return;
        };
        match node.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Get an attribute value.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set the `id` attribute.
    pub fn set_id(&mut self, id: NodeId, value: &str) {
        self.set_attribute(id, "id", value);
    }

    /// Set the rendered size of an element (what layout produced).
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        if let Some(node) = self.element_mut(id) {
            node.size = size;
        }
    }

    /// Rendered size of a node (`clientWidth`/`clientHeight`). Zero for text nodes.
    pub fn size(&self, id: NodeId) -> Size {
        self.node(id).map(|n| n.size).unwrap_or(Size::ZERO)
    }

    /// Apply an inline width in pixels. The rendered width follows immediately.
    pub fn set_style_width(&mut self, id: NodeId, width: f64) {
        if let Some(node) = self.element_mut(id) {
            node.style_width = Some(width);
            node.size.width = width;
        }
    }

    /// Apply an inline height in pixels. The rendered height follows immediately.
    pub fn set_style_height(&mut self, id: NodeId, height: f64) {
        if let Some(node) = self.element_mut(id) {
            node.style_height = Some(height);
            node.size.height = height;
        }
    }

    /// Inline width, if one was applied.
    pub fn style_width(&self, id: NodeId) -> Option<f64> {
        self.node(id).and_then(|n| n.style_width)
    }

    /// Inline height, if one was applied.
    pub fn style_height(&self, id: NodeId) -> Option<f64> {
        self.node(id).and_then(|n| n.style_height)
    }

    /// Cancel native drag gestures starting at this element or inside it.
    pub fn disable_native_drag(&mut self, id: NodeId) {
        if let Some(node) = self.element_mut(id) {
            node.native_drag_disabled = true;
        }
    }

    /// Check if native drag was disabled on this element.
    pub fn is_native_drag_disabled(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.native_drag_disabled)
    }

    /// Find the first strict descendant of `scope` matching `selector`, in document order.
    pub fn query_selector(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self.query_parsed(scope, &selector))
    }

    /// Like [`Document::query_selector`] with an already parsed selector.
    pub fn query_parsed(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) && selector.matches(self, id) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        None
    }

    /// Register `listener` on `target` for every event name in a space-separated list.
    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        events: &str,
        listener: impl Fn(&mut Document, &mut DomEvent) + 'static,
    ) -> Result<ListenerHandle, DomError> {
        let kinds = EventKind::parse_list(events)?;
        match target {
            EventTarget::Document => Ok(self.add_document_listener(&kinds, listener)),
            EventTarget::Node(id) => self.add_listener(id, &kinds, listener),
        }
    }

    /// Register `listener` on an element for each of `kinds`.
    pub fn add_listener(
        &mut self,
        id: NodeId,
        kinds: &[EventKind],
        listener: impl Fn(&mut Document, &mut DomEvent) + 'static,
    ) -> Result<ListenerHandle, DomError> {
        if !self.exists(id) {
            return Err(DomError::NoSuchNode(id));
        }
        if !self.is_element(id) {
            return Err(DomError::NotAnEventTarget(id));
        }
        Ok(self.listeners.register(EventTarget::Node(id), kinds, listener))
    }

    /// Register `listener` on the document itself for each of `kinds`.
    pub fn add_document_listener(
        &mut self,
        kinds: &[EventKind],
        listener: impl Fn(&mut Document, &mut DomEvent) + 'static,
    ) -> ListenerHandle {
        self.listeners.register(EventTarget::Document, kinds, listener)
    }

    /// Number of live registrations (one per event kind).
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of live registrations on one target.
    pub fn listener_count_on(&self, target: EventTarget) -> usize {
        self.listeners.count_on(target)
    }

    /// Dispatch an event at a node: the node, then its ancestors, then the
    /// document (when the node is connected). Returns the event after dispatch.
    pub fn dispatch(&mut self, id: NodeId, event: DomEvent) -> DomEvent {
        let mut path = Vec::new();
        let mut current = if self.exists(id) { Some(id) } else { None };
        while let Some(node) = current {
            path.push(EventTarget::Node(node));
            current = self.parent(node);
        }
        if self.is_connected(id) {
            path.push(EventTarget::Document);
        }
        self.dispatch_along(&path, event)
    }

    /// Dispatch an event with the document itself as target.
    pub fn dispatch_to_document(&mut self, event: DomEvent) -> DomEvent {
        self.dispatch_along(&[EventTarget::Document], event)
    }

    fn dispatch_along(&mut self, path: &[EventTarget], mut event: DomEvent) -> DomEvent {
        if event.kind == EventKind::DragStart
            && path.iter().any(|t| match t {
                EventTarget::Node(id) => self.is_native_drag_disabled(*id),
                EventTarget::Document => false,
            })
        {
            event.prevent_default();
        }

        for &target in path {
            for (listener_id, listener) in self.listeners.matching(target, event.kind) {
                // Removed by an earlier listener of this same dispatch.
                if !self.listeners.is_registered(listener_id) {
                    continue;
                }
                listener(self, &mut event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event
    }
}
