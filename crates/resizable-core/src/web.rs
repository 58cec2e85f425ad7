//! [`ResizeHost`] over the page DOM, for `wasm32` builds.
//!
//! Page elements are adopted into a table and addressed by [`NodeId`] like
//! nodes of the headless document. Native events are converted to
//! [`DomEvent`]s for the listener; `preventDefault`/`stopPropagation` calls
//! made by the listener are mirrored back onto the native event.

use crate::dom::{DomError, DomEvent, EventKind, EventTarget, NodeId, Touch};
use crate::host::ResizeHost;
use crate::options::ConfigError;
use kurbo::{Point, Size};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, HtmlElement, MouseEvent, TouchEvent};

type EventClosure = Closure<dyn Fn(web_sys::Event)>;

struct WebState {
    document: web_sys::Document,
    root: NodeId,
    nodes: Vec<Element>,
    /// Unregistered closures waiting until no callback is running.
    retired: Vec<EventClosure>,
    depth: usize,
}

impl WebState {
    fn adopt(&mut self, element: &Element) -> NodeId {
        match self.nodes.iter().position(|e| e == element) {
            Some(index) => NodeId::from_index(index),
            None => {
                self.nodes.push(element.clone());
                NodeId::from_index(self.nodes.len() - 1)
            }
        }
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.get(node.index()).cloned()
    }
}

/// Handle to the page DOM. Clones share the same element table.
#[derive(Clone)]
pub struct WebHost {
    state: Rc<RefCell<WebState>>,
}

impl fmt::Debug for WebHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("WebHost")
            .field("nodes", &state.nodes.len())
            .field("retired", &state.retired.len())
            .finish()
    }
}

/// A listener registered on a page node or the document.
pub struct WebRegistration {
    target: web_sys::EventTarget,
    kinds: Vec<EventKind>,
    closure: EventClosure,
}

impl fmt::Debug for WebRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebRegistration").field("kinds", &self.kinds).finish()
    }
}

fn host_error(e: JsValue) -> DomError {
    DomError::Host(format!("{:?}", e))
}

impl WebHost {
    /// Host for the current window's document.
    pub fn new() -> Result<Self, DomError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| DomError::Host("No document in this context".to_string()))?;
        Self::for_document(document)
    }

    pub fn for_document(document: web_sys::Document) -> Result<Self, DomError> {
        let root = document
            .document_element()
            .ok_or_else(|| DomError::Host("Document has no root element".to_string()))?;
        Ok(Self {
            state: Rc::new(RefCell::new(WebState {
                document,
                root: NodeId::from_index(0),
                nodes: vec![root],
                retired: Vec::new(),
                depth: 0,
            })),
        })
    }

    /// Id for a page element, e.g. a resize target or an external handle.
    /// Adopting the same element twice returns the same id.
    pub fn adopt(&self, element: &Element) -> NodeId {
        self.state.borrow_mut().adopt(element)
    }

    /// The page element behind an id.
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.state.borrow().element(node)
    }

    fn html_element(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn set_style(&self, node: NodeId, property: &str, pixels: f64) {
        let Some(element) = self.html_element(node) else {
            log::debug!("Cannot style {:?}: not an HTML element", node);
            return;
        };
        if let Err(e) = element.style().set_property(property, &format!("{}px", pixels)) {
            log::warn!("Failed to set {} on {:?}: {:?}", property, node, e);
        }
    }

    fn event_target(&self, target: EventTarget) -> Result<web_sys::EventTarget, DomError> {
        match target {
            EventTarget::Document => Ok(self.state.borrow().document.clone().into()),
            EventTarget::Node(node) => self
                .element(node)
                .map(Into::into)
                .ok_or(DomError::NoSuchNode(node)),
        }
    }

    fn dispatch(
        state: &Weak<RefCell<WebState>>,
        listener: &dyn Fn(&mut WebHost, &mut DomEvent),
        native: &web_sys::Event,
    ) {
        let Some(state) = state.upgrade() else {
            return;
        };
        let Ok(kind) = native.type_().parse::<EventKind>() else {
            return;
        };

        let retired = {
            let mut state = state.borrow_mut();
            state.depth += 1;
            if state.depth == 1 {
                std::mem::take(&mut state.retired)
            } else {
                Vec::new()
            }
        };
        drop(retired);

        let mut event = convert_event(kind, native);
        let mut host = WebHost {
            state: Rc::clone(&state),
        };
        listener(&mut host, &mut event);
        state.borrow_mut().depth -= 1;

        if event.default_prevented() {
            native.prevent_default();
        }
        if event.propagation_stopped() {
            native.stop_propagation();
        }
    }
}

fn convert_event(kind: EventKind, native: &web_sys::Event) -> DomEvent {
    if let Some(touch) = native.dyn_ref::<TouchEvent>() {
        let list = touch.target_touches();
        let touches = (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|t| {
                let client = Point::new(t.client_x() as f64, t.client_y() as f64);
                Touch::new(t.identifier() as i64, client)
            })
            .collect();
        return DomEvent::touch(kind, touches);
    }
    let client = native
        .dyn_ref::<MouseEvent>()
        .map(|m| Point::new(m.client_x() as f64, m.client_y() as f64))
        .unwrap_or(Point::ZERO);
    DomEvent::mouse(kind, client)
}

impl ResizeHost for WebHost {
    type Registration = WebRegistration;

    fn root_element(&self) -> NodeId {
        self.state.borrow().root
    }

    fn check_target(&self, target: NodeId) -> Result<(), ConfigError> {
        match self.element(target) {
            Some(_) => Ok(()),
            None => Err(ConfigError::TargetNotFound(target)),
        }
    }

    fn can_listen(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    fn append_handle(
        &mut self,
        parent: NodeId,
        tag: &str,
        class: &str,
        attribute: &str,
    ) -> Result<NodeId, DomError> {
        let parent = self.element(parent).ok_or(DomError::NoSuchNode(parent))?;
        let element = self
            .state
            .borrow()
            .document
            .create_element(tag)
            .map_err(host_error)?;
        element.class_list().add_1(class).map_err(host_error)?;
        element.set_attribute(attribute, "").map_err(host_error)?;
        parent.append_child(&element).map_err(host_error)?;
        Ok(self.adopt(&element))
    }

    fn find_handle(&mut self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let scope = self.element(scope).ok_or(DomError::NoSuchNode(scope))?;
        let found = scope.query_selector(selector).map_err(host_error)?;
        Ok(found.map(|element| self.adopt(&element)))
    }

    fn remove_element(&mut self, node: NodeId) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        if element.parent_node().is_none() {
            return false;
        }
        element.remove();
        true
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        let list = element.class_list();
        !list.contains(class) && list.add_1(class).is_ok()
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        let list = element.class_list();
        list.contains(class) && list.remove_1(class).is_ok()
    }

    fn client_size(&self, node: NodeId) -> Size {
        self.element(node)
            .map(|e| Size::new(e.client_width() as f64, e.client_height() as f64))
            .unwrap_or(Size::ZERO)
    }

    fn set_width(&mut self, node: NodeId, width: f64) {
        self.set_style(node, "width", width);
    }

    fn set_height(&mut self, node: NodeId, height: f64) {
        self.set_style(node, "height", height);
    }

    fn cancel_native_drag(&mut self, node: NodeId) {
        if let Some(element) = self.html_element(node) {
            let cancel = js_sys::Function::new_no_args("return false;");
            element.set_ondragstart(Some(&cancel));
        }
    }

    fn listen(
        &mut self,
        target: EventTarget,
        kinds: &[EventKind],
        listener: impl Fn(&mut Self, &mut DomEvent) + 'static,
    ) -> Result<WebRegistration, DomError> {
        let native_target = self.event_target(target)?;
        let state = Rc::downgrade(&self.state);
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            WebHost::dispatch(&state, &listener, &event);
        }) as Box<dyn Fn(web_sys::Event)>);

        // Move handlers call preventDefault, so they must not be passive.
        let options = AddEventListenerOptions::new();
        options.set_passive(false);

        let registration = WebRegistration {
            target: native_target,
            kinds: kinds.to_vec(),
            closure,
        };
        for kind in kinds {
            let added = registration
                .target
                .add_event_listener_with_callback_and_add_event_listener_options(
                    kind.name(),
                    registration.closure.as_ref().unchecked_ref(),
                    &options,
                );
            if let Err(e) = added {
                self.unlisten(registration);
                return Err(host_error(e));
            }
        }
        Ok(registration)
    }

    fn unlisten(&mut self, registration: WebRegistration) -> bool {
        let mut removed = false;
        for kind in &registration.kinds {
            removed |= registration
                .target
                .remove_event_listener_with_callback(
                    kind.name(),
                    registration.closure.as_ref().unchecked_ref(),
                )
                .is_ok();
        }

        let mut state = self.state.borrow_mut();
        if state.depth > 0 {
            // Possibly the running closure; drop it once dispatch returns.
            state.retired.push(registration.closure);
        }
        removed
    }
}
