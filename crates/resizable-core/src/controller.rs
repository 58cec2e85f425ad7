//! Resize controller: binds handles to a target element and runs the drag
//! state machine that turns pointer movement into width/height changes.
//!
//! ## Gesture
//!
//! 1) Pointer-down (`mousedown`/`touchstart`) on a handle records the target's
//!    size and the pointer position, registers document-level move and up
//!    listeners and emits [`ResizeEvent::ResizeStart`].
//! 2) Every move (`mousemove`/`touchmove`) applies
//!    `baseline + (pointer - origin)` on the axes the handle allows, skipping
//!    any axis that would fall below its minimum, emits [`ResizeEvent::Resize`]
//!    if something changed, and suppresses the host's default handling.
//! 3) Pointer-up (`mouseup`/`touchend`) anywhere in the document removes the
//!    move and up listeners and emits [`ResizeEvent::ResizeEnd`].
//!
//! Listeners hold only weak references to the controller. If it is dropped
//! without [`ResizeController::destroy`], the next event reaching one of its
//! listeners unregisters that listener (and an open session's document
//! listeners and root class) instead of resizing anything.

use crate::dom::{Document, DomError, DomEvent, EventKind, EventTarget, NodeId};
use crate::emitter::{EventEmitter, ResizeEvent, SubscriptionId};
use crate::handles::{HandleInfo, resolve_handle};
use crate::host::ResizeHost;
use crate::lifecycle::Lifecycle;
use crate::options::{ConfigError, Direction, HandleSpec, ResizeOptions};
use crate::session::{DragSession, pointer_position};
use kurbo::Size;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Class carried by the document root while a drag session is open.
pub const NO_USER_SELECT_CLASS: &str = "resizable--no-user-select";

const POINTER_DOWN: [EventKind; 2] = [EventKind::MouseDown, EventKind::TouchStart];
const POINTER_MOVE: [EventKind; 2] = [EventKind::MouseMove, EventKind::TouchMove];
const POINTER_UP: [EventKind; 2] = [EventKind::MouseUp, EventKind::TouchEnd];

/// Resize controller errors.
#[derive(Debug, Error)]
pub enum ResizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("The {0} handle is already bound")]
    HandleAlreadyBound(Direction),
}

/// A registration shared between its owner and its own listener, so
/// whichever runs first can remove it.
type SharedRegistration<H> = Rc<RefCell<Option<<H as ResizeHost>::Registration>>>;

#[derive(Debug)]
struct HandleBinding<H: ResizeHost> {
    info: HandleInfo,
    pointer_down: SharedRegistration<H>,
}

#[derive(Debug)]
struct SessionListeners<H: ResizeHost> {
    move_listener: H::Registration,
    up_listener: H::Registration,
}

type SharedSession<H> = Rc<RefCell<Option<SessionListeners<H>>>>;

#[derive(Debug)]
struct ActiveSession<H: ResizeHost> {
    session: DragSession,
    listeners: SharedSession<H>,
}

#[derive(Debug)]
struct ControllerState<H: ResizeHost> {
    target: NodeId,
    options: ResizeOptions,
    bindings: Vec<HandleBinding<H>>,
    active: Option<ActiveSession<H>>,
    destroyed: bool,
}

impl<H: ResizeHost> ControllerState<H> {
    fn min_size(&self) -> Size {
        Size::new(self.options.min_width, self.options.min_height)
    }
}

type SharedState<H> = Rc<RefCell<ControllerState<H>>>;
type SharedEvents = Rc<EventEmitter<ResizeEvent>>;

/// Makes an element resizable by dragging handles on its edges and corners.
///
/// Generic over the host document; the headless [`Document`] is the default.
#[derive(Debug)]
pub struct ResizeController<H: ResizeHost = Document> {
    state: SharedState<H>,
    events: SharedEvents,
    lifecycle: Lifecycle<H>,
}

impl<H: ResizeHost> ResizeController<H> {
    /// Validate `options`, disable native dragging on the target, then
    /// resolve and bind every configured handle slot.
    ///
    /// If binding fails part way, everything bound so far is torn down.
    pub fn new(host: &mut H, options: ResizeOptions) -> Result<Self, ResizeError> {
        let target = options.validate_in(host)?;
        host.cancel_native_drag(target);

        let slots = options.handles.clone();
        let mut controller = Self {
            state: Rc::new(RefCell::new(ControllerState {
                target,
                options,
                bindings: Vec::new(),
                active: None,
                destroyed: false,
            })),
            events: Rc::new(EventEmitter::new()),
            lifecycle: Lifecycle::new(),
        };

        let state = Rc::clone(&controller.state);
        let events = Rc::clone(&controller.events);
        controller
            .lifecycle
            .on_destroy(move |host: &mut H| teardown(host, &state, &events));

        for (direction, spec) in slots.iter() {
            if let Err(e) = controller.attach(host, direction, spec) {
                log::warn!("Binding the {} handle failed: {}", direction, e);
                controller.lifecycle.destroy(host);
                return Err(e);
            }
        }

        log::debug!(
            "Resize controller on {:?} bound {} of {} enabled handle(s)",
            target,
            controller.state.borrow().bindings.len(),
            slots.enabled_count()
        );
        Ok(controller)
    }

    /// Bind a handle to a slot that is not bound yet.
    ///
    /// Runs the same resolution as construction: returns the handle element,
    /// or `None` if `spec` is [`HandleSpec::Disabled`] or cannot be resolved.
    /// A slot that already has a handle keeps it. Inert after
    /// [`ResizeController::destroy`].
    pub fn bind_handle(
        &mut self,
        host: &mut H,
        direction: Direction,
        spec: impl Into<HandleSpec>,
    ) -> Result<Option<NodeId>, ResizeError> {
        let spec = spec.into();
        {
            let state = self.state.borrow();
            if state.destroyed {
                log::debug!("Ignoring bind of the {} handle after teardown", direction);
                return Ok(None);
            }
            if state.bindings.iter().any(|b| b.info.direction == direction) {
                return Err(ResizeError::HandleAlreadyBound(direction));
            }
        }

        let element = self.attach(host, direction, &spec)?;
        if element.is_some() {
            self.state.borrow_mut().options.handles.set(direction, spec);
        }
        Ok(element)
    }

    fn attach(
        &mut self,
        host: &mut H,
        direction: Direction,
        spec: &HandleSpec,
    ) -> Result<Option<NodeId>, ResizeError> {
        let (target, prefix) = {
            let state = self.state.borrow();
            (state.target, state.options.handle_class_prefix.clone())
        };
        let Some(resolved) = resolve_handle(host, target, direction, spec, &prefix)? else {
            return Ok(None);
        };

        let pointer_down: SharedRegistration<H> = Rc::new(RefCell::new(None));
        let registration = {
            let state = Rc::downgrade(&self.state);
            let events = Rc::downgrade(&self.events);
            let own = Rc::clone(&pointer_down);
            let element = EventTarget::Node(resolved.element);
            host.listen(element, &POINTER_DOWN, move |host: &mut H, event: &mut DomEvent| {
                let (Some(state), Some(events)) = (state.upgrade(), events.upgrade()) else {
                    release(host, &own);
                    return;
                };
                if start_session(host, &state, &events, direction, event) {
                    events.emit(&ResizeEvent::ResizeStart);
                }
            })
        };
        let registration = match registration {
            Ok(registration) => registration,
            Err(e) => {
                if resolved.auto_created {
                    host.remove_element(resolved.element);
                }
                return Err(e.into());
            }
        };
        *pointer_down.borrow_mut() = Some(registration);

        self.state.borrow_mut().bindings.push(HandleBinding {
            info: HandleInfo {
                direction,
                element: resolved.element,
                axis: direction.axis(),
                auto_created: resolved.auto_created,
            },
            pointer_down,
        });
        Ok(Some(resolved.element))
    }

    /// The element being resized.
    pub fn target(&self) -> NodeId {
        self.state.borrow().target
    }

    /// Effective options, including handles bound after construction.
    pub fn options(&self) -> ResizeOptions {
        self.state.borrow().options.clone()
    }

    /// Bound handles in binding order. Empty after teardown.
    pub fn handles(&self) -> Vec<HandleInfo> {
        self.state.borrow().bindings.iter().map(|b| b.info).collect()
    }

    /// The handle bound to a slot, if any.
    pub fn handle(&self, direction: Direction) -> Option<HandleInfo> {
        self.state
            .borrow()
            .bindings
            .iter()
            .find(|b| b.info.direction == direction)
            .map(|b| b.info)
    }

    /// Check if a drag session is open.
    pub fn is_resizing(&self) -> bool {
        self.state.borrow().active.is_some()
    }

    /// The open drag session, if any.
    pub fn session(&self) -> Option<DragSession> {
        self.state.borrow().active.as_ref().map(|a| a.session.clone())
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.is_destroyed()
    }

    /// Subscribe to every lifecycle signal.
    pub fn on_event(&self, callback: impl Fn(ResizeEvent) + 'static) -> SubscriptionId {
        self.events.on(move |event: &ResizeEvent| callback(*event))
    }

    /// Subscribe to [`ResizeEvent::ResizeStart`].
    pub fn on_resize_start(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        self.on_kind(ResizeEvent::ResizeStart, callback)
    }

    /// Subscribe to [`ResizeEvent::Resize`].
    pub fn on_resize(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        self.on_kind(ResizeEvent::Resize, callback)
    }

    /// Subscribe to [`ResizeEvent::ResizeEnd`].
    pub fn on_resize_end(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        self.on_kind(ResizeEvent::ResizeEnd, callback)
    }

    fn on_kind(&self, kind: ResizeEvent, callback: impl Fn() + 'static) -> SubscriptionId {
        self.events.on(move |event: &ResizeEvent| {
            if *event == kind {
                callback();
            }
        })
    }

    /// Remove a subscription.
    pub fn off(&self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    /// Register an extra action to run on teardown, after the controller's own.
    pub fn on_destroy(&mut self, action: impl FnOnce(&mut H) + 'static) -> bool {
        self.lifecycle.on_destroy(action)
    }

    /// Remove every listener (including an open session's), detach
    /// auto-created handles and drop all subscriptions. Idempotent.
    pub fn destroy(&mut self, host: &mut H) -> bool {
        self.lifecycle.destroy(host)
    }
}

fn start_session<H: ResizeHost>(
    host: &mut H,
    state: &SharedState<H>,
    events: &SharedEvents,
    direction: Direction,
    event: &DomEvent,
) -> bool {
    let Some(origin) = pointer_position(event) else {
        return false;
    };
    let target = {
        let state = state.borrow();
        if state.destroyed {
            return false;
        }
        if let Some(active) = &state.active {
            log::debug!(
                "Ignoring pointer-down on the {} handle during a {} session",
                direction,
                active.session.direction
            );
            return false;
        }
        state.target
    };

    let session = DragSession::new(direction, host.client_size(target), origin);
    let listeners: SharedSession<H> = Rc::new(RefCell::new(None));

    let move_listener = {
        let state = Rc::downgrade(state);
        let events = Rc::downgrade(events);
        let orphan = Rc::clone(&listeners);
        host.listen(
            EventTarget::Document,
            &POINTER_MOVE,
            move |host: &mut H, event: &mut DomEvent| {
                let (Some(state), Some(events)) = (state.upgrade(), events.upgrade()) else {
                    release_session(host, &orphan);
                    return;
                };
                if resize_on_move(host, &state, event) {
                    events.emit(&ResizeEvent::Resize);
                }
            },
        )
    };
    let move_listener = match move_listener {
        Ok(registration) => registration,
        Err(e) => {
            log::warn!("Cannot start a resize session: {}", e);
            return false;
        }
    };

    let up_listener = {
        let state = Rc::downgrade(state);
        let events = Rc::downgrade(events);
        let orphan = Rc::clone(&listeners);
        host.listen(EventTarget::Document, &POINTER_UP, move |host: &mut H, _: &mut DomEvent| {
            let (Some(state), Some(events)) = (state.upgrade(), events.upgrade()) else {
                release_session(host, &orphan);
                return;
            };
            if end_session(host, &state) {
                events.emit(&ResizeEvent::ResizeEnd);
            }
        })
    };
    let up_listener = match up_listener {
        Ok(registration) => registration,
        Err(e) => {
            host.unlisten(move_listener);
            log::warn!("Cannot start a resize session: {}", e);
            return false;
        }
    };

    *listeners.borrow_mut() = Some(SessionListeners {
        move_listener,
        up_listener,
    });
    let root = host.root_element();
    host.add_class(root, NO_USER_SELECT_CLASS);

    log::debug!(
        "Resize session started on the {} handle at {:?}, baseline {:?}",
        direction,
        session.origin,
        session.baseline
    );
    state.borrow_mut().active = Some(ActiveSession { session, listeners });
    true
}

fn resize_on_move<H: ResizeHost>(
    host: &mut H,
    state: &SharedState<H>,
    event: &mut DomEvent,
) -> bool {
    let mut state = state.borrow_mut();
    let target = state.target;
    let min = state.min_size();
    let Some(active) = state.active.as_mut() else {
        return false;
    };

    event.prevent_default();
    event.stop_propagation();

    let Some(pointer) = pointer_position(event) else {
        return false;
    };
    let update = active.session.update(pointer, min);
    if let Some(width) = update.width {
        host.set_width(target, width);
    }
    if let Some(height) = update.height {
        host.set_height(target, height);
    }
    log::trace!("Resize move to {:?}: {:?}", pointer, update);
    !update.is_empty()
}

fn end_session<H: ResizeHost>(host: &mut H, state: &SharedState<H>) -> bool {
    let (active, target) = {
        let mut state = state.borrow_mut();
        (state.active.take(), state.target)
    };
    let Some(active) = active else {
        return false;
    };
    let removed = release_session(host, &active.listeners);
    log::debug!("Resize session ended; target is now {:?}", host.client_size(target));
    removed
}

/// Remove a registration if nobody has yet.
fn release<H: ResizeHost>(host: &mut H, registration: &SharedRegistration<H>) -> bool {
    let taken = registration.borrow_mut().take();
    taken.is_some_and(|registration| host.unlisten(registration))
}

/// Remove a session's document listeners and the root class, once.
fn release_session<H: ResizeHost>(host: &mut H, listeners: &SharedSession<H>) -> bool {
    let taken = listeners.borrow_mut().take();
    let Some(listeners) = taken else {
        return false;
    };
    let mut removed = host.unlisten(listeners.move_listener);
    removed |= host.unlisten(listeners.up_listener);
    let root = host.root_element();
    host.remove_class(root, NO_USER_SELECT_CLASS);
    removed
}

fn teardown<H: ResizeHost>(host: &mut H, state: &SharedState<H>, events: &SharedEvents) {
    let (bindings, active) = {
        let mut state = state.borrow_mut();
        state.destroyed = true;
        (std::mem::take(&mut state.bindings), state.active.take())
    };

    if let Some(active) = active {
        release_session(host, &active.listeners);
    }
    for binding in bindings {
        release(host, &binding.pointer_down);
        if binding.info.auto_created {
            host.remove_element(binding.info.element);
        }
    }
    events.clear();
    log::debug!("Resize controller torn down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::HandleSlots;
    use kurbo::Point;
    use std::cell::Cell;

    fn setup(
        options: impl FnOnce(NodeId) -> ResizeOptions,
    ) -> (Document, NodeId, ResizeController) {
        let mut doc = Document::new();
        let target = doc.create_element("div");
        doc.append_child(doc.body(), target).unwrap();
        doc.set_size(target, Size::new(200.0, 200.0));
        let controller = ResizeController::new(&mut doc, options(target)).unwrap();
        (doc, target, controller)
    }

    fn mouse(kind: EventKind, x: f64, y: f64) -> DomEvent {
        DomEvent::mouse(kind, Point::new(x, y))
    }

    #[test]
    fn test_missing_target_fails() {
        let mut doc = Document::new();
        let result = ResizeController::new(&mut doc, ResizeOptions::default());
        assert!(matches!(result, Err(ResizeError::Config(ConfigError::MissingTarget))));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_default_handles_are_created() {
        let (doc, target, controller) = setup(ResizeOptions::for_target);
        let handles = controller.handles();
        let directions: Vec<_> = handles.iter().map(|h| h.direction).collect();
        assert_eq!(directions, vec![Direction::East, Direction::SouthEast, Direction::South]);
        assert_eq!(doc.children(target).len(), 3);
        assert!(doc.has_class(handles[0].element, "handle-east"));
        // mousedown + touchstart per handle
        assert_eq!(doc.listener_count(), 6);
        assert!(doc.is_native_drag_disabled(target));
    }

    #[test]
    fn test_move_listeners_exist_only_during_session() {
        let (mut doc, _, controller) = setup(ResizeOptions::for_target);
        let east = controller.handle(Direction::East).unwrap().element;
        assert_eq!(doc.listener_count_on(EventTarget::Document), 0);

        doc.dispatch(east, mouse(EventKind::MouseDown, 10.0, 10.0));
        assert_eq!(doc.listener_count_on(EventTarget::Document), 4);
        assert!(controller.is_resizing());
        assert!(doc.has_class(doc.root(), NO_USER_SELECT_CLASS));

        doc.dispatch_to_document(mouse(EventKind::MouseUp, 10.0, 10.0));
        assert_eq!(doc.listener_count_on(EventTarget::Document), 0);
        assert!(!controller.is_resizing());
        assert!(!doc.has_class(doc.root(), NO_USER_SELECT_CLASS));
    }

    #[test]
    fn test_move_suppresses_default_and_propagation() {
        let (mut doc, _, controller) = setup(ResizeOptions::for_target);
        let east = controller.handle(Direction::East).unwrap().element;
        doc.dispatch(east, mouse(EventKind::MouseDown, 0.0, 0.0));

        let ev = doc.dispatch_to_document(mouse(EventKind::MouseMove, 500.0, 0.0));
        assert!(ev.default_prevented());
        assert!(ev.propagation_stopped());

        // Even a move that changes nothing is suppressed.
        let ev = doc.dispatch_to_document(mouse(EventKind::MouseMove, -500.0, 0.0));
        assert!(ev.default_prevented());
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let (mut doc, target, controller) = setup(ResizeOptions::for_target);
        let starts = Rc::new(Cell::new(0));
        {
            let starts = Rc::clone(&starts);
            controller.on_resize_start(move || starts.set(starts.get() + 1));
        }
        let east = controller.handle(Direction::East).unwrap().element;
        let south = controller.handle(Direction::South).unwrap().element;

        doc.dispatch(east, mouse(EventKind::MouseDown, 0.0, 0.0));
        doc.dispatch(south, mouse(EventKind::MouseDown, 0.0, 0.0));
        assert_eq!(starts.get(), 1);
        assert_eq!(controller.session().unwrap().direction, Direction::East);
        assert_eq!(doc.listener_count_on(EventTarget::Document), 4);

        doc.dispatch_to_document(mouse(EventKind::MouseMove, 0.0, 30.0));
        assert_eq!(doc.size(target), Size::new(200.0, 200.0));
    }

    #[test]
    fn test_touch_without_points_does_not_start() {
        let (mut doc, _, controller) = setup(ResizeOptions::for_target);
        let east = controller.handle(Direction::East).unwrap().element;
        doc.dispatch(east, DomEvent::touch(EventKind::TouchStart, Vec::new()));
        assert!(!controller.is_resizing());
    }

    #[test]
    fn test_bind_handle_after_construction() {
        let (mut doc, target, mut controller) =
            setup(|t| ResizeOptions::for_target(t).with_handles(HandleSlots::none()));
        assert!(controller.handles().is_empty());

        let west = controller.bind_handle(&mut doc, Direction::West, true).unwrap().unwrap();
        assert!(doc.has_class(west, "handle-west"));
        assert_eq!(doc.parent(west), Some(target));
        assert_eq!(controller.options().handles.get(Direction::West), &HandleSpec::AutoCreate);

        assert!(matches!(
            controller.bind_handle(&mut doc, Direction::West, true),
            Err(ResizeError::HandleAlreadyBound(Direction::West))
        ));
        assert_eq!(controller.bind_handle(&mut doc, Direction::North, ".missing").unwrap(), None);
        assert_eq!(controller.bind_handle(&mut doc, Direction::North, false).unwrap(), None);
        assert_eq!(controller.handles().len(), 1);
    }

    #[test]
    fn test_destroy_cleans_up_everything() {
        let (mut doc, target, mut controller) = setup(ResizeOptions::for_target);
        let external = doc.create_element("button");
        doc.append_child(doc.body(), external).unwrap();
        controller.bind_handle(&mut doc, Direction::West, external).unwrap();

        let east = controller.handle(Direction::East).unwrap().element;
        doc.dispatch(east, mouse(EventKind::MouseDown, 0.0, 0.0));
        controller.on_event(|_| {});

        let ran = Rc::new(Cell::new(false));
        {
            let ran = Rc::clone(&ran);
            controller.on_destroy(move |_| ran.set(true));
        }

        assert!(controller.destroy(&mut doc));
        assert!(ran.get());
        assert_eq!(doc.listener_count(), 0);
        assert!(doc.children(target).is_empty());
        assert_eq!(doc.parent(external), Some(doc.body()));
        assert!(!doc.has_class(doc.root(), NO_USER_SELECT_CLASS));
        assert!(controller.handles().is_empty());
        assert!(!controller.is_resizing());
        assert!(controller.is_destroyed());

        assert!(!controller.destroy(&mut doc));
        assert_eq!(controller.bind_handle(&mut doc, Direction::North, true).unwrap(), None);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_dropped_controller_is_inert() {
        let (mut doc, target, controller) = setup(ResizeOptions::for_target);
        let east = controller.handle(Direction::East).unwrap().element;
        drop(controller);

        doc.dispatch(east, mouse(EventKind::MouseDown, 0.0, 0.0));
        doc.dispatch_to_document(mouse(EventKind::MouseMove, 100.0, 0.0));
        assert_eq!(doc.size(target), Size::new(200.0, 200.0));
        assert_eq!(doc.listener_count_on(EventTarget::Document), 0);
    }

    #[test]
    fn test_dropped_controller_mid_session_releases_document_listeners() {
        let (mut doc, target, controller) = setup(ResizeOptions::for_target);
        let east = controller.handle(Direction::East).unwrap().element;
        doc.dispatch(east, mouse(EventKind::MouseDown, 0.0, 0.0));
        assert_eq!(doc.listener_count_on(EventTarget::Document), 4);
        assert!(doc.has_class(doc.root(), NO_USER_SELECT_CLASS));
        drop(controller);

        doc.dispatch_to_document(mouse(EventKind::MouseUp, 0.0, 0.0));
        assert_eq!(doc.listener_count_on(EventTarget::Document), 0);
        assert!(!doc.has_class(doc.root(), NO_USER_SELECT_CLASS));

        // The handle's own pointer-down registration goes on its next event.
        assert_eq!(doc.listener_count_on(EventTarget::Node(east)), 2);
        doc.dispatch(east, mouse(EventKind::MouseDown, 0.0, 0.0));
        assert_eq!(doc.listener_count_on(EventTarget::Node(east)), 0);
        assert_eq!(doc.size(target), Size::new(200.0, 200.0));
    }

    #[test]
    fn test_dropped_controller_mid_session_move_releases_session() {
        let (mut doc, target, controller) = setup(ResizeOptions::for_target);
        let south = controller.handle(Direction::South).unwrap().element;
        doc.dispatch(south, mouse(EventKind::MouseDown, 0.0, 0.0));
        drop(controller);

        doc.dispatch_to_document(mouse(EventKind::MouseMove, 0.0, 50.0));
        assert_eq!(doc.size(target), Size::new(200.0, 200.0));
        assert_eq!(doc.listener_count_on(EventTarget::Document), 0);
        assert!(!doc.has_class(doc.root(), NO_USER_SELECT_CLASS));
    }

    /// Headless host whose `listen` starts failing after a fixed number of calls.
    #[derive(Debug)]
    struct FlakyHost {
        doc: Document,
        listens_left: usize,
        live: Vec<u32>,
        next: u32,
    }

    impl FlakyHost {
        fn new(listens_left: usize) -> (Self, NodeId) {
            let mut doc = Document::new();
            let target = doc.create_element("div");
            doc.append_child(doc.body(), target).unwrap();
            let host = Self {
                doc,
                listens_left,
                live: Vec::new(),
                next: 0,
            };
            (host, target)
        }
    }

    impl ResizeHost for FlakyHost {
        type Registration = u32;

        fn root_element(&self) -> NodeId {
            self.doc.root_element()
        }

        fn check_target(&self, target: NodeId) -> Result<(), ConfigError> {
            self.doc.check_target(target)
        }

        fn can_listen(&self, node: NodeId) -> bool {
            self.doc.can_listen(node)
        }

        fn append_handle(
            &mut self,
            parent: NodeId,
            tag: &str,
            class: &str,
            attribute: &str,
        ) -> Result<NodeId, DomError> {
            self.doc.append_handle(parent, tag, class, attribute)
        }

        fn find_handle(
            &mut self,
            scope: NodeId,
            selector: &str,
        ) -> Result<Option<NodeId>, DomError> {
            self.doc.find_handle(scope, selector)
        }

        fn remove_element(&mut self, node: NodeId) -> bool {
            self.doc.remove_element(node)
        }

        fn add_class(&mut self, node: NodeId, class: &str) -> bool {
            ResizeHost::add_class(&mut self.doc, node, class)
        }

        fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
            ResizeHost::remove_class(&mut self.doc, node, class)
        }

        fn client_size(&self, node: NodeId) -> Size {
            self.doc.client_size(node)
        }

        fn set_width(&mut self, node: NodeId, width: f64) {
            self.doc.set_width(node, width);
        }

        fn set_height(&mut self, node: NodeId, height: f64) {
            self.doc.set_height(node, height);
        }

        fn cancel_native_drag(&mut self, node: NodeId) {
            self.doc.cancel_native_drag(node);
        }

        fn listen(
            &mut self,
            _target: EventTarget,
            _kinds: &[EventKind],
            _listener: impl Fn(&mut Self, &mut DomEvent) + 'static,
        ) -> Result<u32, DomError> {
            if self.listens_left == 0 {
                return Err(DomError::Host("listener quota exhausted".to_string()));
            }
            self.listens_left -= 1;
            self.next += 1;
            self.live.push(self.next);
            Ok(self.next)
        }

        fn unlisten(&mut self, registration: u32) -> bool {
            let before = self.live.len();
            self.live.retain(|&id| id != registration);
            self.live.len() != before
        }
    }

    #[test]
    fn test_failed_construction_undoes_earlier_handles() {
        // East and south-east bind, then south fails.
        let (mut host, target) = FlakyHost::new(2);
        let result = ResizeController::new(&mut host, ResizeOptions::for_target(target));

        assert!(matches!(result, Err(ResizeError::Dom(DomError::Host(_)))));
        assert!(host.doc.children(target).is_empty());
        assert!(host.live.is_empty());
    }

    #[test]
    fn test_bind_handle_failure_removes_created_element() {
        let (mut host, target) = FlakyHost::new(0);
        let options = ResizeOptions::for_target(target).with_handles(HandleSlots::none());
        let mut controller = ResizeController::new(&mut host, options).unwrap();

        let result = controller.bind_handle(&mut host, Direction::West, true);
        assert!(matches!(result, Err(ResizeError::Dom(DomError::Host(_)))));
        assert!(host.doc.children(target).is_empty());
        assert!(controller.handles().is_empty());
        assert_eq!(controller.options().handles.get(Direction::West), &HandleSpec::Disabled);
    }
}
