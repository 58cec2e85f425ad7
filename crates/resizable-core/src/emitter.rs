//! Synchronous event emission for resize lifecycle signals.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Lifecycle signals emitted by a resize controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeEvent {
    /// A drag gesture started on a handle.
    ResizeStart,
    /// A move changed at least one dimension.
    Resize,
    /// The drag gesture ended.
    ResizeEnd,
}

impl ResizeEvent {
    /// Event name.
    pub fn name(self) -> &'static str {
        match self {
            ResizeEvent::ResizeStart => "resize-start",
            ResizeEvent::Resize => "resize",
            ResizeEvent::ResizeEnd => "resize-end",
        }
    }
}

impl fmt::Display for ResizeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier returned by [`EventEmitter::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<E> = Rc<dyn Fn(&E)>;

/// Subscriber list with interior mutability, so it can be shared with event
/// listeners and modified from inside a callback.
pub struct EventEmitter<E> {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<E>)>>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
        }
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<E> EventEmitter<E> {
    /// Create an emitter with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every emitted event.
    pub fn on(&self, callback: impl Fn(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Unsubscribe. Returns `true` if the subscription existed.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Notify subscribers in subscription order.
    ///
    /// Subscriptions added or removed by a callback take effect from the next emit.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Subscriber<E>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| Rc::clone(s))
            .collect();
        for subscriber in snapshot {
            subscriber(event);
        }
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.subscribers.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let emitter = EventEmitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b"] {
            let log = Rc::clone(&log);
            emitter.on(move |ev: &ResizeEvent| log.borrow_mut().push(format!("{}:{}", name, ev)));
        }
        emitter.emit(&ResizeEvent::Resize);
        assert_eq!(*log.borrow(), vec!["a:resize", "b:resize"]);
    }

    #[test]
    fn test_off() {
        let emitter = EventEmitter::new();
        let count = Rc::new(Cell::new(0));
        let id = {
            let count = Rc::clone(&count);
            emitter.on(move |_: &ResizeEvent| count.set(count.get() + 1))
        };
        emitter.emit(&ResizeEvent::ResizeStart);
        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        emitter.emit(&ResizeEvent::ResizeStart);
        assert_eq!(count.get(), 1);
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_subscribing_from_a_callback() {
        let emitter = Rc::new(EventEmitter::<ResizeEvent>::new());
        let count = Rc::new(Cell::new(0));
        {
            let weak = Rc::downgrade(&emitter);
            let count = Rc::clone(&count);
            emitter.on(move |_| {
                if let Some(emitter) = weak.upgrade() {
                    let count = Rc::clone(&count);
                    emitter.on(move |_| count.set(count.get() + 1));
                }
            });
        }
        emitter.emit(&ResizeEvent::Resize);
        assert_eq!(count.get(), 0);
        assert_eq!(emitter.len(), 2);
        emitter.emit(&ResizeEvent::Resize);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(ResizeEvent::ResizeStart.name(), "resize-start");
        assert_eq!(ResizeEvent::Resize.name(), "resize");
        assert_eq!(ResizeEvent::ResizeEnd.name(), "resize-end");
    }
}
