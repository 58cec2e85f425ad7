//! Listener registry and removal handles.

use super::{Document, DomEvent, EventKind, NodeId};
use std::fmt;
use std::rc::Rc;

/// A registered event callback.
pub type Listener = Rc<dyn Fn(&mut Document, &mut DomEvent)>;

/// Identifier of a single registration (one target, one event kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The document itself; sees every bubbling event from connected nodes.
    Document,
    /// A specific element.
    Node(NodeId),
}

struct Registration {
    id: ListenerId,
    target: EventTarget,
    kind: EventKind,
    listener: Listener,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<Registration>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("next_id", &self.next_id)
            .field("live", &self.entries.len())
            .finish()
    }
}

impl ListenerRegistry {
    /// Register one listener for several kinds; each kind gets its own id.
    pub(crate) fn register(
        &mut self,
        target: EventTarget,
        kinds: &[EventKind],
        listener: impl Fn(&mut Document, &mut DomEvent) + 'static,
    ) -> ListenerHandle {
        let listener: Listener = Rc::new(listener);
        let mut ids = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let id = ListenerId(self.next_id);
            self.next_id += 1;
            self.entries.push(Registration {
                id,
                target,
                kind,
                listener: Rc::clone(&listener),
            });
            ids.push(id);
        }
        ListenerHandle { ids }
    }

    pub(crate) fn unregister(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|r| r.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_registered(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|r| r.id == id)
    }

    /// Snapshot of listeners for a target and kind, in registration order.
    pub(crate) fn matching(
        &self,
        target: EventTarget,
        kind: EventKind,
    ) -> Vec<(ListenerId, Listener)> {
        self.entries
            .iter()
            .filter(|r| r.target == target && r.kind == kind)
            .map(|r| (r.id, Rc::clone(&r.listener)))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn count_on(&self, target: EventTarget) -> usize {
        self.entries.iter().filter(|r| r.target == target).count()
    }
}

/// Handle returned by listener registration.
///
/// Covers every event alias registered in one call; [`ListenerHandle::remove`]
/// unregisters all of them.
#[derive(Debug, Default, PartialEq, Eq)]
#[must_use = "dropping a ListenerHandle leaves the listener registered"]
pub struct ListenerHandle {
    ids: Vec<ListenerId>,
}

impl ListenerHandle {
    /// Unregister every alias. Returns `true` if at least one was still registered.
    pub fn remove(self, doc: &mut Document) -> bool {
        let mut removed = false;
        for id in self.ids {
            removed |= doc.listeners.unregister(id);
        }
        removed
    }

    /// Registration ids covered by this handle.
    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
