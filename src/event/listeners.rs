//! Listener registry: per-(target, event) handler lists.
//!
//! Handlers are reference-counted closures and are identified by pointer,
//! which is what removal compares against. Adding the same handler twice to
//! the same (target, event) pair is a no-op.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::dispatch::{Event, EventTarget};

/// A shared event handler.
pub type Handler = Rc<dyn Fn(&Event)>;

/// All listeners attached in a document, window included.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<(EventTarget, String), Vec<Handler>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler`. Returns `false` if the same handler was already
    /// attached for this pair.
    pub fn add(&mut self, target: EventTarget, event: &str, handler: Handler) -> bool {
        let list = self
            .listeners
            .entry((target, event.to_owned()))
            .or_default();
        if list.iter().any(|h| Rc::ptr_eq(h, &handler)) {
            return false;
        }
        list.push(handler);
        true
    }

    /// Detach `handler`. Returns `false` if it was not attached.
    pub fn remove(&mut self, target: EventTarget, event: &str, handler: &Handler) -> bool {
        let key = (target, event.to_owned());
        let Some(list) = self.listeners.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|h| !Rc::ptr_eq(h, handler));
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&key);
        }
        removed
    }

    /// Snapshot of the handlers for a pair, in attachment order.
    ///
    /// Dispatch iterates the snapshot so handlers may add or remove
    /// listeners while running.
    pub fn handlers(&self, target: EventTarget, event: &str) -> Vec<Handler> {
        self.listeners
            .get(&(target, event.to_owned()))
            .cloned()
            .unwrap_or_default()
    }

    /// Drop every listener attached to `target`.
    pub fn remove_target(&mut self, target: EventTarget) {
        self.listeners.retain(|(t, _), _| *t != target);
    }

    /// Number of handlers attached for a pair.
    pub fn count(&self, target: EventTarget, event: &str) -> usize {
        self.listeners
            .get(&(target, event.to_owned()))
            .map_or(0, Vec::len)
    }

    /// Total number of handlers across all targets.
    pub fn total(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("pairs", &self.listeners.len())
            .field("handlers", &self.total())
            .finish()
    }
}
