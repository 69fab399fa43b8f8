//! Per-element listener bookkeeping.
//!
//! Each element keeps a [`ListenerBook`] of the listeners it attached. The
//! book holds at most one record per (target, event) pair: attaching again
//! for the same pair detaches the previous handler first. Unmounting
//! releases the whole book.

use std::fmt;

use crate::dom::Document;
use crate::event::{EventTarget, Handler};

/// One attached listener.
#[derive(Clone)]
pub struct ListenerRecord {
    pub target: EventTarget,
    pub event: String,
    pub handler: Handler,
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("target", &self.target)
            .field("event", &self.event)
            .finish()
    }
}

/// Ordered listener records of one element.
#[derive(Debug, Default)]
pub struct ListenerBook {
    records: Vec<ListenerRecord>,
}

impl ListenerBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to `target` and record it, replacing any record for
    /// the same pair.
    pub fn add(&mut self, document: &Document, target: EventTarget, event: &str, handler: Handler) {
        if let Some(pos) = self
            .records
            .iter()
            .position(|r| r.target == target && r.event == event)
        {
            let old = self.records.remove(pos);
            document.remove_event_listener(old.target, &old.event, &old.handler);
        }
        document.add_event_listener(target, event, handler.clone());
        self.records.push(ListenerRecord {
            target,
            event: event.to_owned(),
            handler,
        });
    }

    /// Detach every recorded listener and clear the book.
    ///
    /// Without a document (the window is gone) the records are simply
    /// dropped.
    pub fn release_all(&mut self, document: Option<&Document>) {
        for record in self.records.drain(..) {
            if let Some(document) = document {
                document.remove_event_listener(record.target, &record.event, &record.handler);
            }
        }
    }

    /// Drop records whose target node no longer exists.
    pub fn prune(&mut self, document: &Document) {
        self.records.retain(|r| match r.target {
            EventTarget::Node(node) => document.contains(node),
            EventTarget::Window => true,
        });
    }

    /// Records in attachment order.
    pub fn records(&self) -> &[ListenerRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
