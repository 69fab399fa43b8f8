//! Event objects, targets, and the propagation path.
//!
//! An [`Event`] carries a name, an optional boxed [`Detail`] payload, and the
//! mutable dispatch flags handlers use (`prevent_default`,
//! `stop_propagation`). Flags live in `Cell`s so handlers only ever see
//! `&Event`.

use std::cell::Cell;
use std::fmt;

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

use super::detail::Detail;

// ---------------------------------------------------------------------------
// EventTarget
// ---------------------------------------------------------------------------

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The process-wide window.
    Window,
    /// A node in the document.
    Node(NodeId),
}

impl EventTarget {
    /// The node, if this target is one.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Window => None,
        }
    }
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A dispatched event.
pub struct Event {
    name: String,
    detail: Option<Box<dyn Detail>>,
    bubbles: bool,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    target: Cell<Option<EventTarget>>,
    current_target: Cell<Option<EventTarget>>,
}

impl Event {
    /// Create a non-bubbling event without payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
            bubbles: false,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            target: Cell::new(None),
            current_target: Cell::new(None),
        }
    }

    /// Attach a payload (builder).
    pub fn with_detail(mut self, detail: impl Detail) -> Self {
        self.detail = Some(Box::new(detail));
        self
    }

    /// Make the event bubble (builder).
    pub fn bubbling(mut self) -> Self {
        self.bubbles = true;
        self
    }

    /// The event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the event bubbles.
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Attempt to downcast the payload to a concrete type.
    pub fn detail<T: Detail>(&self) -> Option<&T> {
        self.detail.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Cancel the default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Whether a handler called [`prevent_default`](Self::prevent_default).
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop the event from reaching further targets on its path. Handlers on
    /// the current target still run.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Whether propagation was stopped.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// The target the event was dispatched at.
    pub fn target(&self) -> Option<EventTarget> {
        self.target.get()
    }

    /// The target whose handlers are currently running.
    pub fn current_target(&self) -> Option<EventTarget> {
        self.current_target.get()
    }

    pub(crate) fn set_target(&self, target: EventTarget) {
        self.target.set(Some(target));
    }

    pub(crate) fn set_current_target(&self, target: Option<EventTarget>) {
        self.current_target.set(target);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("detail", &self.detail.as_ref().map(|d| d.detail_name()))
            .field("bubbles", &self.bubbles)
            .field("default_prevented", &self.default_prevented.get())
            .field("target", &self.target.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Propagation path
// ---------------------------------------------------------------------------

/// Compute the propagation path of an event dispatched at `target`.
///
/// A non-bubbling event only visits its target. A bubbling event visits the
/// target, then its composed ancestors (a shadow root hands over to its host),
/// and finally the window when the target is connected to the document.
/// If `target` does not exist in the DOM, returns an empty vec.
pub fn propagation_path(dom: &Dom, target: EventTarget, bubbles: bool) -> Vec<EventTarget> {
    let start = match target {
        EventTarget::Window => return vec![EventTarget::Window],
        EventTarget::Node(id) if !dom.contains(id) => return Vec::new(),
        EventTarget::Node(id) => id,
    };
    if !bubbles {
        return vec![target];
    }

    let mut path = vec![target];
    let mut current = start;
    while let Some(next) = dom.composed_parent(current) {
        path.push(EventTarget::Node(next));
        current = next;
    }
    if dom.root() == Some(current) {
        path.push(EventTarget::Window);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;
    use crate::event::detail::{ContentDetail, NavigateDetail};

    /// Build a small test tree:
    /// ```text
    ///   root
    ///    └ host
    ///       ├ (shadow) ── a
    ///       └ light
    /// detached
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let host = dom.insert_child(root, NodeData::element("app-header"));
        let shadow = dom.insert(NodeData::shadow_root());
        dom.attach_shadow_root(host, shadow);
        let a = dom.insert_child(shadow, NodeData::element("a"));
        let light = dom.insert_child(host, NodeData::element("span"));
        let detached = dom.insert(NodeData::element("div"));
        (dom, root, host, a, light, detached)
    }

    // ── Event ────────────────────────────────────────────────────────

    #[test]
    fn event_defaults() {
        let event = Event::new("click");
        assert_eq!(event.name(), "click");
        assert!(!event.bubbles());
        assert!(!event.default_prevented());
        assert!(!event.propagation_stopped());
        assert_eq!(event.target(), None);
    }

    #[test]
    fn event_detail_downcast() {
        let event = Event::new("navigate").with_detail(NavigateDetail::new("/x"));
        assert_eq!(event.detail::<NavigateDetail>().map(|d| d.path.as_str()), Some("/x"));
        assert!(event.detail::<ContentDetail>().is_none());
        assert!(Event::new("popstate").detail::<NavigateDetail>().is_none());
    }

    #[test]
    fn event_flags() {
        let event = Event::new("click").bubbling();
        event.prevent_default();
        event.stop_propagation();
        assert!(event.bubbles());
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn event_debug_names_detail() {
        let event = Event::new("navigate").with_detail(NavigateDetail::new("/"));
        let debug = format!("{event:?}");
        assert!(debug.contains("NavigateDetail"));
    }

    // ── Propagation path ─────────────────────────────────────────────

    #[test]
    fn path_crosses_shadow_boundary_to_window() {
        let (dom, root, host, a, _light, _detached) = build_tree();
        let shadow = dom.shadow_root(host).unwrap();
        assert_eq!(
            propagation_path(&dom, EventTarget::Node(a), true),
            vec![
                EventTarget::Node(a),
                EventTarget::Node(shadow),
                EventTarget::Node(host),
                EventTarget::Node(root),
                EventTarget::Window,
            ]
        );
    }

    #[test]
    fn non_bubbling_path_is_target_only() {
        let (dom, _root, _host, _a, light, _detached) = build_tree();
        assert_eq!(
            propagation_path(&dom, EventTarget::Node(light), false),
            vec![EventTarget::Node(light)]
        );
    }

    #[test]
    fn detached_path_never_reaches_window() {
        let (dom, _root, _host, _a, _light, detached) = build_tree();
        assert_eq!(
            propagation_path(&dom, EventTarget::Node(detached), true),
            vec![EventTarget::Node(detached)]
        );
    }

    #[test]
    fn window_path() {
        let (dom, ..) = build_tree();
        assert_eq!(
            propagation_path(&dom, EventTarget::Window, true),
            vec![EventTarget::Window]
        );
    }

    #[test]
    fn missing_node_has_empty_path() {
        let (mut dom, _root, _host, _a, light, _detached) = build_tree();
        dom.remove(light);
        assert!(propagation_path(&dom, EventTarget::Node(light), true).is_empty());
    }
}
