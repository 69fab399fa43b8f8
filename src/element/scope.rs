//! `Scope`: a component's handle to its element.

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use crate::dom::{Document, NodeId};
use crate::event::{Event, EventTarget, Handler};
use crate::reactive::{Reactive, Schedule, Updater};
use crate::window::{WeakWindow, Window};

use super::component::Component;
use super::ElementInner;

/// Passed to every [`Component`] method.
///
/// Holds weak links only, so components may store a clone without creating
/// reference cycles. The host, content root, and window are available from
/// [`Component::create`] onwards; everything that needs the element itself
/// (listener bookkeeping, scheduling) works once construction has finished.
pub struct Scope<C: Component> {
    inner: Weak<ElementInner<C>>,
    window: WeakWindow,
    host: NodeId,
    root: NodeId,
}

impl<C: Component> Clone for Scope<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            window: self.window.clone(),
            host: self.host,
            root: self.root,
        }
    }
}

impl<C: Component> Scope<C> {
    pub(crate) fn new(
        inner: Weak<ElementInner<C>>,
        window: WeakWindow,
        host: NodeId,
        root: NodeId,
    ) -> Self {
        Self {
            inner,
            window,
            host,
            root,
        }
    }

    // -----------------------------------------------------------------------
    // State and scheduling
    // -----------------------------------------------------------------------

    /// Request a deferred update of this element.
    pub fn request_update(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.request_update();
        }
    }

    /// An updater that schedules this element.
    pub fn updater(&self) -> Updater {
        let owner: Weak<dyn Schedule> = self.inner.clone();
        Updater::new(owner)
    }

    /// Create a reactive property owned by this element.
    pub fn reactive<T: 'static>(&self, name: &'static str, initial: T) -> Reactive<T> {
        Reactive::new(name, initial, self.updater())
    }

    /// Translate `key` in the current language. Returns the key when the
    /// window is gone.
    pub fn t(&self, key: &str) -> String {
        match self.window.upgrade() {
            Some(window) => window.i18n().t(key),
            None => key.to_owned(),
        }
    }

    // -----------------------------------------------------------------------
    // Environment
    // -----------------------------------------------------------------------

    /// The window, while it is alive.
    pub fn window(&self) -> Option<Window> {
        self.window.upgrade()
    }

    /// The document, while the window is alive.
    pub fn document(&self) -> Option<Document> {
        self.window().map(|window| window.document().clone())
    }

    /// The host element.
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Where rendered markup goes.
    pub fn content_root(&self) -> NodeId {
        self.root
    }

    /// Whether rendering goes into a shadow root.
    pub fn is_isolated(&self) -> bool {
        self.root != self.host
    }

    /// First element in the rendered content matching `selector`.
    ///
    /// Invalid selectors are logged and match nothing.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// Every element in the rendered content matching `selector`.
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.query_all(selector)
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(document) = self.document() else {
            return Vec::new();
        };
        match document.query_selector_all(self.root, selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(selector, %err, "invalid selector");
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    /// Attach `handler` to the first rendered element matching `selector`.
    ///
    /// No match is a no-op. If this element already holds a listener for
    /// the same (element, event) pair, that listener is detached and its
    /// record replaced.
    pub fn add_event_listener_with_cleanup(
        &self,
        selector: &str,
        event: &str,
        handler: impl Fn(&C, &Event) + 'static,
    ) {
        if let Some(node) = self.query_selector(selector) {
            self.record(EventTarget::Node(node), event, self.wrap(handler));
        }
    }

    /// Like [`add_event_listener_with_cleanup`](Self::add_event_listener_with_cleanup)
    /// for every matching element.
    pub fn add_event_listener_all_with_cleanup(
        &self,
        selector: &str,
        event: &str,
        handler: impl Fn(&C, &Event) + 'static,
    ) {
        let nodes = self.query_selector_all(selector);
        if nodes.is_empty() {
            return;
        }
        let handler = self.wrap(handler);
        for node in nodes {
            self.record(EventTarget::Node(node), event, handler.clone());
        }
    }

    /// Attach a window listener, recorded like element listeners and
    /// released on unmount.
    pub fn listen_window(&self, event: &str, handler: impl Fn(&C, &Event) + 'static) {
        self.record(EventTarget::Window, event, self.wrap(handler));
    }

    /// Dispatch `event` on the window.
    pub fn dispatch_window(&self, event: &Event) -> bool {
        self.window()
            .is_some_and(|window| window.dispatch_event(event))
    }

    /// Number of listener records this element holds.
    pub fn listener_count(&self) -> usize {
        self.inner
            .upgrade()
            .map_or(0, |inner| inner.core.listeners.borrow().len())
    }

    /// Handlers hold the element weakly; a handler outliving its element
    /// does nothing.
    fn wrap(&self, handler: impl Fn(&C, &Event) + 'static) -> Handler {
        let inner = self.inner.clone();
        Rc::new(move |event: &Event| {
            if let Some(inner) = inner.upgrade() {
                handler(&inner.component, event);
            }
        })
    }

    /// Unmounted elements record nothing; unmount already released the book.
    fn record(&self, target: EventTarget, event: &str, handler: Handler) {
        let (Some(inner), Some(document)) = (self.inner.upgrade(), self.document()) else {
            return;
        };
        if !inner.core.mounted.get() {
            trace!(event, "ignoring listener on unmounted element");
            return;
        }
        inner
            .core
            .listeners
            .borrow_mut()
            .add(&document, target, event, handler);
    }
}

impl<C: Component> fmt::Debug for Scope<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("host", &self.host)
            .field("root", &self.root)
            .finish()
    }
}
