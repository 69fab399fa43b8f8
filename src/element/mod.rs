//! Custom elements: the component lifecycle base.
//!
//! An [`Element<C>`] pairs a host node with a [`Component`] and runs its
//! lifecycle:
//!
//! - **mount** (entering the document): update synchronously, install the
//!   component's listeners, subscribe to language changes, run `connected`.
//! - **update**: render; if the markup equals the last applied markup do
//!   nothing, otherwise replace the content root's children and reinstall
//!   listeners.
//! - **request_update**: schedule one deferred update on the microtask
//!   queue; further requests before it runs are coalesced.
//! - **unmount** (leaving the document): run `disconnected`, release every
//!   listener record, drop the language subscription.
//!
//! Light components render into the host's children; isolated ones into a
//! shadow root (see [`shadow`]).

pub mod component;
pub mod lifecycle;
pub mod listeners;
pub mod registry;
pub mod scope;
pub mod shadow;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::dom::NodeId;
use crate::i18n::SubscriptionId;
use crate::reactive::Schedule;
use crate::runtime;
use crate::window::{WeakWindow, Window};

pub use component::{Component, RenderMode};
pub use lifecycle::Lifecycle;
pub use listeners::{ListenerBook, ListenerRecord};
pub use registry::{ComponentType, CustomElementRegistry, RegistryError};
pub use scope::Scope;

// ---------------------------------------------------------------------------
// Core state
// ---------------------------------------------------------------------------

/// Lifecycle state shared by every element regardless of component type.
struct Core {
    window: WeakWindow,
    host: NodeId,
    root: NodeId,
    type_name: &'static str,
    mounted: Cell<bool>,
    update_requested: Cell<bool>,
    /// Markup most recently applied to the content root.
    applied: RefCell<String>,
    listeners: RefCell<ListenerBook>,
    language_subscription: Cell<Option<SubscriptionId>>,
}

/// The shared allocation behind an [`Element`].
pub(crate) struct ElementInner<C: Component> {
    core: Core,
    component: C,
    self_ref: Weak<Self>,
}

impl<C: Component> ElementInner<C> {
    fn scope(&self) -> Scope<C> {
        Scope::new(
            self.self_ref.clone(),
            self.core.window.clone(),
            self.core.host,
            self.core.root,
        )
    }
}

impl<C: Component> Schedule for ElementInner<C> {
    fn request_update(&self) {
        if self.core.update_requested.replace(true) {
            return;
        }
        let weak = self.self_ref.clone();
        runtime::queue_microtask(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.core.update_requested.set(false);
            if !inner.core.mounted.get() {
                trace!(component = inner.core.type_name, "skipping update after unmount");
                return;
            }
            inner.update();
        });
    }
}

impl<C: Component> Lifecycle for ElementInner<C> {
    fn render(&self) -> String {
        self.component.render(&self.scope())
    }

    fn update(&self) {
        let markup = self.render();
        if *self.core.applied.borrow() == markup {
            return;
        }
        let Some(window) = self.core.window.upgrade() else {
            return;
        };
        trace!(component = self.core.type_name, "applying update");
        let document = window.document();
        self.core.applied.replace(markup.clone());
        document.set_inner_html(self.core.root, &markup);
        self.core.listeners.borrow_mut().prune(document);
        self.component.add_event_listeners(&self.scope());
    }

    fn mount(&self) {
        if self.core.mounted.replace(true) {
            return;
        }
        debug!(component = self.core.type_name, "mount");
        let scope = self.scope();
        self.update();
        self.component.add_event_listeners(&scope);

        if let Some(window) = self.core.window.upgrade() {
            let weak = self.self_ref.clone();
            let id = window.i18n().subscribe(move || {
                // Subscribers are snapshotted per notification, so an
                // element unmounted earlier in the same one still gets called.
                if let Some(inner) = weak.upgrade().filter(|inner| inner.core.mounted.get()) {
                    inner.update();
                }
            });
            if let Some(stale) = self.core.language_subscription.replace(Some(id)) {
                window.i18n().unsubscribe(stale);
            }
        }

        self.component.connected(&scope);
    }

    fn unmount(&self) {
        if !self.core.mounted.replace(false) {
            return;
        }
        debug!(component = self.core.type_name, "unmount");
        self.component.disconnected(&self.scope());

        let window = self.core.window.upgrade();
        if let (Some(window), Some(id)) = (&window, self.core.language_subscription.take()) {
            window.i18n().unsubscribe(id);
        }
        self.core
            .listeners
            .borrow_mut()
            .release_all(window.as_ref().map(Window::document));
    }

    fn is_mounted(&self) -> bool {
        self.core.mounted.get()
    }

    fn host(&self) -> NodeId {
        self.core.host
    }

    fn content_root(&self) -> NodeId {
        self.core.root
    }

    fn type_name(&self) -> &'static str {
        self.core.type_name
    }

    fn listener_count(&self) -> usize {
        self.core.listeners.borrow().len()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// Typed handle to a custom element and its component.
pub struct Element<C: Component> {
    inner: Rc<ElementInner<C>>,
}

impl<C: Component> Clone for Element<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Component> Element<C> {
    /// Create a detached `<tag>` element hosting a new `C`.
    ///
    /// The element mounts when it is appended into the document.
    pub fn create(window: &Window, tag: &str) -> Self {
        let host = window.document().create_element(tag);
        Self::construct(window, host)
    }

    /// Construct `C` for an existing host node and register the instance.
    pub(crate) fn construct(window: &Window, host: NodeId) -> Self {
        let document = window.document();
        let type_name = registry::short_type_name::<C>();
        let root = shadow::resolve(document, host, C::RENDER_MODE, type_name);
        let applied = document.inner_html(root.node);

        let inner = Rc::new_cyclic(|weak: &Weak<ElementInner<C>>| {
            let scope = Scope::new(weak.clone(), window.downgrade(), host, root.node);
            ElementInner {
                core: Core {
                    window: window.downgrade(),
                    host,
                    root: root.node,
                    type_name,
                    mounted: Cell::new(false),
                    update_requested: Cell::new(false),
                    applied: RefCell::new(applied),
                    listeners: RefCell::new(ListenerBook::new()),
                    language_subscription: Cell::new(None),
                },
                component: C::create(&scope),
                self_ref: weak.clone(),
            }
        });
        document.register_instance(host, inner.clone());
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<ElementInner<C>>) -> Self {
        Self { inner }
    }

    pub(crate) fn into_inner(self) -> Rc<ElementInner<C>> {
        self.inner
    }

    /// The component.
    pub fn component(&self) -> &C {
        &self.inner.component
    }

    /// A scope for this element, as components receive it.
    pub fn scope(&self) -> Scope<C> {
        self.inner.scope()
    }

    /// The host element.
    pub fn host(&self) -> NodeId {
        self.inner.core.host
    }

    /// Where rendered markup goes.
    pub fn content_root(&self) -> NodeId {
        self.inner.core.root
    }

    /// Whether rendering goes into a shadow root.
    pub fn is_isolated(&self) -> bool {
        self.inner.core.root != self.inner.core.host
    }

    /// Whether the element is mounted.
    pub fn is_mounted(&self) -> bool {
        self.inner.core.mounted.get()
    }

    /// Whether a deferred update is queued.
    pub fn update_pending(&self) -> bool {
        self.inner.core.update_requested.get()
    }

    /// The markup most recently applied.
    pub fn applied_markup(&self) -> String {
        self.inner.core.applied.borrow().clone()
    }

    /// Number of listener records held.
    pub fn listener_count(&self) -> usize {
        self.inner.core.listeners.borrow().len()
    }

    /// Snapshot of the listener records.
    pub fn listener_records(&self) -> Vec<ListenerRecord> {
        self.inner.core.listeners.borrow().records().to_vec()
    }

    /// Schedule a deferred update.
    pub fn request_update(&self) {
        self.inner.request_update();
    }

    /// Run an update now.
    pub fn update(&self) {
        self.inner.update();
    }

    /// Render without applying.
    pub fn render(&self) -> String {
        self.inner.render()
    }

    /// Type-erased handle.
    pub fn as_lifecycle(&self) -> Rc<dyn Lifecycle> {
        self.inner.clone()
    }
}

impl<C: Component> fmt::Debug for Element<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("type_name", &self.inner.core.type_name)
            .field("host", &self.inner.core.host)
            .field("root", &self.inner.core.root)
            .field("mounted", &self.inner.core.mounted.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
