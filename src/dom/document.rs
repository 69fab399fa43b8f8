//! The live document: tree, listeners, custom elements, connection tracking.
//!
//! [`Document`] is a cheap, cloneable handle over shared state. Every
//! operation that can run component code (mounting, unmounting, event
//! handlers) first finishes its tree mutation, releases the state borrow,
//! and only then calls out. Component code is therefore free to call back
//! into the document.
//!
//! Custom elements follow the connect/disconnect model: when a subtree
//! becomes reachable from the document root, every element in it whose tag
//! is registered is upgraded (its component is constructed if needed) and
//! mounted, in tree order. When a subtree is removed, mounted instances are
//! unmounted before the nodes go away.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use slotmap::SecondaryMap;
use tracing::{debug, trace};

use crate::element::registry::{ComponentType, CustomElementRegistry, RegistryError};
use crate::element::{Component, Element, ElementInner, Lifecycle};
use crate::event::{propagation_path, Event, EventTarget, Handler, ListenerRegistry};
use crate::window::WeakWindow;

use super::markup;
use super::node::{NodeData, NodeId, NodeKind};
use super::selector::SelectorError;
use super::tree::Dom;

/// Errors from [`Document::attach_shadow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShadowError {
    #[error("shadow roots are not supported in this environment")]
    NotSupported,
    #[error("node is not an element")]
    NotAnElement,
    #[error("a shadow root is already attached")]
    AlreadyAttached,
}

struct DocumentState {
    dom: Dom,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    listeners: ListenerRegistry,
    registry: CustomElementRegistry,
    instances: SecondaryMap<NodeId, Rc<dyn Lifecycle>>,
}

struct DocumentInner {
    state: RefCell<DocumentState>,
    window: WeakWindow,
    shadow_supported: bool,
}

/// Shared handle to a document. Cloning shares state.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    /// Create an empty `<html><head></head><body></body></html>` document.
    pub(crate) fn new(window: WeakWindow, shadow_supported: bool) -> Self {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let html = dom.insert_child(root, NodeData::element("html"));
        let head = dom.insert_child(html, NodeData::element("head"));
        let body = dom.insert_child(html, NodeData::element("body"));
        Self {
            inner: Rc::new(DocumentInner {
                state: RefCell::new(DocumentState {
                    dom,
                    root,
                    head,
                    body,
                    listeners: ListenerRegistry::new(),
                    registry: CustomElementRegistry::new(),
                    instances: SecondaryMap::new(),
                }),
                window,
                shadow_supported,
            }),
        }
    }

    /// A document without a window. Custom elements never upgrade in it.
    pub fn detached() -> Self {
        Self::new(WeakWindow::new(), true)
    }

    /// Whether two handles share the same document.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.inner.state.borrow().root
    }

    /// The `<head>` element.
    pub fn head(&self) -> NodeId {
        self.inner.state.borrow().head
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.inner.state.borrow().body
    }

    /// Read-only access to the underlying tree.
    ///
    /// Do not call back into the document from `f`.
    pub fn with_dom<R>(&self, f: impl FnOnce(&Dom) -> R) -> R {
        f(&self.inner.state.borrow().dom)
    }

    /// Whether `node` exists.
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.state.borrow().dom.contains(node)
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.state.borrow().dom.is_connected(node)
    }

    /// Parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.state.borrow().dom.parent(node)
    }

    /// Children of `node`, in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.state.borrow().dom.children(node).to_vec()
    }

    /// Kind of `node`.
    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.inner.state.borrow().dom.kind(node)
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner
            .state
            .borrow_mut()
            .dom
            .insert(NodeData::element(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner.state.borrow_mut().dom.insert(NodeData::text(text))
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    ///
    /// Appending a fragment moves its children and leaves it empty. Returns
    /// `false` if either node is missing or the move would create a cycle.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        let (kind, was_connected) = {
            let state = self.inner.state.borrow();
            if !state.dom.contains(parent)
                || parent == child
                || state.dom.ancestors(parent).contains(&child)
            {
                return false;
            }
            match state.dom.kind(child) {
                Some(kind) => (kind, state.dom.is_connected(child)),
                None => return false,
            }
        };

        if kind == NodeKind::Fragment {
            for grandchild in self.children(child) {
                self.append_child(parent, grandchild);
            }
            return true;
        }

        if was_connected {
            self.disconnect_subtree(child);
        }
        if !self.inner.state.borrow_mut().dom.reparent(child, parent) {
            return false;
        }
        self.connect_subtree(child);
        true
    }

    /// Remove `node` and everything it owns, unmounting custom elements first.
    pub fn remove(&self, node: NodeId) {
        if self.is_connected(node) {
            self.disconnect_subtree(node);
        }
        // Instances are dropped after the borrow is released.
        let _dropped: Vec<Rc<dyn Lifecycle>> = {
            let mut state = self.inner.state.borrow_mut();
            let mut dropped = Vec::new();
            for id in state.dom.remove(node) {
                state.listeners.remove_target(EventTarget::Node(id));
                dropped.extend(state.instances.remove(id));
            }
            dropped
        };
    }

    /// Remove every child of `node` (the content of a template).
    pub fn clear_children(&self, node: NodeId) {
        for child in self.children(self.container_of(node)) {
            self.remove(child);
        }
    }

    /// Replace the children of `node` with parsed `markup`.
    ///
    /// Old children are unmounted and removed; new custom elements are
    /// mounted if `node` is connected.
    pub fn set_inner_html(&self, node: NodeId, markup: &str) {
        if !self.contains(node) {
            return;
        }
        self.clear_children(node);
        let target = self.container_of(node);
        let created = {
            let mut state = self.inner.state.borrow_mut();
            markup::parse_into(&mut state.dom, target, markup)
        };
        for child in created {
            self.connect_subtree(child);
        }
    }

    /// Append parsed `markup` to `<body>`.
    pub fn load_markup(&self, markup: &str) {
        let body = self.body();
        let created = {
            let mut state = self.inner.state.borrow_mut();
            markup::parse_into(&mut state.dom, body, markup)
        };
        for child in created {
            self.connect_subtree(child);
        }
    }

    /// Serialize the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        markup::inner_html(&self.inner.state.borrow().dom, node)
    }

    /// Serialize `node` including its tag.
    pub fn outer_html(&self, node: NodeId) -> String {
        markup::outer_html(&self.inner.state.borrow().dom, node)
    }

    /// Serialize `node` with its shadow trees inlined as declarative
    /// shadow roots.
    pub fn composed_html(&self, node: NodeId) -> String {
        markup::composed_html(&self.inner.state.borrow().dom, node)
    }

    /// Concatenated text of `node`'s light subtree.
    pub fn text_content(&self, node: NodeId) -> String {
        markup::text_content(&self.inner.state.borrow().dom, node)
    }

    /// Template content, or the node itself.
    fn container_of(&self, node: NodeId) -> NodeId {
        self.template_content(node).unwrap_or(node)
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// Lower-case tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        let state = self.inner.state.borrow();
        state
            .dom
            .get(node)
            .filter(|data| data.is_element())
            .map(|data| data.tag.clone())
    }

    /// Attribute value.
    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let state = self.inner.state.borrow();
        state
            .dom
            .get(node)
            .and_then(|data| data.attribute(name))
            .map(str::to_owned)
    }

    /// Set an attribute. No-op on missing nodes.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.inner.state.borrow_mut().dom.get_mut(node) {
            data.set_attribute(name, value);
        }
    }

    /// Remove an attribute.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .state
            .borrow_mut()
            .dom
            .get_mut(node)
            .and_then(|data| data.remove_attribute(name))
    }

    /// The `class` attribute, empty when unset.
    pub fn class_name(&self, node: NodeId) -> String {
        self.get_attribute(node, "class").unwrap_or_default()
    }

    /// Replace the `class` attribute.
    pub fn set_class_name(&self, node: NodeId, value: &str) {
        self.set_attribute(node, "class", value);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// First descendant of `scope` matching `selector`.
    pub fn query_selector(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorError> {
        self.inner.state.borrow().dom.query_selector(scope, selector)
    }

    /// Every descendant of `scope` matching `selector`.
    pub fn query_selector_all(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        self.inner
            .state
            .borrow()
            .dom
            .query_selector_all(scope, selector)
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        self.inner.state.borrow().dom.closest(node, selector)
    }

    /// First element in the document with the given id.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let state = self.inner.state.borrow();
        state.dom.element_by_id(state.root, id)
    }

    // -----------------------------------------------------------------------
    // Shadow roots and templates
    // -----------------------------------------------------------------------

    /// Attach an empty shadow root to `host`.
    pub fn attach_shadow(&self, host: NodeId) -> Result<NodeId, ShadowError> {
        if !self.inner.shadow_supported {
            return Err(ShadowError::NotSupported);
        }
        let mut state = self.inner.state.borrow_mut();
        if !state.dom.get(host).is_some_and(NodeData::is_element) {
            return Err(ShadowError::NotAnElement);
        }
        if state.dom.shadow_root(host).is_some() {
            return Err(ShadowError::AlreadyAttached);
        }
        let shadow = state.dom.insert(NodeData::shadow_root());
        state.dom.attach_shadow_root(host, shadow);
        Ok(shadow)
    }

    /// The shadow root attached to `host`.
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.inner.state.borrow().dom.shadow_root(host)
    }

    /// Whether this environment supports shadow roots.
    pub fn shadow_supported(&self) -> bool {
        self.inner.shadow_supported
    }

    /// The content fragment of a `<template>`.
    pub fn template_content(&self, template: NodeId) -> Option<NodeId> {
        self.inner
            .state
            .borrow()
            .dom
            .get(template)
            .and_then(|data| data.template_content)
    }

    /// Deep copy of a template's content as a new detached fragment.
    pub fn clone_template_content(&self, template: NodeId) -> Option<NodeId> {
        let content = self.template_content(template)?;
        self.inner.state.borrow_mut().dom.clone_subtree(content)
    }

    // -----------------------------------------------------------------------
    // Head
    // -----------------------------------------------------------------------

    /// Text of the `<title>` element in `<head>`.
    pub fn title(&self) -> String {
        let state = self.inner.state.borrow();
        match state.dom.query_selector(state.head, "title") {
            Ok(Some(title)) => markup::text_content(&state.dom, title),
            _ => String::new(),
        }
    }

    /// Set the document title, creating `<title>` when missing.
    pub fn set_title(&self, title: &str) {
        let head = self.head();
        let existing = self.query_selector(head, "title").ok().flatten();
        let element = existing.unwrap_or_else(|| {
            let element = self.create_element("title");
            self.append_child(head, element);
            element
        });
        self.clear_children(element);
        let text = self.create_text(title);
        self.append_child(element, text);
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Attach a listener. Returns `false` if this exact handler is already
    /// attached for the pair.
    pub fn add_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event: &str,
        handler: Handler,
    ) -> bool {
        self.inner
            .state
            .borrow_mut()
            .listeners
            .add(target.into(), event, handler)
    }

    /// Detach a listener by handler identity.
    pub fn remove_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event: &str,
        handler: &Handler,
    ) -> bool {
        self.inner
            .state
            .borrow_mut()
            .listeners
            .remove(target.into(), event, handler)
    }

    /// Number of listeners for a pair.
    pub fn listener_count(&self, target: impl Into<EventTarget>, event: &str) -> usize {
        self.inner
            .state
            .borrow()
            .listeners
            .count(target.into(), event)
    }

    /// Number of listeners across the document and window.
    pub fn total_listeners(&self) -> usize {
        self.inner.state.borrow().listeners.total()
    }

    /// Dispatch `event` at `target`, running handlers along its propagation
    /// path. Returns `false` if a handler called `prevent_default`.
    pub fn dispatch_event(&self, target: impl Into<EventTarget>, event: &Event) -> bool {
        let target = target.into();
        event.set_target(target);
        let path = propagation_path(&self.inner.state.borrow().dom, target, event.bubbles());
        trace!(event = event.name(), hops = path.len(), "dispatch");

        for hop in path {
            let handlers = self.inner.state.borrow().listeners.handlers(hop, event.name());
            event.set_current_target(Some(hop));
            for handler in handlers {
                handler(event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event.set_current_target(None);
        !event.default_prevented()
    }

    // -----------------------------------------------------------------------
    // Custom elements
    // -----------------------------------------------------------------------

    /// Register component `C` under `tag`.
    ///
    /// Defining a tag twice is a no-op that returns the existing
    /// definition. A new definition upgrades connected elements with that
    /// tag.
    pub fn define<C: Component>(&self, tag: &str) -> Result<ComponentType, RegistryError> {
        let (definition, created) = self
            .inner
            .state
            .borrow_mut()
            .registry
            .define(ComponentType::of::<C>(tag))?;
        if created {
            let root = self.root();
            self.connect_subtree(root);
        }
        Ok(definition)
    }

    /// Whether `tag` has a definition.
    pub fn is_defined(&self, tag: &str) -> bool {
        self.inner.state.borrow().registry.get(tag).is_some()
    }

    /// The definition registered under `tag`.
    pub fn get_definition(&self, tag: &str) -> Option<ComponentType> {
        self.inner.state.borrow().registry.get(tag).cloned()
    }

    /// The component instance hosted by `node`, if upgraded.
    pub fn element_instance(&self, node: NodeId) -> Option<Rc<dyn Lifecycle>> {
        self.inner.state.borrow().instances.get(node).cloned()
    }

    /// Typed handle to the component hosted by `node`.
    pub fn element<C: Component>(&self, node: NodeId) -> Option<Element<C>> {
        let instance = self.element_instance(node)?;
        instance
            .into_any()
            .downcast::<ElementInner<C>>()
            .ok()
            .map(Element::from_inner)
    }

    pub(crate) fn register_instance(&self, node: NodeId, instance: Rc<dyn Lifecycle>) {
        // A replaced instance is dropped after the borrow is released.
        let _previous = self.inner.state.borrow_mut().instances.insert(node, instance);
    }

    /// Upgrade and mount every custom element in `start`'s composed subtree.
    fn connect_subtree(&self, start: NodeId) {
        let Some(window) = self.inner.window.upgrade() else {
            return;
        };
        let nodes = {
            let state = self.inner.state.borrow();
            if !state.dom.is_connected(start) {
                return;
            }
            state.dom.walk_composed(start)
        };

        for node in nodes {
            let (instance, definition) = {
                let state = self.inner.state.borrow();
                if !state.dom.is_connected(node) {
                    continue;
                }
                match state.dom.get(node) {
                    Some(data) if data.is_element() => (
                        state.instances.get(node).cloned(),
                        state.registry.get(&data.tag).cloned(),
                    ),
                    _ => continue,
                }
            };
            let instance = match (instance, definition) {
                (Some(instance), _) => instance,
                (None, Some(definition)) => {
                    debug!(tag = definition.tag(), "upgrading element");
                    definition.upgrade(&window, node)
                }
                (None, None) => continue,
            };
            if !instance.is_mounted() && self.is_connected(node) {
                instance.mount();
            }
        }
    }

    /// Unmount every mounted instance in `start`'s composed subtree.
    fn disconnect_subtree(&self, start: NodeId) {
        let instances: Vec<Rc<dyn Lifecycle>> = {
            let state = self.inner.state.borrow();
            state
                .dom
                .walk_composed(start)
                .into_iter()
                .filter_map(|node| state.instances.get(node).cloned())
                .collect()
        };
        for instance in instances {
            if instance.is_mounted() {
                instance.unmount();
            }
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Document")
            .field("nodes", &state.dom.len())
            .field("instances", &state.instances.len())
            .field("listeners", &state.listeners)
            .field("shadow_supported", &self.inner.shadow_supported)
            .finish()
    }
}
