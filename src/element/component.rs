//! The `Component` trait: what a custom element type provides.

use super::scope::Scope;

/// Where a component's rendered markup goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Render into the host element's own children.
    #[default]
    Light,
    /// Render into a shadow root attached to the host. Falls back to
    /// [`Light`](Self::Light) with a warning where shadow roots are
    /// unavailable.
    Isolated,
}

/// A custom element type.
///
/// Implementors hold their state (typically [`Reactive`](crate::reactive::Reactive)
/// cells created through the scope) and describe their markup. The element
/// wrapper owns the lifecycle: it calls [`render`](Self::render) whenever an
/// update runs and only touches the document when the output changed.
///
/// Every method receives the element's [`Scope`], the component's handle
/// to its host, document, and listener bookkeeping.
pub trait Component: Sized + 'static {
    /// Light or isolated rendering. Chosen per type.
    const RENDER_MODE: RenderMode = RenderMode::Light;

    /// Construct the component. Runs once per element, before mounting.
    fn create(cx: &Scope<Self>) -> Self;

    /// Produce the element's markup from its current state.
    ///
    /// Must be free of side effects; it may run any number of times.
    fn render(&self, _cx: &Scope<Self>) -> String {
        String::new()
    }

    /// Install listeners on the rendered content, typically through
    /// [`Scope::add_event_listener_with_cleanup`]. Runs after every applied
    /// update and once more on mount.
    fn add_event_listeners(&self, _cx: &Scope<Self>) {}

    /// Called after the element is mounted and first rendered.
    fn connected(&self, _cx: &Scope<Self>) {}

    /// Called when the element leaves the document, before its listeners are
    /// released.
    fn disconnected(&self, _cx: &Scope<Self>) {}
}
