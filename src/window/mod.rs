//! The window: process-wide context for one running application.
//!
//! A [`Window`] owns the [`Document`], the session [`History`], the
//! translation lookup, and the configuration. It is created once at startup
//! and handed to (or weakly referenced by) everything else.

pub mod history;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::config::AppConfig;
use crate::dom::Document;
use crate::event::{Event, EventTarget, Handler, POPSTATE};
use crate::i18n::I18n;
use crate::runtime;

pub use history::History;

pub(crate) struct WindowInner {
    document: Document,
    history: RefCell<History>,
    i18n: I18n,
    config: AppConfig,
}

/// Shared handle to the window. Cloning shares state.
#[derive(Clone)]
pub struct Window {
    inner: Rc<WindowInner>,
}

/// Non-owning handle to a [`Window`].
#[derive(Clone, Default)]
pub struct WeakWindow(Weak<WindowInner>);

impl WeakWindow {
    /// A handle that never upgrades.
    pub fn new() -> Self {
        Self(Weak::new())
    }

    /// The window, if it is still alive.
    pub fn upgrade(&self) -> Option<Window> {
        self.0.upgrade().map(|inner| Window { inner })
    }
}

impl fmt::Debug for WeakWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakWindow")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

impl Window {
    /// Create a window with an empty document.
    pub fn new(config: AppConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<WindowInner>| WindowInner {
            document: Document::new(WeakWindow(weak.clone()), config.shadow_dom),
            history: RefCell::new(History::new(config.initial_path.clone())),
            i18n: I18n::with_stored_language(&config.default_language),
            config: config.clone(),
        });
        Self { inner }
    }

    /// Create a window and load `markup` into the body.
    pub fn with_markup(config: AppConfig, markup: &str) -> Self {
        let window = Self::new(config);
        window.document().load_markup(markup);
        window
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakWindow {
        WeakWindow(Rc::downgrade(&self.inner))
    }

    /// Whether two handles share the same window.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// The translation lookup.
    pub fn i18n(&self) -> &I18n {
        &self.inner.i18n
    }

    /// The configuration.
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    // -----------------------------------------------------------------------
    // Location and history
    // -----------------------------------------------------------------------

    /// The current path.
    pub fn location_path(&self) -> String {
        self.inner.history.borrow().current().to_owned()
    }

    /// Number of history entries.
    pub fn history_len(&self) -> usize {
        self.inner.history.borrow().len()
    }

    /// Push a history entry. Does not dispatch `popstate`.
    pub fn push_state(&self, path: &str) {
        debug!(path, "push state");
        self.inner.history.borrow_mut().push(path);
    }

    /// Go back one entry.
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Go forward one entry.
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Move through history by `delta` entries and dispatch `popstate` as a
    /// task. Returns `false` if the move was out of range.
    pub fn go(&self, delta: isize) -> bool {
        let moved = self.inner.history.borrow_mut().go(delta);
        if moved {
            debug!(path = %self.location_path(), "history traversal");
            self.run_task(|| self.dispatch_event(&Event::new(POPSTATE)));
        }
        moved
    }

    // -----------------------------------------------------------------------
    // Events and tasks
    // -----------------------------------------------------------------------

    /// Attach a window listener.
    pub fn add_event_listener(&self, event: &str, handler: Handler) -> bool {
        self.document()
            .add_event_listener(EventTarget::Window, event, handler)
    }

    /// Detach a window listener.
    pub fn remove_event_listener(&self, event: &str, handler: &Handler) -> bool {
        self.document()
            .remove_event_listener(EventTarget::Window, event, handler)
    }

    /// Number of window listeners for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.document().listener_count(EventTarget::Window, event)
    }

    /// Dispatch `event` on the window.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        self.document().dispatch_event(EventTarget::Window, event)
    }

    /// Run `f` as a task: run it, then drain the microtask queue.
    pub fn run_task<R>(&self, f: impl FnOnce() -> R) -> R {
        let result = f();
        runtime::perform_microtask_checkpoint();
        result
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("location", &self.location_path())
            .field("document", &self.inner.document)
            .field("i18n", &self.inner.i18n)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn starts_at_initial_path() {
        let window = Window::new(AppConfig::default().with_initial_path("/layout-alt"));
        assert_eq!(window.location_path(), "/layout-alt");
        assert_eq!(window.history_len(), 1);
    }

    #[test]
    fn push_state_does_not_dispatch() {
        let window = Window::new(AppConfig::default());
        let pops = Rc::new(Cell::new(0));
        let p = pops.clone();
        window.add_event_listener(POPSTATE, Rc::new(move |_: &Event| p.set(p.get() + 1)));
        window.push_state("/a");
        assert_eq!(window.location_path(), "/a");
        assert_eq!(pops.get(), 0);
    }

    #[test]
    fn traversal_dispatches_popstate_without_pushing() {
        let window = Window::new(AppConfig::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (w, s) = (window.downgrade(), seen.clone());
        window.add_event_listener(
            POPSTATE,
            Rc::new(move |_: &Event| {
                if let Some(w) = w.upgrade() {
                    s.borrow_mut().push(w.location_path());
                }
            }),
        );
        window.push_state("/a");
        assert!(window.back());
        assert!(!window.back());
        assert!(window.forward());
        assert_eq!(*seen.borrow(), vec!["/".to_owned(), "/a".to_owned()]);
        assert_eq!(window.history_len(), 2);
    }

    #[test]
    fn run_task_drains_microtasks() {
        let window = Window::new(AppConfig::default());
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        let value = window.run_task(|| {
            runtime::queue_microtask(move || r.set(true));
            42
        });
        assert_eq!(value, 42);
        assert!(ran.get());
    }

    #[test]
    fn weak_window_upgrades_while_alive() {
        let window = Window::new(AppConfig::default());
        let weak = window.downgrade();
        assert!(weak.upgrade().is_some_and(|w| w.ptr_eq(&window)));
        drop(window);
        assert!(weak.upgrade().is_none());
        assert!(WeakWindow::new().upgrade().is_none());
    }

    #[test]
    fn with_markup_loads_body() {
        let window = Window::with_markup(AppConfig::default(), r#"<div id="app"></div>"#);
        assert!(window.document().get_element_by_id("app").is_some());
    }

    #[test]
    fn default_language_is_applied() {
        let window = Window::new(AppConfig::default().with_default_language("xx"));
        assert_eq!(window.i18n().current_language(), "en");
    }
}
