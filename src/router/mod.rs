//! Client-side router: path → deferred component, mounted into a layout.
//!
//! The router listens on the window for [`NAVIGATE`] (push a history entry,
//! then render) and [`POPSTATE`] (render the current location). Rendering a
//! path loads the route's module, clones the route's layout template into
//! the application root, and mounts the module's component into the
//! layout's content slot. Failures render a placeholder instead.
//!
//! Event-triggered renders run as tasks on the current
//! [`LocalSet`](tokio::task::LocalSet). Concurrent renders are not
//! cancelled: whichever finishes loading last mounts last.

pub mod head;
pub mod route;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::event::{Event, Handler, NavigateDetail, NAVIGATE, POPSTATE};
use crate::runtime;
use crate::window::Window;

pub use route::{LoadError, LoadFuture, Loader, Module, Route, Routes};

/// Markup shown when no route matches.
pub const NOT_FOUND_MARKUP: &str = "<div>Page not found</div>";
/// Markup shown when a route's component or layout is unusable.
pub const INVALID_ROUTE_MARKUP: &str = "<div>Error: Invalid component or layout</div>";
/// Markup shown when a route's module fails to load.
pub const LOAD_ERROR_MARKUP: &str = "<div>Error loading page</div>";

/// How a render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The route's component was mounted into its layout.
    Mounted,
    /// No route for the path; the not-found placeholder is shown.
    NotFound,
    /// The module or layout was unusable; the error placeholder is shown.
    InvalidComponentOrLayout,
    /// The loader failed; the load-error placeholder is shown.
    LoadFailed,
}

/// Why a loaded route could not be mounted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("module has no default component")]
    MissingDefaultExport,

    #[error("`{0}` is not a defined custom element")]
    Undefined(String),

    #[error("`{tag}` is defined as `{registered}`, not `{exported}`")]
    Mismatch {
        tag: String,
        registered: &'static str,
        exported: &'static str,
    },

    #[error("layout template `#{0}` not found")]
    MissingLayout(String),

    #[error("layout `{layout}` has no `#{slot}` slot")]
    MissingSlot { layout: String, slot: String },

    #[error("application root `#{0}` not found")]
    MissingRoot(String),
}

struct RouterInner {
    window: Window,
    routes: Routes,
    current: RefCell<Option<String>>,
    listening: Cell<bool>,
    in_flight: Cell<usize>,
    handlers: RefCell<Vec<(&'static str, Handler)>>,
}

/// Shared handle to the router. Cloning shares state.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Create a router over `routes`. Nothing happens until
    /// [`init`](Self::init).
    pub fn new(window: &Window, routes: Routes) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                window: window.clone(),
                routes,
                current: RefCell::new(None),
                listening: Cell::new(false),
                in_flight: Cell::new(0),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The window.
    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    /// The route table.
    pub fn routes(&self) -> &Routes {
        &self.inner.routes
    }

    /// Path of the route mounted last, or `None` if the last render showed a
    /// placeholder.
    pub fn current_route(&self) -> Option<String> {
        self.inner.current.borrow().clone()
    }

    /// Number of event-triggered renders that have not finished.
    pub fn pending_renders(&self) -> usize {
        self.inner.in_flight.get()
    }

    /// Whether window listeners are attached.
    pub fn is_listening(&self) -> bool {
        self.inner.listening.get()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Attach the window listeners, then render the current location.
    ///
    /// Navigation events spawn local tasks, so run it inside a
    /// [`LocalSet`](tokio::task::LocalSet); elsewhere they only update the
    /// location. Calling it again only re-renders.
    pub async fn init(&self) -> RouteOutcome {
        self.listen();
        let path = self.inner.window.location_path();
        self.resolve_and_mount(&path).await
    }

    /// Spawn [`init`](Self::init) on the current `LocalSet`.
    pub fn start(&self) -> JoinHandle<RouteOutcome> {
        let router = self.clone();
        tokio::task::spawn_local(async move { router.init().await })
    }

    /// Detach the window listeners.
    pub fn stop(&self) {
        let handlers = std::mem::take(&mut *self.inner.handlers.borrow_mut());
        for (event, handler) in &handlers {
            self.inner.window.remove_event_listener(event, handler);
        }
        self.inner.listening.set(false);
    }

    fn listen(&self) {
        if self.inner.listening.replace(true) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let on_navigate: Handler = Rc::new(move |event: &Event| {
            let Some(detail) = event.detail::<NavigateDetail>() else {
                warn!("navigate event without a path");
                return;
            };
            if let Some(router) = Self::upgrade(&weak) {
                router.inner.window.push_state(&detail.path);
                router.spawn_render(detail.path.clone());
            }
        });

        let weak = Rc::downgrade(&self.inner);
        let on_popstate: Handler = Rc::new(move |_: &Event| {
            if let Some(router) = Self::upgrade(&weak) {
                let path = router.inner.window.location_path();
                router.spawn_render(path);
            }
        });

        for (event, handler) in [(NAVIGATE, on_navigate), (POPSTATE, on_popstate)] {
            self.inner
                .window
                .add_event_listener(event, handler.clone());
            self.inner.handlers.borrow_mut().push((event, handler));
        }
    }

    fn upgrade(weak: &Weak<RouterInner>) -> Option<Router> {
        weak.upgrade().map(|inner| Router { inner })
    }

    /// Outside a `LocalSet` the render is dropped with an error; the
    /// location is already current, so the next [`init`](Self::init)
    /// renders it.
    fn spawn_render(&self, path: String) {
        let router = self.clone();
        let in_flight = &self.inner.in_flight;
        in_flight.set(in_flight.get() + 1);
        let task = {
            let path = path.clone();
            async move {
                router.resolve_and_mount(&path).await;
                let in_flight = &router.inner.in_flight;
                in_flight.set(in_flight.get().saturating_sub(1));
            }
        };
        // tokio offers no non-panicking spawn_local.
        let spawned = panic::catch_unwind(AssertUnwindSafe(|| tokio::task::spawn_local(task)));
        if spawned.is_err() {
            in_flight.set(in_flight.get().saturating_sub(1));
            error!(path, "no LocalSet to render on, render skipped");
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Push `path` onto the history and render it.
    pub async fn navigate(&self, path: &str) -> RouteOutcome {
        self.inner.window.push_state(path);
        self.resolve_and_mount(path).await
    }

    /// Render `path`: mount its route, or show a placeholder.
    ///
    /// Drains the microtask queue before returning, so updates scheduled by
    /// the mounted component have been applied.
    pub async fn resolve_and_mount(&self, path: &str) -> RouteOutcome {
        let outcome = match self.inner.routes.get(path).cloned() {
            None => {
                debug!(path, "no route for path");
                self.render_placeholder(NOT_FOUND_MARKUP, "page_not_found", "page_not_found_description");
                RouteOutcome::NotFound
            }
            Some(route) => match route.load(&self.inner.window).await {
                Err(err) => {
                    error!(path, %err, "error loading page");
                    self.render_placeholder(LOAD_ERROR_MARKUP, "error", "error_loading_page");
                    RouteOutcome::LoadFailed
                }
                Ok(module) => match self.mount(&route, &module) {
                    Ok(()) => {
                        debug!(path, layout = %route.layout, "route mounted");
                        RouteOutcome::Mounted
                    }
                    Err(err) => {
                        error!(path, %err, "invalid component or layout");
                        self.render_placeholder(
                            INVALID_ROUTE_MARKUP,
                            "error",
                            "error_invalid_component_or_layout",
                        );
                        RouteOutcome::InvalidComponentOrLayout
                    }
                },
            },
        };
        *self.inner.current.borrow_mut() =
            (outcome == RouteOutcome::Mounted).then(|| path.to_owned());
        runtime::perform_microtask_checkpoint();
        outcome
    }

    fn mount(&self, route: &Route, module: &Module) -> Result<(), MountError> {
        let window = &self.inner.window;
        let document = window.document();
        let config = window.config();

        let exported = module
            .default_export()
            .ok_or(MountError::MissingDefaultExport)?;
        let component = document
            .get_definition(exported.tag())
            .ok_or_else(|| MountError::Undefined(exported.tag().to_owned()))?;
        if !component.same_component(exported) {
            return Err(MountError::Mismatch {
                tag: component.tag().to_owned(),
                registered: component.type_name(),
                exported: exported.type_name(),
            });
        }
        let template = document
            .get_element_by_id(&route.layout)
            .filter(|&node| document.tag_name(node).as_deref() == Some("template"))
            .ok_or_else(|| MountError::MissingLayout(route.layout.clone()))?;
        let app = document
            .get_element_by_id(&config.root_id)
            .ok_or_else(|| MountError::MissingRoot(config.root_id.clone()))?;
        let layout = document
            .clone_template_content(template)
            .ok_or_else(|| MountError::MissingLayout(route.layout.clone()))?;
        let Some(slot) = document.with_dom(|dom| dom.element_by_id(layout, &config.content_slot))
        else {
            document.remove(layout);
            return Err(MountError::MissingSlot {
                layout: route.layout.clone(),
                slot: config.content_slot.clone(),
            });
        };

        document.clear_children(app);
        document.append_child(app, layout);
        document.remove(layout);
        let host = component.instantiate(window);
        document.append_child(slot, host);
        document.set_class_name(app, &route.layout);

        let i18n = window.i18n();
        let title = i18n.t(route.title.as_deref().unwrap_or(component.type_name()));
        let description = i18n.t(route.description.as_deref().unwrap_or(""));
        head::set_title(document, &config.title, &title);
        head::set_description(document, &description);
        Ok(())
    }

    fn render_placeholder(&self, markup: &str, title_key: &str, description_key: &str) {
        let window = &self.inner.window;
        let document = window.document();
        let config = window.config();
        match document.get_element_by_id(&config.root_id) {
            Some(app) => document.set_inner_html(app, markup),
            None => error!(root = %config.root_id, "application root not found"),
        }
        head::set_title(document, &config.title, &window.i18n().t(title_key));
        head::set_description(document, &window.i18n().t(description_key));
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.inner.routes.paths())
            .field("current", &self.inner.current.borrow())
            .field("listening", &self.inner.listening.get())
            .finish()
    }
}
