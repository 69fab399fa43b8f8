//! Pilot: programmatic interaction with a headless site.
//!
//! The `Pilot` owns a window, a router, and a single-threaded tokio runtime
//! with a `LocalSet`, so event-triggered navigations spawn and complete
//! without a real browser loop. Every interaction runs as a task and then
//! settles: pending renders finish and the microtask queue drains.

use std::future::Future;

use tokio::runtime::{Builder, Runtime};
use tokio::task::LocalSet;
use tracing::warn;

use crate::components;
use crate::config::AppConfig;
use crate::dom::{Document, NodeId, SelectorList};
use crate::element::RegistryError;
use crate::event::{Event, NavigateDetail, CLICK, NAVIGATE};
use crate::router::{head, RouteOutcome, Router, Routes};
use crate::runtime;
use crate::window::Window;

/// Upper bound on scheduler turns [`Pilot::settle`] waits for renders.
const MAX_SETTLE_TURNS: usize = 64;

/// Errors building a [`Pilot`].
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error("failed to build runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless site driver for testing.
///
/// # Examples
///
/// ```
/// use dim::router::RouteOutcome;
/// use dim::testing::Pilot;
///
/// let pilot = Pilot::site().unwrap();
/// assert_eq!(pilot.start(), RouteOutcome::Mounted);
/// pilot.navigate("/layout-alt");
/// assert_eq!(pilot.location(), "/layout-alt");
/// ```
pub struct Pilot {
    window: Window,
    router: Router,
    local: LocalSet,
    runtime: Runtime,
}

impl Pilot {
    /// Create a window with `markup` in its body and a router over `routes`.
    pub fn new(config: AppConfig, markup: &str, routes: Routes) -> Result<Self, PilotError> {
        let runtime = Builder::new_current_thread().build()?;
        let window = Window::with_markup(config, markup);
        let router = Router::new(&window, routes);
        Ok(Self {
            window,
            router,
            local: LocalSet::new(),
            runtime,
        })
    }

    /// The demo site with the default configuration.
    pub fn site() -> Result<Self, PilotError> {
        Self::site_with(AppConfig::default())
    }

    /// The demo site with `config`.
    pub fn site_with(config: AppConfig) -> Result<Self, PilotError> {
        let pilot = Self::new(config, components::INDEX_MARKUP, components::routes())?;
        components::install(&pilot.window)?;
        Ok(pilot)
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Run `future` to completion inside the pilot's `LocalSet`.
    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(self.local.run_until(future))
    }

    /// Initialize the router and render the current location.
    pub fn start(&self) -> RouteOutcome {
        let outcome = self.run(self.router.init());
        self.settle();
        outcome
    }

    /// Let spawned renders finish, then drain microtasks.
    pub fn settle(&self) {
        let router = &self.router;
        self.run(async {
            for _ in 0..MAX_SETTLE_TURNS {
                if router.pending_renders() == 0 {
                    break;
                }
                tokio::task::yield_now().await;
            }
        });
        runtime::perform_microtask_checkpoint();
    }

    /// Run `f` as a task inside the `LocalSet`, then settle.
    pub fn task<R>(&self, f: impl FnOnce(&Window) -> R) -> R {
        let result = self.run(async { self.window.run_task(|| f(&self.window)) });
        self.settle();
        result
    }

    /// Dispatch a `navigate` event for `path` on the window.
    pub fn navigate(&self, path: &str) {
        self.task(|window| {
            window.dispatch_event(&Event::new(NAVIGATE).with_detail(NavigateDetail::new(path)))
        });
    }

    /// Go back one history entry.
    pub fn back(&self) -> bool {
        self.task(Window::back)
    }

    /// Go forward one history entry.
    pub fn forward(&self) -> bool {
        self.task(Window::forward)
    }

    /// Switch the language.
    pub fn set_language(&self, lang: &str) {
        self.task(|window| window.i18n().set_language(lang));
    }

    /// Click the first element matching `selector`, searching shadow trees
    /// too. Returns `false` if nothing matched.
    pub fn click(&self, selector: &str) -> bool {
        let Some(node) = self.find(selector) else {
            warn!(selector, "click target not found");
            return false;
        };
        self.task(|window| {
            window
                .document()
                .dispatch_event(node, &Event::new(CLICK).bubbling())
        });
        true
    }

    /// First element matching `selector` in composed tree order.
    pub fn find(&self, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector).ok()?;
        self.document().with_dom(|dom| {
            let root = dom.root()?;
            dom.walk_composed(root)
                .into_iter()
                .find(|&node| list.matches(dom, node))
        })
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// The window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The document.
    pub fn document(&self) -> &Document {
        self.window.document()
    }

    /// The router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The application root.
    pub fn app(&self) -> Option<NodeId> {
        self.document()
            .get_element_by_id(&self.window.config().root_id)
    }

    /// Light markup of the application root.
    pub fn html(&self) -> String {
        self.app()
            .map(|app| self.document().inner_html(app))
            .unwrap_or_default()
    }

    /// Markup of the application root with shadow trees inlined.
    pub fn composed_html(&self) -> String {
        self.app()
            .map(|app| self.document().composed_html(app))
            .unwrap_or_default()
    }

    /// The document title.
    pub fn title(&self) -> String {
        self.document().title()
    }

    /// The page description.
    pub fn description(&self) -> Option<String> {
        head::description(self.document())
    }

    /// The current path.
    pub fn location(&self) -> String {
        self.window.location_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_mounts_initial_path() {
        let pilot = Pilot::site().unwrap();
        assert_eq!(pilot.start(), RouteOutcome::Mounted);
        assert!(pilot.router().is_listening());
        assert!(pilot.html().contains("<start-page>"));
        assert_eq!(pilot.title(), "Start | dim");
        assert_eq!(
            pilot.description().as_deref(),
            Some("A starting point for dim sites.")
        );
    }

    #[test]
    fn navigate_event_renders_and_pushes() {
        let pilot = Pilot::site().unwrap();
        pilot.start();
        pilot.navigate("/layout-alt");
        assert_eq!(pilot.router().pending_renders(), 0);
        assert_eq!(pilot.location(), "/layout-alt");
        assert_eq!(pilot.window().history_len(), 2);
        assert!(pilot.html().contains("<layout-alt-page>"));
        assert_eq!(pilot.router().current_route().as_deref(), Some("/layout-alt"));
    }

    #[test]
    fn find_searches_shadow_trees() {
        let pilot = Pilot::site().unwrap();
        pilot.start();
        let anchor = pilot.find("a[href=\"/layout-alt\"]").unwrap();
        assert!(pilot.document().is_connected(anchor));
        assert!(pilot.find("a.missing").is_none());
        assert!(pilot.find("[[").is_none());
        assert!(!pilot.click("a.missing"));
    }

    #[test]
    fn unknown_path_shows_not_found() {
        let config = AppConfig::default().with_initial_path("/nope");
        let pilot = Pilot::site_with(config).unwrap();
        assert_eq!(pilot.start(), RouteOutcome::NotFound);
        assert_eq!(pilot.html(), crate::router::NOT_FOUND_MARKUP);
    }
}
