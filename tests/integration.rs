//! Integration tests for dim.
//!
//! These tests exercise the public API from outside the crate, verifying that
//! elements, the router, and the demo site work together correctly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dim::components::{self, AppSidebar, LayoutAltPage};
use dim::element::{Component, Element, Scope};
use dim::event::{Event, NavigateDetail, CLICK, NAVIGATE, SET_SIDEBAR_CONTENT};
use dim::html::{html, style_map};
use dim::i18n::I18n;
use dim::reactive::Reactive;
use dim::router::{LoadError, Module, Route, RouteOutcome, Router, Routes};
use dim::runtime::perform_microtask_checkpoint;
use dim::testing::{tag_lines, Pilot};
use dim::{AppConfig, Window};
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;
use tokio::task::LocalSet;

// ---------------------------------------------------------------------------
// Test components
// ---------------------------------------------------------------------------

/// A button whose label is reactive. Counts renders and clicks.
struct Toggle {
    label: Reactive<String>,
    renders: Cell<u32>,
    clicks: Cell<u32>,
}

impl Component for Toggle {
    fn create(cx: &Scope<Self>) -> Self {
        Toggle {
            label: cx.reactive("label", "off".to_owned()),
            renders: Cell::new(0),
            clicks: Cell::new(0),
        }
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        self.renders.set(self.renders.get() + 1);
        html(&["<button>", "</button>"], &[&self.label.get()])
    }

    fn add_event_listeners(&self, cx: &Scope<Self>) {
        cx.add_event_listener_with_cleanup("button", CLICK, |this: &Toggle, _| {
            this.clicks.set(this.clicks.get() + 1);
        });
    }
}

/// Installs two handlers for the same (element, event) pair.
struct Twice {
    hits: RefCell<Vec<&'static str>>,
}

impl Component for Twice {
    fn create(_cx: &Scope<Self>) -> Self {
        Twice {
            hits: RefCell::new(Vec::new()),
        }
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        "<button>go</button>".to_owned()
    }

    fn add_event_listeners(&self, cx: &Scope<Self>) {
        cx.add_event_listener_with_cleanup("button", CLICK, |this: &Twice, _| {
            this.hits.borrow_mut().push("first");
        });
        cx.add_event_listener_with_cleanup("button", CLICK, |this: &Twice, _| {
            this.hits.borrow_mut().push("second");
        });
    }
}

/// A page that renders its own tag name.
struct Page;

impl Component for Page {
    fn create(_cx: &Scope<Self>) -> Self {
        Page
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        "<p>page</p>".to_owned()
    }
}

struct OtherPage;

impl Component for OtherPage {
    fn create(_cx: &Scope<Self>) -> Self {
        OtherPage
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        "<p>other</p>".to_owned()
    }
}

fn mounted<C: Component>(window: &Window, tag: &str) -> Element<C> {
    let element = Element::<C>::create(window, tag);
    let document = window.document();
    document.append_child(document.body(), element.host());
    element
}

fn click(window: &Window, node: dim::dom::NodeId) {
    window
        .document()
        .dispatch_event(node, &Event::new(CLICK).bubbling());
}

const LAYOUT_MARKUP: &str = concat!(
    r#"<template id="L"><section><div id="app-content"></div></section></template>"#,
    r#"<div id="app"></div>"#,
);

async fn define<C: Component>(window: Window, tag: &'static str) -> Result<Module, LoadError> {
    window
        .document()
        .define::<C>(tag)
        .map(Module::new)
        .map_err(|err| LoadError::Failed(err.to_string()))
}

// ---------------------------------------------------------------------------
// Element lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_writes_in_one_turn_update_once() {
    let window = Window::new(AppConfig::default());
    let element = mounted::<Toggle>(&window, "x-toggle");
    let before = element.component().renders.get();
    for n in 0..10 {
        element.component().label.set(format!("v{n}"));
    }
    perform_microtask_checkpoint();
    assert_eq!(element.component().renders.get(), before + 1);
    assert_eq!(
        window.document().inner_html(element.host()),
        "<button>v9</button>"
    );
}

#[test]
fn test_unchanged_render_keeps_content() {
    let window = Window::new(AppConfig::default());
    let element = mounted::<Toggle>(&window, "x-toggle");
    let scope = element.scope();
    let first = scope.query_selector("button").unwrap();

    element.component().label.set("off".to_owned());
    perform_microtask_checkpoint();
    assert_eq!(scope.query_selector("button"), Some(first));

    element.component().label.set("on".to_owned());
    perform_microtask_checkpoint();
    let second = scope.query_selector("button").unwrap();
    assert_ne!(second, first);
    assert!(!window.document().contains(first));

    // listeners were reinstalled on the new content
    assert_eq!(element.listener_count(), 1);
    assert_eq!(window.document().listener_count(second, CLICK), 1);
    click(&window, second);
    assert_eq!(element.component().clicks.get(), 1);
}

#[test]
fn test_listener_with_cleanup_keeps_latest() {
    let window = Window::new(AppConfig::default());
    let element = mounted::<Twice>(&window, "x-twice");
    let button = element.scope().query_selector("button").unwrap();
    assert_eq!(element.listener_count(), 1);
    assert_eq!(window.document().listener_count(button, CLICK), 1);
    click(&window, button);
    assert_eq!(*element.component().hits.borrow(), vec!["second"]);
}

#[test]
fn test_unmount_releases_listeners() {
    let window = Window::new(AppConfig::default());
    let element = mounted::<Toggle>(&window, "x-toggle");
    let button = element.scope().query_selector("button").unwrap();
    assert_eq!(window.i18n().subscriber_count(), 1);

    window.document().remove(element.host());
    assert!(!element.is_mounted());
    assert_eq!(element.listener_count(), 0);
    assert_eq!(window.document().total_listeners(), 0);
    assert_eq!(window.i18n().subscriber_count(), 0);

    click(&window, button);
    assert_eq!(element.component().clicks.get(), 0);
}

#[test]
fn test_update_after_unmount_is_skipped() {
    let window = Window::new(AppConfig::default());
    let element = mounted::<Toggle>(&window, "x-toggle");
    let before = element.component().renders.get();
    element.component().label.set("on".to_owned());
    window.document().remove(element.host());
    perform_microtask_checkpoint();
    assert_eq!(element.component().renders.get(), before);
    assert!(!element.update_pending());
}

// ---------------------------------------------------------------------------
// Translation, markup helpers
// ---------------------------------------------------------------------------

#[test]
fn test_translation_lookup() {
    let i18n = I18n::new();
    i18n.add_translations_json("en", r#"{"a": {"b": "X"}}"#).unwrap();
    assert_eq!(i18n.t("a.b"), "X");
    assert_eq!(i18n.t("no.such.key"), "no.such.key");
    assert_eq!(i18n.t("a"), "a");
}

#[test]
fn test_style_map_and_html() {
    assert_eq!(
        style_map([("color", "red"), ("fontSize", "14px")]),
        "color: red; fontSize: 14px"
    );
    let missing: Option<String> = None;
    assert_eq!(html(&["<a>", "</a>"], &[&missing]), "<a></a>");
    assert_eq!(dim::html!("<a>", missing, "</a>"), "<a></a>");
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[test]
fn test_router_mounts_into_layout() {
    let routes = Routes::new().route("/", Route::new(|w| define::<Page>(w, "x-page"), "L"));
    let pilot = Pilot::new(AppConfig::default(), LAYOUT_MARKUP, routes).unwrap();
    assert_eq!(pilot.start(), RouteOutcome::Mounted);
    let app = pilot.app().unwrap();
    assert_eq!(pilot.document().class_name(app), "L");
    assert_eq!(
        pilot.html(),
        r#"<section><div id="app-content"><x-page><p>page</p></x-page></div></section>"#
    );
    assert_eq!(pilot.title(), "Page | dim");
}

#[test]
fn test_router_unknown_path() {
    let pilot = Pilot::new(AppConfig::default(), LAYOUT_MARKUP, Routes::new()).unwrap();
    pilot.start();
    pilot.navigate("/missing");
    assert_eq!(pilot.html(), "<div>Page not found</div>");
    assert_eq!(pilot.title(), "Page Not Found | dim");
    assert_eq!(
        pilot.description().as_deref(),
        Some("The requested page could not be found.")
    );
}

#[test]
fn test_router_loader_rejects() {
    let routes = Routes::new().route(
        "/",
        Route::new(|_| async { Err(LoadError::Failed("boom".into())) }, "L"),
    );
    let pilot = Pilot::new(AppConfig::default(), LAYOUT_MARKUP, routes).unwrap();
    assert_eq!(pilot.start(), RouteOutcome::LoadFailed);
    assert_eq!(pilot.html(), "<div>Error loading page</div>");
    assert_eq!(pilot.title(), "Error | dim");
    assert_eq!(pilot.description().as_deref(), Some("Error loading page"));
}

#[test]
fn test_config_title_is_title_base() {
    let config = AppConfig::from_env_str("APP_TITLE=Docs\n");
    let routes = Routes::new().route(
        "/",
        Route::new(|w| define::<Page>(w, "x-page"), "L").with_title("Home"),
    );
    let pilot = Pilot::new(config, LAYOUT_MARKUP, routes).unwrap();
    pilot.start();
    assert_eq!(pilot.title(), "Home | Docs");
}

#[tokio::test]
async fn test_overlapping_navigations_last_load_wins() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let window = Window::with_markup(AppConfig::default(), LAYOUT_MARKUP);
            let (release, gate) = oneshot::channel::<()>();
            let gate = Rc::new(RefCell::new(Some(gate)));
            let routes = Routes::new()
                .route(
                    "/slow",
                    Route::new(
                        move |w| {
                            let gate = gate.borrow_mut().take();
                            async move {
                                if let Some(gate) = gate {
                                    let _ = gate.await;
                                }
                                define::<Page>(w, "x-page").await
                            }
                        },
                        "L",
                    ),
                )
                .route("/fast", Route::new(|w| define::<OtherPage>(w, "x-other"), "L"));
            let router = Router::new(&window, routes);
            router.init().await;

            for path in ["/slow", "/fast"] {
                window.run_task(|| {
                    window.dispatch_event(
                        &Event::new(NAVIGATE).with_detail(NavigateDetail::new(path)),
                    )
                });
            }
            assert_eq!(router.pending_renders(), 2);
            while router.pending_renders() > 1 {
                tokio::task::yield_now().await;
            }
            let document = window.document();
            let app = document.get_element_by_id("app").unwrap();
            assert!(document.inner_html(app).contains("<x-other>"));
            assert_eq!(window.location_path(), "/fast");

            release.send(()).unwrap();
            while router.pending_renders() > 0 {
                tokio::task::yield_now().await;
            }
            // the slower load finished last and replaced the newer page
            assert!(document.inner_html(app).contains("<x-page>"));
            assert_eq!(router.current_route().as_deref(), Some("/slow"));
            assert_eq!(window.location_path(), "/fast");
        })
        .await;
}

// ---------------------------------------------------------------------------
// Demo site
// ---------------------------------------------------------------------------

#[test]
fn test_site_start_page() {
    let pilot = Pilot::site().unwrap();
    assert_eq!(pilot.start(), RouteOutcome::Mounted);
    insta::assert_snapshot!(tag_lines(&pilot.html()), @r#"
    <app-header>
    </app-header>
    <main id="app-content" class="container">
    <start-page>
    <section class="start-page container">
    <h1>
    Edit me
    </h1>
    <p>
    Change the content of this page in
    <code>
    src/components/pages.rs
    </code>
    .
    </p>
    </section>
    </start-page>
    </main>
    <app-footer>
    </app-footer>
    "#);
}

#[test]
fn test_site_header_link_navigates() {
    let pilot = Pilot::site().unwrap();
    pilot.start();
    assert!(pilot.click("a[href=\"/layout-alt\"]"));
    assert_eq!(pilot.location(), "/layout-alt");
    assert_eq!(pilot.title(), "Alternative Layout | dim");
    let app = pilot.app().unwrap();
    assert_eq!(pilot.document().class_name(app), "alternate-layout");

    // the page filled the sidebar slot when it connected
    let sidebar = pilot.find(AppSidebar::TAG).unwrap();
    let root = pilot.document().shadow_root(sidebar).unwrap();
    let slot = pilot.document().query_selector(root, "slot").unwrap().unwrap();
    assert_eq!(
        pilot.document().inner_html(slot),
        LayoutAltPage::sidebar_content()
    );
    assert!(pilot.composed_html().contains("Sidebar Content."));
}

#[test]
fn test_site_external_link_is_not_routed() {
    let pilot = Pilot::site().unwrap();
    pilot.start();
    assert!(pilot.click("a[href=\"https://github.com/buelbuel/dim\"]"));
    assert_eq!(pilot.location(), "/");
    assert_eq!(pilot.window().history_len(), 1);
}

#[test]
fn test_site_back_and_forward() {
    let pilot = Pilot::site().unwrap();
    pilot.start();
    pilot.navigate("/layout-alt");
    assert_eq!(pilot.window().listener_count(SET_SIDEBAR_CONTENT), 1);

    assert!(pilot.back());
    assert_eq!(pilot.location(), "/");
    assert!(pilot.html().contains("<start-page>"));
    assert_eq!(pilot.window().history_len(), 2);
    // the sidebar left with its layout
    assert_eq!(pilot.window().listener_count(SET_SIDEBAR_CONTENT), 0);

    assert!(pilot.forward());
    assert_eq!(pilot.location(), "/layout-alt");
    assert!(pilot.html().contains("<layout-alt-page>"));
    assert!(!pilot.forward());
}

#[test]
fn test_site_language_switch() {
    let pilot = Pilot::site().unwrap();
    pilot.start();
    let link = pilot.find("a[href=\"/layout-alt\"]").unwrap();
    assert_eq!(pilot.document().text_content(link), "Layout Alt");

    pilot.set_language("de");
    let link = pilot.find("a[href=\"/layout-alt\"]").unwrap();
    assert_eq!(pilot.document().text_content(link), "Anderes Layout");

    pilot.navigate("/layout-alt");
    assert_eq!(pilot.title(), "Alternatives Layout | dim");
    pilot.navigate("/nope");
    assert_eq!(pilot.title(), "Seite nicht gefunden | dim");
}

#[test]
fn test_site_shell_is_defined_once() {
    let pilot = Pilot::site().unwrap();
    components::install(pilot.window()).unwrap();
    pilot.start();
    pilot.navigate("/layout-alt");
    pilot.navigate("/");
    let headers = pilot
        .document()
        .query_selector_all(pilot.document().body(), "app-header")
        .unwrap();
    // template content is not searched
    assert_eq!(headers.len(), 1);
}
