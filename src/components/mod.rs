//! The demo site: shell components, pages, layouts, and routes.
//!
//! - [`AppHeader`] : navigation links, turns internal clicks into navigations
//! - [`AppFooter`] : static footer
//! - [`AppSidebar`] : slot filled through `set-sidebar-content`
//! - [`StartPage`], [`LayoutAltPage`] : route pages
//!
//! [`install`] registers the shell components and translations on a window;
//! [`routes`] builds the route table; [`INDEX_MARKUP`] is the page the
//! router renders into.

pub mod footer;
pub mod header;
pub mod pages;
pub mod sidebar;

pub use footer::AppFooter;
pub use header::AppHeader;
pub use pages::{LayoutAltPage, StartPage};
pub use sidebar::AppSidebar;

use tracing::warn;

use crate::dom::Document;
use crate::element::{Component, RegistryError};
use crate::i18n::I18n;
use crate::router::{LoadError, Module, Route, Routes};
use crate::window::Window;

/// Body markup: two layout templates and the application root.
pub const INDEX_MARKUP: &str = concat!(
    r#"<template id="main-layout">"#,
    "<app-header></app-header>",
    r#"<main id="app-content" class="container"></main>"#,
    "<app-footer></app-footer>",
    "</template>",
    r#"<template id="alternate-layout">"#,
    "<app-header></app-header>",
    r#"<div class="layout-alt">"#,
    "<app-sidebar></app-sidebar>",
    r#"<main id="app-content"></main>"#,
    "</div>",
    "<app-footer></app-footer>",
    "</template>",
    r#"<div id="app"></div>"#,
);

const EN: &str = r#"{
    "nav": { "start": "Start", "layout_alt": "Layout Alt", "github": "GitHub" },
    "start_description": "A starting point for dim sites.",
    "layout_alt_description": "A page using the alternate layout."
}"#;

const DE: &str = r#"{
    "nav": { "start": "Start", "layout_alt": "Anderes Layout", "github": "GitHub" },
    "Start": "Start",
    "Alternative Layout": "Alternatives Layout",
    "start_description": "Ein Ausgangspunkt für dim-Seiten.",
    "layout_alt_description": "Eine Seite mit dem alternativen Layout.",
    "error": "Fehler",
    "error_invalid_component_or_layout": "Ungültige Komponente oder ungültiges Layout",
    "error_loading_page": "Fehler beim Laden der Seite",
    "page_not_found": "Seite nicht gefunden",
    "page_not_found_description": "Die angeforderte Seite wurde nicht gefunden."
}"#;

/// Register the shell components (header, footer, sidebar).
pub fn define_all(document: &Document) -> Result<(), RegistryError> {
    document.define::<AppHeader>(AppHeader::TAG)?;
    document.define::<AppFooter>(AppFooter::TAG)?;
    document.define::<AppSidebar>(AppSidebar::TAG)?;
    Ok(())
}

/// Add the site's English and German strings.
pub fn add_translations(i18n: &I18n) {
    for (lang, json) in [("en", EN), ("de", DE)] {
        if let Err(err) = i18n.add_translations_json(lang, json) {
            warn!(%err, "skipping translation bundle");
        }
    }
}

/// Translations plus shell components.
pub fn install(window: &Window) -> Result<(), RegistryError> {
    add_translations(window.i18n());
    define_all(window.document())
}

/// The site's route table. Page components are defined when their route
/// first loads.
pub fn routes() -> Routes {
    Routes::new()
        .route(
            "/",
            Route::new(|window| page::<StartPage>(window, StartPage::TAG), "main-layout")
                .with_title("Start")
                .with_description("start_description"),
        )
        .route(
            "/layout-alt",
            Route::new(
                |window| page::<LayoutAltPage>(window, LayoutAltPage::TAG),
                "alternate-layout",
            )
            .with_title("Alternative Layout")
            .with_description("layout_alt_description"),
        )
}

async fn page<C: Component>(window: Window, tag: &'static str) -> Result<Module, LoadError> {
    window
        .document()
        .define::<C>(tag)
        .map(Module::new)
        .map_err(|err| LoadError::Failed(err.to_string()))
}
