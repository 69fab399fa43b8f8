//! Route pages.

use crate::element::{Component, Scope};
use crate::event::{ContentDetail, Event, SET_SIDEBAR_CONTENT};
use crate::html::style_map;

/// Landing page mounted at `/`.
pub struct StartPage;

impl StartPage {
    pub const TAG: &'static str = "start-page";
}

impl Component for StartPage {
    fn create(_cx: &Scope<Self>) -> Self {
        StartPage
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        concat!(
            r#"<section class="start-page container">"#,
            "<h1>Edit me</h1>",
            "<p>Change the content of this page in <code>src/components/pages.rs</code>.</p>",
            "</section>",
        )
        .to_owned()
    }
}

/// Page for the alternate layout. Fills the sidebar when connected.
pub struct LayoutAltPage;

impl LayoutAltPage {
    pub const TAG: &'static str = "layout-alt-page";

    /// Markup sent to the sidebar.
    pub fn sidebar_content() -> String {
        let styles = style_map([
            ("text-align", "center"),
            ("color", "var(--color-gray-100)"),
        ]);
        crate::html!(r#"<p style=""#, styles, r#"">Sidebar Content.</p>"#)
    }
}

impl Component for LayoutAltPage {
    fn create(_cx: &Scope<Self>) -> Self {
        LayoutAltPage
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        concat!(
            r#"<section class="layout-b-page container">"#,
            "<h1>Alternative Layout.</h1>",
            "<p>Define different layouts with &lt;template&gt;.</p>",
            "</section>",
        )
        .to_owned()
    }

    fn connected(&self, cx: &Scope<Self>) {
        cx.dispatch_window(
            &Event::new(SET_SIDEBAR_CONTENT).with_detail(ContentDetail::new(Self::sidebar_content())),
        );
    }
}
