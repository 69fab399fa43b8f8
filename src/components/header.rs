//! Site header: navigation links.
//!
//! Clicks on same-origin links (`href` starting with a single `/`) are
//! turned into [`NAVIGATE`] events on the window; other links keep their
//! default action.

use tracing::trace;

use crate::element::{Component, RenderMode, Scope};
use crate::event::{Event, NavigateDetail, CLICK, NAVIGATE};

/// The `app-header` element.
pub struct AppHeader {
    cx: Scope<Self>,
}

impl AppHeader {
    /// Default tag.
    pub const TAG: &'static str = "app-header";

    fn follow_link(&self, event: &Event) {
        let (Some(document), Some(target)) =
            (self.cx.document(), event.target().and_then(|t| t.node()))
        else {
            return;
        };
        let Some(anchor) = document.closest(target, "a").ok().flatten() else {
            return;
        };
        let Some(href) = document.get_attribute(anchor, "href") else {
            return;
        };
        if !is_internal(&href) {
            trace!(%href, "external link");
            return;
        }
        event.prevent_default();
        self.cx
            .dispatch_window(&Event::new(NAVIGATE).with_detail(NavigateDetail::new(href)));
    }
}

fn is_internal(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

impl Component for AppHeader {
    const RENDER_MODE: RenderMode = RenderMode::Isolated;

    fn create(cx: &Scope<Self>) -> Self {
        AppHeader { cx: cx.clone() }
    }

    fn render(&self, cx: &Scope<Self>) -> String {
        crate::html!(
            r#"<header class="app-header"><nav class="app-header__nav">"#,
            r#"<a class="app-header__link" href="/">"#,
            cx.t("nav.start"),
            r#"</a><a class="app-header__link" href="/layout-alt">"#,
            cx.t("nav.layout_alt"),
            r#"</a><a class="app-header__link" href="https://github.com/buelbuel/dim">"#,
            cx.t("nav.github"),
            "</a></nav></header>",
            "<style>.app-header { display: grid; height: 6rem; } ",
            ".app-header__nav { display: flex; justify-content: center; gap: 1rem; }</style>",
        )
    }

    fn add_event_listeners(&self, cx: &Scope<Self>) {
        cx.add_event_listener_all_with_cleanup("a", CLICK, |this: &AppHeader, event| {
            this.follow_link(event)
        });
    }
}
