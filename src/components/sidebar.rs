//! Sidebar with a slot whose content other components replace through the
//! [`SET_SIDEBAR_CONTENT`] window event.

use tracing::debug;

use crate::element::{Component, RenderMode, Scope};
use crate::event::{ContentDetail, Event, SET_SIDEBAR_CONTENT};

/// The `app-sidebar` element.
pub struct AppSidebar {
    cx: Scope<Self>,
}

impl AppSidebar {
    /// Default tag.
    pub const TAG: &'static str = "app-sidebar";

    fn set_content(&self, event: &Event) {
        let Some(detail) = event.detail::<ContentDetail>() else {
            return;
        };
        let selector = match &detail.slot {
            Some(name) => format!("slot[name=\"{name}\"]"),
            None => "slot".to_owned(),
        };
        let (Some(document), Some(slot)) = (self.cx.document(), self.cx.query_selector(&selector))
        else {
            debug!(%selector, "sidebar slot not found");
            return;
        };
        document.set_inner_html(slot, &detail.content);
    }
}

impl Component for AppSidebar {
    const RENDER_MODE: RenderMode = RenderMode::Isolated;

    fn create(cx: &Scope<Self>) -> Self {
        AppSidebar { cx: cx.clone() }
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        r#"<aside class="app-sidebar"><slot></slot></aside>"#.to_owned()
    }

    fn connected(&self, cx: &Scope<Self>) {
        cx.listen_window(SET_SIDEBAR_CONTENT, |this: &AppSidebar, event| {
            this.set_content(event)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::window::Window;

    fn sidebar_window() -> Window {
        let window = Window::with_markup(AppConfig::default(), "<app-sidebar></app-sidebar>");
        window.document().define::<AppSidebar>(AppSidebar::TAG).unwrap();
        window
    }

    fn slot_html(window: &Window) -> String {
        let document = window.document();
        let host = document
            .query_selector(document.body(), AppSidebar::TAG)
            .unwrap()
            .unwrap();
        let root = document.shadow_root(host).unwrap();
        let slot = document.query_selector(root, "slot").unwrap().unwrap();
        document.inner_html(slot)
    }

    #[test]
    fn window_event_replaces_slot_content() {
        let window = sidebar_window();
        assert_eq!(window.listener_count(SET_SIDEBAR_CONTENT), 1);
        window.dispatch_event(
            &Event::new(SET_SIDEBAR_CONTENT).with_detail(ContentDetail::new("<p>one</p>")),
        );
        assert_eq!(slot_html(&window), "<p>one</p>");
        window.dispatch_event(
            &Event::new(SET_SIDEBAR_CONTENT).with_detail(ContentDetail::new("<p>two</p>")),
        );
        assert_eq!(slot_html(&window), "<p>two</p>");
    }

    #[test]
    fn unknown_named_slot_is_ignored() {
        let window = sidebar_window();
        window.dispatch_event(
            &Event::new(SET_SIDEBAR_CONTENT)
                .with_detail(ContentDetail::for_slot("footer", "<p>x</p>")),
        );
        assert_eq!(slot_html(&window), "");
    }

    #[test]
    fn listener_released_on_removal() {
        let window = sidebar_window();
        let document = window.document();
        let host = document
            .query_selector(document.body(), AppSidebar::TAG)
            .unwrap()
            .unwrap();
        document.remove(host);
        assert_eq!(window.listener_count(SET_SIDEBAR_CONTENT), 0);
    }
}
