//! Site footer. Static content.

use crate::element::{Component, RenderMode, Scope};

/// The `app-footer` element.
pub struct AppFooter;

impl AppFooter {
    /// Default tag.
    pub const TAG: &'static str = "app-footer";
}

impl Component for AppFooter {
    const RENDER_MODE: RenderMode = RenderMode::Isolated;

    fn create(_cx: &Scope<Self>) -> Self {
        AppFooter
    }

    fn render(&self, _cx: &Scope<Self>) -> String {
        concat!(
            r#"<footer class="app-footer">"#,
            r#"<p class="app-footer__p container">There is a 🥄.</p>"#,
            "</footer>",
            "<style>.app-footer { padding: 6rem 0; } ",
            ".app-footer__p { text-align: center; }</style>",
        )
        .to_owned()
    }
}
