//! Snapshot rendering helpers.
//!
//! Functions for mounting a component in a throwaway window and capturing
//! its markup, plus a line-per-tag formatter that keeps snapshot diffs
//! readable.

use crate::config::AppConfig;
use crate::element::{Component, Element};
use crate::window::Window;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Mount `C` as `tag` in a fresh window and return the markup of its content
/// root (the shadow root for isolated components).
///
/// # Examples
///
/// ```
/// use dim::components::AppFooter;
/// use dim::testing::render_to_string;
///
/// let html = render_to_string::<AppFooter>(AppFooter::TAG);
/// assert!(html.starts_with("<footer"));
/// ```
pub fn render_to_string<C: Component>(tag: &str) -> String {
    let window = Window::new(AppConfig::default());
    render_in::<C>(&window, tag)
}

/// Like [`render_to_string`], inside an existing window.
pub fn render_in<C: Component>(window: &Window, tag: &str) -> String {
    let document = window.document();
    let element = Element::<C>::create(window, tag);
    document.append_child(document.body(), element.host());
    document.inner_html(element.content_root())
}

/// Break markup into one tag or text run per line.
///
/// Whitespace-only text between tags is dropped.
pub fn tag_lines(markup: &str) -> String {
    let mut lines = Vec::new();
    let mut rest = markup;
    while !rest.is_empty() {
        let end = if rest.starts_with('<') {
            rest.find('>').map_or(rest.len(), |i| i + 1)
        } else {
            rest.find('<').unwrap_or(rest.len())
        };
        let (piece, tail) = rest.split_at(end);
        if !piece.trim().is_empty() {
            lines.push(piece.trim());
        }
        rest = tail;
    }
    lines.join("\n")
}
