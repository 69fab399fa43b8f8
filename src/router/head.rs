//! Page title and description in `<head>`.

use crate::dom::{Document, NodeId};

/// Set the document title to `"{page} | {base}"`.
pub fn set_title(document: &Document, base: &str, page: &str) {
    document.set_title(&format!("{page} | {base}"));
}

/// Set `<meta name="description">`, creating it in `<head>` when missing.
pub fn set_description(document: &Document, text: &str) {
    let meta = description_element(document).unwrap_or_else(|| {
        let meta = document.create_element("meta");
        document.set_attribute(meta, "name", "description");
        document.append_child(document.head(), meta);
        meta
    });
    document.set_attribute(meta, "content", text);
}

/// Current description, or `None` when there is no description element.
pub fn description(document: &Document) -> Option<String> {
    description_element(document).map(|meta| {
        document
            .get_attribute(meta, "content")
            .unwrap_or_default()
    })
}

fn description_element(document: &Document) -> Option<NodeId> {
    document
        .query_selector(document.head(), "meta[name=\"description\"]")
        .ok()
        .flatten()
}
