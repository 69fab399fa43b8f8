//! Node types: NodeId, NodeKind, NodeData.

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// The kind of a node in the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document root. Exactly one per [`Document`](super::Document).
    Document,
    /// An element with a tag name and attributes.
    Element,
    /// A run of character data.
    Text,
    /// A `<!-- ... -->` comment.
    Comment,
    /// A detached container whose children move when it is appended
    /// (template content, cloned layouts).
    Fragment,
    /// The isolated content root attached to a host element.
    ShadowRoot,
}

/// Elements that never have children or a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Data associated with a single DOM node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// What kind of node this is.
    pub kind: NodeKind,
    /// Lower-case tag name for elements, empty for every other kind.
    pub tag: String,
    /// Attributes in source order, including `id` and `class`.
    pub attributes: Vec<(String, String)>,
    /// Character data for text and comment nodes.
    pub text: String,
    /// Detached fragment holding the children of a `<template>` element.
    pub template_content: Option<NodeId>,
}

impl NodeData {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: String::new(),
            attributes: Vec::new(),
            text: String::new(),
            template_content: None,
        }
    }

    /// Create an element node. The tag name is lower-cased.
    pub fn element(tag: impl Into<String>) -> Self {
        let mut data = Self::with_kind(NodeKind::Element);
        data.tag = tag.into().to_ascii_lowercase();
        data
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        let mut data = Self::with_kind(NodeKind::Text);
        data.text = text.into();
        data
    }

    /// Create a comment node.
    pub fn comment(text: impl Into<String>) -> Self {
        let mut data = Self::with_kind(NodeKind::Comment);
        data.text = text.into();
        data
    }

    /// Create an empty fragment.
    pub fn fragment() -> Self {
        Self::with_kind(NodeKind::Fragment)
    }

    /// Create a shadow root node.
    pub fn shadow_root() -> Self {
        Self::with_kind(NodeKind::ShadowRoot)
    }

    /// Create the document root node.
    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document)
    }

    /// Whether this is an element node.
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Whether this element is a void element (`<meta>`, `<br>`, ...).
    pub fn is_void(&self) -> bool {
        self.is_element() && VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    /// Set the `id` attribute (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_attribute("id", id);
        self
    }

    /// Add a single CSS class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute. Returns the previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// The `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Iterate the whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or_default().split_whitespace()
    }

    /// Check whether this node has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a CSS class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attribute("class", joined);
    }

    /// Remove a CSS class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        let joined = remaining.join(" ");
        self.set_attribute("class", joined);
    }

    /// Toggle a CSS class: add if absent, remove if present.
    pub fn toggle_class(&mut self, class: &str) {
        if self.has_class(class) {
            self.remove_class(class);
        } else {
            self.add_class(class);
        }
    }
}
