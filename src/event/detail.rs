//! Event payloads and well-known event names.
//!
//! The [`Detail`] trait is object-safe and supports downcasting via `Any`.
//! Built-in payloads: [`NavigateDetail`], [`ContentDetail`].

use std::any::Any;

/// Navigation intent, dispatched on the window by links and components.
pub const NAVIGATE: &str = "navigate";
/// History traversal, dispatched on the window by `back`/`forward`/`go`.
pub const POPSTATE: &str = "popstate";
/// Cross-component content injection into the sidebar slot.
pub const SET_SIDEBAR_CONTENT: &str = "set-sidebar-content";
/// Pointer activation.
pub const CLICK: &str = "click";

// ---------------------------------------------------------------------------
// Detail trait
// ---------------------------------------------------------------------------

/// Object-safe event payload.
///
/// All payloads implement `as_any` for downcasting and `detail_name` for
/// logging.
pub trait Detail: 'static {
    /// Upcast to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Human-readable name for this payload type.
    fn detail_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Built-in payloads
// ---------------------------------------------------------------------------

/// Payload of a [`NAVIGATE`] event: the path to go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateDetail {
    pub path: String,
}

impl NavigateDetail {
    /// Create a navigation payload.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Detail for NavigateDetail {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn detail_name(&self) -> &str {
        "NavigateDetail"
    }
}

/// Markup destined for a named slot of a mounted component.
///
/// `slot == None` targets the default slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDetail {
    pub slot: Option<String>,
    pub content: String,
}

impl ContentDetail {
    /// Content for the default slot.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            slot: None,
            content: content.into(),
        }
    }

    /// Content for a named slot.
    pub fn for_slot(slot: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            slot: Some(slot.into()),
            content: content.into(),
        }
    }
}

impl Detail for ContentDetail {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn detail_name(&self) -> &str {
        "ContentDetail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_through_trait_object() {
        let boxed: Box<dyn Detail> = Box::new(NavigateDetail::new("/about"));
        assert_eq!(boxed.detail_name(), "NavigateDetail");
        let nav = boxed.as_any().downcast_ref::<NavigateDetail>().unwrap();
        assert_eq!(nav.path, "/about");
        assert!(boxed.as_any().downcast_ref::<ContentDetail>().is_none());
    }

    #[test]
    fn content_detail_slots() {
        assert_eq!(ContentDetail::new("<p>x</p>").slot, None);
        let named = ContentDetail::for_slot("aside", "y");
        assert_eq!(named.slot.as_deref(), Some("aside"));
        assert_eq!(named.content, "y");
    }
}
