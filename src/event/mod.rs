//! Event system: payloads, event objects, listener registry, propagation.

pub mod detail;
pub mod dispatch;
pub mod listeners;

pub use detail::{ContentDetail, Detail, NavigateDetail, CLICK, NAVIGATE, POPSTATE, SET_SIDEBAR_CONTENT};
pub use dispatch::{propagation_path, Event, EventTarget};
pub use listeners::{Handler, ListenerRegistry};
