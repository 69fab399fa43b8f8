//! Headless document: slotmap node arena, markup, selectors, live document.
//!
//! - [`Dom`]: the raw tree (nodes, parents, children, shadow roots).
//! - [`markup`]: parse and serialize markup.
//! - [`selector`]: the selector engine used by queries.
//! - [`Document`]: the shared, live document components and the router
//!   work against.

pub mod document;
pub mod markup;
pub mod node;
pub mod query;
pub mod selector;
pub mod tree;

pub use document::{Document, ShadowError};
pub use node::{NodeData, NodeId, NodeKind};
pub use selector::{SelectorError, SelectorList};
pub use tree::Dom;
