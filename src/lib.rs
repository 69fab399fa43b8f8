//! # dim
//!
//! A minimal custom-element UI micro-framework with reactive rendering and a
//! client-side router, running against a headless document.
//!
//! dim components are plain Rust types that render markup strings. The
//! element wrapper batches state changes into one update per turn, applies
//! markup only when it changed, and keeps a listener book so re-rendering
//! never stacks duplicate handlers. The router maps paths to lazily loaded
//! components and mounts them into `<template>` layouts.
//!
//! ## Core Systems
//!
//! - **[`dom`]** : Slotmap-backed document with shadow roots, templates, markup parsing, selectors
//! - **[`event`]** : Window and element events with bubbling and typed payloads
//! - **[`runtime`]** : Microtask queue and checkpoint
//! - **[`reactive`]** : Reactive properties that schedule their owner
//! - **[`element`]** : `Component` trait, element lifecycle, listener bookkeeping, registry
//! - **[`router`]** : Route table, deferred module loading, layout mounting, head metadata
//! - **[`i18n`]** : Translation lookup with language subscription
//! - **[`html`]** : Markup builder and style serializer
//! - **[`window`]** : Document, history, translations, configuration
//! - **[`config`]** : Application configuration and `.env` parsing
//! - **[`components`]** : The demo site: header, footer, sidebar, pages, routes
//! - **[`testing`]** : Headless pilot and snapshot helpers

// Foundation
pub mod config;
pub mod runtime;

// Core systems
pub mod dom;
pub mod event;

// Components and reactivity
pub mod element;
pub mod reactive;

// Application
pub mod html;
pub mod i18n;
pub mod router;
pub mod window;

// Site
pub mod components;

// Testing
pub mod testing;

pub use config::AppConfig;
pub use dom::Document;
pub use element::{Component, Element, RenderMode, Scope};
pub use html::{style_map, Interpolate};
pub use i18n::I18n;
pub use reactive::Reactive;
pub use router::{Route, RouteOutcome, Router, Routes};
pub use window::Window;
