//! Route table entries and deferred component modules.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::element::ComponentType;
use crate::window::Window;

/// Errors from a route's component loader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("module failed to load: {0}")]
    Failed(String),
}

/// What a loader resolves to: a module whose default export is the page
/// component.
#[derive(Debug, Clone, Default)]
pub struct Module {
    default: Option<ComponentType>,
}

impl Module {
    /// A module exporting `component`.
    pub fn new(component: ComponentType) -> Self {
        Self {
            default: Some(component),
        }
    }

    /// A module without a default export.
    pub fn without_default() -> Self {
        Self::default()
    }

    /// The default export.
    pub fn default_export(&self) -> Option<&ComponentType> {
        self.default.as_ref()
    }
}

/// The future a loader returns.
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<Module, LoadError>>>>;

type LoadFn = Rc<dyn Fn(Window) -> LoadFuture>;

/// A deferred, single-shot module resolver.
///
/// The first successful load is cached; later loads return the cached
/// module without calling the loader again. Failures are not cached.
#[derive(Clone)]
pub struct Loader {
    load: LoadFn,
    cache: Rc<RefCell<Option<Module>>>,
}

impl Loader {
    /// Wrap a loader function.
    pub fn new<F, Fut>(load: F) -> Self
    where
        F: Fn(Window) -> Fut + 'static,
        Fut: Future<Output = Result<Module, LoadError>> + 'static,
    {
        Self {
            load: Rc::new(move |window| Box::pin(load(window))),
            cache: Rc::new(RefCell::new(None)),
        }
    }

    /// Resolve the module.
    pub async fn load(&self, window: &Window) -> Result<Module, LoadError> {
        if let Some(module) = self.cache.borrow().clone() {
            return Ok(module);
        }
        let module = (self.load)(window.clone()).await?;
        *self.cache.borrow_mut() = Some(module.clone());
        Ok(module)
    }

    /// Whether a module has been cached.
    pub fn is_loaded(&self) -> bool {
        self.cache.borrow().is_some()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// A route table entry.
#[derive(Debug, Clone)]
pub struct Route {
    pub loader: Loader,
    /// Id of the `<template>` holding the layout.
    pub layout: String,
    /// Translation key for the page title.
    pub title: Option<String>,
    /// Translation key for the page description.
    pub description: Option<String>,
}

impl Route {
    /// A route that loads its component with `load` and mounts it into
    /// `layout`.
    pub fn new<F, Fut>(load: F, layout: impl Into<String>) -> Self
    where
        F: Fn(Window) -> Fut + 'static,
        Fut: Future<Output = Result<Module, LoadError>> + 'static,
    {
        Self {
            loader: Loader::new(load),
            layout: layout.into(),
            title: None,
            description: None,
        }
    }

    /// Set the title key (builder).
    pub fn with_title(mut self, key: impl Into<String>) -> Self {
        self.title = Some(key.into());
        self
    }

    /// Set the description key (builder).
    pub fn with_description(mut self, key: impl Into<String>) -> Self {
        self.description = Some(key.into());
        self
    }

    /// Resolve this route's module.
    pub async fn load(&self, window: &Window) -> Result<Module, LoadError> {
        self.loader.load(window).await
    }
}

/// Path → route. Exact matches only.
#[derive(Debug, Clone, Default)]
pub struct Routes {
    routes: HashMap<String, Route>,
}

impl Routes {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route (builder). A later route for the same path replaces the
    /// earlier one.
    pub fn route(mut self, path: impl Into<String>, route: Route) -> Self {
        self.routes.insert(path.into(), route);
        self
    }

    /// Look up a path.
    pub fn get(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    /// All paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
