//! Custom element registry: tag name → component type.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::dom::NodeId;
use crate::window::Window;

use super::component::Component;
use super::lifecycle::Lifecycle;
use super::Element;

/// Errors from [`CustomElementRegistry::define`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("`{0}` is not a valid custom element name")]
    InvalidName(String),
}

type Construct = Rc<dyn Fn(&Window, NodeId) -> Rc<dyn Lifecycle>>;

/// A registrable component type: a tag plus a type-erased constructor.
#[derive(Clone)]
pub struct ComponentType {
    tag: String,
    type_name: &'static str,
    type_id: TypeId,
    construct: Construct,
}

impl ComponentType {
    /// Describe component `C` under `tag`. Does not register it.
    pub fn of<C: Component>(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            type_name: short_type_name::<C>(),
            type_id: TypeId::of::<C>(),
            construct: Rc::new(|window: &Window, host: NodeId| -> Rc<dyn Lifecycle> {
                Element::<C>::construct(window, host).into_inner()
            }),
        }
    }

    /// The registered tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Short type name of the component, e.g. `StartPage`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both describe the same component type, whatever their tags.
    pub fn same_component(&self, other: &ComponentType) -> bool {
        self.type_id == other.type_id
    }

    /// Create a new detached element of this type.
    pub fn instantiate(&self, window: &Window) -> NodeId {
        let host = window.document().create_element(&self.tag);
        (self.construct)(window, host);
        host
    }

    /// Construct the component for an existing element.
    pub(crate) fn upgrade(&self, window: &Window, host: NodeId) -> Rc<dyn Lifecycle> {
        (self.construct)(window, host)
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// The last path segment of `C`'s type name.
pub(crate) fn short_type_name<C: 'static>() -> &'static str {
    let full = std::any::type_name::<C>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Registered component types, keyed by tag.
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, ComponentType>,
}

impl CustomElementRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type.
    ///
    /// Returns the definition in effect and whether it was newly added. An
    /// existing tag keeps its first definition.
    pub fn define(&mut self, ty: ComponentType) -> Result<(ComponentType, bool), RegistryError> {
        if !is_valid_name(&ty.tag) {
            return Err(RegistryError::InvalidName(ty.tag));
        }
        if let Some(existing) = self.definitions.get(&ty.tag) {
            debug!(tag = %ty.tag, "element already defined");
            return Ok((existing.clone(), false));
        }
        debug!(tag = %ty.tag, type_name = ty.type_name, "defining element");
        self.definitions.insert(ty.tag.clone(), ty.clone());
        Ok((ty, true))
    }

    /// Look up a definition.
    pub fn get(&self, tag: &str) -> Option<&ComponentType> {
        self.definitions.get(tag)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Lower-case, starts with a letter, contains a hyphen.
fn is_valid_name(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}
