//! Reactive properties: observable cells that schedule their owner.
//!
//! A [`Reactive<T>`] stores a value and holds a weak link to the component
//! that owns it. Every `set` stores the new value unconditionally and then
//! asks the owner for an update; the owner coalesces those requests (see
//! [`Element::request_update`](crate::element::Element::request_update)), so
//! N writes in one synchronous turn produce one re-render.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

/// Something that can be asked to re-render later.
pub trait Schedule {
    /// Request a deferred update. Repeated calls before the update runs
    /// coalesce.
    fn request_update(&self);
}

/// A weak handle to a [`Schedule`] owner.
///
/// A detached updater (or one whose owner has been dropped) does nothing.
#[derive(Clone, Default)]
pub struct Updater {
    target: Option<Weak<dyn Schedule>>,
}

impl Updater {
    /// Link to `owner` without keeping it alive.
    pub fn new(owner: Weak<dyn Schedule>) -> Self {
        Self {
            target: Some(owner),
        }
    }

    /// An updater with no owner.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Forward to the owner's [`Schedule::request_update`], if it is alive.
    pub fn request_update(&self) {
        if let Some(owner) = self.target.as_ref().and_then(Weak::upgrade) {
            owner.request_update();
        }
    }

    /// Whether the owner is still alive.
    pub fn is_live(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|owner| owner.strong_count() > 0)
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater").field("live", &self.is_live()).finish()
    }
}

/// A named value whose writes schedule an update on its owner.
pub struct Reactive<T> {
    name: &'static str,
    value: RefCell<T>,
    owner: Updater,
}

impl<T: 'static> Reactive<T> {
    /// Create a property with an initial value. Does not schedule.
    pub fn new(name: &'static str, initial: T, owner: Updater) -> Self {
        Self {
            name,
            value: RefCell::new(initial),
            owner,
        }
    }

    /// The property name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Borrow the value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store `value` and schedule the owner, even if the value is unchanged.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.notify();
    }

    /// Mutate the value in place, then schedule the owner.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.notify();
    }

    /// Store `value`, schedule the owner, and return the old value.
    pub fn replace(&self, value: T) -> T {
        let old = self.value.replace(value);
        self.notify();
        old
    }

    /// Overwrite the backing value without scheduling.
    ///
    /// Used to reset a property from outside the render cycle.
    pub fn redefine(&self, value: T) {
        *self.value.borrow_mut() = value;
    }

    fn notify(&self) {
        trace!(property = self.name, "reactive property set");
        self.owner.request_update();
    }
}

impl<T: Clone + 'static> Reactive<T> {
    /// Clone the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

/// Install a reactive property owned by `owner`.
pub fn define_reactive_property<T: 'static>(
    owner: &Rc<dyn Schedule>,
    name: &'static str,
    initial: T,
) -> Reactive<T> {
    Reactive::new(name, initial, Updater::new(Rc::downgrade(owner)))
}
