//! Reactive state: observable properties that schedule their owner.
//!
//! - [`Reactive`] : a named cell; `set` stores and requests an update.
//! - [`define_reactive_property`] : bind a cell to an owner.
//! - [`Schedule`] / [`Updater`] : the owner side of the link.

pub mod property;

pub use property::{define_reactive_property, Reactive, Schedule, Updater};
