//! Type-erased lifecycle capability shared by every element.

use std::any::Any;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::reactive::Schedule;

/// The operations the document and router need from an element, whatever
/// its component type.
///
/// States: unmounted → mounted → unmounted. `mount` and `unmount` are
/// idempotent.
pub trait Lifecycle: Schedule {
    /// Render the component's markup without applying it.
    fn render(&self) -> String;

    /// Render and apply the result if it differs from the last applied
    /// markup, then reinstall listeners.
    fn update(&self);

    /// Enter the mounted state: update, install listeners, subscribe to
    /// language changes, run the `connected` hook.
    fn mount(&self);

    /// Leave the mounted state: run the `disconnected` hook, release every
    /// listener record, drop the language subscription.
    fn unmount(&self);

    /// Whether the element is mounted.
    fn is_mounted(&self) -> bool;

    /// The host element.
    fn host(&self) -> NodeId;

    /// Where rendered markup goes: the shadow root or the host.
    fn content_root(&self) -> NodeId;

    /// Short type name of the component, e.g. `StartPage`.
    fn type_name(&self) -> &'static str;

    /// Number of listener records currently held.
    fn listener_count(&self) -> usize;

    /// Upcast for downcasting to the concrete element.
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}
