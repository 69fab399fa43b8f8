//! Microtask queue.
//!
//! A per-thread FIFO of deferred closures, drained at checkpoints. This is
//! the lowest-latency deferral available to components: work queued here
//! runs after the current synchronous task finishes and before the next
//! externally triggered event is handled.
//!
//! [`Window::run_task`](crate::window::Window::run_task) runs a closure and
//! then checkpoints; everything that dispatches events from outside (the
//! test pilot, history traversal, the router's spawned tasks) goes through
//! it or checkpoints explicitly.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

type Microtask = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Microtask>> = RefCell::new(VecDeque::new());
    static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Queue `task` to run at the next microtask checkpoint.
pub fn queue_microtask(task: impl FnOnce() + 'static) {
    QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Number of microtasks waiting to run.
pub fn pending_microtasks() -> usize {
    QUEUE.with(|queue| queue.borrow().len())
}

/// Run queued microtasks until the queue is empty, including ones queued by
/// the microtasks themselves.
///
/// A checkpoint reached from inside a running microtask returns immediately;
/// the outer checkpoint picks up whatever was queued.
pub fn perform_microtask_checkpoint() {
    if DRAINING.with(Cell::get) {
        return;
    }
    DRAINING.with(|draining| draining.set(true));
    let _guard = DrainGuard;

    // Pop one at a time so no borrow is held while the task runs.
    while let Some(task) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) {
        task();
    }
}

/// Resets the draining flag even if a microtask panics.
struct DrainGuard;

impl Drop for DrainGuard {
    fn drop(&mut self) {
        DRAINING.with(|draining| draining.set(false));
    }
}
