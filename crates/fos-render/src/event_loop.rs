//! Microtask queue
//!
//! The host drains it after each task, the way a browser drains promise
//! jobs. Tasks queued while draining run in the same drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

/// Queued microtask
pub type Microtask = Box<dyn FnOnce()>;

/// FIFO queue of microtasks
#[derive(Default)]
pub struct MicrotaskQueue {
    tasks: RefCell<VecDeque<Microtask>>,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a microtask
    pub fn queue_microtask(&self, task: Microtask) {
        self.tasks.borrow_mut().push_back(task);
    }

    /// Run microtasks until the queue is empty, returning how many ran
    pub fn run_microtasks(&self) -> usize {
        let mut executed = 0;
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            executed += 1;
        }
        executed
    }

    /// Check if there's pending work
    pub fn has_pending_work(&self) -> bool {
        !self.tasks.borrow().is_empty()
    }
}

impl fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("pending", &self.tasks.borrow().len())
            .finish()
    }
}
