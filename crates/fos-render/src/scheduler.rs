//! Bucketed scheduler
//!
//! Deferred work is grouped in five buckets that run in a fixed order
//! within one flush. A flush takes the whole queue before running anything,
//! so work scheduled by a callback lands in the next flush.

use std::cell::RefCell;
use std::fmt;

/// Scheduler buckets, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// Internal fixes such as focus restoration
    Fixes,
    /// Deferred prop plugins
    Props,
    /// `use:connected` callbacks
    Mount,
    Ready,
    Done,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Fixes,
        Bucket::Props,
        Bucket::Mount,
        Bucket::Ready,
        Bucket::Done,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct Batch {
    buckets: [Vec<Task>; 5],
}

/// Five-bucket queue flushed once per microtask
#[derive(Default)]
pub struct Scheduler {
    batch: RefCell<Option<Batch>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task`. Returns true when this started a new batch, meaning
    /// the caller must arrange a flush.
    pub fn add(&self, bucket: Bucket, task: Task) -> bool {
        let mut batch = self.batch.borrow_mut();
        let started = batch.is_none();
        batch
            .get_or_insert_with(Batch::default)
            .buckets[bucket.index()]
            .push(task);
        started
    }

    /// Whether a batch is waiting for its flush
    pub fn is_pending(&self) -> bool {
        self.batch.borrow().is_some()
    }

    /// Run the current batch, bucket by bucket. Returns how many tasks ran.
    pub fn flush(&self) -> usize {
        let Some(batch) = self.batch.borrow_mut().take() else {
            return 0;
        };
        let mut ran = 0;
        for tasks in batch.buckets {
            for task in tasks {
                task();
                ran += 1;
            }
        }
        tracing::trace!("scheduler flush ran {} tasks", ran);
        ran
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn push(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Task {
        let log = log.clone();
        Box::new(move || log.borrow_mut().push(name))
    }

    #[test]
    fn test_buckets_run_in_priority_order() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        assert!(scheduler.add(Bucket::Done, push(&log, "done")));
        assert!(!scheduler.add(Bucket::Mount, push(&log, "mount 1")));
        scheduler.add(Bucket::Fixes, push(&log, "fixes"));
        scheduler.add(Bucket::Mount, push(&log, "mount 2"));
        scheduler.add(Bucket::Props, push(&log, "props"));
        assert_eq!(scheduler.flush(), 5);
        assert_eq!(
            *log.borrow(),
            vec!["fixes", "props", "mount 1", "mount 2", "done"]
        );
    }

    #[test]
    fn test_reentrant_add_goes_to_next_flush() {
        let scheduler = Rc::new(Scheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let (s, l) = (scheduler.clone(), log.clone());
        scheduler.add(
            Bucket::Mount,
            Box::new(move || {
                l.borrow_mut().push("first");
                let l = l.clone();
                assert!(s.add(Bucket::Fixes, Box::new(move || l.borrow_mut().push("second"))));
            }),
        );
        assert_eq!(scheduler.flush(), 1);
        assert_eq!(*log.borrow(), vec!["first"]);
        assert!(scheduler.is_pending());
        assert_eq!(scheduler.flush(), 1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }
}
