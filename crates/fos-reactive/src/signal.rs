//! Signals and memos built on tracked cells

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{CellId, Reactive, ReactiveRuntime, Scope};

struct SignalInner<T> {
    value: RefCell<T>,
    cell: CellId,
    rt: Weak<dyn ReactiveRuntime>,
}

impl<T> Drop for SignalInner<T> {
    fn drop(&mut self) {
        if let Some(rt) = self.rt.upgrade() {
            rt.release_cell(self.cell);
        }
    }
}

/// Reactive read/write cell
///
/// Reads inside a computation subscribe it; every `set` re-runs the
/// subscribers. Clones share the same value.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(rt: &Reactive, value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                cell: rt.create_cell(),
                rt: Rc::downgrade(rt),
            }),
        }
    }

    fn track(&self) {
        if let Some(rt) = self.inner.rt.upgrade() {
            rt.track(self.inner.cell);
        }
    }

    fn notify(&self) {
        if let Some(rt) = self.inner.rt.upgrade() {
            rt.notify(self.inner.cell);
        }
    }

    /// Read (tracked)
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.inner.value.borrow().clone()
    }

    /// Read without subscribing
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value (tracked)
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.inner.value.borrow())
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Write and notify subscribers
    pub fn set(&self, value: T) {
        let old = self.inner.value.replace(value);
        drop(old);
        self.notify();
    }

    /// Mutate in place and notify subscribers
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.notify();
    }

    /// Check whether two handles point at the same signal
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.value.try_borrow() {
            Ok(value) => f.debug_tuple("Signal").field(&*value).finish(),
            Err(_) => f.write_str("Signal(<borrowed>)"),
        }
    }
}

/// Derived value, recomputed when its sources change and propagated only
/// when the result differs
pub struct Memo<T> {
    signal: Signal<T>,
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Memo<T> {
    pub fn new(rt: &Reactive, mut f: impl FnMut() -> T + 'static) -> Self {
        let id = rt.create_computation(false);
        // First run by hand so the value exists before the computation does
        let prev = rt.swap_scope(Scope::tracking(id));
        let initial = f();
        rt.swap_scope(prev);

        let signal = Signal::new(rt, initial);
        let target = signal.clone();
        rt.set_computation(
            id,
            Box::new(move || {
                let next = f();
                if target.with_untracked(|current| *current != next) {
                    target.set(next);
                }
            }),
        );
        Self { signal }
    }

    /// Read (tracked)
    pub fn get(&self) -> T {
        self.signal.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }
}
