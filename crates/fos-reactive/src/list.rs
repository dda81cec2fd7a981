//! Observable list
//!
//! A vector whose mutators notify subscribers explicitly, for use as the
//! source of a keyed list.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{CellId, Reactive, ReactiveRuntime};

struct ListInner<T> {
    items: RefCell<Vec<T>>,
    cell: CellId,
    rt: Weak<dyn ReactiveRuntime>,
}

impl<T> Drop for ListInner<T> {
    fn drop(&mut self) {
        if let Some(rt) = self.rt.upgrade() {
            rt.release_cell(self.cell);
        }
    }
}

/// Reactive `Vec<T>`; reads track, mutations notify once per call
pub struct ReactiveVec<T> {
    inner: Rc<ListInner<T>>,
}

impl<T> Clone for ReactiveVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> ReactiveVec<T> {
    pub fn new(rt: &Reactive) -> Self {
        Self::from_vec(rt, Vec::new())
    }

    pub fn from_vec(rt: &Reactive, items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(ListInner {
                items: RefCell::new(items),
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

    /// Apply a mutation, then notify subscribers
    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let out = f(&mut self.inner.items.borrow_mut());
        if let Some(rt) = self.inner.rt.upgrade() {
            rt.notify(self.inner.cell);
        }
        out
    }

    /// Snapshot of the items (tracked)
    pub fn to_vec(&self) -> Vec<T> {
        self.track();
        self.inner.items.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.track();
        f(&self.inner.items.borrow())
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.track();
        self.inner.items.borrow().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.track();
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, item: T) {
        self.mutate(|v| v.push(item));
    }

    pub fn pop(&self) -> Option<T> {
        self.mutate(Vec::pop)
    }

    /// Insert at the front (`unshift`)
    pub fn unshift(&self, item: T) {
        self.mutate(|v| v.insert(0, item));
    }

    /// Remove from the front (`shift`)
    pub fn shift(&self) -> Option<T> {
        self.mutate(|v| if v.is_empty() { None } else { Some(v.remove(0)) })
    }

    pub fn insert(&self, index: usize, item: T) {
        self.mutate(|v| v.insert(index.min(v.len()), item));
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        self.mutate(|v| (index < v.len()).then(|| v.remove(index)))
    }

    /// Replace one item, returning the previous value
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        self.mutate(|v| {
            v.get_mut(index)
                .map(|slot| std::mem::replace(slot, item))
        })
    }

    pub fn swap(&self, a: usize, b: usize) {
        self.mutate(|v| {
            if a < v.len() && b < v.len() {
                v.swap(a, b);
            }
        });
    }

    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.mutate(|v| v.sort_by(compare));
    }

    pub fn reverse(&self) {
        self.mutate(|v| v.reverse());
    }

    pub fn retain(&self, keep: impl FnMut(&T) -> bool) {
        self.mutate(|v| v.retain(keep));
    }

    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Replace the whole content
    pub fn replace(&self, items: Vec<T>) -> Vec<T> {
        self.mutate(|v| std::mem::replace(v, items))
    }

    /// Arbitrary in-place edit with a single notification
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        self.mutate(f)
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.items.try_borrow() {
            Ok(items) => f.debug_list().entries(items.iter()).finish(),
            Err(_) => f.write_str("ReactiveVec(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{root, Runtime};
    use std::cell::Cell;

    #[test]
    fn test_mutators_notify() {
        let rt: Reactive = Rc::new(Runtime::new());
        let list = ReactiveVec::from_vec(&rt, vec![3, 1, 2]);
        let runs = Rc::new(Cell::new(0));
        root(&rt, |_| {
            let (list, runs) = (list.clone(), runs.clone());
            rt.render_effect(Box::new(move || {
                list.len();
                runs.set(runs.get() + 1);
            }));
        });
        list.push(4);
        list.sort_by(|a, b| a.cmp(b));
        assert_eq!(list.shift(), Some(1));
        list.unshift(0);
        assert_eq!(runs.get(), 5);
        assert_eq!(list.to_vec(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_range_is_harmless() {
        let rt: Reactive = Rc::new(Runtime::new());
        let list: ReactiveVec<i32> = ReactiveVec::new(&rt);
        assert_eq!(list.remove(3), None);
        assert_eq!(list.set(0, 1), None);
        assert_eq!(list.shift(), None);
        list.swap(0, 5);
        list.insert(10, 7);
        assert_eq!(list.to_vec(), vec![7]);
    }
}
