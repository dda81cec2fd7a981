//! Comprehensive tests for fos-reactive
//!
//! Exercises the runtime only through the `ReactiveRuntime` trait object,
//! the way the renderer sees it.

use fos_reactive::{
    Context, Memo, Reactive, ReactiveVec, Runtime, Signal, batch, effect, on_cleanup,
    render_effect, root, untrack,
};
use proptest::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn runtime() -> Reactive {
    Runtime::shared()
}

// ============================================================================
// OWNERSHIP
// ============================================================================

#[test]
fn test_nested_computations_disposed_with_root() {
    let rt = runtime();
    let cleaned = Rc::new(RefCell::new(Vec::new()));
    let dispose = root(&rt, |dispose| {
        let outer = cleaned.clone();
        let rt2 = rt.clone();
        render_effect(&rt, move || {
            let inner = outer.clone();
            let rt3 = rt2.clone();
            render_effect(&rt2, move || {
                let inner = inner.clone();
                on_cleanup(&rt3, move || inner.borrow_mut().push("inner"));
            });
            let outer = outer.clone();
            on_cleanup(&rt2, move || outer.borrow_mut().push("outer"));
        });
        dispose
    });
    assert!(cleaned.borrow().is_empty());
    dispose.dispose();
    // Children go first, then the owner's own cleanups
    assert_eq!(*cleaned.borrow(), vec!["inner", "outer"]);
}

#[test]
fn test_rerun_cleans_previous_run() {
    let rt = runtime();
    let count = Signal::new(&rt, 0);
    let cleanups = Rc::new(Cell::new(0));
    root(&rt, |_| {
        let (count, cleanups, rt2) = (count.clone(), cleanups.clone(), rt.clone());
        render_effect(&rt, move || {
            count.get();
            let cleanups = cleanups.clone();
            on_cleanup(&rt2, move || cleanups.set(cleanups.get() + 1));
        });
    });
    count.set(1);
    count.set(2);
    assert_eq!(cleanups.get(), 2);
}

#[test]
fn test_disposed_root_stops_reacting() {
    let rt = runtime();
    let count = Signal::new(&rt, 0);
    let seen = Rc::new(Cell::new(0));
    let dispose = root(&rt, |dispose| {
        let (count, seen) = (count.clone(), seen.clone());
        render_effect(&rt, move || seen.set(count.get()));
        dispose
    });
    count.set(5);
    dispose.dispose();
    count.set(9);
    assert_eq!(seen.get(), 5);
}

// ============================================================================
// TRACKING
// ============================================================================

#[test]
fn test_untrack_does_not_subscribe() {
    let rt = runtime();
    let a = Signal::new(&rt, 1);
    let b = Signal::new(&rt, 10);
    let sums = Rc::new(RefCell::new(Vec::new()));
    root(&rt, |_| {
        let (a, b, sums, rt2) = (a.clone(), b.clone(), sums.clone(), rt.clone());
        render_effect(&rt, move || {
            let other = untrack(&rt2, || b.get());
            sums.borrow_mut().push(a.get() + other);
        });
    });
    b.set(20);
    a.set(2);
    assert_eq!(*sums.borrow(), vec![11, 22]);
}

#[test]
fn test_dynamic_dependencies() {
    let rt = runtime();
    let flag = Signal::new(&rt, true);
    let left = Signal::new(&rt, "left");
    let right = Signal::new(&rt, "right");
    let runs = Rc::new(Cell::new(0));
    root(&rt, |_| {
        let (flag, left, right, runs) = (flag.clone(), left.clone(), right.clone(), runs.clone());
        render_effect(&rt, move || {
            runs.set(runs.get() + 1);
            let _ = if flag.get() { left.get() } else { right.get() };
        });
    });
    right.set("r2");
    assert_eq!(runs.get(), 1);
    flag.set(false);
    left.set("l2");
    assert_eq!(runs.get(), 2);
    right.set("r3");
    assert_eq!(runs.get(), 3);
}

#[test]
fn test_effects_run_after_render_effects() {
    let rt = runtime();
    let count = Signal::new(&rt, 0);
    let order = Rc::new(RefCell::new(Vec::new()));
    root(&rt, |_| {
        let (c1, o1) = (count.clone(), order.clone());
        effect(&rt, move || o1.borrow_mut().push(format!("effect {}", c1.get())));
        let (c2, o2) = (count.clone(), order.clone());
        render_effect(&rt, move || o2.borrow_mut().push(format!("render {}", c2.get())));
    });
    batch(&rt, || count.set(1));
    assert_eq!(
        *order.borrow(),
        vec!["render 0", "effect 0", "render 1", "effect 1"]
    );
}

#[test]
fn test_memo_chain() {
    let rt = runtime();
    let base = Signal::new(&rt, 2);
    let out = Rc::new(Cell::new(0));
    root(&rt, |_| {
        let b = base.clone();
        let doubled = Memo::new(&rt, move || b.get() * 2);
        let d = doubled.clone();
        let plus_one = Memo::new(&rt, move || d.get() + 1);
        let out = out.clone();
        render_effect(&rt, move || out.set(plus_one.get()));
    });
    assert_eq!(out.get(), 5);
    base.set(10);
    assert_eq!(out.get(), 21);
}

// ============================================================================
// CONTEXT AND LISTS
// ============================================================================

#[test]
fn test_context_visible_in_nested_effect() {
    let rt = runtime();
    let locale = Context::new(String::from("en"));
    let seen = Rc::new(RefCell::new(String::new()));
    root(&rt, |_| {
        locale.provide(&rt, String::from("fr"));
        let (locale, seen, rt2) = (locale.clone(), seen.clone(), rt.clone());
        render_effect(&rt, move || *seen.borrow_mut() = locale.get(&rt2));
    });
    assert_eq!(*seen.borrow(), "fr");
}

#[test]
fn test_reactive_vec_drives_effect() {
    let rt = runtime();
    let list = ReactiveVec::from_vec(&rt, vec!["a", "b"]);
    let joined = Rc::new(RefCell::new(String::new()));
    root(&rt, |_| {
        let (list, joined) = (list.clone(), joined.clone());
        render_effect(&rt, move || *joined.borrow_mut() = list.to_vec().concat());
    });
    list.reverse();
    assert_eq!(*joined.borrow(), "ba");
    batch(&rt, || {
        list.push("c");
        list.retain(|s| *s != "b");
    });
    assert_eq!(*joined.borrow(), "ac");
}

proptest! {
    #[test]
    fn prop_batched_writes_run_once(values in proptest::collection::vec(0i32..100, 1..20)) {
        let rt = runtime();
        let signal = Signal::new(&rt, -1);
        let runs = Rc::new(Cell::new(0));
        let last = Rc::new(Cell::new(0));
        root(&rt, |_| {
            let (signal, runs, last) = (signal.clone(), runs.clone(), last.clone());
            render_effect(&rt, move || {
                last.set(signal.get());
                runs.set(runs.get() + 1);
            });
        });
        batch(&rt, || {
            for v in &values {
                signal.set(*v);
            }
        });
        prop_assert_eq!(runs.get(), 2);
        prop_assert_eq!(last.get(), *values.last().unwrap());
    }
}
