//! Owner-scoped context values

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Reactive, Scope};

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

/// Identity of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey(u64);

impl ContextKey {
    pub fn unique() -> Self {
        ContextKey(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Typed context with a default value
#[derive(Debug, Clone)]
pub struct Context<T> {
    key: ContextKey,
    default: T,
}

impl<T: Clone + 'static> Context<T> {
    pub fn new(default: T) -> Self {
        Self {
            key: ContextKey::unique(),
            default,
        }
    }

    pub fn key(&self) -> ContextKey {
        self.key
    }

    /// Provide a value on the current owner
    pub fn provide(&self, rt: &Reactive, value: T) {
        rt.provide(self.key, Rc::new(value));
    }

    /// Run `f` in a child owner that sees `value`
    pub fn with_value<R>(&self, rt: &Reactive, value: T, f: impl FnOnce() -> R) -> R {
        let owner = rt.create_owner(false);
        let current = rt.scope();
        let prev = rt.swap_scope(Scope {
            owner: Some(owner),
            ..current
        });
        rt.provide(self.key, Rc::new(value));
        let out = f();
        rt.swap_scope(prev);
        out
    }

    /// Nearest provided value, or the default
    pub fn get(&self, rt: &Reactive) -> T {
        rt.lookup(self.key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
            .unwrap_or_else(|| self.default.clone())
    }
}
