//! fOS Reactive
//!
//! The rendering core never talks to a concrete signal library. It is handed
//! an `Rc<dyn ReactiveRuntime>` and only uses the primitives below: owners
//! (roots), computations (render effects and effects), cleanups, tracked
//! cells (the building block of signals and memos), untracking and
//! owner-scoped context values. [`Runtime`] is the default implementation.
//!
//! The generic conveniences ([`root`], [`untrack`], [`batch`], [`Signal`],
//! [`Memo`], [`Context`], [`ReactiveVec`]) are written once against the trait,
//! so any runtime that honours it gets them for free.

mod context;
mod list;
mod runtime;
mod signal;

pub use context::{Context, ContextKey};
pub use list::ReactiveVec;
pub use runtime::Runtime;
pub use signal::{Memo, Signal};

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared handle to a reactive runtime
pub type Reactive = Rc<dyn ReactiveRuntime>;

/// Owner (root or computation) identifier. The generation makes ids of
/// disposed owners stale instead of aliasing a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Tracked cell identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub(crate) u32);

/// Current owner and tracking listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scope {
    /// Owner new computations and cleanups attach to
    pub owner: Option<OwnerId>,
    /// Computation that records cell reads (`None` = untracked)
    pub listener: Option<OwnerId>,
}

impl Scope {
    /// Scope that owns and tracks into `id`
    pub fn tracking(id: OwnerId) -> Self {
        Self {
            owner: Some(id),
            listener: Some(id),
        }
    }
}

/// Reactive library capability object
///
/// Render effects run synchronously when created. Effects run once the
/// outermost batch or computation has finished. Writes to a cell re-run the
/// computations that read it, batched per write.
pub trait ReactiveRuntime {
    /// Create an owner. Detached owners (roots) are only disposed explicitly;
    /// attached owners are disposed with the current owner.
    fn create_owner(&self, detached: bool) -> OwnerId;

    /// Create a computation owned by the current owner, without running it
    fn create_computation(&self, deferred: bool) -> OwnerId;

    /// Install the function a computation runs
    fn set_computation(&self, id: OwnerId, f: Box<dyn FnMut()>);

    /// Clean the computation's previous run and run it again
    fn run_computation(&self, id: OwnerId);

    /// Run an effect now, or queue it when inside a batch or computation
    fn queue_effect(&self, id: OwnerId);

    /// Dispose an owner: children first, then its cleanups (newest first).
    /// Disposing twice is a no-op.
    fn dispose(&self, id: OwnerId);

    fn is_disposed(&self, id: OwnerId) -> bool;

    /// Replace the current scope, returning the previous one
    fn swap_scope(&self, scope: Scope) -> Scope;

    fn scope(&self) -> Scope;

    /// Register a cleanup on the current owner
    fn cleanup(&self, f: Box<dyn FnOnce()>);

    fn create_cell(&self) -> CellId;

    /// Free a cell whose value is gone
    fn release_cell(&self, cell: CellId);

    /// Record a read of `cell` by the current listener
    fn track(&self, cell: CellId);

    /// Schedule every computation that read `cell`
    fn notify(&self, cell: CellId);

    fn begin_batch(&self);

    /// Leave a batch; the outermost exit flushes queued computations
    fn end_batch(&self);

    /// Store a context value on the current owner
    fn provide(&self, key: ContextKey, value: Rc<dyn Any>);

    /// Find a context value on the current owner or its ancestors
    fn lookup(&self, key: ContextKey) -> Option<Rc<dyn Any>>;

    /// Create and immediately run a computation
    fn render_effect(&self, f: Box<dyn FnMut()>) {
        let id = self.create_computation(false);
        self.set_computation(id, f);
        self.run_computation(id);
    }

    /// Create a computation that runs after the current batch
    fn effect(&self, f: Box<dyn FnMut()>) {
        let id = self.create_computation(true);
        self.set_computation(id, f);
        self.queue_effect(id);
    }
}

/// Disposer of a root
#[derive(Clone)]
pub struct Dispose {
    rt: Weak<dyn ReactiveRuntime>,
    owner: OwnerId,
}

impl Dispose {
    pub fn new(rt: &Reactive, owner: OwnerId) -> Self {
        Self {
            rt: Rc::downgrade(rt),
            owner,
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Dispose the root (idempotent)
    pub fn dispose(&self) {
        if let Some(rt) = self.rt.upgrade() {
            rt.dispose(self.owner);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.rt.upgrade().is_none_or(|rt| rt.is_disposed(self.owner))
    }
}

impl fmt::Debug for Dispose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispose").field("owner", &self.owner).finish()
    }
}

/// Run `f` in a new root. Reads inside are untracked; effects created
/// inside run when `f` returns.
pub fn root<T>(rt: &Reactive, f: impl FnOnce(Dispose) -> T) -> T {
    let owner = rt.create_owner(true);
    let prev = rt.swap_scope(Scope {
        owner: Some(owner),
        listener: None,
    });
    rt.begin_batch();
    let out = f(Dispose::new(rt, owner));
    rt.swap_scope(prev);
    rt.end_batch();
    out
}

/// Run `f` without recording reads
pub fn untrack<T>(rt: &Reactive, f: impl FnOnce() -> T) -> T {
    let current = rt.scope();
    let prev = rt.swap_scope(Scope {
        listener: None,
        ..current
    });
    let out = f();
    rt.swap_scope(prev);
    out
}

/// Run `f` with the given owner (and no listener)
pub fn with_owner<T>(rt: &Reactive, owner: OwnerId, f: impl FnOnce() -> T) -> T {
    let prev = rt.swap_scope(Scope {
        owner: Some(owner),
        listener: None,
    });
    let out = f();
    rt.swap_scope(prev);
    out
}

/// Group writes so dependents re-run once, when `f` returns
pub fn batch<T>(rt: &Reactive, f: impl FnOnce() -> T) -> T {
    rt.begin_batch();
    let out = f();
    rt.end_batch();
    out
}

/// Register a cleanup on the current owner
pub fn on_cleanup(rt: &Reactive, f: impl FnOnce() + 'static) {
    rt.cleanup(Box::new(f));
}

/// Create a render effect
pub fn render_effect(rt: &Reactive, f: impl FnMut() + 'static) {
    rt.render_effect(Box::new(f));
}

/// Create a deferred effect
pub fn effect(rt: &Reactive, f: impl FnMut() + 'static) {
    rt.effect(Box::new(f));
}
