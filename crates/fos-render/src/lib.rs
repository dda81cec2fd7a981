//! fOS Render
//!
//! Runtime half of the partial compiler: instantiates hoisted templates,
//! binds prop setters at walk positions, inserts children and reconciles
//! keyed lists. All reactivity goes through the injected
//! [`fos_reactive::ReactiveRuntime`]; the renderer never assumes a specific
//! signal implementation.

mod children;
mod event_loop;
mod map;
mod partial;
mod plugins;
mod props;
mod render;
mod scheduler;
mod value;

pub use event_loop::{Microtask, MicrotaskQueue};
pub use partial::{PartialArg, PartialFactory, PartialMeta};
pub use plugins::{PluginHandler, PluginRegistry, BUILTIN_NAMESPACES};
pub use props::{PropKind, PROPERTY_NAMES};
pub use render::{component, Component, ComponentFactory, RenderOptions, Tag};
pub use scheduler::{Bucket, Scheduler};
pub use value::{Children, Mount, NodeCallback, Props, Value};

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use fos_dom::{DomError, DomTree};
use fos_html::HtmlError;
use fos_reactive::Reactive;

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The template ran out of elements before every argument was applied;
    /// the partial metadata does not match its HTML
    #[error("partial walk exhausted: applied {applied} of {expected} arguments")]
    WalkExhausted { expected: usize, applied: usize },

    #[error("invalid partial metadata: {0}")]
    InvalidMetadata(String),

    #[error("renderer was dropped")]
    Detached,

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Html(#[from] HtmlError),
}

struct RendererInner {
    tree: RefCell<DomTree>,
    rt: Reactive,
    microtasks: MicrotaskQueue,
    scheduler: Scheduler,
    plugins: RefCell<PluginRegistry>,
}

/// Rendering core bound to one DOM tree and one reactive runtime
///
/// Cloning is cheap and yields a handle to the same renderer. The tree is
/// never borrowed while user code (listeners, callbacks, components) runs.
#[derive(Clone)]
pub struct Renderer {
    inner: Rc<RendererInner>,
}

/// Non-owning renderer handle, held by effects and factories
#[derive(Clone)]
pub struct WeakRenderer {
    inner: Weak<RendererInner>,
}

impl WeakRenderer {
    pub fn upgrade(&self) -> Option<Renderer> {
        self.inner.upgrade().map(|inner| Renderer { inner })
    }
}

impl Renderer {
    /// Create a renderer over an empty document
    pub fn new(rt: Reactive) -> Self {
        Self::with_tree(rt, DomTree::new())
    }

    /// Create a renderer over an existing tree
    pub fn with_tree(rt: Reactive, tree: DomTree) -> Self {
        Self {
            inner: Rc::new(RendererInner {
                tree: RefCell::new(tree),
                rt,
                microtasks: MicrotaskQueue::new(),
                scheduler: Scheduler::new(),
                plugins: RefCell::new(PluginRegistry::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakRenderer {
        WeakRenderer {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The injected reactive runtime
    pub fn reactive(&self) -> &Reactive {
        &self.inner.rt
    }

    /// Borrow the tree. Do not hold the borrow across renderer calls.
    pub fn tree(&self) -> Ref<'_, DomTree> {
        self.inner.tree.borrow()
    }

    /// Borrow the tree mutably. Do not hold the borrow across renderer calls.
    pub fn tree_mut(&self) -> RefMut<'_, DomTree> {
        self.inner.tree.borrow_mut()
    }

    /// Run `f` with the tree borrowed mutably
    pub fn with_tree_mut<T>(&self, f: impl FnOnce(&mut DomTree) -> T) -> T {
        f(&mut self.inner.tree.borrow_mut())
    }

    pub fn document(&self) -> fos_dom::NodeId {
        self.tree().document()
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    /// Queue `task` in a scheduler bucket; the first task of a batch
    /// queues the flush as a microtask
    pub fn schedule(&self, bucket: Bucket, task: impl FnOnce() + 'static) {
        if self.inner.scheduler.add(bucket, Box::new(task)) {
            let weak = self.downgrade();
            self.inner.microtasks.queue_microtask(Box::new(move || {
                if let Some(renderer) = weak.upgrade() {
                    renderer.inner.scheduler.flush();
                }
            }));
        }
    }

    /// Queue a plain microtask
    pub fn queue_microtask(&self, task: impl FnOnce() + 'static) {
        self.inner.microtasks.queue_microtask(Box::new(task));
    }

    /// Drain the microtask queue (host hook). Returns how many ran.
    pub fn run_microtasks(&self) -> usize {
        self.inner.microtasks.run_microtasks()
    }

    // ---------------------------------------------------------------------
    // Reactive helpers
    // ---------------------------------------------------------------------

    /// Render effect holding only a weak handle to the renderer
    pub(crate) fn render_effect(&self, mut f: impl FnMut(&Renderer) + 'static) {
        let weak = self.downgrade();
        self.inner.rt.render_effect(Box::new(move || {
            if let Some(renderer) = weak.upgrade() {
                f(&renderer);
            }
        }));
    }

    /// Register a cleanup on the current owner
    pub(crate) fn on_cleanup(&self, f: impl FnOnce(&Renderer) + 'static) {
        let weak = self.downgrade();
        self.inner.rt.cleanup(Box::new(move || {
            if let Some(renderer) = weak.upgrade() {
                f(&renderer);
            }
        }));
    }

    /// Run queued custom-element upgrade callbacks
    pub(crate) fn run_upgrades(&self) {
        let pending = self.tree_mut().take_pending_upgrades();
        for (node, callback) in pending {
            callback(node);
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("nodes", &self.inner.tree.try_borrow().map(|t| t.len()).ok())
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}

/// Log an error raised inside a reactive computation, where it cannot be
/// returned to a caller
pub(crate) fn report(context: &str, result: RenderResult<()>) {
    if let Err(err) = result {
        tracing::warn!("{}: {}", context, err);
    }
}
