//! Default reactive runtime
//!
//! Owners live in a slot arena addressed by generation-checked ids. Every
//! user callback (computation bodies, cleanups, dropped closures) runs with
//! the state borrow released, so callbacks may freely re-enter the runtime.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::{CellId, ContextKey, OwnerId, ReactiveRuntime, Scope};

struct Computation {
    f: Option<Box<dyn FnMut()>>,
    sources: Vec<CellId>,
    deferred: bool,
    queued: bool,
}

#[derive(Default)]
struct Owner {
    parent: Option<OwnerId>,
    children: Vec<OwnerId>,
    cleanups: Vec<Box<dyn FnOnce()>>,
    context: Vec<(ContextKey, Rc<dyn Any>)>,
    computation: Option<Computation>,
}

struct Slot {
    generation: u32,
    owner: Option<Owner>,
}

#[derive(Default)]
struct State {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    /// Observers per cell
    cells: Vec<Vec<OwnerId>>,
    free_cells: Vec<u32>,
    scope: Scope,
    depth: u32,
    flushing: bool,
    pending: VecDeque<OwnerId>,
    effects: VecDeque<OwnerId>,
}

impl State {
    fn get(&self, id: OwnerId) -> Option<&Owner> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.owner.as_ref())
    }

    fn get_mut(&mut self, id: OwnerId) -> Option<&mut Owner> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.owner.as_mut())
    }

    fn alloc(&mut self, owner: Owner) -> OwnerId {
        if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.slots[index as usize];
            slot.owner = Some(owner);
            return OwnerId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            owner: Some(owner),
        });
        OwnerId {
            index,
            generation: 0,
        }
    }

    /// Free a slot, handing the owner back so it is dropped outside the borrow
    fn free(&mut self, id: OwnerId) -> Option<Owner> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let owner = slot.owner.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index);
        owner
    }
}

/// Default owner-tree runtime
#[derive(Default)]
pub struct Runtime {
    state: RefCell<State>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, the form the rendering core takes
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Number of live owners (roots and computations)
    pub fn owner_count(&self) -> usize {
        self.state
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.owner.is_some())
            .count()
    }

    /// Dispose children and run cleanups of an owner, and drop its
    /// subscriptions, keeping the owner itself alive
    fn clean(&self, id: OwnerId) {
        let (children, cleanups) = {
            let mut st = self.state.borrow_mut();
            let Some(owner) = st.get_mut(id) else {
                return;
            };
            let children = std::mem::take(&mut owner.children);
            let cleanups = std::mem::take(&mut owner.cleanups);
            let sources = owner
                .computation
                .as_mut()
                .map(|c| std::mem::take(&mut c.sources))
                .unwrap_or_default();
            for cell in sources {
                if let Some(observers) = st.cells.get_mut(cell.0 as usize) {
                    observers.retain(|o| *o != id);
                }
            }
            (children, cleanups)
        };
        for child in children.into_iter().rev() {
            self.dispose(child);
        }
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }

    fn maybe_flush(&self) {
        {
            let st = self.state.borrow();
            if st.depth > 0 || st.flushing {
                return;
            }
        }
        self.flush();
    }

    fn flush(&self) {
        self.state.borrow_mut().flushing = true;
        let mut runs = 0usize;
        loop {
            let next = {
                let mut st = self.state.borrow_mut();
                match st.pending.pop_front() {
                    Some(id) => Some(id),
                    None => st.effects.pop_front(),
                }
            };
            match next {
                Some(id) => {
                    runs += 1;
                    self.run_computation(id);
                }
                None => break,
            }
        }
        self.state.borrow_mut().flushing = false;
        if runs > 0 {
            tracing::trace!("reactive flush ran {} computations", runs);
        }
    }
}

impl ReactiveRuntime for Runtime {
    fn create_owner(&self, detached: bool) -> OwnerId {
        let mut st = self.state.borrow_mut();
        let parent = st.scope.owner.filter(|p| st.get(*p).is_some());
        let id = st.alloc(Owner {
            parent,
            ..Owner::default()
        });
        match parent {
            Some(p) if !detached => {
                if let Some(parent) = st.get_mut(p) {
                    parent.children.push(id);
                }
            }
            None if !detached => {
                tracing::debug!("owner created outside a root will never be disposed");
            }
            _ => {}
        }
        id
    }

    fn create_computation(&self, deferred: bool) -> OwnerId {
        let id = self.create_owner(false);
        if let Some(owner) = self.state.borrow_mut().get_mut(id) {
            owner.computation = Some(Computation {
                f: None,
                sources: Vec::new(),
                deferred,
                queued: false,
            });
        }
        id
    }

    fn set_computation(&self, id: OwnerId, f: Box<dyn FnMut()>) {
        let previous = {
            let mut st = self.state.borrow_mut();
            match st.get_mut(id).and_then(|o| o.computation.as_mut()) {
                Some(c) => c.f.replace(f),
                None => Some(f),
            }
        };
        drop(previous);
    }

    fn run_computation(&self, id: OwnerId) {
        self.clean(id);
        let f = {
            let mut st = self.state.borrow_mut();
            match st.get_mut(id).and_then(|o| o.computation.as_mut()) {
                Some(c) => {
                    c.queued = false;
                    c.f.take()
                }
                None => None,
            }
        };
        let Some(mut f) = f else {
            return;
        };

        let prev = self.swap_scope(Scope::tracking(id));
        self.state.borrow_mut().depth += 1;
        f();
        let leftover = {
            let mut st = self.state.borrow_mut();
            st.depth -= 1;
            match st.get_mut(id).and_then(|o| o.computation.as_mut()) {
                Some(c) if c.f.is_none() => {
                    c.f = Some(f);
                    None
                }
                _ => Some(f),
            }
        };
        // Disposed while running
        drop(leftover);
        self.swap_scope(prev);
        self.maybe_flush();
    }

    fn queue_effect(&self, id: OwnerId) {
        let run_now = {
            let mut st = self.state.borrow_mut();
            if st.depth == 0 && !st.flushing {
                true
            } else {
                if let Some(c) = st.get_mut(id).and_then(|o| o.computation.as_mut()) {
                    c.queued = true;
                }
                st.effects.push_back(id);
                false
            }
        };
        if run_now {
            self.run_computation(id);
        }
    }

    fn dispose(&self, id: OwnerId) {
        if self.is_disposed(id) {
            return;
        }
        self.clean(id);
        let dead = {
            let mut st = self.state.borrow_mut();
            let parent = st.get(id).and_then(|o| o.parent);
            if let Some(parent) = parent.and_then(|p| st.get_mut(p)) {
                parent.children.retain(|c| *c != id);
            }
            st.free(id)
        };
        drop(dead);
    }

    fn is_disposed(&self, id: OwnerId) -> bool {
        self.state.borrow().get(id).is_none()
    }

    fn swap_scope(&self, scope: Scope) -> Scope {
        std::mem::replace(&mut self.state.borrow_mut().scope, scope)
    }

    fn scope(&self) -> Scope {
        self.state.borrow().scope
    }

    fn cleanup(&self, f: Box<dyn FnOnce()>) {
        let rejected = {
            let mut st = self.state.borrow_mut();
            match st.scope.owner {
                Some(owner) => match st.get_mut(owner) {
                    Some(owner) => {
                        owner.cleanups.push(f);
                        None
                    }
                    None => Some(f),
                },
                None => Some(f),
            }
        };
        if rejected.is_some() {
            tracing::debug!("cleanup registered outside an owner is never run");
        }
    }

    fn create_cell(&self) -> CellId {
        let mut st = self.state.borrow_mut();
        if let Some(index) = st.free_cells.pop() {
            return CellId(index);
        }
        st.cells.push(Vec::new());
        CellId(st.cells.len() as u32 - 1)
    }

    fn release_cell(&self, cell: CellId) {
        // Cells can be released from a drop that happens inside a borrow
        let Ok(mut st) = self.state.try_borrow_mut() else {
            return;
        };
        if let Some(observers) = st.cells.get_mut(cell.0 as usize) {
            observers.clear();
            st.free_cells.push(cell.0);
        }
    }

    fn track(&self, cell: CellId) {
        let mut st = self.state.borrow_mut();
        let Some(listener) = st.scope.listener else {
            return;
        };
        let added = match st.get_mut(listener).and_then(|o| o.computation.as_mut()) {
            Some(c) if !c.sources.contains(&cell) => {
                c.sources.push(cell);
                true
            }
            _ => false,
        };
        if added {
            if let Some(observers) = st.cells.get_mut(cell.0 as usize) {
                observers.push(listener);
            }
        }
    }

    fn notify(&self, cell: CellId) {
        {
            let mut st = self.state.borrow_mut();
            let observers = match st.cells.get_mut(cell.0 as usize) {
                Some(observers) => std::mem::take(observers),
                None => return,
            };
            for id in observers {
                let deferred = match st.get_mut(id).and_then(|o| o.computation.as_mut()) {
                    Some(c) if !c.queued => {
                        c.queued = true;
                        c.deferred
                    }
                    _ => continue,
                };
                if deferred {
                    st.effects.push_back(id);
                } else {
                    st.pending.push_back(id);
                }
            }
        }
        self.maybe_flush();
    }

    fn begin_batch(&self) {
        self.state.borrow_mut().depth += 1;
    }

    fn end_batch(&self) {
        {
            let mut st = self.state.borrow_mut();
            st.depth = st.depth.saturating_sub(1);
        }
        self.maybe_flush();
    }

    fn provide(&self, key: ContextKey, value: Rc<dyn Any>) {
        let mut st = self.state.borrow_mut();
        let Some(owner) = st.scope.owner else {
            tracing::warn!("context provided outside an owner is ignored");
            return;
        };
        if let Some(owner) = st.get_mut(owner) {
            owner.context.retain(|(k, _)| *k != key);
            owner.context.push((key, value));
        }
    }

    fn lookup(&self, key: ContextKey) -> Option<Rc<dyn Any>> {
        let st = self.state.borrow();
        let mut cur = st.scope.owner;
        while let Some(id) = cur {
            let owner = st.get(id)?;
            if let Some((_, value)) = owner.context.iter().find(|(k, _)| *k == key) {
                return Some(value.clone());
            }
            cur = owner.parent;
        }
        None
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("owners", &self.owner_count())
            .finish()
    }
}
