//! DOM Events
//!
//! Listener storage and the event object handed to listeners. Dispatch
//! itself lives in the renderer, which must release its borrow of the tree
//! before listeners run.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::NodeId;

/// Event listener callback
pub type Listener = Rc<dyn Fn(&Event)>;

/// Event passed to listeners
#[derive(Debug)]
pub struct Event {
    pub name: String,
    pub target: NodeId,
    pub current_target: Cell<NodeId>,
    pub bubbles: bool,
    /// Free-form payload for custom events
    pub detail: Option<String>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl Event {
    pub fn new(name: &str, target: NodeId) -> Self {
        Self {
            name: name.to_string(),
            target,
            current_target: Cell::new(target),
            bubbles: true,
            detail: None,
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    /// Event that only reaches its target
    pub fn non_bubbling(name: &str, target: NodeId) -> Self {
        Self {
            bubbles: false,
            ..Self::new(name, target)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Listeners per node and event name
#[derive(Default)]
pub struct ListenerMap {
    map: HashMap<NodeId, Vec<(String, Listener)>>,
}

impl ListenerMap {
    pub fn add(&mut self, node: NodeId, event: &str, listener: Listener) {
        self.map
            .entry(node)
            .or_default()
            .push((event.to_string(), listener));
    }

    /// Remove a listener by identity
    pub fn remove(&mut self, node: NodeId, event: &str, listener: &Listener) -> bool {
        let Some(list) = self.map.get_mut(&node) else {
            return false;
        };
        let before = list.len();
        list.retain(|(name, l)| !(name == event && Rc::ptr_eq(l, listener)));
        before != list.len()
    }

    pub fn get(&self, node: NodeId, event: &str) -> Vec<Listener> {
        self.map
            .get(&node)
            .map(|list| {
                list.iter()
                    .filter(|(name, _)| name == event)
                    .map(|(_, l)| l.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn clear(&mut self, node: NodeId) {
        self.map.remove(&node);
    }
}

impl fmt::Debug for ListenerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerMap")
            .field("nodes", &self.map.len())
            .finish()
    }
}
