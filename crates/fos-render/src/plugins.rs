//! Prop plugins
//!
//! External collaborators register handlers for a full prop name or a whole
//! namespace. Plugins are consulted before the built-in setters.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::{Bucket, RenderResult, Renderer, Value, report};

/// Plugin handler: `(renderer, node, local name, value)`
pub type PluginHandler = Rc<dyn Fn(&Renderer, NodeId, &str, Value) -> RenderResult<()>>;

/// Namespaces handled by the built-in setters
pub const BUILTIN_NAMESPACES: [&str; 5] = ["on", "prop", "class", "style", "use"];

#[derive(Clone)]
struct Plugin {
    handler: PluginHandler,
    on_microtask: bool,
}

/// Registered plugins and the derived `xmlns` declarations
pub struct PluginRegistry {
    names: HashMap<String, Plugin>,
    namespaces: HashMap<String, Plugin>,
    /// Every known namespace, built-ins first, in registration order
    known: Vec<String>,
    xmlns: String,
}

impl PluginRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            names: HashMap::new(),
            namespaces: HashMap::new(),
            known: Vec::new(),
            xmlns: String::new(),
        };
        for ns in BUILTIN_NAMESPACES {
            registry.know(ns);
        }
        registry
    }

    fn know(&mut self, ns: &str) {
        if self.known.iter().any(|k| k == ns) {
            return;
        }
        self.known.push(ns.to_string());
        if !self.xmlns.is_empty() {
            self.xmlns.push(' ');
        }
        self.xmlns.push_str("xmlns:");
        self.xmlns.push_str(ns);
        self.xmlns.push_str("=\"/\"");
    }

    pub fn register_name(&mut self, name: &str, handler: PluginHandler, on_microtask: bool) {
        self.names.insert(
            name.to_string(),
            Plugin {
                handler,
                on_microtask,
            },
        );
    }

    pub fn register_namespace(&mut self, ns: &str, handler: PluginHandler, on_microtask: bool) {
        self.namespaces.insert(
            ns.to_string(),
            Plugin {
                handler,
                on_microtask,
            },
        );
        self.know(ns);
    }

    /// `xmlns:<ns>="/"` for every known namespace, space separated
    pub fn xmlns_declarations(&self) -> &str {
        &self.xmlns
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    /// Plugin for a prop name: exact name first, then its namespace.
    /// Returns the handler, its microtask flag and the local name.
    fn lookup<'a>(&self, name: &'a str) -> Option<(PluginHandler, bool, &'a str)> {
        if let Some(plugin) = self.names.get(name) {
            return Some((plugin.handler.clone(), plugin.on_microtask, name));
        }
        let (ns, local) = name.split_once(':')?;
        let plugin = self.namespaces.get(ns)?;
        Some((plugin.handler.clone(), plugin.on_microtask, local))
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("names", &self.names.keys().collect::<Vec<_>>())
            .field("namespaces", &self.known)
            .finish()
    }
}

impl Renderer {
    /// Handle the prop `name` with `handler`. With `run_on_microtask` the
    /// handler runs in the scheduler's props bucket instead of immediately.
    pub fn props_plugin(
        &self,
        name: &str,
        handler: impl Fn(&Renderer, NodeId, &str, Value) -> RenderResult<()> + 'static,
        run_on_microtask: bool,
    ) {
        self.inner
            .plugins
            .borrow_mut()
            .register_name(name, Rc::new(handler), run_on_microtask);
    }

    /// Handle every prop in namespace `ns` with `handler`
    pub fn props_plugin_ns(
        &self,
        ns: &str,
        handler: impl Fn(&Renderer, NodeId, &str, Value) -> RenderResult<()> + 'static,
        run_on_microtask: bool,
    ) {
        tracing::debug!("registered prop namespace '{}'", ns);
        self.inner
            .plugins
            .borrow_mut()
            .register_namespace(ns, Rc::new(handler), run_on_microtask);
    }

    /// `xmlns:<ns>="/"` for every known prop namespace, for hosts that
    /// hand user markup with namespaced props to a namespace-aware XML
    /// parser. Templates parsed here need none: html5ever reads
    /// `route:to` as a plain attribute name.
    pub fn xmlns_declarations(&self) -> String {
        self.inner.plugins.borrow().xmlns_declarations().to_string()
    }

    /// Hand a prop to its plugin. Returns `Ok(false)` when no plugin claims it.
    pub(crate) fn apply_plugin(&self, node: NodeId, name: &str, value: &Value) -> RenderResult<bool> {
        let found = self.inner.plugins.borrow().lookup(name);
        let Some((handler, on_microtask, local)) = found else {
            return Ok(false);
        };
        if on_microtask {
            let weak = self.downgrade();
            let (local, value) = (local.to_string(), value.clone());
            self.schedule(Bucket::Props, move || {
                if let Some(renderer) = weak.upgrade() {
                    report("prop plugin", handler(&renderer, node, &local, value));
                }
            });
        } else {
            handler(self, node, local, value.clone())?;
        }
        Ok(true)
    }
}
