//! Prop dispatch and setters
//!
//! Every prop a template binds ends in one of the setters below. Compiled
//! code calls the setter for a prop kind directly; `jsx` and spreads go
//! through [`Renderer::assign_prop`], the only place a prop name is
//! classified at runtime.

use fos_dom::{NodeId, ScopedStyleSheet, StyleDeclaration};
use fos_reactive::untrack;

use crate::{report, Bucket, Children, NodeCallback, RenderResult, Renderer, Value};

/// Plain prop names that are node properties rather than attributes
pub const PROPERTY_NAMES: [&str; 7] = [
    "value",
    "checked",
    "selected",
    "indeterminate",
    "muted",
    "defaultValue",
    "defaultChecked",
];

/// Setter selected by a prop name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    /// `class`
    Class,
    /// `class:token`
    ClassNS,
    /// `style`
    Style,
    /// `style:property`
    StyleNS,
    /// Plain property name such as `value`
    Prop,
    /// `prop:name`
    PropNS,
    /// `onClick` style plain event name
    Event,
    /// `on:event`
    EventNS,
    UseRef,
    UseCss,
    UseConnected,
    UseDisconnected,
    Spread,
    /// Catch-all attribute
    Attribute,
}

impl PropKind {
    /// Classify a prop name. Returns the kind and the name the setter
    /// receives (the local part for namespaced names).
    pub fn classify(name: &str) -> (PropKind, &str) {
        if let Some((ns, local)) = name.split_once(':') {
            let kind = match (ns, local) {
                ("class", _) => PropKind::ClassNS,
                ("style", _) => PropKind::StyleNS,
                ("prop", _) => PropKind::PropNS,
                ("on", _) => PropKind::EventNS,
                ("use", "ref") => PropKind::UseRef,
                ("use", "css") => PropKind::UseCss,
                ("use", "connected") => PropKind::UseConnected,
                ("use", "disconnected") => PropKind::UseDisconnected,
                _ => return (PropKind::Attribute, name),
            };
            return (kind, local);
        }
        match name {
            "class" => (PropKind::Class, name),
            "style" => (PropKind::Style, name),
            _ if PROPERTY_NAMES.contains(&name) => (PropKind::Prop, name),
            _ if is_event_name(name) => (PropKind::Event, &name[2..]),
            _ => (PropKind::Attribute, name),
        }
    }

    /// Whether the kind is written as `namespace:local`
    pub fn is_namespaced(self) -> bool {
        matches!(
            self,
            PropKind::ClassNS
                | PropKind::StyleNS
                | PropKind::PropNS
                | PropKind::EventNS
                | PropKind::UseRef
                | PropKind::UseCss
                | PropKind::UseConnected
                | PropKind::UseDisconnected
        )
    }
}

/// `onClick`: `on` followed by an uppercase letter
fn is_event_name(name: &str) -> bool {
    name.len() > 2
        && name.starts_with("on")
        && name[2..].chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

impl Renderer {
    /// Apply `apply` now, or inside a render effect when `value` is reactive
    fn bind(
        &self,
        value: Value,
        context: &'static str,
        mut apply: impl FnMut(&Renderer, Value) -> RenderResult<()> + 'static,
    ) -> RenderResult<()> {
        match value {
            Value::Dynamic(f) => {
                self.render_effect(move |renderer| {
                    let value = f().resolve();
                    report(context, apply(renderer, value));
                });
                Ok(())
            }
            other => apply(self, other),
        }
    }

    /// Classify `name` and dispatch `value` to its setter. Plugins are
    /// consulted first.
    pub fn assign_prop(&self, node: NodeId, name: &str, value: Value) -> RenderResult<()> {
        if name == "__proto__" {
            tracing::warn!("ignoring __proto__ prop");
            return Ok(());
        }
        if name == "children" {
            self.create_children(node, Children::from(value))?;
            return Ok(());
        }
        if self.apply_plugin(node, name, &value)? {
            return Ok(());
        }
        let (kind, local) = PropKind::classify(name);
        self.apply_prop(node, kind, local, value)
    }

    /// Dispatch a prop whose kind is already known
    pub fn apply_prop(
        &self,
        node: NodeId,
        kind: PropKind,
        name: &str,
        value: Value,
    ) -> RenderResult<()> {
        match kind {
            PropKind::Class => self.set_class(node, value),
            PropKind::ClassNS => self.set_class_token(node, name, value),
            PropKind::Style => self.set_style(node, value),
            PropKind::StyleNS => self.set_style_property(node, name, value),
            PropKind::Prop | PropKind::PropNS => self.set_property(node, name, value),
            PropKind::Event => self.add_event(node, &name.to_ascii_lowercase(), value),
            PropKind::EventNS => self.add_event(node, name, value),
            PropKind::UseRef => self.set_ref(node, value),
            PropKind::UseCss => self.set_css(node, value),
            PropKind::UseConnected => self.set_connected(node, value),
            PropKind::UseDisconnected => self.set_disconnected(node, value),
            PropKind::Spread => self.spread_props(node, value),
            PropKind::Attribute => self.set_attribute(node, name, value),
        }
    }

    // ---------------------------------------------------------------------
    // Class and style
    // ---------------------------------------------------------------------

    /// `class`: a string replaces the attribute, an object toggles tokens
    pub fn set_class(&self, node: NodeId, value: Value) -> RenderResult<()> {
        if let Value::Object(entries) = value {
            for (tokens, on) in entries {
                for token in tokens.split_whitespace() {
                    self.set_class_token(node, token, on.clone())?;
                }
            }
            return Ok(());
        }
        self.bind(value, "class", move |renderer, value| match value {
            Value::Object(entries) => {
                let toggles: Vec<(String, bool)> = entries
                    .into_iter()
                    .map(|(tokens, on)| (tokens, on.resolve().is_truthy()))
                    .collect();
                let mut tree = renderer.tree_mut();
                for (tokens, on) in toggles {
                    for token in tokens.split_whitespace() {
                        tree.toggle_class(node, token, on)?;
                    }
                }
                Ok(())
            }
            v if v.is_absent() => {
                renderer.tree_mut().remove_attribute(node, "class")?;
                Ok(())
            }
            v => Ok(renderer.tree_mut().set_attribute(node, "class", &v.to_text())?),
        })
    }

    /// `class:token`: toggle one token by truthiness
    pub fn set_class_token(&self, node: NodeId, token: &str, value: Value) -> RenderResult<()> {
        let token = token.to_string();
        let mut previous: Option<bool> = None;
        self.bind(value, "class token", move |renderer, value| {
            let on = value.is_truthy();
            // Nothing to remove on the first run
            if previous.is_none() && !on {
                previous = Some(false);
                return Ok(());
            }
            if previous == Some(on) {
                return Ok(());
            }
            previous = Some(on);
            renderer.tree_mut().toggle_class(node, &token, on)?;
            Ok(())
        })
    }

    /// `style`: a string replaces the declaration, an object sets properties
    pub fn set_style(&self, node: NodeId, value: Value) -> RenderResult<()> {
        if let Value::Object(entries) = value {
            for (name, v) in entries {
                self.set_style_property(node, &name, v)?;
            }
            return Ok(());
        }
        self.bind(value, "style", move |renderer, value| {
            match value {
                Value::Object(entries) => {
                    let properties: Vec<(String, Option<String>)> = entries
                        .into_iter()
                        .map(|(name, v)| {
                            let v = v.resolve();
                            (name, (!v.is_absent()).then(|| v.to_text()))
                        })
                        .collect();
                    let mut tree = renderer.tree_mut();
                    for (name, text) in properties {
                        tree.set_style_property(node, &name, text.as_deref())?;
                    }
                }
                v if v.is_absent() => {
                    renderer.tree_mut().remove_attribute(node, "style")?;
                }
                v => {
                    let css = StyleDeclaration::parse(&v.to_text()).css_text();
                    let mut tree = renderer.tree_mut();
                    if css.is_empty() {
                        tree.remove_attribute(node, "style")?;
                    } else {
                        tree.set_attribute(node, "style", &css)?;
                    }
                }
            }
            Ok(())
        })
    }

    /// `style:name`: set one property, removing it for null/false
    pub fn set_style_property(&self, node: NodeId, name: &str, value: Value) -> RenderResult<()> {
        let name = name.to_string();
        self.bind(value, "style property", move |renderer, value| {
            let text = (!value.is_absent()).then(|| value.to_text());
            renderer
                .tree_mut()
                .set_style_property(node, &name, text.as_deref())?;
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Properties and attributes
    // ---------------------------------------------------------------------

    /// Assign a node property (never serialized as an attribute)
    pub fn set_property(&self, node: NodeId, name: &str, value: Value) -> RenderResult<()> {
        let name = name.to_string();
        self.bind(value, "property", move |renderer, value| {
            match value.to_property() {
                Some(property) => renderer.tree_mut().set_property(node, &name, property)?,
                None => tracing::debug!("property '{}' cannot hold {:?}", name, value),
            }
            Ok(())
        })
    }

    /// Catch-all: null/false/undefined remove, `true` is the empty string
    pub fn set_attribute(&self, node: NodeId, name: &str, value: Value) -> RenderResult<()> {
        let name = name.to_string();
        self.bind(value, "attribute", move |renderer, value| {
            let mut tree = renderer.tree_mut();
            match value {
                v if v.is_absent() => {
                    tree.remove_attribute(node, &name)?;
                }
                Value::Bool(true) => tree.set_attribute(node, &name, "")?,
                v => tree.set_attribute(node, &name, &v.to_text())?,
            }
            Ok(())
        })
    }

    /// Apply every own entry of an object, in order. Later entries win.
    pub fn spread_props(&self, node: NodeId, value: Value) -> RenderResult<()> {
        let value = match value {
            Value::Dynamic(f) => untrack(self.reactive(), || f().resolve()),
            other => other,
        };
        match value {
            Value::Object(entries) => {
                for (name, value) in entries {
                    self.assign_prop(node, &name, value)?;
                }
            }
            v if v.is_absent() => {}
            other => tracing::warn!("cannot spread {:?} onto an element", other),
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Events and lifecycle
    // ---------------------------------------------------------------------

    /// Add listeners for `event`; arrays fan out. Listeners are removed when
    /// the current owner is disposed.
    pub fn add_event(&self, node: NodeId, event: &str, value: Value) -> RenderResult<()> {
        let value = match value {
            Value::Dynamic(f) => untrack(self.reactive(), || f().resolve()),
            other => other,
        };
        match value {
            Value::Handler(listener) => {
                self.tree_mut()
                    .add_event_listener(node, event, listener.clone());
                let event = event.to_string();
                self.on_cleanup(move |renderer| {
                    renderer
                        .tree_mut()
                        .remove_event_listener(node, &event, &listener);
                });
            }
            Value::Array(handlers) => {
                for handler in handlers {
                    self.add_event(node, event, handler)?;
                }
            }
            v if v.is_absent() => {}
            other => tracing::warn!("'{}' handler is not a function: {:?}", event, other),
        }
        Ok(())
    }

    /// Call `f` for every callback in `value` (arrays fan out)
    fn each_callback(&self, value: Value, what: &str, f: &mut dyn FnMut(&Renderer, NodeCallback)) {
        let value = match value {
            Value::Dynamic(accessor) => untrack(self.reactive(), || accessor().resolve()),
            other => other,
        };
        match value {
            Value::Callback(callback) => f(self, callback),
            Value::Array(items) => {
                for item in items {
                    self.each_callback(item, what, f);
                }
            }
            v if v.is_absent() => {}
            other => tracing::warn!("{} expects a callback, got {:?}", what, other),
        }
    }

    /// `use:ref`: call back with the node right away
    pub fn set_ref(&self, node: NodeId, value: Value) -> RenderResult<()> {
        self.each_callback(value, "use:ref", &mut |_, callback| callback(node));
        Ok(())
    }

    /// `use:connected`: call back once mounted (scheduler mount bucket)
    pub fn set_connected(&self, node: NodeId, value: Value) -> RenderResult<()> {
        self.each_callback(value, "use:connected", &mut |renderer, callback| {
            renderer.schedule(Bucket::Mount, move || callback(node));
        });
        Ok(())
    }

    /// `use:disconnected`: call back when the current owner is disposed
    pub fn set_disconnected(&self, node: NodeId, value: Value) -> RenderResult<()> {
        self.each_callback(value, "use:disconnected", &mut |renderer, callback| {
            renderer.on_cleanup(move |_| callback(node));
        });
        Ok(())
    }

    /// `use:css`: adopt a scoped stylesheet on the node's document and add
    /// its scope class to the node
    pub fn set_css(&self, node: NodeId, value: Value) -> RenderResult<()> {
        self.bind(value, "use:css", move |renderer, value| {
            if value.is_absent() {
                return Ok(());
            }
            let sheet = ScopedStyleSheet::new(&value.to_text());
            let scope = sheet.scope.clone();
            let mut tree = renderer.tree_mut();
            let document = tree.document();
            if tree.adopt_stylesheet(document, sheet) {
                tracing::debug!("adopted stylesheet {}", scope);
            }
            tree.toggle_class(node, &scope, true)?;
            Ok(())
        })
    }
}
