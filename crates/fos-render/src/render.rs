//! Elements, components and the top-level render API

use std::fmt;
use std::rc::Rc;

use fos_dom::{Event, Namespace, NodeId};
use fos_reactive::{root, untrack, Dispose};

use crate::{Children, Props, RenderError, RenderResult, Renderer, WeakRenderer};

/// Component function: `(renderer, props, children) -> children`
pub type Component = Rc<dyn Fn(&Renderer, Props, Children) -> RenderResult<Children>>;

/// Wrap a closure as a [`Component`]
pub fn component(
    f: impl Fn(&Renderer, Props, Children) -> RenderResult<Children> + 'static,
) -> Component {
    Rc::new(f)
}

/// What `jsx` instantiates
#[derive(Clone)]
pub enum Tag {
    Element(String),
    Component(Component),
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Element(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Element(name)
    }
}

impl From<Component> for Tag {
    fn from(component: Component) -> Self {
        Tag::Component(component)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Element(name) => write!(f, "Element({})", name),
            Tag::Component(_) => f.write_str("Component"),
        }
    }
}

/// Hoisted component reference
#[derive(Clone)]
pub struct ComponentFactory {
    renderer: WeakRenderer,
    component: Component,
}

impl ComponentFactory {
    /// Run the component untracked, so reads in its body do not subscribe
    /// the caller
    pub fn call(&self, props: Props, children: Children) -> RenderResult<Children> {
        let renderer = self.renderer.upgrade().ok_or(RenderError::Detached)?;
        let component = self.component.clone();
        untrack(renderer.reactive(), || component(&renderer, props, children))
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory").finish_non_exhaustive()
    }
}

/// Options for [`Renderer::render`] and [`Renderer::insert`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Remove the parent's existing children first
    pub clear: bool,
    /// Insert as siblings right after the given node instead of inside it
    pub relative: bool,
}

impl Renderer {
    /// Create an element or run a component, without a precompiled
    /// template. Props are classified by name at runtime.
    pub fn jsx(&self, tag: impl Into<Tag>, props: Props, children: Children) -> RenderResult<Children> {
        match tag.into() {
            Tag::Element(name) => {
                let node = {
                    let mut tree = self.tree_mut();
                    match name.as_str() {
                        "svg" => tree.create_element_ns(Namespace::Svg, &name),
                        "math" => tree.create_element_ns(Namespace::MathMl, &name),
                        _ => tree.create_element(&name),
                    }
                };
                self.run_upgrades();
                for (prop, value) in props {
                    self.assign_prop(node, &prop, value)?;
                }
                self.create_children(node, children)?;
                Ok(Children::Node(node))
            }
            Tag::Component(component) => {
                untrack(self.reactive(), || component(self, props, children))
            }
        }
    }

    /// Hoist a component into a reusable factory
    pub fn create_component(&self, component: Component) -> ComponentFactory {
        ComponentFactory {
            renderer: self.downgrade(),
            component,
        }
    }

    /// Render `children` into `parent` (the document by default) in a new
    /// root. Disposing the returned handle removes everything rendered.
    pub fn render(
        &self,
        children: impl Into<Children>,
        parent: Option<NodeId>,
        options: RenderOptions,
    ) -> RenderResult<Dispose> {
        let children = children.into();
        let (result, dispose) = root(self.reactive(), |dispose| {
            (self.insert(children, parent, options), dispose)
        });
        match result {
            Ok(nodes) => {
                tracing::debug!("rendered {} top-level nodes", nodes.len());
                Ok(dispose)
            }
            Err(err) => {
                dispose.dispose();
                Err(err)
            }
        }
    }

    /// Insert `children` under the current owner. Returns the inserted
    /// top-level nodes.
    pub fn insert(
        &self,
        children: impl Into<Children>,
        parent: Option<NodeId>,
        options: RenderOptions,
    ) -> RenderResult<Vec<NodeId>> {
        let children = children.into();
        let target = parent.unwrap_or_else(|| self.document());
        if options.relative {
            let (parent, next) = {
                let tree = self.tree();
                (tree.parent(target), tree.next_sibling(target))
            };
            match parent {
                Some(parent) => return self.insert_children(parent, children, next),
                None => tracing::warn!(
                    "relative insert after detached {:?}, appending inside it",
                    target
                ),
            }
        }
        if options.clear {
            self.tree_mut().clear_children(target)?;
        }
        self.create_children(target, children)
    }

    /// Render `children` into a fresh fragment
    pub fn to_html_fragment(&self, children: impl Into<Children>) -> RenderResult<NodeId> {
        let fragment = self.tree_mut().create_fragment();
        self.create_children(fragment, children.into())?;
        Ok(fragment)
    }

    /// Render `children` detached and return the top-level nodes
    pub fn to_html(&self, children: impl Into<Children>) -> RenderResult<Vec<NodeId>> {
        let fragment = self.to_html_fragment(children)?;
        Ok(self.tree().children(fragment))
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        fos_html::outer_html(&self.tree(), node)
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        fos_html::inner_html(&self.tree(), node)
    }

    /// Deliver `event` to its target and, when it bubbles, the target's
    /// ancestors. Returns false when a listener prevented the default.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        let path = if event.bubbles {
            self.tree().event_path(event.target)
        } else {
            vec![event.target]
        };
        for node in path {
            let listeners = self.tree().listeners(node, &event.name);
            if listeners.is_empty() {
                continue;
            }
            event.current_target.set(node);
            for listener in listeners {
                listener(event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        !event.is_default_prevented()
    }
}
