//! Children insertion
//!
//! Every inserted node is removed again when the owner that inserted it is
//! disposed. Reactive children keep an empty text node as their position
//! marker and re-insert their content right after it on every run.

use std::rc::Rc;

use fos_dom::NodeId;

use crate::{report, Children, RenderResult, Renderer};

impl Renderer {
    /// Append `child` to `parent`. Returns the inserted top-level nodes.
    pub fn create_children(&self, parent: NodeId, child: Children) -> RenderResult<Vec<NodeId>> {
        self.insert_children(parent, child, None)
    }

    /// Insert `child` into `parent` before `anchor` (or at the end)
    pub fn insert_children(
        &self,
        parent: NodeId,
        child: Children,
        anchor: Option<NodeId>,
    ) -> RenderResult<Vec<NodeId>> {
        match child {
            Children::None => Ok(Vec::new()),
            Children::Text(text) => {
                let node = self.tree_mut().create_text(&text);
                self.place(parent, node, anchor)?;
                Ok(vec![node])
            }
            Children::Node(node) => {
                let fragment_children = {
                    let tree = self.tree();
                    tree.get(node)
                        .is_some_and(|n| n.is_fragment())
                        .then(|| tree.children(node))
                };
                let nodes = fragment_children.unwrap_or_else(|| vec![node]);
                for &node in &nodes {
                    self.place(parent, node, anchor)?;
                }
                Ok(nodes)
            }
            Children::List(items) => {
                let mut nodes = Vec::new();
                for item in items {
                    nodes.extend(self.insert_children(parent, item, anchor)?);
                }
                Ok(nodes)
            }
            Children::Dynamic(f) => self.insert_dynamic(parent, f, anchor),
            Children::Mount(mount) => mount(self, parent, anchor),
        }
    }

    /// Insert one node and remove it when the current owner is disposed
    pub(crate) fn place(
        &self,
        parent: NodeId,
        node: NodeId,
        anchor: Option<NodeId>,
    ) -> RenderResult<()> {
        self.tree_mut().insert_before(parent, node, anchor)?;
        self.on_cleanup(move |renderer| {
            if let Err(err) = renderer.tree_mut().remove(node) {
                tracing::debug!("removing {:?} on cleanup: {}", node, err);
            }
        });
        Ok(())
    }

    fn insert_dynamic(
        &self,
        parent: NodeId,
        f: Rc<dyn Fn() -> Children>,
        anchor: Option<NodeId>,
    ) -> RenderResult<Vec<NodeId>> {
        let marker = self.tree_mut().create_text("");
        self.place(parent, marker, anchor)?;
        self.render_effect(move |renderer| {
            let children = f();
            let (parent, next) = {
                let tree = renderer.tree();
                (tree.parent(marker), tree.next_sibling(marker))
            };
            let Some(parent) = parent else {
                tracing::debug!("reactive children marker {:?} is detached", marker);
                return;
            };
            report(
                "reactive children",
                renderer.insert_children(parent, children, next).map(drop),
            );
        });
        Ok(vec![marker])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_reactive::{root, Runtime, Signal};

    #[test]
    fn test_dynamic_children_replace_in_place() {
        let renderer = Renderer::new(Runtime::shared());
        let label = Signal::new(renderer.reactive(), "a".to_string());
        let div = renderer.tree_mut().create_element("div");
        root(renderer.reactive(), |_| {
            let children = Children::List(vec![
                "[".into(),
                Children::from(label.clone()),
                "]".into(),
            ]);
            renderer.create_children(div, children).unwrap();
        });
        assert_eq!(renderer.tree().text_content(div), "[a]");
        label.set("bc".to_string());
        assert_eq!(renderer.tree().text_content(div), "[bc]");
    }

    #[test]
    fn test_dispose_removes_inserted_nodes() {
        let renderer = Renderer::new(Runtime::shared());
        let div = renderer.tree_mut().create_element("div");
        let dispose = root(renderer.reactive(), |dispose| {
            renderer
                .create_children(div, Children::List(vec!["x".into(), "y".into()]))
                .unwrap();
            dispose
        });
        assert_eq!(renderer.tree().children(div).len(), 2);
        dispose.dispose();
        assert!(renderer.tree().children(div).is_empty());
    }
}
