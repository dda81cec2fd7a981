//! Element walker
//!
//! Pre-order, document-order traversal restricted to elements. This is the
//! walk the partial instantiator uses to find the node for each walk index,
//! so its order must match the compiler's element numbering exactly.

use crate::{DomTree, NodeId};

/// Iterator over the elements of a subtree in pre-order
#[derive(Debug, Clone)]
pub struct ElementWalker<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl<'a> ElementWalker<'a> {
    /// Walk `root` (when it is an element) and its element descendants
    pub fn new(tree: &'a DomTree, root: NodeId) -> Self {
        let mut walker = Self {
            tree,
            root,
            next: None,
        };
        walker.next = if tree.get(root).is_some_and(|n| n.is_element()) {
            Some(root)
        } else {
            walker.advance(root)
        };
        walker
    }

    fn step(&self, cur: NodeId) -> Option<NodeId> {
        if let Some(child) = self.tree.first_child(cur) {
            return Some(child);
        }
        let mut cur = cur;
        while cur != self.root {
            if let Some(next) = self.tree.next_sibling(cur) {
                return Some(next);
            }
            cur = self.tree.parent(cur)?;
        }
        None
    }

    fn advance(&self, from: NodeId) -> Option<NodeId> {
        let mut cur = self.step(from)?;
        loop {
            if self.tree.get(cur).is_some_and(|n| n.is_element()) {
                return Some(cur);
            }
            cur = self.step(cur)?;
        }
    }
}

impl Iterator for ElementWalker<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.advance(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preorder_elements_only() {
        let mut tree = DomTree::new();
        let frag = tree.create_fragment();
        let table = tree.create_element("table");
        let tr = tree.create_element("tr");
        let td1 = tree.create_element("td");
        let td2 = tree.create_element("td");
        let text = tree.create_text("x");
        let p = tree.create_element("p");
        tree.append_child(frag, table).unwrap();
        tree.append_child(table, tr).unwrap();
        tree.append_child(tr, td1).unwrap();
        tree.append_child(td1, text).unwrap();
        tree.append_child(tr, td2).unwrap();
        tree.append_child(frag, p).unwrap();

        let order: Vec<NodeId> = ElementWalker::new(&tree, frag).collect();
        assert_eq!(order, vec![table, tr, td1, td2, p]);

        let sub: Vec<NodeId> = ElementWalker::new(&tree, tr).collect();
        assert_eq!(sub, vec![tr, td1, td2]);
    }

    #[test]
    fn test_empty_root() {
        let mut tree = DomTree::new();
        let frag = tree.create_fragment();
        assert_eq!(ElementWalker::new(&tree, frag).count(), 0);
        let text = tree.create_text("t");
        assert_eq!(ElementWalker::new(&tree, text).count(), 0);
    }
}
