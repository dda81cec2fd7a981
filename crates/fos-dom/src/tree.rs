//! DOM Tree (arena-based allocation)
//!
//! Nodes are allocated once and never freed. Detaching a node only unlinks
//! it, which keeps `NodeId`s held by reactive rows and templates valid.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::{
    ClassList, CustomElementRegistry, DomError, DomResult, ElementData, ElementWalker, Listener,
    ListenerMap, Namespace, Node, NodeData, NodeId, PropertyValue, QualName, ScopedStyleSheet,
    StringInterner, StyleDeclaration, UpgradeCallback,
};

/// Arena-based DOM tree for memory efficiency
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
    document: NodeId,
    listeners: ListenerMap,
    custom_elements: CustomElementRegistry,
    upgraded: HashSet<NodeId>,
    pending_upgrades: Vec<(NodeId, UpgradeCallback)>,
    adopted: HashMap<NodeId, Vec<ScopedStyleSheet>>,
}

impl DomTree {
    /// Create a tree holding an empty document node
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(64),
            interner: StringInterner::new(),
            document: NodeId::NONE,
            listeners: ListenerMap::default(),
            custom_elements: CustomElementRegistry::new(),
            upgraded: HashSet::new(),
            pending_upgrades: Vec::new(),
            adopted: HashMap::new(),
        };
        tree.document = tree.alloc(NodeData::Document);
        tree
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// The document node every connected node descends from
    #[inline]
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Number of nodes ever allocated
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Create an HTML element, upgrading it when its name is a defined
    /// custom element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.create_element_ns(Namespace::Html, tag);
        self.try_upgrade(id);
        id
    }

    /// Create an inert element in the given namespace (parser and template
    /// content path, never upgraded)
    pub fn create_element_ns(&mut self, ns: Namespace, tag: &str) -> NodeId {
        let local = self.interner.intern(tag);
        self.alloc(NodeData::Element(ElementData::new(QualName::new(ns, local))))
    }

    /// Create a text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Create a comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Comment(text.to_string()))
    }

    /// Create an empty document fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.to_option())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.to_option())
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child.to_option())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.to_option())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.to_option())
    }

    /// Child nodes in order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.first_child(id);
        while let Some(child) = cur {
            out.push(child);
            cur = self.next_sibling(child);
        }
        out
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Topmost ancestor (the node itself when detached)
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            cur = parent;
        }
        cur
    }

    /// Check if the node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.root_of(id) == self.document
    }

    /// Pre-order walk over the elements below `root`
    pub fn elements(&self, root: NodeId) -> ElementWalker<'_> {
        ElementWalker::new(self, root)
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Append a child node (fragments move their children)
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference`, or at the end when `reference` is `None`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        let parent_node = self.node(parent)?;
        if !matches!(
            parent_node.data,
            NodeData::Element(_) | NodeData::Fragment | NodeData::Document
        ) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let child_node = self.node(child)?;
        if matches!(child_node.data, NodeData::Document) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild { parent, reference });
            }
        }

        if child_node.is_fragment() {
            for grandchild in self.children(child) {
                self.link_before(parent, grandchild, reference)?;
            }
            return Ok(child);
        }

        // Inserting a node before itself keeps its position
        let reference = match reference {
            Some(r) if r == child => self.next_sibling(child),
            other => other,
        };
        self.link_before(parent, child, reference)?;
        Ok(child)
    }

    fn link_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.remove(child)?;

        let prev = match reference {
            Some(r) => self.node(r)?.prev_sibling,
            None => self.node(parent)?.last_child,
        };
        let next = reference.unwrap_or(NodeId::NONE);

        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = child;
        } else {
            self.node_mut(parent)?.last_child = child;
        }
        Ok(())
    }

    /// Detach a node from its parent (no-op when already detached)
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else {
            self.node_mut(parent)?.last_child = prev;
        }

        let node = self.node_mut(id)?;
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Remove every child of `id`
    pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
        for child in self.children(id) {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Copy a node (and its subtree when `deep`). Listeners are not copied.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let data = self.node(id)?.data.clone();
        let copy = self.alloc(data);
        if deep {
            for child in self.children(id) {
                let child_copy = self.clone_node(child, true)?;
                self.link_before(copy, child_copy, None)?;
            }
        }
        Ok(copy)
    }

    /// Copy a node like `clone_node` and upgrade defined custom elements in
    /// the copy. Upgrade callbacks are queued, see [`DomTree::take_pending_upgrades`].
    pub fn import_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let copy = self.clone_node(id, deep)?;
        let elements: Vec<NodeId> = self.elements(copy).collect();
        for element in elements {
            self.try_upgrade(element);
        }
        Ok(copy)
    }

    // ---------------------------------------------------------------------
    // Element data
    // ---------------------------------------------------------------------

    /// Local tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)
            .and_then(|n| n.as_element())
            .map(|e| self.interner.get(e.name.local))
    }

    /// Namespace of an element
    pub fn namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| n.as_element()).map(|e| &e.name.ns)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let key = self.interner.lookup(name)?;
        self.get(id)?.as_element()?.get_attr(key)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let key = self.interner.intern(name);
        self.element_mut(id)?.set_attr(key, value.to_string());
        Ok(())
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let Some(key) = self.interner.lookup(name) else {
            self.element_mut(id)?;
            return Ok(false);
        };
        Ok(self.element_mut(id)?.remove_attr(key))
    }

    /// Attributes as owned `(name, value)` pairs in insertion order
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        self.get(id)
            .and_then(|n| n.as_element())
            .map(|e| {
                e.attrs
                    .iter()
                    .map(|a| (self.interner.get(a.name).to_string(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_property(&self, id: NodeId, name: &str) -> Option<&PropertyValue> {
        self.get(id)?.as_element()?.get_property(name)
    }

    pub fn set_property(&mut self, id: NodeId, name: &str, value: PropertyValue) -> DomResult<()> {
        self.element_mut(id)?.set_property(name, value);
        Ok(())
    }

    /// Class tokens of an element
    pub fn class_list(&self, id: NodeId) -> ClassList {
        ClassList::parse(self.get_attribute(id, "class").unwrap_or(""))
    }

    /// Add or remove the class tokens named by `token`
    pub fn toggle_class(&mut self, id: NodeId, token: &str, force: bool) -> DomResult<()> {
        let mut list = self.class_list(id);
        if !list.set(token, force) {
            return Ok(());
        }
        self.set_attribute(id, "class", &list.to_string())
    }

    /// Parsed inline style of an element
    pub fn style(&self, id: NodeId) -> StyleDeclaration {
        StyleDeclaration::parse(self.get_attribute(id, "style").unwrap_or(""))
    }

    /// Set (`Some`) or remove (`None`) one inline style property
    pub fn set_style_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> DomResult<()> {
        let mut style = self.style(id);
        match value {
            Some(value) => style.set(name, value),
            None => {
                if !style.remove(name) {
                    return Ok(());
                }
            }
        }
        if style.is_empty() {
            self.remove_attribute(id, "style")?;
            Ok(())
        } else {
            self.set_attribute(id, "style", &style.css_text())
        }
    }

    // ---------------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------------

    /// Concatenated text of a node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) => out.push_str(t),
            Some(NodeData::Comment(_)) | None => {}
            Some(_) => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Replace the data of a text or comment node, or the children of an
    /// element with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(t) | NodeData::Comment(t) => {
                t.clear();
                t.push_str(text);
                Ok(())
            }
            _ => {
                self.clear_children(id)?;
                if !text.is_empty() {
                    let text_node = self.create_text(text);
                    self.append_child(id, text_node)?;
                }
                Ok(())
            }
        }
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    pub fn add_event_listener(&mut self, id: NodeId, event: &str, listener: Listener) {
        self.listeners.add(id, event, listener);
    }

    pub fn remove_event_listener(&mut self, id: NodeId, event: &str, listener: &Listener) -> bool {
        self.listeners.remove(id, event, listener)
    }

    /// Listeners registered on `id` for `event`, in registration order
    pub fn listeners(&self, id: NodeId, event: &str) -> Vec<Listener> {
        self.listeners.get(id, event)
    }

    /// Target followed by its ancestors (bubbling order)
    pub fn event_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = vec![target];
        let mut cur = target;
        while let Some(parent) = self.parent(cur) {
            path.push(parent);
            cur = parent;
        }
        path
    }

    // ---------------------------------------------------------------------
    // Custom elements
    // ---------------------------------------------------------------------

    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.custom_elements
    }

    pub fn custom_elements_mut(&mut self) -> &mut CustomElementRegistry {
        &mut self.custom_elements
    }

    /// Check if a custom element has been upgraded
    pub fn is_upgraded(&self, id: NodeId) -> bool {
        self.upgraded.contains(&id)
    }

    fn try_upgrade(&mut self, id: NodeId) {
        if self.upgraded.contains(&id) {
            return;
        }
        let Some(name) = self.tag_name(id) else {
            return;
        };
        let name = self
            .get_attribute(id, "is")
            .filter(|_| !name.contains('-'))
            .unwrap_or(name);
        if let Some(def) = self.custom_elements.get(name) {
            let callback = def.callback.clone();
            tracing::trace!("upgrading <{}> ({:?})", def.name, id);
            self.upgraded.insert(id);
            self.pending_upgrades.push((id, callback));
        }
    }

    /// Upgrade callbacks queued by element creation or `import_node`. The
    /// caller runs them once it no longer borrows the tree.
    pub fn take_pending_upgrades(&mut self) -> Vec<(NodeId, UpgradeCallback)> {
        std::mem::take(&mut self.pending_upgrades)
    }

    // ---------------------------------------------------------------------
    // Adopted stylesheets
    // ---------------------------------------------------------------------

    /// Adopt a stylesheet on a root. Returns false if a sheet with the same
    /// scope was already adopted there.
    pub fn adopt_stylesheet(&mut self, root: NodeId, sheet: ScopedStyleSheet) -> bool {
        let sheets = self.adopted.entry(root).or_default();
        if sheets.iter().any(|s| s.scope == sheet.scope) {
            return false;
        }
        sheets.push(sheet);
        true
    }

    pub fn adopted_stylesheets(&self, root: NodeId) -> &[ScopedStyleSheet] {
        self.adopted.get(&root).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Debug for DomTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomTree")
            .field("nodes", &self.nodes.len())
            .field("custom_elements", &self.custom_elements)
            .field("pending_upgrades", &self.pending_upgrades.len())
            .finish()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
