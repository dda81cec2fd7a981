//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree used by the rendering core. Nodes are addressed by
//! [`NodeId`] and never move, so ids stay valid after a node is detached and
//! can be re-inserted elsewhere (the keyed-list reconciler relies on this).

mod classlist;
mod css_scope;
mod custom_elements;
mod events;
mod interner;
mod node;
mod style;
mod tree;
mod tree_walker;

pub use classlist::ClassList;
pub use css_scope::{scope_class, ScopedStyleSheet};
pub use custom_elements::{
    CustomElementDefinition, CustomElementError, CustomElementRegistry, UpgradeCallback,
};
pub use events::{Event, Listener, ListenerMap};
pub use interner::{InternedString, StringInterner};
pub use node::{
    format_number, Attribute, ElementData, Namespace, Node, NodeData, PropertyValue, QualName,
};
pub use style::StyleDeclaration;
pub use tree::DomTree;
pub use tree_walker::ElementWalker;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node" in the intrusive links
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn to_option(self) -> Option<NodeId> {
        if self.is_valid() { Some(self) } else { None }
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),

    #[error("Hierarchy request error: cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Reference node {reference:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, reference: NodeId },

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),
}
