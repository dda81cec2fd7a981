//! Element outlines
//!
//! An outline is the pre-order list of elements of a fragment with their
//! depth and sorted attributes. Comparing the outline a template author
//! intended with the outline html5ever actually builds exposes implicit
//! `<tbody>` insertion, foster parenting and auto-closed `<p>` elements.

use std::fmt;

use fos_dom::{DomTree, NodeId};

use crate::{HtmlParser, HtmlResult};

/// One element of an outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub depth: usize,
    pub tag: String,
    /// Attributes sorted by name
    pub attrs: Vec<(String, String)>,
}

impl OutlineEntry {
    pub fn new(depth: usize, tag: impl Into<String>, mut attrs: Vec<(String, String)>) -> Self {
        attrs.sort();
        Self {
            depth,
            tag: tag.into(),
            attrs,
        }
    }
}

impl fmt::Display for OutlineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}", "  ".repeat(self.depth), self.tag)?;
        for (name, value) in &self.attrs {
            write!(f, " {}=\"{}\"", name, value)?;
        }
        write!(f, ">")
    }
}

/// Pre-order element outline
pub type Outline = Vec<OutlineEntry>;

/// Outline of the elements below `root` (depth 0 = children of `root`)
pub fn outline_of(tree: &DomTree, root: NodeId) -> Outline {
    let mut out = Vec::new();
    collect(tree, root, 0, &mut out);
    out
}

fn collect(tree: &DomTree, parent: NodeId, depth: usize, out: &mut Outline) {
    for child in tree.children(parent) {
        if let Some(tag) = tree.tag_name(child) {
            out.push(OutlineEntry::new(depth, tag, tree.attributes(child)));
            collect(tree, child, depth + 1, out);
        }
    }
}

/// Parse `html` with html5ever and outline the result
pub fn parse_outline(html: &str, xml: bool) -> HtmlResult<Outline> {
    let mut tree = DomTree::new();
    let fragment = HtmlParser::new().parse_fragment(&mut tree, html, xml)?;
    Ok(outline_of(&tree, fragment))
}
