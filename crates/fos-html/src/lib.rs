//! fOS HTML
//!
//! html5ever-backed fragment parser producing `fos-dom` nodes, the matching
//! serializer, and element outlines used to detect markup that a browser
//! would restructure while parsing.

mod outline;
mod parser;
mod serializer;

pub use outline::{outline_of, parse_outline, Outline, OutlineEntry};
pub use parser::{FragmentContext, HtmlParser};
pub use serializer::{
    escape_attribute, escape_text, is_raw_text_element, is_void_element, HtmlSerializer,
};

use fos_dom::{DomError, DomTree, NodeId};

/// Result type for HTML operations
pub type HtmlResult<T> = Result<T, HtmlError>;

/// HTML parsing errors
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsed document has no body")]
    MissingBody,

    #[error("fragment context <{0}> was not created by the parser")]
    MissingContext(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Parse an HTML (or, with `xml`, namespaced SVG/MathML) fragment into a new
/// fragment node of `tree`
pub fn parse_fragment(tree: &mut DomTree, html: &str, xml: bool) -> HtmlResult<NodeId> {
    HtmlParser::new().parse_fragment(tree, html, xml)
}

/// Serialize a node including itself
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node)
}

/// Serialize the children of a node
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node)
}
