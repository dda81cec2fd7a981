//! HTML Serialization (innerHTML/outerHTML)
//!
//! Output follows the compiler's template conventions so that a static
//! template serializes back to the exact string it was parsed from:
//! - empty attribute values are written as the bare name
//! - other values are double-quoted with `&`, `"` and `'` escaped
//! - void elements end with ` />`, other elements always get a close tag

use fos_dom::{DomTree, NodeData, NodeId};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr", "basefont", "bgsound", "frame", "keygen", "command", "menuitem",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Check whether `tag` is an HTML void element
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Elements whose text is written and parsed without entity handling
pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// HTML serializer
#[derive(Debug, Clone, Default)]
pub struct HtmlSerializer {
    /// Whether to format output with indentation
    pub pretty_print: bool,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty_print: true }
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output, 0);
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output, 0);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String, depth: usize) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document | NodeData::Fragment => {
                self.serialize_children(tree, node_id, output, depth);
            }
            NodeData::Element(elem) => {
                let tag = tree.interner().get(elem.name.local);
                let is_void = is_void_element(tag);

                if self.pretty_print && depth > 0 {
                    output.push('\n');
                    output.push_str(&"  ".repeat(depth));
                }

                output.push('<');
                output.push_str(tag);
                for attr in elem.attrs.iter() {
                    output.push(' ');
                    output.push_str(tree.interner().get(attr.name));
                    if !attr.value.is_empty() {
                        output.push_str("=\"");
                        escape_attribute(&attr.value, output);
                        output.push('"');
                    }
                }

                if is_void {
                    output.push_str(" />");
                    return;
                }
                output.push('>');

                if is_raw_text_element(tag) {
                    output.push_str(&tree.text_content(node_id));
                } else {
                    self.serialize_children(tree, node_id, output, depth + 1);
                }

                if self.pretty_print && node.first_child.is_valid() {
                    output.push('\n');
                    output.push_str(&"  ".repeat(depth));
                }
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(text, output),
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent: NodeId, output: &mut String, depth: usize) {
        for child in tree.children(parent) {
            self.serialize_node(tree, child, output, depth);
        }
    }
}

/// Escape text content for HTML
pub fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_element_with_attributes() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attribute(div, "id", "x").unwrap();
        tree.set_attribute(div, "data-on", "").unwrap();
        tree.set_attribute(div, "title", "a \"b\" & 'c'").unwrap();
        let text = tree.create_text("1 < 2");
        tree.append_child(div, text).unwrap();
        assert_eq!(
            HtmlSerializer::new().serialize_outer(&tree, div),
            "<div id=\"x\" data-on title=\"a &quot;b&quot; &amp; &#39;c&#39;\">1 &lt; 2</div>"
        );
    }

    #[test]
    fn test_void_element() {
        let mut tree = DomTree::new();
        let img = tree.create_element("img");
        tree.set_attribute(img, "src", "a.png").unwrap();
        assert_eq!(
            HtmlSerializer::new().serialize_outer(&tree, img),
            "<img src=\"a.png\" />"
        );
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let mut tree = DomTree::new();
        let style = tree.create_element("style");
        tree.set_text_content(style, "a > b { }").unwrap();
        assert_eq!(
            HtmlSerializer::new().serialize_outer(&tree, style),
            "<style>a > b { }</style>"
        );
    }

    #[test]
    fn test_pretty_print() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        tree.append_child(ul, li).unwrap();
        assert_eq!(
            HtmlSerializer::pretty().serialize_outer(&tree, ul),
            "<ul>\n  <li></li>\n</ul>"
        );
    }
}
