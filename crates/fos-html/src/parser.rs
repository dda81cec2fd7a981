//! HTML5 fragment parser
//!
//! Uses html5ever's RcDom and converts the result into a `fos-dom`
//! fragment. Markup that only parses inside a particular parent (`<tr>`,
//! `<td>`, `<option>`, SVG children, ...) is wrapped in that parent first,
//! the same way a `<template>` element would accept it.

use fos_dom::{DomTree, Namespace, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::{HtmlError, HtmlResult};

/// Parent context a fragment is parsed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentContext {
    Body,
    Table,
    TableBody,
    TableRow,
    ColGroup,
    Select,
    Svg,
    MathMl,
}

impl FragmentContext {
    /// Pick the context from the first tag of the markup
    pub fn for_markup(html: &str, xml: bool) -> Self {
        let first = first_tag_name(html).unwrap_or_default();
        if xml {
            return match first.as_str() {
                "svg" | "math" => FragmentContext::Body,
                _ if html.contains(Namespace::MATHML_URI) => FragmentContext::MathMl,
                _ => FragmentContext::Svg,
            };
        }
        match first.as_str() {
            "tr" => FragmentContext::TableBody,
            "td" | "th" => FragmentContext::TableRow,
            "tbody" | "thead" | "tfoot" | "caption" | "colgroup" => FragmentContext::Table,
            "col" => FragmentContext::ColGroup,
            "option" | "optgroup" => FragmentContext::Select,
            _ => FragmentContext::Body,
        }
    }

    /// Elements opened around the markup, outermost first
    pub fn wrapper(self) -> &'static [&'static str] {
        match self {
            FragmentContext::Body => &[],
            FragmentContext::Table => &["table"],
            FragmentContext::TableBody => &["table", "tbody"],
            FragmentContext::TableRow => &["table", "tbody", "tr"],
            FragmentContext::ColGroup => &["table", "colgroup"],
            FragmentContext::Select => &["select"],
            FragmentContext::Svg => &["svg"],
            FragmentContext::MathMl => &["math"],
        }
    }
}

fn first_tag_name(html: &str) -> Option<String> {
    let bytes = html.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'<' && bytes[i + 1].is_ascii_alphabetic() {
            let name: String = html[i + 1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
                .collect();
            return Some(name.to_ascii_lowercase());
        }
        i += 1;
    }
    None
}

/// HTML5 parser
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse `html` into a new fragment node of `tree`. Elements are created
    /// inert (custom elements are not upgraded).
    pub fn parse_fragment(&self, tree: &mut DomTree, html: &str, xml: bool) -> HtmlResult<NodeId> {
        let context = FragmentContext::for_markup(html, xml);
        tracing::trace!("parsing fragment in {:?} context ({} bytes)", context, html.len());

        let mut source = String::with_capacity(html.len() + 64);
        source.push_str("<!DOCTYPE html><html><head></head><body>");
        for tag in context.wrapper() {
            source.push('<');
            source.push_str(tag);
            source.push('>');
        }
        source.push_str(html);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut source.as_bytes())?;

        let mut container = find_element(&dom.document, "body").ok_or(HtmlError::MissingBody)?;
        for tag in context.wrapper() {
            container = find_element(&container, tag)
                .ok_or_else(|| HtmlError::MissingContext(tag.to_string()))?;
        }

        let fragment = tree.create_fragment();
        for child in container.children.borrow().iter() {
            self.convert_node(child, tree, fragment)?;
        }
        Ok(fragment)
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> HtmlResult<()> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Text { contents } => {
                let id = tree.create_text(&contents.borrow().to_string());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(&contents.to_string());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let ns = Namespace::from_uri(&name.ns.to_string());
                let id = tree.create_element_ns(ns, &name.local.to_string());
                for attr in attrs.borrow().iter() {
                    let attr_name = match &attr.name.prefix {
                        Some(prefix) if !prefix.is_empty() => {
                            format!("{}:{}", prefix, attr.name.local)
                        }
                        _ => attr.name.local.to_string(),
                    };
                    tree.set_attribute(id, &attr_name, &attr.value.to_string())?;
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }
}

/// First element named `tag` in a depth-first search below `handle`
fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let RcNodeData::Element { name, .. } = &child.data {
            if name.local.as_ref() == tag {
                return Some(child.clone());
            }
        }
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_selection() {
        assert_eq!(FragmentContext::for_markup("<tr><td>1</td></tr>", false), FragmentContext::TableBody);
        assert_eq!(FragmentContext::for_markup(" <td></td>", false), FragmentContext::TableRow);
        assert_eq!(FragmentContext::for_markup("<option>a</option>", false), FragmentContext::Select);
        assert_eq!(FragmentContext::for_markup("text <b>x</b>", false), FragmentContext::Body);
        assert_eq!(FragmentContext::for_markup("<svg></svg>", true), FragmentContext::Body);
        assert_eq!(FragmentContext::for_markup("<circle></circle>", true), FragmentContext::Svg);
    }

    #[test]
    fn test_parse_simple_fragment() {
        let mut tree = DomTree::new();
        let frag = HtmlParser::new()
            .parse_fragment(&mut tree, "<div id=\"a\"><span>Text</span></div> tail", false)
            .unwrap();
        let children = tree.children(frag);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.tag_name(children[0]), Some("div"));
        assert_eq!(tree.get_attribute(children[0], "id"), Some("a"));
        assert_eq!(tree.text_content(children[1]), " tail");
    }

    #[test]
    fn test_parse_table_row() {
        let mut tree = DomTree::new();
        let frag = HtmlParser::new()
            .parse_fragment(&mut tree, "<tr><td>1</td><td>2</td></tr>", false)
            .unwrap();
        let children = tree.children(frag);
        assert_eq!(children.len(), 1);
        assert_eq!(tree.tag_name(children[0]), Some("tr"));
        assert_eq!(tree.elements(frag).count(), 3);
    }

    #[test]
    fn test_parse_svg_namespace() {
        let mut tree = DomTree::new();
        let frag = HtmlParser::new()
            .parse_fragment(
                &mut tree,
                "<svg xmlns=\"http://www.w3.org/2000/svg\"><circle r=\"1\"></circle></svg>",
                true,
            )
            .unwrap();
        let circle = tree.elements(frag).nth(1).unwrap();
        assert_eq!(tree.namespace(circle), Some(&Namespace::Svg));
        assert_eq!(tree.tag_name(circle), Some("circle"));
    }
}
