//! Partial builder
//!
//! A native element compiles to a [`Partial`]: the HTML of the element and
//! its static subtree, plus the assignments for every element in it that
//! needs a runtime setter, keyed by the element's pre-order walk index.

use fos_html::{is_raw_text_element, Outline, OutlineEntry};
use fos_render::{PartialMeta, PropKind};

use crate::ast::{AttrValue, JsxAttribute, JsxChild, JsxElement, JsxNode};
use crate::const_fold::ConstValue;
use crate::error::{CompileError, CompileResult};
use crate::escape::{decode_entities, escape_attribute, escape_text, normalize_jsx_text};
use crate::html_spec::{can_contain, TEXT};
use crate::merge::{merge_children, Node};
use crate::predicates::{
    is_attribute_literal, is_children_literal, is_component_name, is_custom_element,
    is_native_tag, is_void_element, namespace_root,
};
use crate::props::{classify, AssignKind, Assignment, NameClass};
use crate::token::Span;
use crate::transform::Compiler;

/// Assignments of one element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeProps {
    /// Pre-order index of the element in the instantiated template
    pub walk: usize,
    pub assignments: Vec<Assignment>,
}

/// Compiled template of a static subtree
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    /// Tag of the first element
    pub tag: String,
    pub content: String,
    /// Elements with assignments, in walk order. The k-th entry is the
    /// k-th runtime argument.
    pub nodes: Vec<NodeProps>,
    pub element_count: usize,
    /// XML namespace the template is parsed in
    pub xmlns: Option<String>,
    /// Contains a custom element; instantiate by import
    pub custom: bool,
    /// Element outline the content is meant to produce
    pub outline: Outline,
    pub span: Span,
}

impl Partial {
    fn open(tag: &str, xmlns: Option<&str>, span: Span) -> Self {
        Self {
            tag: tag.to_string(),
            content: format!("<{}", tag),
            nodes: Vec::new(),
            element_count: 1,
            xmlns: xmlns.map(str::to_string),
            custom: false,
            outline: Vec::new(),
            span,
        }
    }

    /// XML partials and custom elements keep their own instantiation path
    pub fn is_mergeable(&self) -> bool {
        self.xmlns.is_none() && !self.custom
    }

    /// Add an assignment for the element at `walk`
    pub fn assign(&mut self, walk: usize, assignment: Assignment) {
        match self.nodes.binary_search_by_key(&walk, |n| n.walk) {
            Ok(i) => self.nodes[i].assignments.push(assignment),
            Err(i) => self.nodes.insert(
                i,
                NodeProps {
                    walk,
                    assignments: vec![assignment],
                },
            ),
        }
    }

    /// Append escaped text after the content
    pub fn push_text(&mut self, text: &str) {
        self.content.push_str(&escape_text(text));
    }

    /// Append `script`/`style` text as is; the parser reads it verbatim up
    /// to the first `</tag`.
    fn push_raw_text(&mut self, tag: &str, text: &str, span: Span) -> CompileResult<()> {
        let closing = format!("</{}", tag);
        if text.to_ascii_lowercase().contains(&closing) {
            return Err(CompileError::MalformedHtml {
                message: format!("text inside <{}> cannot contain `{}`", tag, closing),
                span,
            });
        }
        self.content.push_str(text);
        Ok(())
    }

    /// Insert escaped text before the content
    pub fn prepend_text(&mut self, text: &str) {
        self.content.insert_str(0, &escape_text(text));
    }

    /// Concatenate a sibling partial
    pub fn append(&mut self, other: Partial) {
        self.splice(other, 0);
    }

    /// Place `child` inside the (still open) root element
    fn inline_child(&mut self, child: Partial) {
        self.custom |= child.custom;
        self.splice(child, 1);
    }

    fn splice(&mut self, other: Partial, depth: usize) {
        let shift = self.element_count;
        self.content.push_str(&other.content);
        self.nodes.extend(other.nodes.into_iter().map(|mut node| {
            node.walk += shift;
            node
        }));
        self.outline.extend(other.outline.into_iter().map(|mut entry| {
            entry.depth += depth;
            entry
        }));
        self.element_count += other.element_count;
        self.span = self.span.merge(other.span);
    }

    /// Position metadata for the runtime
    pub fn meta(&self) -> PartialMeta {
        let mut meta = PartialMeta::default();
        for (arg, node) in self.nodes.iter().enumerate() {
            if node.walk != arg {
                meta.map.insert(node.walk, arg);
            }
        }
        meta.max = self.nodes.last().map(|node| node.walk + 1);
        meta.xmlns = self.xmlns.clone();
        meta.import = self.custom;
        meta
    }
}

impl Compiler<'_> {
    /// Build an element or fragment
    pub(crate) fn build_node(&mut self, node: &JsxNode, ns: Option<&'static str>) -> CompileResult<Node> {
        match node {
            JsxNode::Element(el) => self.build_element(el, ns),
            JsxNode::Fragment(fragment) => {
                let children = merge_children(self.build_children(&fragment.children, None, ns)?);
                Ok(match children.len() {
                    1 => children.into_iter().next().unwrap_or(Node::Code("[]".into())),
                    _ => Node::Code(self.array_code(children)?),
                })
            }
        }
    }

    pub(crate) fn build_element(&mut self, el: &JsxElement, ns: Option<&'static str>) -> CompileResult<Node> {
        if !is_native_tag(&el.name) {
            return if is_component_name(&el.name) {
                self.component_call(el).map(Node::Code)
            } else {
                self.jsx_call(el).map(Node::Code)
            };
        }
        let tag = el.name.source();
        let element_ns = namespace_root(&tag).or(ns);
        let children_ns = if tag == "foreignObject" { None } else { element_ns };

        let mut partial = Partial::open(&tag, element_ns, el.span);
        let mut custom = is_custom_element(&tag);
        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut has_xmlns = false;
        let mut after_spread = false;

        for attribute in &el.attributes {
            match attribute {
                JsxAttribute::Spread { expr, .. } => {
                    let value = self.compile_expr(expr)?;
                    partial.assign(0, Assignment::new(AssignKind::Prop(PropKind::Spread), "", value));
                    after_spread = true;
                }
                JsxAttribute::Named { name, value, .. } => {
                    match classify(name, &self.config.plugin_namespaces) {
                        NameClass::Runtime(kind, name) => {
                            let value = self.attr_value_code(value.as_ref())?;
                            partial.assign(0, Assignment::new(kind, name, value));
                        }
                        NameClass::Inlinable(kind, name) => {
                            let literal = is_attribute_literal(value.as_ref()).filter(|_| !after_spread);
                            match literal {
                                Some(literal) => {
                                    if let Some(text) = inline_value(&literal) {
                                        push_attribute(&mut partial.content, &name, &text);
                                        custom |= name == "is";
                                        has_xmlns |= name == "xmlns";
                                        attrs.push((name, text));
                                    }
                                }
                                None => {
                                    let value = self.attr_value_code(value.as_ref())?;
                                    partial.assign(0, Assignment::new(kind, name, value));
                                }
                            }
                        }
                    }
                }
            }
        }

        if let Some(uri) = namespace_root(&tag).filter(|_| !has_xmlns) {
            push_attribute(&mut partial.content, "xmlns", uri);
            attrs.push(("xmlns".to_string(), uri.to_string()));
        }
        partial.outline.push(OutlineEntry::new(0, tag.as_str(), attrs));

        if is_void_element(&tag) {
            if let Some(child) = el.children.iter().find(|c| !is_blank_text(c)) {
                return Err(CompileError::InvalidNesting {
                    parent: tag,
                    child: child_name(child),
                    span: child_span(child, el.span),
                });
            }
            partial.content.push_str(" />");
        } else {
            partial.content.push('>');
            let parent = element_ns.is_none().then_some(tag.as_str());
            let children = merge_children(self.build_children(&el.children, parent, children_ns)?);
            let mut rest = Vec::new();
            let raw_text = element_ns.is_none() && is_raw_text_element(&tag);
            for child in children {
                match child {
                    Node::Text(text) if rest.is_empty() && raw_text => {
                        partial.push_raw_text(&tag, &text, el.span)?
                    }
                    Node::Text(text) if rest.is_empty() => partial.push_text(&text),
                    Node::Partial(child) if rest.is_empty() => partial.inline_child(child),
                    other => rest.push(other),
                }
            }
            if !rest.is_empty() {
                let value = match rest.len() {
                    1 => self.node_code(rest.remove(0))?,
                    _ => self.array_code(rest)?,
                };
                partial.assign(0, Assignment::new(AssignKind::Children, "children", value));
            }
            partial.content.push_str("</");
            partial.content.push_str(&tag);
            partial.content.push('>');
        }

        partial.custom |= custom;
        tracing::trace!(
            "built <{}> partial: {} elements, {} dynamic",
            tag,
            partial.element_count,
            partial.nodes.len()
        );
        Ok(Node::Partial(partial))
    }

    /// Build children in order, checking each against `parent`'s content
    /// model. Fragments are flattened.
    pub(crate) fn build_children(
        &mut self,
        children: &[JsxChild],
        parent: Option<&str>,
        ns: Option<&'static str>,
    ) -> CompileResult<Vec<Node>> {
        let mut nodes = Vec::new();
        for child in children {
            match child {
                JsxChild::Text { value, span } => {
                    let text = decode_entities(&normalize_jsx_text(value));
                    if text.is_empty() {
                        continue;
                    }
                    check_nesting(parent, TEXT, *span)?;
                    nodes.push(Node::Text(text));
                }
                JsxChild::Expression(expr) => {
                    if expr.is_empty() {
                        continue;
                    }
                    match is_children_literal(child) {
                        Some(value) => {
                            if let Some(text) = child_text(&value) {
                                check_nesting(parent, TEXT, expr.span)?;
                                nodes.push(Node::Text(text));
                            }
                        }
                        None => nodes.push(Node::Code(self.compile_expr(expr)?)),
                    }
                }
                JsxChild::Spread { span, .. } => {
                    return Err(CompileError::SpreadChild { span: *span });
                }
                JsxChild::Node(JsxNode::Element(el)) => {
                    if is_native_tag(&el.name) {
                        check_nesting(parent, &el.name.source(), el.name_span)?;
                    }
                    nodes.push(self.build_element(el, ns)?);
                }
                JsxChild::Node(JsxNode::Fragment(fragment)) => {
                    nodes.extend(self.build_children(&fragment.children, parent, ns)?);
                }
            }
        }
        Ok(nodes)
    }

    fn attr_value_code(&mut self, value: Option<&AttrValue>) -> CompileResult<String> {
        match value {
            None => Ok("true".to_string()),
            Some(AttrValue::String { value, .. }) => Ok(crate::escape::js_string(value)),
            Some(AttrValue::Expression(expr)) => self.compile_expr(expr),
            Some(AttrValue::Element(node)) => self.compile_node(node),
        }
    }
}

fn check_nesting(parent: Option<&str>, child: &str, span: Span) -> CompileResult<()> {
    match parent {
        Some(parent) if !can_contain(parent, child) => Err(CompileError::InvalidNesting {
            parent: parent.to_string(),
            child: child.to_string(),
            span,
        }),
        _ => Ok(()),
    }
}

/// Attribute text for a literal, `None` when the attribute is omitted
fn inline_value(value: &ConstValue) -> Option<String> {
    match value {
        ConstValue::Boolean(false) | ConstValue::Null | ConstValue::Undefined => None,
        ConstValue::Boolean(true) => Some(String::new()),
        other => other.to_js_string(),
    }
}

/// Text a literal child renders; booleans and nullish render nothing
fn child_text(value: &ConstValue) -> Option<String> {
    match value {
        ConstValue::Boolean(_) | ConstValue::Null | ConstValue::Undefined => None,
        other => other.to_js_string().filter(|s| !s.is_empty()),
    }
}

/// ` name` for empty values, ` name="value"` otherwise. Values are never
/// left unquoted, so the content matches what the serializer writes back.
fn push_attribute(content: &mut String, name: &str, value: &str) {
    content.push(' ');
    content.push_str(name);
    if !value.is_empty() {
        content.push_str("=\"");
        content.push_str(&escape_attribute(value));
        content.push('"');
    }
}

fn is_blank_text(child: &JsxChild) -> bool {
    match child {
        JsxChild::Text { value, .. } => normalize_jsx_text(value).is_empty(),
        JsxChild::Expression(expr) => expr.is_empty(),
        _ => false,
    }
}

fn child_name(child: &JsxChild) -> String {
    match child {
        JsxChild::Node(JsxNode::Element(el)) => el.name.source(),
        JsxChild::Node(JsxNode::Fragment(_)) => "fragment".to_string(),
        _ => TEXT.to_string(),
    }
}

fn child_span(child: &JsxChild, fallback: Span) -> Span {
    let span = match child {
        JsxChild::Text { span, .. } | JsxChild::Spread { span, .. } => *span,
        JsxChild::Expression(expr) => expr.span,
        JsxChild::Node(node) => node.span(),
    };
    if span.is_empty() { fallback } else { span }
}
