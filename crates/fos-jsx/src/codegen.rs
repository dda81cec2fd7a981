//! Code generation
//!
//! Turns built nodes into JavaScript: partial call sites with one setter
//! closure per dynamic element, arrays for fragments, and `createComponent`
//! / `jsx` calls with a props object.

use crate::ast::{AttrName, AttrValue, JsxAttribute, JsxElement, JsxName};
use crate::error::{CompileError, CompileResult};
use crate::escape::js_string;
use crate::hoist::factory_arguments;
use crate::lexer::{is_identifier_part, is_identifier_start};
use crate::merge::{merge_children, Node};
use crate::partial::{NodeProps, Partial};
use crate::predicates::is_custom_element;
use crate::transform::Compiler;
use crate::validate::validate_partial;

impl Compiler<'_> {
    pub(crate) fn node_code(&mut self, node: Node) -> CompileResult<String> {
        match node {
            Node::Text(text) => Ok(js_string(&text)),
            Node::Code(code) => Ok(code),
            Node::Partial(partial) => self.partial_call(partial),
        }
    }

    /// `[a, b, ...]`
    pub(crate) fn array_code(&mut self, nodes: Vec<Node>) -> CompileResult<String> {
        let items = nodes
            .into_iter()
            .map(|node| self.node_code(node))
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(format!("[{}]", items.join(", ")))
    }

    fn partial_call(&mut self, partial: Partial) -> CompileResult<String> {
        let validate = self.config.validate_html;
        let factory = if self.config.hoist {
            let mut checked = false;
            let name = self.state.hoist(&partial, |p| {
                if validate {
                    checked = true;
                    validate_partial(p)
                } else {
                    Ok(())
                }
            })?;
            if checked {
                self.state.count_validation();
            }
            name
        } else {
            if validate {
                validate_partial(&partial)?;
                self.state.count_validation();
            }
            let create = self.state.import("createPartial");
            format!("{}({})", create, factory_arguments(&partial.content, &partial.meta()))
        };

        if partial.nodes.is_empty() {
            return Ok(format!("{}()", factory));
        }
        let setters: Vec<String> = partial
            .nodes
            .iter()
            .map(|node| self.setter_closure(node))
            .collect();
        Ok(format!("{}([{}])", factory, setters.join(", ")))
    }

    /// `node => { _setter(node, ...); ... }` for one element
    fn setter_closure(&mut self, node: &NodeProps) -> String {
        let calls: Vec<String> = node
            .assignments
            .iter()
            .map(|assignment| {
                let function = self.state.import(assignment.runtime_function());
                format!("{}(node, {})", function, assignment.arguments())
            })
            .collect();
        format!("node => {{ {} }}", calls.join("; "))
    }

    /// `_createComponent(Name)({ ...props })`
    pub(crate) fn component_call(&mut self, el: &JsxElement) -> CompileResult<String> {
        let props = self.props_object(el)?;
        let create = self.state.import("createComponent");
        Ok(format!("{}({})({})", create, el.name.source(), props))
    }

    /// `_jsx("tag", { ...props })` for tags the compiler does not know
    pub(crate) fn jsx_call(&mut self, el: &JsxElement) -> CompileResult<String> {
        let tag = el.name.source();
        if let JsxName::Ident(name) = &el.name {
            if name.contains('-') && !is_custom_element(name) {
                return Err(CompileError::UnresolvedName {
                    name: tag,
                    span: el.name_span,
                });
            }
        }
        let props = self.props_object(el)?;
        let jsx = self.state.import("jsx");
        tracing::trace!("<{}> compiled through the generic jsx path", tag);
        Ok(format!("{}({}, {})", jsx, js_string(&tag), props))
    }

    fn props_object(&mut self, el: &JsxElement) -> CompileResult<String> {
        let mut entries = Vec::new();
        for attribute in &el.attributes {
            match attribute {
                JsxAttribute::Spread { expr, .. } => {
                    entries.push(format!("...{}", self.compile_expr(expr)?));
                }
                JsxAttribute::Named { name, value, .. } => {
                    let value = match value {
                        None => "true".to_string(),
                        Some(AttrValue::String { value, .. }) => js_string(value),
                        Some(AttrValue::Expression(expr)) => self.compile_expr(expr)?,
                        Some(AttrValue::Element(node)) => self.compile_node(node)?,
                    };
                    entries.push(format!("{}: {}", property_key(name), value));
                }
            }
        }

        let children = merge_children(self.build_children(&el.children, None, None)?);
        match children.len() {
            0 => {}
            1 => {
                let child = children.into_iter().next().map(|c| self.node_code(c)).transpose()?;
                if let Some(child) = child {
                    entries.push(format!("children: {}", child));
                }
            }
            _ => entries.push(format!("children: {}", self.array_code(children)?)),
        }

        Ok(if entries.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", entries.join(", "))
        })
    }
}

/// Identifier keys stay bare, anything else is quoted
fn property_key(name: &AttrName) -> String {
    match name {
        AttrName::Plain(plain) if is_identifier(plain) => plain.clone(),
        other => js_string(&other.source()),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_part)
}
