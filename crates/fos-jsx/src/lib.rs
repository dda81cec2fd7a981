//! fOS JSX
//!
//! Partial compiler: static markup is inlined into HTML templates that are
//! hoisted to module scope and instantiated by cloning, while dynamic props
//! and children are bound to the cloned elements through precomputed walk
//! indices. The output targets the `fos-render` runtime.

mod ast;
mod codegen;
mod config;
mod const_fold;
mod error;
mod escape;
mod hoist;
mod html_spec;
mod lexer;
mod merge;
mod parser;
mod partial;
mod predicates;
mod props;
mod token;
mod transform;
mod validate;

pub use ast::{
    AttrName, AttrValue, Expr, JsxAttribute, JsxChild, JsxElement, JsxFragment, JsxName, JsxNode,
    Module, Piece,
};
pub use config::{Config, ReactiveLib};
pub use const_fold::{fold_expression, ConstValue};
pub use error::{CompileError, CompileResult};
pub use escape::{decode_entities, js_string, normalize_jsx_text};
pub use hoist::{factory_arguments, CompilationUnitState, PartialKey};
pub use html_spec::can_contain;
pub use merge::{merge_children, merge_pair, Node};
pub use parser::parse_module;
pub use partial::{NodeProps, Partial};
pub use predicates::{
    is_attribute_literal, is_children_literal, is_component_name, is_native_tag, is_void_element,
};
pub use props::{AssignKind, Assignment};
pub use token::Span;
pub use transform::{compile, CompileOutput, Compiler};
pub use validate::validate_partial;

/// Compile one JSX node in isolation, without hoisting. Returns the built
/// node (a partial for native elements) for inspection.
pub fn build(source: &str, config: &Config) -> CompileResult<Node> {
    let module = parse_module(source)?;
    let node = module
        .pieces
        .iter()
        .find_map(|piece| match piece {
            Piece::Jsx(node) => Some(node),
            Piece::Code(_) => None,
        })
        .ok_or_else(|| CompileError::syntax("no JSX element found", Span::default()))?;
    Compiler::new(config).build_node(node, None)
}
