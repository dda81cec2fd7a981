//! JSX syntax tree
//!
//! The scanner keeps ordinary JavaScript as opaque text and only builds
//! nodes for JSX. An [`Expr`] is the text of an expression container split
//! around the JSX it contains, so nested markup compiles in place.

use crate::const_fold::{fold_expression, ConstValue};
use crate::token::Span;

/// One piece of JavaScript source: opaque code or a JSX node inside it
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Code(String),
    Jsx(Box<JsxNode>),
}

/// A module: code with JSX nodes embedded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub pieces: Vec<Piece>,
}

/// JavaScript expression inside `{}` or after `...`
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub pieces: Vec<Piece>,
    pub span: Span,
}

impl Expr {
    pub fn has_jsx(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, Piece::Jsx(_)))
    }

    /// Source text, when the expression is plain code
    pub fn code(&self) -> Option<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Code(code) => out.push_str(code),
                Piece::Jsx(_) => return None,
            }
        }
        Some(out)
    }

    /// `{}` or `{/* comment */}`
    pub fn is_empty(&self) -> bool {
        self.code().is_some_and(|code| strip_comments(&code).trim().is_empty())
    }

    /// Compile-time value of the expression
    pub fn fold(&self) -> ConstValue {
        match self.code() {
            Some(code) => fold_expression(&code),
            None => ConstValue::Dynamic,
        }
    }
}

/// Element or fragment
#[derive(Debug, Clone, PartialEq)]
pub enum JsxNode {
    Element(JsxElement),
    Fragment(JsxFragment),
}

impl JsxNode {
    pub fn span(&self) -> Span {
        match self {
            JsxNode::Element(el) => el.span,
            JsxNode::Fragment(fragment) => fragment.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub name: JsxName,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
    pub span: Span,
    /// Span of the tag name in the opening tag
    pub name_span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    pub span: Span,
}

/// Tag name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxName {
    /// `div`, `my-element`, `Component`
    Ident(String),
    /// `svg:rect`
    Namespaced { namespace: String, local: String },
    /// `Foo.Bar`
    Member(Vec<String>),
}

impl JsxName {
    /// Name as written
    pub fn source(&self) -> String {
        match self {
            JsxName::Ident(name) => name.clone(),
            JsxName::Namespaced { namespace, local } => format!("{}:{}", namespace, local),
            JsxName::Member(parts) => parts.join("."),
        }
    }
}

/// Attribute name, `prefix:local` split
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrName {
    Plain(String),
    Namespaced { namespace: String, local: String },
}

impl AttrName {
    pub fn source(&self) -> String {
        match self {
            AttrName::Plain(name) => name.clone(),
            AttrName::Namespaced { namespace, local } => format!("{}:{}", namespace, local),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            AttrName::Plain(_) => None,
            AttrName::Namespaced { namespace, .. } => Some(namespace),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
    Named {
        name: AttrName,
        value: Option<AttrValue>,
        span: Span,
    },
    Spread {
        expr: Expr,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Quoted string, entities decoded
    String { value: String, span: Span },
    Expression(Expr),
    Element(Box<JsxNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    /// Raw JSX text as written
    Text { value: String, span: Span },
    Expression(Expr),
    Spread { expr: Expr, span: Span },
    Node(JsxNode),
}

/// Remove `//` and `/* */` comments outside strings
fn strip_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            c => out.push(c),
        }
    }
    out
}
