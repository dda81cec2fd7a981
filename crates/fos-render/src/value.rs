//! Prop values and children
//!
//! `Value` is what a prop setter receives: a plain scalar, a collection, a
//! callback, or a reactive accessor that is re-read inside a render effect.
//! `Children` is what can be inserted into a parent node.

use std::fmt;
use std::rc::Rc;

use fos_dom::{format_number, Listener, NodeId, PropertyValue};
use fos_reactive::{Memo, Signal};

use crate::{RenderResult, Renderer};

/// Callback receiving a node (`use:ref`, `use:connected`, ...)
pub type NodeCallback = Rc<dyn Fn(NodeId)>;

/// Ordered prop list, as written at the call site
pub type Props = Vec<(String, Value)>;

/// Prop value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Own enumerable entries, in order
    Object(Vec<(String, Value)>),
    Handler(Listener),
    Callback(NodeCallback),
    /// Reactive accessor
    Dynamic(Rc<dyn Fn() -> Value>),
}

impl Value {
    /// Reactive value from a closure
    pub fn dynamic(f: impl Fn() -> Value + 'static) -> Self {
        Value::Dynamic(Rc::new(f))
    }

    pub fn handler(f: impl Fn(&fos_dom::Event) + 'static) -> Self {
        Value::Handler(Rc::new(f))
    }

    pub fn callback(f: impl Fn(NodeId) + 'static) -> Self {
        Value::Callback(Rc::new(f))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Value::Dynamic(_))
    }

    /// Read accessors until a plain value remains (tracked when called
    /// inside a computation)
    pub fn resolve(self) -> Value {
        let mut value = self;
        while let Value::Dynamic(f) = value {
            value = f();
        }
        value
    }

    /// JavaScript truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// `null`, `undefined` or `false`: values that remove an attribute
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null | Value::Bool(false))
    }

    /// String form used for attributes and style values
    pub fn to_text(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_text(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Handler(_) | Value::Callback(_) | Value::Dynamic(_) => "function".to_string(),
        }
    }

    /// Property form; collections and callbacks have none
    pub fn to_property(&self) -> Option<PropertyValue> {
        match self {
            Value::Undefined => Some(PropertyValue::Undefined),
            Value::Null => Some(PropertyValue::Null),
            Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            Value::Number(n) => Some(PropertyValue::Number(*n)),
            Value::String(s) => Some(PropertyValue::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(entries) => f.debug_tuple("Object").field(entries).finish(),
            Value::Handler(_) => f.write_str("Handler"),
            Value::Callback(_) => f.write_str("Callback"),
            Value::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

impl PartialEq for Value {
    /// Structural for data, identity for callbacks and accessors
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Handler(a), Value::Handler(b)) => Rc::ptr_eq(a, b),
            (Value::Callback(a), Value::Callback(b)) => Rc::ptr_eq(a, b),
            (Value::Dynamic(a), Value::Dynamic(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Clone + Into<Value> + 'static> From<Signal<T>> for Value {
    fn from(signal: Signal<T>) -> Self {
        Value::dynamic(move || signal.get().into())
    }
}

impl<T: Clone + PartialEq + Into<Value> + 'static> From<Memo<T>> for Value {
    fn from(memo: Memo<T>) -> Self {
        Value::dynamic(move || memo.get().into())
    }
}

/// Mounts itself into `parent` before `anchor`
pub type Mount = Rc<dyn Fn(&Renderer, NodeId, Option<NodeId>) -> RenderResult<Vec<NodeId>>>;

/// Anything that can be inserted as children
#[derive(Clone, Default)]
pub enum Children {
    #[default]
    None,
    Text(String),
    Node(NodeId),
    List(Vec<Children>),
    /// Reactive children, replaced whenever the accessor re-runs
    Dynamic(Rc<dyn Fn() -> Children>),
    /// Self-managing children such as keyed lists
    Mount(Mount),
}

impl Children {
    pub fn dynamic(f: impl Fn() -> Children + 'static) -> Self {
        Children::Dynamic(Rc::new(f))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }

    /// Top-level nodes when the children are already materialized
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Children::Node(id) => vec![*id],
            Children::List(items) => items.iter().flat_map(Children::nodes).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the last inserted node can change after insertion
    pub(crate) fn has_dynamic_tail(&self) -> bool {
        match self {
            Children::Dynamic(_) => true,
            Children::List(items) => items
                .iter()
                .rev()
                .find(|c| !c.is_none())
                .is_some_and(Children::has_dynamic_tail),
            _ => false,
        }
    }
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::None => f.write_str("None"),
            Children::Text(t) => write!(f, "Text({:?})", t),
            Children::Node(id) => write!(f, "Node({:?})", id),
            Children::List(items) => f.debug_tuple("List").field(items).finish(),
            Children::Dynamic(_) => f.write_str("Dynamic"),
            Children::Mount(_) => f.write_str("Mount"),
        }
    }
}

impl From<&str> for Children {
    fn from(s: &str) -> Self {
        Children::Text(s.to_string())
    }
}

impl From<String> for Children {
    fn from(s: String) -> Self {
        Children::Text(s)
    }
}

impl From<NodeId> for Children {
    fn from(id: NodeId) -> Self {
        Children::Node(id)
    }
}

impl From<f64> for Children {
    fn from(n: f64) -> Self {
        Children::Text(format_number(n))
    }
}

impl From<i32> for Children {
    fn from(n: i32) -> Self {
        Children::Text(n.to_string())
    }
}

impl<T: Into<Children>> From<Vec<T>> for Children {
    fn from(items: Vec<T>) -> Self {
        Children::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Children>> From<Option<T>> for Children {
    fn from(v: Option<T>) -> Self {
        v.map_or(Children::None, Into::into)
    }
}

impl<T: Clone + Into<Children> + 'static> From<Signal<T>> for Children {
    fn from(signal: Signal<T>) -> Self {
        Children::dynamic(move || signal.get().into())
    }
}

impl From<Value> for Children {
    /// Text for scalars, reactive text for accessors
    fn from(value: Value) -> Self {
        match value {
            Value::Undefined | Value::Null | Value::Bool(_) => Children::None,
            Value::Array(items) => Children::List(items.into_iter().map(Into::into).collect()),
            Value::Dynamic(f) => Children::dynamic(move || f().into()),
            other => Children::Text(other.to_text()),
        }
    }
}
