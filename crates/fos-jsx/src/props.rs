//! Compile-time prop classification
//!
//! Every dynamic or namespaced attribute of a native element becomes an
//! [`Assignment`]: a resolved setter plus the JavaScript for its value. The
//! setter is chosen here, once, from the attribute name as written.

use fos_render::{PropKind, BUILTIN_NAMESPACES};

use crate::ast::AttrName;
use crate::escape::js_string;

/// Setter an assignment compiles to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssignKind {
    /// One of the runtime prop setters
    Prop(PropKind),
    /// Children that could not be inlined into the template
    Children,
    /// `xmlns:prefix` declaration
    Xmlns,
    /// Attribute in a registered plugin namespace
    Plugin,
}

/// One runtime setter call for an element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub kind: AssignKind,
    /// Name the setter receives: the local name for namespaced props, the
    /// full `ns:local` name for plugins and `xmlns:` declarations
    pub name: String,
    /// JavaScript expression for the value
    pub value: String,
}

impl Assignment {
    pub fn new(kind: AssignKind, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Runtime entry point the assignment calls
    pub fn runtime_function(&self) -> &'static str {
        match &self.kind {
            AssignKind::Prop(kind) => setter_name(*kind),
            AssignKind::Children => "createChildren",
            AssignKind::Xmlns => "setAttribute",
            AssignKind::Plugin => "assignProp",
        }
    }

    /// Arguments after the node: `(name, value)` or just `(value)`
    pub fn arguments(&self) -> String {
        let named = match &self.kind {
            AssignKind::Prop(kind) => !matches!(
                kind,
                PropKind::Class
                    | PropKind::Style
                    | PropKind::UseRef
                    | PropKind::UseCss
                    | PropKind::UseConnected
                    | PropKind::UseDisconnected
                    | PropKind::Spread
            ),
            AssignKind::Children => false,
            AssignKind::Xmlns | AssignKind::Plugin => true,
        };
        if named {
            format!("{}, {}", js_string(&self.name), self.value)
        } else {
            self.value.clone()
        }
    }
}

/// Runtime function name for a prop kind
pub fn setter_name(kind: PropKind) -> &'static str {
    match kind {
        PropKind::Class => "setClass",
        PropKind::ClassNS => "setClassToken",
        PropKind::Style => "setStyle",
        PropKind::StyleNS => "setStyleProperty",
        PropKind::Prop | PropKind::PropNS => "setProperty",
        PropKind::Event | PropKind::EventNS => "addEvent",
        PropKind::UseRef => "setRef",
        PropKind::UseCss => "setCSS",
        PropKind::UseConnected => "setConnected",
        PropKind::UseDisconnected => "setDisconnected",
        PropKind::Spread => "spreadProps",
        PropKind::Attribute => "setAttribute",
    }
}

/// How an attribute name is handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameClass {
    /// Always a runtime assignment, even with a literal value
    Runtime(AssignKind, String),
    /// Plain attribute: inlined when the value is literal, otherwise set
    /// through the given kind
    Inlinable(AssignKind, String),
}

/// Classify an attribute name. `plugins` are the extra namespaces that
/// behave like the built-in ones.
pub fn classify(name: &AttrName, plugins: &[String]) -> NameClass {
    match name {
        AttrName::Namespaced { namespace, local } => {
            if namespace == "xmlns" {
                return NameClass::Runtime(AssignKind::Xmlns, name.source());
            }
            if BUILTIN_NAMESPACES.contains(&namespace.as_str()) {
                let full = name.source();
                let (kind, _) = PropKind::classify(&full);
                return match kind {
                    // `use:` outside the known names is a plain attribute
                    PropKind::Attribute => NameClass::Inlinable(AssignKind::Prop(kind), full),
                    kind => NameClass::Runtime(AssignKind::Prop(kind), local.clone()),
                };
            }
            if plugins.iter().any(|p| p == namespace) {
                return NameClass::Runtime(AssignKind::Plugin, name.source());
            }
            NameClass::Inlinable(AssignKind::Prop(PropKind::Attribute), name.source())
        }
        AttrName::Plain(plain) => {
            let (kind, local) = PropKind::classify(plain);
            match kind {
                PropKind::Event => NameClass::Runtime(AssignKind::Prop(kind), local.to_lowercase()),
                kind => NameClass::Inlinable(AssignKind::Prop(kind), local.to_string()),
            }
        }
    }
}
