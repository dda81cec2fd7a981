//! AST predicates
//!
//! Pure classification of tags, attributes and children. Nothing here
//! fails; callers get booleans or `None`.

use fos_dom::CustomElementRegistry;

use crate::ast::{AttrValue, JsxChild, JsxName};
use crate::const_fold::ConstValue;

/// HTML void elements plus legacy aliases
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr", "basefont", "bgsound", "frame", "keygen", "command", "menuitem",
];

const HTML_TAGS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col", "colgroup",
    "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd", "label",
    "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter", "nav", "noscript",
    "object", "ol", "optgroup", "option", "output", "p", "param", "picture", "pre", "progress",
    "q", "rp", "rt", "ruby", "s", "samp", "script", "search", "section", "select", "slot", "small",
    "source", "span", "strong", "style", "sub", "summary", "sup", "table", "tbody", "td",
    "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "track", "u", "ul",
    "var", "video", "wbr", "basefont", "bgsound", "frame", "keygen", "command", "menuitem",
];

const SVG_TAGS: &[&str] = &[
    "svg", "animate", "animateMotion", "animateTransform", "circle", "clipPath", "defs", "desc",
    "ellipse", "feBlend", "feColorMatrix", "feComponentTransfer", "feComposite",
    "feConvolveMatrix", "feDiffuseLighting", "feDisplacementMap", "feDistantLight",
    "feDropShadow", "feFlood", "feFuncA", "feFuncB", "feFuncG", "feFuncR", "feGaussianBlur",
    "feImage", "feMerge", "feMergeNode", "feMorphology", "feOffset", "fePointLight",
    "feSpecularLighting", "feSpotLight", "feTile", "feTurbulence", "filter", "foreignObject", "g",
    "image", "line", "linearGradient", "marker", "mask", "metadata", "mpath", "path", "pattern",
    "polygon", "polyline", "radialGradient", "rect", "set", "stop", "switch", "symbol", "text",
    "textPath", "tspan", "use", "view",
];

const MATHML_TAGS: &[&str] = &[
    "math", "annotation", "annotation-xml", "maction", "menclose", "merror", "mfenced", "mfrac",
    "mi", "mmultiscripts", "mn", "mo", "mover", "mpadded", "mphantom", "mprescripts", "mroot",
    "mrow", "ms", "mspace", "msqrt", "mstyle", "msub", "msubsup", "msup", "mtable", "mtd",
    "mtext", "mtr", "munder", "munderover", "semantics",
];

/// Tags that open an XML namespace and get an injected `xmlns`
pub fn namespace_root(tag: &str) -> Option<&'static str> {
    match tag {
        "svg" | "foreignObject" => Some(fos_dom::Namespace::SVG_URI),
        "math" => Some(fos_dom::Namespace::MATHML_URI),
        _ => None,
    }
}

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_svg_tag(tag: &str) -> bool {
    SVG_TAGS.contains(&tag)
}

pub fn is_mathml_tag(tag: &str) -> bool {
    MATHML_TAGS.contains(&tag)
}

/// Custom element name: lowercase start, contains a hyphen, not reserved
pub fn is_custom_element(tag: &str) -> bool {
    CustomElementRegistry::is_valid_name(tag)
}

/// Whether a tag compiles to a partial rather than a component call
pub fn is_native_tag(name: &JsxName) -> bool {
    match name {
        JsxName::Ident(tag) => {
            HTML_TAGS.contains(&tag.as_str())
                || is_svg_tag(tag)
                || is_mathml_tag(tag)
                || is_custom_element(tag)
        }
        JsxName::Namespaced { .. } | JsxName::Member(_) => false,
    }
}

/// Capitalised identifiers and member expressions reference components;
/// unknown lowercase names go through the generic `jsx` path
pub fn is_component_name(name: &JsxName) -> bool {
    match name {
        JsxName::Ident(tag) => tag
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || c == '_' || c == '$'),
        JsxName::Member(_) => true,
        JsxName::Namespaced { .. } => false,
    }
}

/// Compile-time value of a child: decoded text, or a folded expression
pub fn is_children_literal(child: &JsxChild) -> Option<ConstValue> {
    match child {
        JsxChild::Text { value, .. } => Some(ConstValue::String(value.as_str().into())),
        JsxChild::Expression(expr) => {
            let value = expr.fold();
            (!value.is_dynamic()).then_some(value)
        }
        JsxChild::Spread { .. } | JsxChild::Node(_) => None,
    }
}

/// Compile-time value of an attribute. A missing value is boolean `true`.
pub fn is_attribute_literal(value: Option<&AttrValue>) -> Option<ConstValue> {
    match value {
        None => Some(ConstValue::Boolean(true)),
        Some(AttrValue::String { value, .. }) => Some(ConstValue::String(value.as_str().into())),
        Some(AttrValue::Expression(expr)) => {
            let value = expr.fold();
            (!value.is_dynamic()).then_some(value)
        }
        Some(AttrValue::Element(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Piece};
    use crate::token::Span;

    #[test]
    fn test_void_elements() {
        for tag in ["img", "br", "input", "keygen"] {
            assert!(is_void_element(tag), "{}", tag);
        }
        assert!(!is_void_element("div"));
    }

    #[test]
    fn test_tag_classification() {
        let ident = |s: &str| JsxName::Ident(s.to_string());
        assert!(is_native_tag(&ident("div")));
        assert!(is_native_tag(&ident("circle")));
        assert!(is_native_tag(&ident("mfrac")));
        assert!(is_native_tag(&ident("x-card")));
        assert!(!is_native_tag(&ident("Card")));
        assert!(!is_native_tag(&ident("widget")));
        assert!(is_component_name(&ident("Card")));
        assert!(!is_component_name(&ident("widget")));
        assert!(is_component_name(&JsxName::Member(vec!["ui".into(), "Card".into()])));
    }

    #[test]
    fn test_literal_values() {
        let expr = |code: &str| Expr {
            pieces: vec![Piece::Code(code.to_string())],
            span: Span::default(),
        };
        assert_eq!(is_attribute_literal(None), Some(ConstValue::Boolean(true)));
        assert_eq!(
            is_attribute_literal(Some(&AttrValue::Expression(expr("'a' + 'b'")))),
            Some(ConstValue::String("ab".into()))
        );
        assert_eq!(is_attribute_literal(Some(&AttrValue::Expression(expr("sig")))), None);
        assert_eq!(
            is_children_literal(&JsxChild::Expression(expr("3"))),
            Some(ConstValue::Number(3.0))
        );
    }

    #[test]
    fn test_namespace_roots() {
        assert_eq!(namespace_root("svg"), Some(fos_dom::Namespace::SVG_URI));
        assert_eq!(namespace_root("math"), Some(fos_dom::Namespace::MATHML_URI));
        assert_eq!(namespace_root("div"), None);
    }
}
