//! Tag content model
//!
//! Which children the HTML parser keeps where they were written. Markup
//! that breaks these rules is restructured by the parser (foster parenting,
//! implied end tags), so the compiled template would not match the source.

use crate::predicates::is_void_element;

/// Marker for a text child in [`can_contain`]
pub const TEXT: &str = "#text";

/// Elements that only accept phrasing content
const PHRASING_PARENTS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "span", "a", "b", "i", "em", "strong",
    "small", "label", "abbr", "cite", "code", "dfn", "kbd", "q", "s", "samp", "sub", "sup", "u",
    "var", "mark", "bdi", "bdo", "time", "data", "legend", "summary", "dt", "button", "output",
    "rt", "rp",
];

/// Flow elements that close an open `<p>` or cannot sit in phrasing
/// content
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "search", "section", "table", "ul",
    "li", "dd", "dt", "tr", "td", "th", "tbody", "thead", "tfoot", "caption", "colgroup", "col",
    "html", "body", "head",
];

/// Elements that can be the child of anything that accepts flow content
const SCRIPT_SUPPORTING: &[&str] = &["script", "template"];

/// Parents with a closed list of allowed children
fn allowed_children(parent: &str) -> Option<&'static [&'static str]> {
    Some(match parent {
        "table" => &["caption", "colgroup", "thead", "tbody", "tfoot", "tr", "style"],
        "thead" | "tbody" | "tfoot" => &["tr"],
        "tr" => &["td", "th"],
        "colgroup" => &["col"],
        "ul" | "ol" | "menu" => &["li"],
        "dl" => &["dt", "dd", "div"],
        "select" => &["option", "optgroup", "hr"],
        "optgroup" => &["option"],
        "datalist" => &["option"],
        "html" => &["head", "body"],
        "head" => &["title", "meta", "link", "style", "base", "noscript"],
        "picture" => &["source", "img"],
        "ruby" => &["rt", "rp", "rb", "rtc", "span", "b", "i", "em", "strong"],
        _ => return None,
    })
}

/// Parents whose text content the parser moves or drops
const NO_TEXT: &[&str] = &[
    "table", "thead", "tbody", "tfoot", "tr", "colgroup", "html", "head", "select", "optgroup",
    "picture",
];

/// Parents whose content is raw text
const TEXT_ONLY: &[&str] = &["textarea", "title", "option", "script", "style"];

/// Whether `child` (a tag name, or [`TEXT`]) may be a direct child of
/// `parent` without the parser restructuring it. Table parts, list items
/// and document structure tags are only accepted inside their own parents.
pub fn can_contain(parent: &str, child: &str) -> bool {
    if is_void_element(parent) {
        return false;
    }
    if child == TEXT {
        if parent == "ul" || parent == "ol" || parent == "dl" {
            return true;
        }
        return !NO_TEXT.contains(&parent);
    }
    if TEXT_ONLY.contains(&parent) {
        return false;
    }
    if SCRIPT_SUPPORTING.contains(&child) && parent != "tr" && parent != "colgroup" {
        return true;
    }
    if let Some(allowed) = allowed_children(parent) {
        return allowed.contains(&child);
    }
    match child {
        // Table parts only inside their table ancestors
        "tr" | "td" | "th" | "tbody" | "thead" | "tfoot" | "caption" | "colgroup" | "col" => {
            false
        }
        "li" => parent == "ul" || parent == "ol" || parent == "menu",
        "dt" | "dd" => parent == "dl" || parent == "div",
        "option" | "optgroup" => false,
        "html" | "head" | "body" => false,
        "a" if parent == "a" => false,
        "form" if parent == "form" => false,
        "button" | "a" | "input" | "select" | "textarea" if parent == "button" => false,
        _ if PHRASING_PARENTS.contains(&parent) => !BLOCK_ELEMENTS.contains(&child),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows() {
        assert!(can_contain("tr", "td"));
        assert!(!can_contain("tr", "div"));
        assert!(!can_contain("div", "tr"));
        assert!(can_contain("tbody", "tr"));
        assert!(!can_contain("table", "td"));
        assert!(!can_contain("tr", TEXT));
    }

    #[test]
    fn test_phrasing_parents() {
        assert!(!can_contain("p", "div"));
        assert!(!can_contain("p", "p"));
        assert!(can_contain("p", "b"));
        assert!(!can_contain("a", "a"));
        assert!(can_contain("div", "p"));
    }

    #[test]
    fn test_lists_and_voids() {
        assert!(can_contain("ul", "li"));
        assert!(!can_contain("ul", "div"));
        assert!(!can_contain("div", "li"));
        assert!(!can_contain("img", "span"));
        assert!(!can_contain("br", TEXT));
        assert!(can_contain("ul", "template"));
    }

    #[test]
    fn test_foreign_content_is_open() {
        assert!(can_contain("svg", "circle"));
        assert!(can_contain("x-card", "div"));
        assert!(!can_contain("x-card", "tr"));
    }
}
