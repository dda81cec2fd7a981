//! Scoped stylesheets for `use:css`
//!
//! The bare word `class` in a selector stands for "the element this sheet is
//! attached to". It is rewritten to a class derived from a hash of the sheet
//! text, so the same sheet used on many nodes shares one scope and is adopted
//! once per root.

/// Adoptable stylesheet with its scope class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedStyleSheet {
    /// Generated class name (`c` + hex hash)
    pub scope: String,
    /// Rewritten CSS text
    pub css: String,
}

impl ScopedStyleSheet {
    pub fn new(css: &str) -> Self {
        let scope = scope_class(css);
        let css = rewrite_selectors(css, &scope);
        Self { scope, css }
    }
}

/// Stable scope class for a stylesheet text (FNV-1a)
pub fn scope_class(css: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in css.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("c{:08x}", hash)
}

fn rewrite_selectors(css: &str, scope: &str) -> String {
    let mut out = String::with_capacity(css.len() + 16);
    let mut segment = String::new();
    for c in css.chars() {
        match c {
            '{' => {
                if segment.trim_start().starts_with('@') {
                    out.push_str(&segment);
                } else {
                    out.push_str(&replace_class_word(&segment, scope));
                }
                segment.clear();
                out.push(c);
            }
            '}' | ';' => {
                out.push_str(&segment);
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    out.push_str(&segment);
    out
}

fn replace_class_word(selector: &str, scope: &str) -> String {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    let mut out = String::with_capacity(selector.len());
    let mut rest = selector;
    let mut prev: Option<char> = None;
    while let Some(pos) = rest.find("class") {
        let before = rest[..pos].chars().last().or(prev);
        let after = rest[pos + 5..].chars().next();
        out.push_str(&rest[..pos]);
        let standalone = !before.is_some_and(|c| is_ident(c) || c == '.' || c == '#' || c == '[')
            && !after.is_some_and(is_ident);
        if standalone {
            out.push('.');
            out.push_str(scope);
        } else {
            out.push_str("class");
        }
        prev = Some('s');
        rest = &rest[pos + 5..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_is_stable() {
        assert_eq!(scope_class("a{}"), scope_class("a{}"));
        assert_ne!(scope_class("a{}"), scope_class("b{}"));
        assert_eq!(scope_class("").len(), 9);
    }

    #[test]
    fn test_rewrite_class_selector() {
        let sheet = ScopedStyleSheet::new("class { color: red; } class:hover span{x:y}");
        let expected = format!(
            ".{0} {{ color: red; }} .{0}:hover span{{x:y}}",
            sheet.scope
        );
        assert_eq!(sheet.css, expected);
    }

    #[test]
    fn test_other_words_untouched() {
        let sheet = ScopedStyleSheet::new(".classy, [class] { a: class; } @media (x) { class {} }");
        assert!(sheet.css.starts_with(".classy, [class] { a: class; } @media (x) { ."));
    }
}
