//! Inline style declarations
//!
//! The `style` attribute is the single source of truth; this type parses it,
//! edits one property at a time and serializes it back as `cssText`.

/// Ordered `property: value` pairs of an inline style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    props: Vec<(String, String)>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `cssText` string. Malformed declarations are skipped.
    pub fn parse(css_text: &str) -> Self {
        let mut decl = Self::new();
        for part in css_text.split(';') {
            let Some((name, value)) = part.split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if !name.is_empty() && !value.is_empty() {
                decl.set(name, value);
            }
        }
        decl
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, keeping its position when it already exists
    pub fn set(&mut self, name: &str, value: &str) {
        match self.props.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.props.push((name.to_string(), value.to_string())),
        }
    }

    /// Remove a property, returning whether it was set
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.props.len();
        self.props.retain(|(n, _)| n != name);
        before != self.props.len()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Serialize as `a: b; c: d;`
    pub fn css_text(&self) -> String {
        self.props
            .iter()
            .map(|(n, v)| format!("{}: {};", n, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let style = StyleDeclaration::parse("color:red; ;width : 10px;bogus");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("width"), Some("10px"));
        assert_eq!(style.css_text(), "color: red; width: 10px;");
    }

    #[test]
    fn test_custom_property() {
        let mut style = StyleDeclaration::new();
        style.set("--gap", "4px");
        style.set("--gap", "8px");
        assert_eq!(style.css_text(), "--gap: 8px;");
        assert!(style.remove("--gap"));
        assert!(!style.remove("--gap"));
    }
}
