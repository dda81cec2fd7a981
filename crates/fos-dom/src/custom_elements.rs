//! Custom Elements
//!
//! Custom element registry. Elements whose name is defined are upgraded when
//! created or imported into the live tree; cloning inert template content
//! does not upgrade.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::NodeId;

/// Callback run once per upgraded element
pub type UpgradeCallback = Rc<dyn Fn(NodeId)>;

/// Custom element definition
#[derive(Clone)]
pub struct CustomElementDefinition {
    pub name: String,
    pub callback: UpgradeCallback,
}

impl fmt::Debug for CustomElementDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomElementDefinition")
            .field("name", &self.name)
            .finish()
    }
}

/// Custom element errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomElementError {
    #[error("'{0}' is not a valid custom element name")]
    InvalidName(String),
    #[error("'{0}' has already been defined")]
    AlreadyDefined(String),
}

/// Custom elements registry
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, CustomElementDefinition>,
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a custom element
    pub fn define(
        &mut self,
        name: &str,
        callback: UpgradeCallback,
    ) -> Result<(), CustomElementError> {
        if !Self::is_valid_name(name) {
            return Err(CustomElementError::InvalidName(name.to_string()));
        }
        if self.definitions.contains_key(name) {
            return Err(CustomElementError::AlreadyDefined(name.to_string()));
        }
        tracing::debug!("defined custom element <{}>", name);
        self.definitions.insert(
            name.to_string(),
            CustomElementDefinition {
                name: name.to_string(),
                callback,
            },
        );
        Ok(())
    }

    /// Get element definition
    pub fn get(&self, name: &str) -> Option<&CustomElementDefinition> {
        self.definitions.get(name)
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Valid custom element name: lowercase ASCII letter first, at least
    /// one `-`, only name characters after it, and not one of the names
    /// SVG and MathML already reserve.
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }
        name.contains('-') && chars.all(is_name_char) && !RESERVED_NAMES.contains(&name)
    }
}

const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

fn is_name_char(c: char) -> bool {
    matches!(c,
        '-' | '.' | '_' | '0'..='9' | 'a'..='z'
        | '\u{B7}'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{203F}'..='\u{2040}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(CustomElementRegistry::is_valid_name("my-element"));
        assert!(CustomElementRegistry::is_valid_name("x-"));
        assert!(!CustomElementRegistry::is_valid_name("myelement"));
        assert!(!CustomElementRegistry::is_valid_name("My-Element"));
        assert!(!CustomElementRegistry::is_valid_name("font-face"));
        assert!(!CustomElementRegistry::is_valid_name("my element"));
        assert!(!CustomElementRegistry::is_valid_name("1-up"));
        assert!(CustomElementRegistry::is_valid_name("math-α"));
        assert!(CustomElementRegistry::is_valid_name("x-1.2_b"));
    }

    #[test]
    fn test_define() {
        let mut registry = CustomElementRegistry::new();
        assert!(registry.define("my-element", Rc::new(|_| {})).is_ok());
        assert!(registry.is_defined("my-element"));
        assert_eq!(
            registry.define("my-element", Rc::new(|_| {})),
            Err(CustomElementError::AlreadyDefined("my-element".into()))
        );
        assert!(matches!(
            registry.define("nohyphen", Rc::new(|_| {})),
            Err(CustomElementError::InvalidName(_))
        ));
    }
}
