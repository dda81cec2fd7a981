//! Class tokens of an element's `class` attribute
//!
//! `class:name={on}` bindings and object-valued `class` props both end up
//! here. A key may name several tokens at once (`"btn primary"`).

use std::fmt;

/// Ordered class tokens, each present once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens of a raw `class` attribute value, first occurrence wins
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        list.set(value, true);
        list
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Turn every whitespace-separated token of `key` on or off.
    /// Returns whether the list changed.
    pub fn set(&mut self, key: &str, on: bool) -> bool {
        let before = self.tokens.len();
        let mut changed = false;
        for token in key.split_whitespace() {
            if on {
                if !self.contains(token) {
                    self.tokens.push(token.to_owned());
                    changed = true;
                }
            } else {
                self.tokens.retain(|t| t != token);
            }
        }
        changed || self.tokens.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}
