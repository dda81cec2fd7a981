//! Name table for tags and attributes
//!
//! Every cloned partial row repeats the same handful of names, so elements
//! and attributes carry a 4-byte id into this table instead of a `String`.

use std::collections::HashMap;
use std::rc::Rc;

/// Id of a name in a [`StringInterner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Always the empty name
    pub const EMPTY: InternedString = InternedString(0);
}

/// Names seeded into every tree: the tags and attributes partials use most.
const SEED_NAMES: &[&str] = &[
    "div", "span", "p", "a", "b", "i", "img", "ul", "ol", "li", "table", "tbody", "tr", "td",
    "th", "input", "button", "label", "select", "option", "textarea", "form", "svg", "g",
    "path", "circle", "template", "id", "class", "style", "href", "src", "type", "value",
    "checked", "disabled", "name", "is", "xmlns",
];

/// Bidirectional name table
#[derive(Debug)]
pub struct StringInterner {
    names: Vec<Rc<str>>,
    ids: HashMap<Rc<str>, InternedString>,
}

impl StringInterner {
    /// Table holding the empty name at id 0 and the common partial names
    pub fn new() -> Self {
        Self::with_names(SEED_NAMES)
    }

    /// Table seeded with `names` after the empty name
    pub fn with_names(names: &[&str]) -> Self {
        let mut table = Self {
            names: Vec::with_capacity(names.len() + 1),
            ids: HashMap::with_capacity(names.len() + 1),
        };
        table.intern("");
        for name in names {
            table.intern(name);
        }
        table
    }

    pub fn intern(&mut self, name: &str) -> InternedString {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = InternedString(self.names.len() as u32);
        let shared: Rc<str> = Rc::from(name);
        self.names.push(Rc::clone(&shared));
        self.ids.insert(shared, id);
        id
    }

    /// Id of `name` if some element or attribute already used it
    pub fn lookup(&self, name: &str) -> Option<InternedString> {
        self.ids.get(name).copied()
    }

    /// Name behind `id`; unknown ids read as the empty name.
    #[inline]
    pub fn get(&self, id: InternedString) -> &str {
        match self.names.get(id.0 as usize) {
            Some(name) => name,
            None => "",
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
