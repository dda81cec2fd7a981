//! Hoisting and deduplication
//!
//! One [`CompilationUnitState`] lives for the compilation of one file.
//! Partials with the same content and metadata share one module-scope
//! factory, which is validated when it is first declared.

use std::collections::{BTreeSet, HashMap};

use fos_render::PartialMeta;

use crate::error::CompileResult;
use crate::escape::js_string;
use crate::partial::Partial;

/// Identity of a hoisted partial
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialKey {
    pub content: String,
    pub meta: PartialMeta,
}

impl PartialKey {
    pub fn of(partial: &Partial) -> Self {
        Self {
            content: partial.content.clone(),
            meta: partial.meta(),
        }
    }
}

/// Per-file compiler state
#[derive(Debug, Default)]
pub struct CompilationUnitState {
    partials: HashMap<PartialKey, String>,
    /// Module-scope declarations in creation order
    declarations: Vec<String>,
    /// Runtime functions the module imports
    imports: BTreeSet<&'static str>,
    validations: usize,
}

impl CompilationUnitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local name of a runtime function, recording the import
    pub fn import(&mut self, function: &'static str) -> String {
        self.imports.insert(function);
        format!("_{}", function)
    }

    /// Name of the factory for `partial`, declaring it on first use.
    /// `validate` runs once per distinct key, before the declaration.
    pub fn hoist(
        &mut self,
        partial: &Partial,
        validate: impl FnOnce(&Partial) -> CompileResult<()>,
    ) -> CompileResult<String> {
        let key = PartialKey::of(partial);
        if let Some(name) = self.partials.get(&key) {
            return Ok(name.clone());
        }
        validate(partial)?;

        let name = format!("_partial{}", self.partials.len());
        let create = self.import("createPartial");
        let declaration = format!(
            "const {} = {}({});",
            name,
            create,
            factory_arguments(&key.content, &key.meta)
        );
        tracing::debug!("hoisted {} ({} bytes of HTML)", name, key.content.len());
        self.declarations.push(declaration);
        self.partials.insert(key, name.clone());
        Ok(name)
    }

    pub fn declarations(&self) -> &[String] {
        &self.declarations
    }

    pub fn imports(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.imports.iter().copied()
    }

    /// Distinct partials declared so far
    pub fn partial_count(&self) -> usize {
        self.partials.len()
    }

    /// Templates checked against the HTML parser
    pub fn validations(&self) -> usize {
        self.validations
    }

    pub fn count_validation(&mut self) {
        self.validations += 1;
    }
}

/// `"html"` or `"html", {meta}` for `createPartial`
pub fn factory_arguments(content: &str, meta: &PartialMeta) -> String {
    let html = js_string(content);
    if *meta == PartialMeta::default() {
        html
    } else {
        format!("{}, {}", html, meta.to_json())
    }
}
