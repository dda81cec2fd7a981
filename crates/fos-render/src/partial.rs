//! Partial instantiation
//!
//! A partial factory owns one compiled HTML string. The first call parses
//! it and keeps the fragment; every call copies that fragment and hands
//! each argument the element found at its walk position.

use std::cell::OnceCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::{Children, RenderError, RenderResult, Renderer, WeakRenderer};

/// Per-instance argument: receives the node at its walk position
pub type PartialArg = Box<dyn FnOnce(&Renderer, NodeId) -> RenderResult<()>>;

/// Position metadata of a partial
///
/// JSON form: walk index keys mapped to argument indexes (identity entries
/// omitted) plus `m` (walk limit), `x` (XML namespace) and `i` (import
/// instead of clone), e.g. `{"3":1,"m":4}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PartialMeta {
    /// Walk index -> argument index, for non-identity positions
    pub map: BTreeMap<usize, usize>,
    /// Stop walking at this many elements
    pub max: Option<usize>,
    /// Parse in this XML namespace
    pub xmlns: Option<String>,
    /// Import (upgrading custom elements) instead of cloning
    pub import: bool,
}

impl PartialMeta {
    /// Parse the JSON form. An empty string means no metadata.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| RenderError::InvalidMetadata(err.to_string()))?;
        let serde_json::Value::Object(entries) = value else {
            return Err(RenderError::InvalidMetadata(format!(
                "expected an object, got {}",
                json
            )));
        };

        let mut meta = Self::default();
        for (key, value) in entries {
            let invalid = || RenderError::InvalidMetadata(format!("bad value for '{}': {}", key, value));
            match key.as_str() {
                "m" => meta.max = Some(value.as_u64().ok_or_else(invalid)? as usize),
                "x" => meta.xmlns = Some(value.as_str().ok_or_else(invalid)?.to_string()),
                "i" => {
                    meta.import = match &value {
                        serde_json::Value::Bool(b) => *b,
                        serde_json::Value::Number(n) => n.as_u64().is_some_and(|n| n != 0),
                        _ => return Err(invalid()),
                    }
                }
                _ => {
                    let walk = key.parse::<usize>().map_err(|_| {
                        RenderError::InvalidMetadata(format!("unknown key '{}'", key))
                    })?;
                    let arg = value.as_u64().ok_or_else(invalid)? as usize;
                    meta.map.insert(walk, arg);
                }
            }
        }
        Ok(meta)
    }

    /// JSON form with keys in a stable order
    pub fn to_json(&self) -> String {
        let mut entries = serde_json::Map::new();
        for (walk, arg) in &self.map {
            entries.insert(walk.to_string(), (*arg).into());
        }
        if let Some(max) = self.max {
            entries.insert("m".to_string(), max.into());
        }
        if let Some(xmlns) = &self.xmlns {
            entries.insert("x".to_string(), xmlns.clone().into());
        }
        if self.import {
            entries.insert("i".to_string(), 1.into());
        }
        serde_json::Value::Object(entries).to_string()
    }

    /// `(walk index, argument index)` pairs for a walk over `elements`
    /// elements with `args` arguments
    fn targets(&self, elements: usize, args: usize) -> Vec<(usize, usize)> {
        let remapped: HashSet<usize> = self.map.values().copied().collect();
        (0..elements)
            .filter_map(|walk| match self.map.get(&walk) {
                Some(&arg) => Some((walk, arg)),
                None if walk < args && !remapped.contains(&walk) => Some((walk, walk)),
                None => None,
            })
            .collect()
    }
}

struct PartialInner {
    html: String,
    meta: PartialMeta,
    template: OnceCell<NodeId>,
    renderer: WeakRenderer,
}

/// Hoisted template factory
#[derive(Clone)]
pub struct PartialFactory {
    inner: Rc<PartialInner>,
}

impl PartialFactory {
    pub fn html(&self) -> &str {
        &self.inner.html
    }

    pub fn meta(&self) -> &PartialMeta {
        &self.inner.meta
    }

    /// The parsed template fragment, parsed on first use
    fn template(&self, renderer: &Renderer) -> RenderResult<NodeId> {
        if let Some(&template) = self.inner.template.get() {
            return Ok(template);
        }
        let xml = self.inner.meta.xmlns.is_some();
        let fragment = fos_html::parse_fragment(&mut renderer.tree_mut(), &self.inner.html, xml)?;
        tracing::debug!(
            "parsed partial template ({} bytes, xml: {})",
            self.inner.html.len(),
            xml
        );
        Ok(*self.inner.template.get_or_init(|| fragment))
    }

    /// Instantiate the template and apply `args` at their walk positions.
    /// Returns the single root node, or a list of the top-level nodes.
    pub fn call(&self, args: Vec<PartialArg>) -> RenderResult<Children> {
        let renderer = self.inner.renderer.upgrade().ok_or(RenderError::Detached)?;
        let template = self.template(&renderer)?;
        let meta = &self.inner.meta;

        let root = {
            let mut tree = renderer.tree_mut();
            if meta.import {
                tree.import_node(template, true)?
            } else {
                tree.clone_node(template, true)?
            }
        };
        if meta.import {
            renderer.run_upgrades();
        }

        if !args.is_empty() {
            let expected = args.len();
            let elements: Vec<NodeId> = {
                let tree = renderer.tree();
                let limit = meta.max.unwrap_or(usize::MAX);
                tree.elements(root).take(limit).collect()
            };
            let targets = meta.targets(elements.len(), expected);
            let applied = targets
                .iter()
                .map(|&(_, arg)| arg)
                .filter(|&arg| arg < expected)
                .collect::<HashSet<_>>()
                .len();
            if applied < expected {
                return Err(RenderError::WalkExhausted { expected, applied });
            }

            let mut slots: Vec<Option<PartialArg>> = args.into_iter().map(Some).collect();
            for (walk, arg) in targets {
                if let Some(apply) = slots.get_mut(arg).and_then(Option::take) {
                    apply(&renderer, elements[walk])?;
                }
            }
        }

        let nodes = renderer.tree().children(root);
        Ok(if nodes.len() == 1 {
            Children::Node(nodes[0])
        } else {
            Children::List(nodes.into_iter().map(Children::Node).collect())
        })
    }
}

impl fmt::Debug for PartialFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialFactory")
            .field("html", &self.inner.html)
            .field("meta", &self.inner.meta)
            .field("parsed", &self.inner.template.get().is_some())
            .finish()
    }
}

impl Renderer {
    /// Create a factory for a compiled HTML string. Each factory keeps its
    /// own parsed template.
    pub fn create_partial(&self, html: impl Into<String>, meta: PartialMeta) -> PartialFactory {
        PartialFactory {
            inner: Rc::new(PartialInner {
                html: html.into(),
                meta,
                template: OnceCell::new(),
                renderer: self.downgrade(),
            }),
        }
    }
}
