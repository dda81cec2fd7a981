//! Compiler Configuration

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Reactive library adapter the compiled module imports the runtime through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactiveLib {
    #[default]
    Solid,
    Oby,
    Flimsy,
}

impl fmt::Display for ReactiveLib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReactiveLib::Solid => "solid",
            ReactiveLib::Oby => "oby",
            ReactiveLib::Flimsy => "flimsy",
        })
    }
}

/// Compiler configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Module the runtime functions are imported from
    pub runtime_module: String,

    /// Adapter appended to `runtime_module`
    pub lib: ReactiveLib,

    /// Hoist partial factories to module scope and share them
    pub hoist: bool,

    /// Check every template against the HTML parser
    pub validate_html: bool,

    /// Namespaces handled by runtime prop plugins
    pub plugin_namespaces: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime_module: "fos-render".to_string(),
            lib: ReactiveLib::default(),
            hoist: true,
            validate_html: true,
            plugin_namespaces: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a JSON configuration. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Import path of the runtime, `<runtime_module>/<lib>`
    pub fn import_source(&self) -> String {
        format!("{}/{}", self.runtime_module.trim_end_matches('/'), self.lib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.hoist);
        assert!(config.validate_html);
        assert_eq!(config.import_source(), "fos-render/solid");
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{"lib":"oby","pluginNamespaces":["route"]}"#).unwrap();
        assert_eq!(config.lib, ReactiveLib::Oby);
        assert_eq!(config.plugin_namespaces, vec!["route".to_string()]);
        assert!(config.hoist);
        assert_eq!(config.import_source(), "fos-render/oby");
    }

    #[test]
    fn test_unknown_lib_rejected() {
        assert!(Config::from_json(r#"{"lib":"react"}"#).is_err());
    }
}
