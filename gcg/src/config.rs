//! Generator configuration.
//!
//! A [`GenConfig`] is built once per run (defaults, optionally overlaid by a
//! `gcg.toml` file) and handed to every component by reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::GenError;
use crate::imports::ImportDeclaration;

/// Name of the config file picked up from the source folder.
pub const CONFIG_FILE_NAME: &str = "gcg.toml";

/// Initialisms kept as a single word when converting to snake case.
///
/// Order matters: replacements are applied in this order.
pub const DEFAULT_INITIALISMS: &[&str] = &[
    "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP", "JSON", "LHS", "QPS",
    "RAM", "RHS", "RPC", "SLA", "SMS", "SMTP", "SSH", "TLS", "TTL", "UID", "UI", "UUID", "URI", "URL", "UTF8", "VM",
    "XML", "XSRF", "XSS",
];

/// Configuration stored in gcg.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    #[serde(default)]
    pub naming: NamingSettings,
    #[serde(default)]
    pub markers: MarkerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    /// Default imports per template identifier.
    #[serde(default = "default_templates")]
    pub templates: BTreeMap<String, TemplateSettings>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            naming: NamingSettings::default(),
            markers: MarkerSettings::default(),
            source: SourceSettings::default(),
            templates: default_templates(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingSettings {
    #[serde(default = "default_initialisms")]
    pub initialisms: Vec<String>,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            initialisms: default_initialisms(),
        }
    }
}

/// Opt-out markers recognized by the extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSettings {
    /// Struct tag key carrying opt-out options, e.g. `gopher:"-"`.
    #[serde(default = "default_tag_key")]
    pub tag_key: String,
    #[serde(default = "default_disable_values")]
    pub disable_values: Vec<String>,
    /// Substring that disables a whole type when found in its doc comment.
    #[serde(default = "default_doc_marker")]
    pub doc_marker: String,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            tag_key: default_tag_key(),
            disable_values: default_disable_values(),
            doc_marker: default_doc_marker(),
        }
    }
}

impl MarkerSettings {
    pub fn is_disable_value(&self, value: &str) -> bool {
        self.disable_values.iter().any(|v| v == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Substring an import path must contain to be carried into the
    /// generated file.
    #[serde(default = "default_package_filter")]
    pub package_filter: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            package_filter: default_package_filter(),
            file_prefix: default_file_prefix(),
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSettings {
    #[serde(default)]
    pub imports: Vec<ImportDeclaration>,
}

fn default_initialisms() -> Vec<String> {
    DEFAULT_INITIALISMS.iter().map(|s| s.to_string()).collect()
}

fn default_tag_key() -> String {
    "gopher".to_string()
}

fn default_disable_values() -> Vec<String> {
    vec!["gen_disable".to_string(), "-".to_string()]
}

fn default_doc_marker() -> String {
    "gopher:gen_disable".to_string()
}

fn default_package_filter() -> String {
    "gopay".to_string()
}

fn default_file_prefix() -> String {
    "gen_".to_string()
}

fn default_extension() -> String {
    "go".to_string()
}

fn default_templates() -> BTreeMap<String, TemplateSettings> {
    let mut templates = BTreeMap::new();
    templates.insert(
        "pkg.model.option".to_string(),
        TemplateSettings {
            imports: vec![ImportDeclaration::new("gorm.io/gorm")],
        },
    );
    templates
}

impl GenConfig {
    /// Load a config file; keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let content = std::fs::read_to_string(path).map_err(|e| GenError::Configuration {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml(&content).map_err(|e| GenError::Configuration {
            message: format!("failed to parse {}: {e}", path.display()),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `gcg.toml` from `folder` if present, defaults otherwise.
    pub fn discover(folder: &Path) -> Result<Self, GenError> {
        let candidate = folder.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Default imports registered for a template; empty when none is.
    pub fn default_imports(&self, template_id: &str) -> &[ImportDeclaration] {
        self.templates
            .get(template_id)
            .map(|t| t.imports.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert_eq!(config.naming.initialisms.len(), 34);
        assert_eq!(config.markers.tag_key, "gopher");
        assert!(config.markers.is_disable_value("-"));
        assert!(config.markers.is_disable_value("gen_disable"));
        assert!(!config.markers.is_disable_value("omitempty"));
        assert_eq!(config.source.package_filter, "gopay");
        assert_eq!(config.source.file_prefix, "gen_");
        assert_eq!(config.default_imports("pkg.model.option")[0].path, "gorm.io/gorm");
        assert!(config.default_imports("unknown").is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GenConfig::from_toml(
            r#"
[source]
package_filter = "acme"

[templates."custom.option"]
imports = [{ path = "gorm.io/gorm" }, { alias = "q", path = "acme/query" }]
"#,
        )
        .unwrap();
        assert_eq!(config.source.package_filter, "acme");
        assert_eq!(config.source.file_prefix, "gen_");
        assert_eq!(config.naming.initialisms, default_initialisms());
        let imports = config.default_imports("custom.option");
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[1].alias.as_deref(), Some("q"));
        // An explicit table replaces the built-in one.
        assert!(config.default_imports("pkg.model.option").is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = GenConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("initialisms"));
        assert!(toml_str.contains("package_filter"));
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenConfig::discover(dir.path()).unwrap();
        assert_eq!(config.markers.doc_marker, "gopher:gen_disable");
    }

    #[test]
    fn test_load_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[source\n").unwrap();
        assert!(matches!(GenConfig::load(&path), Err(GenError::Configuration { .. })));
    }
}
