//! Configuration and input documents for MetaQuery.
//!
//! Everything read from disk passes through this module and is checked
//! before any core type is built:
//!
//! - **fields.yml**: the field catalog ([`FieldsDocument`])
//! - **selection.yml**: the requested field ids ([`SelectionDocument`])
//! - **metaquery.yaml**: optional project settings ([`MetaQueryConfig`])

pub mod fields;
pub mod selection;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogError;

pub use fields::FieldsDocument;
pub use selection::SelectionDocument;

/// Name used in error messages for documents parsed from a string.
pub(crate) const INLINE_ORIGIN: &str = "<inline>";

/// Error type for configuration and input loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but its shape or values are not acceptable.
    #[error("{message} in {origin}")]
    Schema { origin: String, message: String },

    #[error("Catalog error in {origin}: {source}")]
    Catalog {
        origin: String,
        #[source]
        source: CatalogError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConfigError {
    pub(crate) fn schema(origin: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            origin: origin.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn yaml(origin: &str, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            origin: origin.to_string(),
            source,
        }
    }
}

/// Read a document, mapping a missing file to [`ConfigError::NotFound`].
pub(crate) fn read_document(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io(e),
    })
}

/// Optional project settings, usually `metaquery.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetaQueryConfig {
    /// Default path of the field catalog.
    #[serde(default)]
    pub fields_file: Option<PathBuf>,

    /// Directory that receives `audit.json`, `query.sql` and `explain.txt`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Version stamped into every audit record.
    #[serde(default = "default_metaquery_version")]
    pub metaquery_version: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for MetaQueryConfig {
    fn default() -> Self {
        Self {
            fields_file: None,
            output_dir: default_output_dir(),
            metaquery_version: default_metaquery_version(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MetaQueryConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_document(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, INLINE_ORIGIN)
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Option<Self> =
            serde_yaml::from_str(content).map_err(|e| ConfigError::yaml(origin, e))?;
        let config = config.unwrap_or_default();
        if config.metaquery_version.trim().is_empty() {
            return Err(ConfigError::schema(
                origin,
                "metaquery_version must be a non-empty string",
            ));
        }
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive (e.g. "info", "metaquery_policy=debug").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_metaquery_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MetaQueryConfig::default();
        assert_eq!(config.fields_file, None);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.metaquery_version, "0.1.0");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
fields_file: catalog/fields.yml
output_dir: out
metaquery_version: "0.2.0"
logging:
  level: debug
"#;
        let config = MetaQueryConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.fields_file, Some(PathBuf::from("catalog/fields.yml")));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.metaquery_version, "0.2.0");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MetaQueryConfig::from_yaml("").unwrap();
        assert_eq!(config, MetaQueryConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = MetaQueryConfig::from_yaml("output: out\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_blank_version_rejected() {
        let err = MetaQueryConfig::from_yaml("metaquery_version: \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Schema { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metaquery.yaml");
        let err = MetaQueryConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = MetaQueryConfig::load_or_default(None).unwrap();
        assert_eq!(config, MetaQueryConfig::default());
    }
}
