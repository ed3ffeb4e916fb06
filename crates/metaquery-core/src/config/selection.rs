//! `selection.yml` loading.
//!
//! Expected shape:
//!
//! ```yaml
//! selected_field_ids:
//!   - model_id
//!   - pd
//! ```
//!
//! Only shape is checked here. Duplicates, unknown ids and malformed ids are
//! left for governance validation so they show up in the audit record.

use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

use super::{ConfigError, INLINE_ORIGIN, read_document};

#[derive(Debug, Deserialize)]
struct RawSelectionDocument {
    #[serde(default)]
    selected_field_ids: Option<Vec<Value>>,
}

/// A validated `selection.yml` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDocument {
    /// Requested field ids, trimmed, in file order.
    pub selected_field_ids: Vec<String>,
}

impl SelectionDocument {
    /// Load a selection from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_document(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a selection from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, INLINE_ORIGIN)
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: Option<RawSelectionDocument> = if content.trim().is_empty() {
            None
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::yaml(origin, e))?
        };

        let Some(items) = raw.and_then(|doc| doc.selected_field_ids) else {
            return Err(ConfigError::schema(origin, "Missing 'selected_field_ids' key"));
        };

        let selected_field_ids = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item.as_str().map(str::trim) {
                Some(id) if !id.is_empty() => Ok(id.to_string()),
                _ => Err(ConfigError::schema(
                    origin,
                    format!("selected_field_ids[{i}] must be a non-empty string"),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { selected_field_ids })
    }
}
