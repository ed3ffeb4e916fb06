//! `fields.yml` loading.
//!
//! Expected shape:
//!
//! ```yaml
//! fields:
//!   - field_id: model_id
//!     datatable_id: MODELS
//!     sql_expr: model_id
//!     label: Model ID      # optional
//! ```

use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

use super::{ConfigError, INLINE_ORIGIN, read_document};
use crate::catalog::FieldCatalog;
use crate::field::Field;

/// Raw document as written on disk, before value checks.
#[derive(Debug, Deserialize)]
struct RawFieldsDocument {
    #[serde(default)]
    fields: Option<Vec<RawField>>,
}

/// Values stay untyped so numbers and booleans are rejected, not coerced.
#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(default)]
    field_id: Option<Value>,
    #[serde(default)]
    datatable_id: Option<Value>,
    #[serde(default)]
    sql_expr: Option<Value>,
    #[serde(default)]
    label: Option<Value>,
}

/// A validated `fields.yml` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldsDocument {
    /// Fields in file order, values trimmed.
    pub fields: Vec<Field>,
}

impl FieldsDocument {
    /// Load a field catalog document from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_document(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a field catalog document from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, INLINE_ORIGIN)
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: Option<RawFieldsDocument> = if content.trim().is_empty() {
            None
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::yaml(origin, e))?
        };

        let Some(raw_fields) = raw.and_then(|doc| doc.fields) else {
            return Err(ConfigError::schema(origin, "Missing 'fields' key"));
        };

        let fields = raw_fields
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let field_id = required(raw.field_id, origin, i, "field_id")?;
                let datatable_id = required(raw.datatable_id, origin, i, "datatable_id")?;
                let sql_expr = required(raw.sql_expr, origin, i, "sql_expr")?;
                let field = Field::new(field_id, datatable_id, sql_expr);
                match raw.label {
                    None => Ok(field),
                    Some(Value::String(label)) => Ok(field.with_label(label.trim())),
                    Some(_) => Err(ConfigError::schema(
                        origin,
                        format!("fields[{i}].label must be a string if provided"),
                    )),
                }
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { fields })
    }

    /// Load a file and build the catalog in one step.
    pub fn load_catalog(path: impl AsRef<Path>) -> Result<FieldCatalog, ConfigError> {
        let path = path.as_ref();
        Self::from_file(path)?.into_catalog(&path.display().to_string())
    }

    /// Build the catalog, rejecting duplicate field ids.
    pub fn into_catalog(self, origin: &str) -> Result<FieldCatalog, ConfigError> {
        FieldCatalog::from_fields(self.fields).map_err(|source| ConfigError::Catalog {
            origin: origin.to_string(),
            source,
        })
    }
}

fn required(
    value: Option<Value>,
    origin: &str,
    index: usize,
    key: &str,
) -> Result<String, ConfigError> {
    match value.as_ref().and_then(Value::as_str).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::schema(
            origin,
            format!("fields[{index}].{key} must be a non-empty string"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, FieldLookup};

    #[test]
    fn test_parse_fields() {
        let yaml = r#"
fields:
  - field_id: model_id
    datatable_id: MODELS
    sql_expr: model_id
    label: Model ID
  - field_id: "  customer_age "
    datatable_id: CUSTOMERS
    sql_expr: age
"#;
        let doc = FieldsDocument::from_yaml(yaml).unwrap();
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.fields[0].label.as_deref(), Some("Model ID"));
        assert_eq!(doc.fields[1].field_id, "customer_age");
        assert_eq!(doc.fields[1].label, None);

        let catalog = doc.into_catalog("fields.yml").unwrap();
        assert_eq!(catalog.lookup("customer_age").unwrap().datatable_id, "CUSTOMERS");
    }

    #[test]
    fn test_missing_fields_key() {
        let err = FieldsDocument::from_yaml("other: 1\n").unwrap_err();
        assert_eq!(err.to_string(), "Missing 'fields' key in <inline>");
    }

    #[test]
    fn test_empty_document() {
        let err = FieldsDocument::from_yaml("   \n").unwrap_err();
        assert!(matches!(err, ConfigError::Schema { .. }));
    }

    #[test]
    fn test_fields_not_a_list() {
        let err = FieldsDocument::from_yaml("fields: nope\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_top_level_not_a_mapping() {
        let err = FieldsDocument::from_yaml("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_blank_sql_expr_reports_index() {
        let yaml = r#"
fields:
  - field_id: pd
    datatable_id: MODELS
    sql_expr: pd
  - field_id: run_date
    datatable_id: MODELS
    sql_expr: "   "
"#;
        let err = FieldsDocument::from_yaml(yaml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fields[1].sql_expr must be a non-empty string in <inline>"
        );
    }

    #[test]
    fn test_numeric_field_id_rejected() {
        let yaml = "fields:\n  - field_id: 42\n    datatable_id: MODELS\n    sql_expr: pd\n";
        let err = FieldsDocument::from_yaml(yaml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fields[0].field_id must be a non-empty string in <inline>"
        );
    }

    #[test]
    fn test_boolean_sql_expr_rejected() {
        let yaml = "fields:\n  - field_id: pd\n    datatable_id: MODELS\n    sql_expr: true\n";
        let err = FieldsDocument::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Schema { .. }));
    }

    #[test]
    fn test_non_string_label_rejected() {
        let yaml = r#"
fields:
  - field_id: pd
    datatable_id: MODELS
    sql_expr: pd
    label: 7
"#;
        let err = FieldsDocument::from_yaml(yaml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fields[0].label must be a string if provided in <inline>"
        );
    }

    #[test]
    fn test_null_label_is_absent() {
        let yaml = r#"
fields:
  - field_id: pd
    datatable_id: MODELS
    sql_expr: pd
    label: ~
"#;
        let doc = FieldsDocument::from_yaml(yaml).unwrap();
        assert_eq!(doc.fields[0].label, None);
    }

    #[test]
    fn test_missing_datatable_id() {
        let yaml = "fields:\n  - field_id: pd\n    sql_expr: pd\n";
        let err = FieldsDocument::from_yaml(yaml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fields[0].datatable_id must be a non-empty string in <inline>"
        );
    }

    #[test]
    fn test_duplicate_field_ids_rejected() {
        let yaml = r#"
fields:
  - field_id: pd
    datatable_id: MODELS
    sql_expr: pd
  - field_id: pd
    datatable_id: MODELS
    sql_expr: pd_12m
"#;
        let err = FieldsDocument::from_yaml(yaml)
            .unwrap()
            .into_catalog("fields.yml")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Catalog {
                source: CatalogError::DuplicateFieldId(ref id),
                ..
            } if id == "pd"
        ));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.yml");
        std::fs::write(
            &path,
            "fields:\n  - field_id: pd\n    datatable_id: MODELS\n    sql_expr: pd\n",
        )
        .unwrap();

        let catalog = FieldsDocument::load_catalog(&path).unwrap();
        assert_eq!(catalog.all_ids(), vec!["pd"]);
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        let err = FieldsDocument::from_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("File not found:"));
    }
}
