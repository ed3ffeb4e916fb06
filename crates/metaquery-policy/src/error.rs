//! Governance failure types.
//!
//! A failed control is reported as data inside the audit record, never as a
//! Rust error path out of the validator. The JSON shape is flat: the `code`
//! tag, the check-specific detail fields, then `message`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hint attached to multi-source failures.
pub const MULTI_SOURCE_RECOMMENDATION: &str =
    "Create a pre-validated view (V2) or define explicit joins (V3).";

/// A terminal governance failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The kind of failure, with its detail fields.
    #[serde(flatten)]
    pub kind: ValidationErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Machine-readable code of this failure.
    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    // =========================================================================
    // SELECTION ERRORS
    // =========================================================================

    /// Create an empty selection error.
    pub fn empty_selection() -> Self {
        Self::new(
            ValidationErrorKind::EmptySelection,
            "No fields selected in selection.yml. At least one field is required.",
        )
    }

    /// Create an invalid field id error.
    pub fn invalid_field_id(invalid_field_ids: Vec<String>) -> Self {
        Self::new(
            ValidationErrorKind::InvalidFieldId { invalid_field_ids },
            "field_id must be alphanumeric + underscore only.",
        )
    }

    /// Create a field not found error.
    pub fn field_not_found(unknown_field_ids: Vec<String>, available_fields: Vec<String>) -> Self {
        let message = format!(
            "field_id(s) not defined in fields.yml: {}",
            unknown_field_ids.join(", ")
        );
        Self::new(
            ValidationErrorKind::FieldNotFound {
                unknown_field_ids,
                available_fields,
            },
            message,
        )
    }

    // =========================================================================
    // SOURCE ERRORS
    // =========================================================================

    /// Create a multi-source error. `sources_found` is sorted here.
    pub fn multi_source_not_allowed(fields_by_source: IndexMap<String, Vec<String>>) -> Self {
        let mut sources_found: Vec<String> = fields_by_source.keys().cloned().collect();
        sources_found.sort();
        Self::new(
            ValidationErrorKind::MultiSourceNotAllowed {
                sources_found,
                fields_by_source,
                recommendation: MULTI_SOURCE_RECOMMENDATION.to_string(),
            },
            "Fields span multiple sources. V1 restriction: single-source queries only.",
        )
    }

    /// Create an invalid source name error.
    pub fn invalid_source_name(source: impl Into<String>) -> Self {
        Self::new(
            ValidationErrorKind::InvalidSourceName {
                source: source.into(),
            },
            "datatable_id must match pattern ^[A-Z0-9_]+$",
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Categories of governance failures, with their detail fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    /// The selection has no entries.
    EmptySelection,

    /// Some requested ids fail the field id syntax.
    InvalidFieldId {
        /// Offending ids, input order, duplicates preserved.
        invalid_field_ids: Vec<String>,
    },

    /// Some requested ids are not in the catalog.
    FieldNotFound {
        /// Unknown ids in input order.
        unknown_field_ids: Vec<String>,
        /// Every catalog id, sorted.
        available_fields: Vec<String>,
    },

    /// The deduplicated selection spans more than one source table.
    MultiSourceNotAllowed {
        /// Distinct sources, sorted.
        sources_found: Vec<String>,
        /// Source to field ids, in first-seen order.
        fields_by_source: IndexMap<String, Vec<String>>,
        recommendation: String,
    },

    /// The resolved source fails the source name syntax.
    InvalidSourceName { source: String },
}

impl ValidationErrorKind {
    /// Machine-readable code of this kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptySelection => ErrorCode::EmptySelection,
            Self::InvalidFieldId { .. } => ErrorCode::InvalidFieldId,
            Self::FieldNotFound { .. } => ErrorCode::FieldNotFound,
            Self::MultiSourceNotAllowed { .. } => ErrorCode::MultiSourceNotAllowed,
            Self::InvalidSourceName { .. } => ErrorCode::InvalidSourceName,
        }
    }
}

/// Machine-readable failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EmptySelection,
    InvalidFieldId,
    FieldNotFound,
    MultiSourceNotAllowed,
    InvalidSourceName,
}

impl ErrorCode {
    /// The wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::InvalidFieldId => "INVALID_FIELD_ID",
            Self::FieldNotFound => "FIELD_NOT_FOUND",
            Self::MultiSourceNotAllowed => "MULTI_SOURCE_NOT_ALLOWED",
            Self::InvalidSourceName => "INVALID_SOURCE_NAME",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_not_found_json_shape() {
        let err = ValidationError::field_not_found(
            vec!["unknown_field".to_string()],
            vec!["model_id".to_string(), "pd".to_string()],
        );
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "code": "FIELD_NOT_FOUND",
                "unknown_field_ids": ["unknown_field"],
                "available_fields": ["model_id", "pd"],
                "message": "field_id(s) not defined in fields.yml: unknown_field",
            })
        );
    }

    #[test]
    fn test_empty_selection_json_shape() {
        let err = ValidationError::empty_selection();
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "EMPTY_SELECTION");
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_multi_source_sorts_sources_and_keeps_grouping_order() {
        let mut by_source = IndexMap::new();
        by_source.insert("MODELS".to_string(), vec!["model_id".to_string()]);
        by_source.insert("CUSTOMERS".to_string(), vec!["customer_age".to_string()]);

        let err = ValidationError::multi_source_not_allowed(by_source);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["sources_found"], json!(["CUSTOMERS", "MODELS"]));

        let keys: Vec<&String> = value["fields_by_source"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(value["recommendation"], MULTI_SOURCE_RECOMMENDATION);
    }

    #[test]
    fn test_round_trip_through_json() {
        let err = ValidationError::invalid_source_name("models");
        let json = serde_json::to_string(&err).unwrap();
        let back: ValidationError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
        assert_eq!(back.code(), ErrorCode::InvalidSourceName);
    }

    #[test]
    fn test_display_includes_code() {
        let err = ValidationError::invalid_field_id(vec!["bad-id".to_string()]);
        assert_eq!(
            err.to_string(),
            "INVALID_FIELD_ID: field_id must be alphanumeric + underscore only."
        );
    }
}
