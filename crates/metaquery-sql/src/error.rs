//! Error types for the SQL crate.

use thiserror::Error;

/// Errors that can occur while generating SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// No fields were given.
    #[error("cannot build a SELECT without fields")]
    NoFields,

    /// A field id is not in the catalog.
    #[error("unknown field {field_id}")]
    UnknownField { field_id: String },

    /// A field id is not safe to use as a column alias.
    #[error("invalid field id {field_id}")]
    InvalidFieldId { field_id: String },

    /// The source table name is not safe to use in SQL.
    #[error("invalid source name {source_name}")]
    InvalidSourceName { source_name: String },

    /// A field belongs to a different source than the one being queried.
    #[error("field {field_id} belongs to {field_source}, not {source_name}")]
    SourceMismatch {
        field_id: String,
        field_source: String,
        source_name: String,
    },
}
