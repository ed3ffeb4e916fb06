//! Field definitions.

use serde::{Deserialize, Serialize};

/// A queryable column: one SQL expression owned by one source table.
///
/// Fields are never mutated after construction; the catalog only hands out
/// shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Identifier used in selections (`^[A-Za-z0-9_]+$`).
    pub field_id: String,

    /// Owning source table (`^[A-Z0-9_]+$` once validated).
    pub datatable_id: String,

    /// Raw SQL expression or column reference.
    pub sql_expr: String,

    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Field {
    /// Create a field without a label.
    pub fn new(
        field_id: impl Into<String>,
        datatable_id: impl Into<String>,
        sql_expr: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            datatable_id: datatable_id.into(),
            sql_expr: sql_expr.into(),
            label: None,
        }
    }

    /// Attach a human-readable label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
