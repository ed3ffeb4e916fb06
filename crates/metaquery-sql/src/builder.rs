//! SELECT statement generation.

use metaquery_core::FieldLookup;
use metaquery_core::ident::{is_valid_field_id, is_valid_source_name};

use crate::error::SqlError;

/// Builds single-source SELECT statements from catalog fields.
pub struct SelectBuilder<'a, L: FieldLookup + ?Sized> {
    catalog: &'a L,
}

impl<'a, L: FieldLookup + ?Sized> SelectBuilder<'a, L> {
    /// Create a builder over a catalog.
    pub fn new(catalog: &'a L) -> Self {
        Self { catalog }
    }

    /// Render `SELECT <fields> FROM <source>;`.
    ///
    /// Projections keep the order of `field_ids`. A projection is aliased by
    /// its field id unless the expression already is the field id.
    pub fn build<S: AsRef<str>>(&self, source: &str, field_ids: &[S]) -> Result<String, SqlError> {
        if field_ids.is_empty() {
            return Err(SqlError::NoFields);
        }
        if !is_valid_source_name(source) {
            return Err(SqlError::InvalidSourceName {
                source_name: source.to_string(),
            });
        }

        let projections = field_ids
            .iter()
            .map(|id| self.projection(source, id.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sql = String::from("SELECT\n");
        sql.push_str(&projections.join(",\n"));
        sql.push_str(&format!("\nFROM {source};\n"));

        tracing::debug!(source, fields = field_ids.len(), "built SELECT statement");
        Ok(sql)
    }

    fn projection(&self, source: &str, field_id: &str) -> Result<String, SqlError> {
        if !is_valid_field_id(field_id) {
            return Err(SqlError::InvalidFieldId {
                field_id: field_id.to_string(),
            });
        }
        let field = self
            .catalog
            .lookup(field_id)
            .ok_or_else(|| SqlError::UnknownField {
                field_id: field_id.to_string(),
            })?;
        if field.datatable_id != source {
            return Err(SqlError::SourceMismatch {
                field_id: field_id.to_string(),
                field_source: field.datatable_id.clone(),
                source_name: source.to_string(),
            });
        }

        if field.sql_expr == field.field_id {
            Ok(format!("  {}", field.sql_expr))
        } else {
            Ok(format!("  {} AS {}", field.sql_expr, field.field_id))
        }
    }
}

/// Render a SELECT for an allowed selection.
pub fn build_select<L, S>(source: &str, field_ids: &[S], catalog: &L) -> Result<String, SqlError>
where
    L: FieldLookup + ?Sized,
    S: AsRef<str>,
{
    SelectBuilder::new(catalog).build(source, field_ids)
}
