//! Field catalog.
//!
//! The catalog is built once from `fields.yml` (or directly from code) and is
//! read-only afterwards. Validation and SQL generation only see it through
//! the [`FieldLookup`] trait.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::field::Field;

/// Errors raised while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two fields share the same `field_id`.
    #[error("duplicate field_id '{0}' in catalog")]
    DuplicateFieldId(String),
}

/// Read-only access to a set of fields.
pub trait FieldLookup {
    /// Find a field by id.
    fn lookup(&self, field_id: &str) -> Option<&Field>;

    /// All known field ids, sorted ascending.
    fn all_ids(&self) -> Vec<&str>;

    /// Check whether a field id is known.
    fn contains(&self, field_id: &str) -> bool {
        self.lookup(field_id).is_some()
    }
}

/// Immutable mapping from `field_id` to [`Field`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: BTreeMap<String, Field>,
}

impl FieldCatalog {
    /// Build a catalog, rejecting duplicate field ids.
    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for field in fields {
            match map.entry(field.field_id.clone()) {
                Entry::Occupied(_) => return Err(CatalogError::DuplicateFieldId(field.field_id)),
                Entry::Vacant(slot) => {
                    slot.insert(field);
                }
            }
        }
        Ok(Self { fields: map })
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the catalog has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldLookup for FieldCatalog {
    fn lookup(&self, field_id: &str) -> Option<&Field> {
        self.fields.get(field_id)
    }

    fn all_ids(&self) -> Vec<&str> {
        // BTreeMap keys are already in ascending order
        self.fields.keys().map(String::as_str).collect()
    }
}
