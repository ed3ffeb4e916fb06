//! MetaQuery core types.
//!
//! Shared by every MetaQuery crate:
//! - [`Field`]: one queryable column of a source table
//! - [`FieldCatalog`]: the immutable set of known fields, keyed by `field_id`
//! - [`ident`]: identifier syntax rules for field ids and source names
//! - [`config`]: YAML loading for `fields.yml`, `selection.yml` and `metaquery.yaml`

pub mod catalog;
pub mod config;
pub mod field;
pub mod ident;

pub use catalog::{CatalogError, FieldCatalog, FieldLookup};
pub use config::{
    ConfigError, FieldsDocument, LoggingConfig, MetaQueryConfig, SelectionDocument,
};
pub use field::Field;
