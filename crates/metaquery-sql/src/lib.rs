//! # metaquery-sql
//!
//! SQL generation for selections that passed governance validation.
//!
//! Only single-source `SELECT` statements are produced. Each selected field
//! becomes one projection, aliased by its field id:
//!
//! ```sql
//! SELECT
//!   model_id,
//!   age AS customer_age
//! FROM CUSTOMERS;
//! ```
//!
//! The builder re-checks identifiers and source ownership on its own, so a
//! caller that skips validation still cannot produce a cross-source query.

pub mod builder;
pub mod error;

pub use builder::{SelectBuilder, build_select};
pub use error::SqlError;
