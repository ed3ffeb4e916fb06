//! # metaquery-audit
//!
//! Run artifacts for MetaQuery.
//!
//! Every validation run leaves a compliance trail:
//!
//! | Artifact | Written | Content |
//! |----------|---------|---------|
//! | `audit.json` | always | the [`AuditResult`](metaquery_policy::AuditResult), verbatim |
//! | `query.sql` | ALLOW only | the generated SELECT |
//! | `explain.txt` | ALLOW only | human-readable report |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use metaquery_audit::ArtifactWriter;
//! # use metaquery_policy::AuditResult;
//! # fn example(audit: &AuditResult, sql: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = ArtifactWriter::to_dir("out")?;
//! writer.record(audit, Some(sql))?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod report;
pub mod storage;
pub mod writer;

pub use error::ArtifactError;
pub use report::render_explanation;
pub use storage::{
    AUDIT_FILE, ArtifactStore, EXPLAIN_FILE, FileArtifactStore, MemoryArtifactStore, QUERY_FILE,
    StoredArtifacts,
};
pub use writer::{ArtifactWriter, WrittenArtifacts};
