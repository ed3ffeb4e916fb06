//! Artifact writer.
//!
//! Applies the output policy of a run on top of an [`ArtifactStore`]: the
//! audit record is always stored, the query and explanation only when the
//! selection was allowed.

use metaquery_policy::AuditResult;
use std::path::Path;
use std::sync::Arc;

use crate::error::ArtifactError;
use crate::report::render_explanation;
use crate::storage::{ArtifactStore, FileArtifactStore, MemoryArtifactStore};

/// What was written for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub audit: bool,
    pub sql: bool,
    pub explanation: bool,
}

/// Writes the artifacts of validation runs.
pub struct ArtifactWriter {
    storage: Arc<dyn ArtifactStore>,
}

impl ArtifactWriter {
    /// Create a writer storing files under `dir`.
    pub fn to_dir(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        Ok(Self {
            storage: Arc::new(FileArtifactStore::new(dir.as_ref())?),
        })
    }

    /// Create a writer with a custom storage backend.
    pub fn with_storage(storage: Arc<dyn ArtifactStore>) -> Self {
        Self { storage }
    }

    /// Create a writer keeping everything in memory.
    pub fn in_memory() -> (Self, Arc<MemoryArtifactStore>) {
        let store = Arc::new(MemoryArtifactStore::new());
        (Self::with_storage(store.clone()), store)
    }

    /// Store the artifacts of one run.
    ///
    /// `sql` is ignored for blocked runs.
    pub fn record(
        &self,
        audit: &AuditResult,
        sql: Option<&str>,
    ) -> Result<WrittenArtifacts, ArtifactError> {
        self.storage.write_audit(audit)?;

        let mut written = WrittenArtifacts {
            audit: true,
            sql: false,
            explanation: false,
        };

        match sql {
            Some(sql) if audit.is_allowed() => {
                self.storage.write_sql(sql)?;
                self.storage
                    .write_explanation(&render_explanation(audit, Some(sql)))?;
                written.sql = true;
                written.explanation = true;
            }
            _ => {}
        }

        tracing::info!(
            decision = %audit.decision,
            sql = written.sql,
            explanation = written.explanation,
            "run artifacts stored"
        );
        Ok(written)
    }
}
