//! Artifact storage backends.

use metaquery_policy::AuditResult;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::ArtifactError;

/// File name of the audit record.
pub const AUDIT_FILE: &str = "audit.json";
/// File name of the generated query.
pub const QUERY_FILE: &str = "query.sql";
/// File name of the explanation report.
pub const EXPLAIN_FILE: &str = "explain.txt";

/// Trait for artifact storage backends.
pub trait ArtifactStore: Send + Sync {
    /// Store the audit record of a run.
    fn write_audit(&self, audit: &AuditResult) -> Result<(), ArtifactError>;

    /// Store the generated SQL.
    fn write_sql(&self, sql: &str) -> Result<(), ArtifactError>;

    /// Store the explanation report.
    fn write_explanation(&self, text: &str) -> Result<(), ArtifactError>;
}

/// Writes artifacts as files in one directory.
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| ArtifactError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory receiving the artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, content: &str) -> Result<(), ArtifactError> {
        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "artifact written");
        Ok(())
    }
}

impl ArtifactStore for FileArtifactStore {
    fn write_audit(&self, audit: &AuditResult) -> Result<(), ArtifactError> {
        let mut json = audit.to_json_pretty()?;
        json.push('\n');
        self.write(AUDIT_FILE, &json)
    }

    fn write_sql(&self, sql: &str) -> Result<(), ArtifactError> {
        self.write(QUERY_FILE, sql)
    }

    fn write_explanation(&self, text: &str) -> Result<(), ArtifactError> {
        self.write(EXPLAIN_FILE, text)
    }
}

/// Artifacts kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredArtifacts {
    pub audit: Option<AuditResult>,
    pub sql: Option<String>,
    pub explanation: Option<String>,
}

/// In-memory store, for tests and for callers that only inspect results.
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<StoredArtifacts>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything stored so far.
    pub fn snapshot(&self) -> Result<StoredArtifacts, ArtifactError> {
        self.artifacts
            .read()
            .map(|a| a.clone())
            .map_err(|e| ArtifactError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn update(&self, apply: impl FnOnce(&mut StoredArtifacts)) -> Result<(), ArtifactError> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|e| ArtifactError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        apply(&mut artifacts);
        Ok(())
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn write_audit(&self, audit: &AuditResult) -> Result<(), ArtifactError> {
        self.update(|a| a.audit = Some(audit.clone()))
    }

    fn write_sql(&self, sql: &str) -> Result<(), ArtifactError> {
        self.update(|a| a.sql = Some(sql.to_string()))
    }

    fn write_explanation(&self, text: &str) -> Result<(), ArtifactError> {
        self.update(|a| a.explanation = Some(text.to_string()))
    }
}
