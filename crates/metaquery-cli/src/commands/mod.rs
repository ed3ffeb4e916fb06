//! CLI command implementations.

pub mod build;
pub mod validate;

use metaquery_core::{ConfigError, FieldCatalog, FieldsDocument, MetaQueryConfig, SelectionDocument};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::console;

/// How a command ended, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Selection allowed.
    Allowed,
    /// Selection blocked by governance.
    Blocked,
    /// Inputs or configuration could not be loaded.
    InputError,
    /// Anything else (e.g. artifacts could not be written).
    Failed,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Allowed => 0,
            RunStatus::Blocked => 1,
            RunStatus::InputError => 2,
            RunStatus::Failed => 3,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Catalog and selection loaded for one run.
pub struct Inputs {
    pub catalog: FieldCatalog,
    pub selection: Vec<String>,
}

/// Load `fields.yml` and `selection.yml`.
///
/// On failure the error is printed as a `YAML ERROR` panel and `None` is
/// returned, so callers can exit with [`RunStatus::InputError`].
pub fn load_inputs(
    selection: &Path,
    fields: Option<&Path>,
    config: &MetaQueryConfig,
) -> Option<Inputs> {
    match try_load_inputs(selection, fields, config) {
        Ok(inputs) => Some(inputs),
        Err(e) => {
            tracing::error!(error = %e, "failed to load inputs");
            console::print_panel("YAML ERROR", &e.to_string());
            None
        }
    }
}

fn try_load_inputs(
    selection: &Path,
    fields: Option<&Path>,
    config: &MetaQueryConfig,
) -> Result<Inputs, ConfigError> {
    let fields_path = resolve_fields_path(fields, config)?;
    let catalog = FieldsDocument::load_catalog(&fields_path)?;
    let selection = SelectionDocument::from_file(selection)?.selected_field_ids;
    tracing::debug!(
        fields = catalog.len(),
        selected = selection.len(),
        "inputs loaded"
    );
    Ok(Inputs { catalog, selection })
}

fn resolve_fields_path(
    fields: Option<&Path>,
    config: &MetaQueryConfig,
) -> Result<PathBuf, ConfigError> {
    fields
        .map(Path::to_path_buf)
        .or_else(|| config.fields_file.clone())
        .ok_or_else(|| {
            ConfigError::Config(
                "no fields file given: pass --fields or set fields_file in metaquery.yaml"
                    .to_string(),
            )
        })
}
