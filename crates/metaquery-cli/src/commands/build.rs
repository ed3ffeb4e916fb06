//! `metaquery build` command implementation.
//!
//! Loads the catalog and selection, runs governance validation, and writes
//! the run artifacts. `audit.json` is written even when the selection is
//! blocked.

use anyhow::{Context, Result};
use metaquery_audit::ArtifactWriter;
use metaquery_core::MetaQueryConfig;
use metaquery_policy::GovernanceValidator;
use metaquery_sql::build_select;
use std::path::Path;

use super::{RunStatus, load_inputs};
use crate::console;

pub fn run(
    selection: &Path,
    fields: Option<&Path>,
    output_dir: Option<&Path>,
    config: &MetaQueryConfig,
) -> Result<RunStatus> {
    let Some(inputs) = load_inputs(selection, fields, config) else {
        return Ok(RunStatus::InputError);
    };

    let outcome = GovernanceValidator::new(&inputs.catalog)
        .with_metaquery_version(config.metaquery_version.as_str())
        .validate(&inputs.selection);

    let output_dir = output_dir.unwrap_or(&config.output_dir);
    let writer = ArtifactWriter::to_dir(output_dir)
        .with_context(|| format!("preparing output directory {}", output_dir.display()))?;

    let audit = &outcome.audit;
    if !audit.is_allowed() {
        writer.record(audit, None).context("writing audit.json")?;

        let code = audit
            .error_code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "VALIDATION_ERROR".to_string());
        console::print_panel("VALIDATION", &format!("ERROR: {code}\nDecision: BLOCK"));
        if let Some(error) = &audit.error {
            println!("{}", serde_json::to_string_pretty(error)?);
        }
        return Ok(RunStatus::Blocked);
    }

    let source = audit
        .source
        .as_deref()
        .context("allowed audit record has no source")?;
    let sql = build_select(source, &outcome.accepted, &inputs.catalog)
        .context("generating SQL for allowed selection")?;

    writer.record(audit, Some(&sql)).context("writing run artifacts")?;

    console::print_panel("MetaQuery", "OK: query.sql + audit.json + explain.txt generated");
    Ok(RunStatus::Allowed)
}
