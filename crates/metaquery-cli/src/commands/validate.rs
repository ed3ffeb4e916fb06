//! `metaquery validate` command implementation.
//!
//! Dry run of `build`: validates and prints, never writes files.

use anyhow::Result;
use metaquery_audit::render_explanation;
use metaquery_core::MetaQueryConfig;
use metaquery_policy::{AuditResult, GovernanceValidator};
use std::path::Path;

use super::{RunStatus, load_inputs};

pub fn run(
    selection: &Path,
    fields: Option<&Path>,
    explain: bool,
    config: &MetaQueryConfig,
) -> Result<RunStatus> {
    let Some(inputs) = load_inputs(selection, fields, config) else {
        return Ok(RunStatus::InputError);
    };

    let outcome = GovernanceValidator::new(&inputs.catalog)
        .with_metaquery_version(config.metaquery_version.as_str())
        .validate(&inputs.selection);

    print!("{}", render(&outcome.audit, explain)?);

    Ok(if outcome.is_allowed() {
        RunStatus::Allowed
    } else {
        RunStatus::Blocked
    })
}

fn render(audit: &AuditResult, explain: bool) -> Result<String> {
    if explain {
        Ok(render_explanation(audit, None))
    } else {
        let mut json = audit.to_json_pretty()?;
        json.push('\n');
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::write_inputs;

    #[test]
    fn test_validate_writes_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let (fields, selection) = write_inputs(dir.path(), &["pd", "run_date"]);

        let status = run(&selection, Some(&fields), false, &MetaQueryConfig::default()).unwrap();
        assert_eq!(status, RunStatus::Allowed);

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_validate_blocked_status() {
        let dir = tempfile::tempdir().unwrap();
        let (fields, selection) = write_inputs(dir.path(), &["bad-id"]);

        let status = run(&selection, Some(&fields), true, &MetaQueryConfig::default()).unwrap();
        assert_eq!(status, RunStatus::Blocked);
    }

    #[test]
    fn test_render_modes() {
        let dir = tempfile::tempdir().unwrap();
        let (fields, selection) = write_inputs(dir.path(), &["unknown_field"]);
        let inputs = load_inputs(&selection, Some(&fields), &MetaQueryConfig::default()).unwrap();
        let audit = GovernanceValidator::new(&inputs.catalog)
            .validate(&inputs.selection)
            .audit;

        let json = render(&audit, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"]["code"], "FIELD_NOT_FOUND");

        let report = render(&audit, true).unwrap();
        assert!(report.contains("  ✗ all_fields_exist"));
    }
}
