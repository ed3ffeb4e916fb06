//! Human-readable explanation of a validation run (`explain.txt`).

use metaquery_policy::{AuditResult, ControlStatus};
use std::fmt::Write as _;

const TITLE: &str = "MetaQuery V1 Validation Report";

/// Render the explanation report.
///
/// `sql` is the generated statement for allowed runs; blocked runs have none
/// and get an error section instead.
pub fn render_explanation(audit: &AuditResult, sql: Option<&str>) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(TITLE.chars().count()));
    let _ = writeln!(out, "Decision: {}", audit.decision);
    let _ = writeln!(out, "Status: {}", audit.status);
    let _ = writeln!(out, "Source: {}", audit.source.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Fields: {} selected", audit.fields_selected.len());
    out.push('\n');

    out.push_str("Controls:\n");
    for (control, status) in &audit.controls {
        let mark = match status {
            ControlStatus::Pass => '✓',
            ControlStatus::Fail => '✗',
        };
        let _ = writeln!(out, "  {mark} {control}");
    }

    if !audit.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &audit.warnings {
            let _ = writeln!(out, "  - {}: {}", warning.code(), warning.message);
        }
    }

    if let Some(error) = &audit.error {
        out.push_str("\nError:\n");
        let _ = writeln!(out, "  {error}");
    }

    if let Some(sql) = sql {
        out.push_str("\nGenerated SQL:\n");
        out.push_str("--------------\n");
        out.push_str(sql.trim_end_matches('\n'));
        out.push('\n');
    }

    out
}
