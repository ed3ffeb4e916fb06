//! Governance validator running the ordered V1 controls.
//!
//! Controls run in this order and the first failure stops the run:
//!
//! 1. **non_empty_selection** - at least one field requested
//! 2. **all_fields_exist** - every id is well-formed, then every id is in the catalog
//! 3. **no_duplicates** - repeated ids collapse to their first occurrence (never fails)
//! 4. **single_source** - all fields belong to one source table
//! 5. **valid_source_name** - the source name is safe to put in SQL
//!
//! The id syntax rule records its result under `all_fields_exist`, the same
//! key as the membership rule, so that audit records keep the V1 layout.

use indexmap::IndexMap;
use metaquery_core::FieldLookup;
use metaquery_core::ident::{is_valid_field_id, is_valid_source_name};

use crate::audit::{AuditResult, AuditWarning, Control};
use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;

/// Result of one validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Deduplicated ids once deduplication has run, otherwise the raw selection.
    pub accepted: Vec<String>,
    /// The audit record for this call.
    pub audit: AuditResult,
}

impl ValidationOutcome {
    /// Whether the selection was allowed.
    pub fn is_allowed(&self) -> bool {
        self.audit.is_allowed()
    }

    /// Split into `(accepted_ids, audit)`.
    pub fn into_parts(self) -> (Vec<String>, AuditResult) {
        (self.accepted, self.audit)
    }
}

/// Validates field selections against a catalog.
///
/// Holds only read-only borrows and configuration, so one validator can be
/// reused for any number of selections.
pub struct GovernanceValidator<'a, L: FieldLookup + ?Sized, C: Clock = SystemClock> {
    /// The catalog to resolve ids against.
    catalog: &'a L,
    /// Source of audit timestamps.
    clock: C,
    /// Version stamped into audit records.
    metaquery_version: String,
}

impl<'a, L: FieldLookup + ?Sized> GovernanceValidator<'a, L> {
    /// Create a validator using the wall clock.
    pub fn new(catalog: &'a L) -> Self {
        Self {
            catalog,
            clock: SystemClock,
            metaquery_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl<'a, L: FieldLookup + ?Sized, C: Clock> GovernanceValidator<'a, L, C> {
    /// Replace the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> GovernanceValidator<'a, L, C2> {
        GovernanceValidator {
            catalog: self.catalog,
            clock,
            metaquery_version: self.metaquery_version,
        }
    }

    /// Set the version stamped into audit records.
    pub fn with_metaquery_version(mut self, version: impl Into<String>) -> Self {
        self.metaquery_version = version.into();
        self
    }

    /// Validate a selection.
    ///
    /// Never fails: a blocked selection is reported through the audit
    /// record so it can always be persisted.
    pub fn validate<S: AsRef<str>>(&self, selection: &[S]) -> ValidationOutcome {
        let selection: Vec<String> = selection.iter().map(|s| s.as_ref().to_string()).collect();
        let mut audit = AuditResult::begin(
            self.metaquery_version.as_str(),
            self.clock.now(),
            selection.clone(),
        );

        // 1. Non-empty selection
        if selection.is_empty() {
            return block(
                audit,
                Control::NonEmptySelection,
                ValidationError::empty_selection(),
                selection,
            );
        }
        pass(&mut audit, Control::NonEmptySelection);

        // 2. Field id syntax
        let invalid: Vec<String> = selection
            .iter()
            .filter(|id| !is_valid_field_id(id))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return block(
                audit,
                Control::AllFieldsExist,
                ValidationError::invalid_field_id(invalid),
                selection,
            );
        }

        // 3. Field existence
        let unknown: Vec<String> = selection
            .iter()
            .filter(|id| !self.catalog.contains(id))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            let available = self.catalog.all_ids().into_iter().map(str::to_string).collect();
            return block(
                audit,
                Control::AllFieldsExist,
                ValidationError::field_not_found(unknown, available),
                selection,
            );
        }
        pass(&mut audit, Control::AllFieldsExist);

        // 4. Deduplication
        let (deduped, warnings) = deduplicate(&selection);
        for warning in &warnings {
            tracing::warn!(warning = %warning.message, "duplicate field ids collapsed");
        }
        audit.warnings.extend(warnings);
        pass(&mut audit, Control::NoDuplicates);

        // 5. Single source
        let fields_by_source = self.group_by_source(&deduped);
        if fields_by_source.len() != 1 {
            return block(
                audit,
                Control::SingleSource,
                ValidationError::multi_source_not_allowed(fields_by_source),
                deduped,
            );
        }
        pass(&mut audit, Control::SingleSource);

        // 6. Source name format
        let source = fields_by_source.into_keys().next().unwrap_or_default();
        if !is_valid_source_name(&source) {
            return block(
                audit,
                Control::ValidSourceName,
                ValidationError::invalid_source_name(source),
                deduped,
            );
        }
        pass(&mut audit, Control::ValidSourceName);

        tracing::info!(
            source = %source,
            fields = deduped.len(),
            warnings = audit.warnings.len(),
            "selection allowed"
        );
        audit.allow(source, deduped.clone());

        ValidationOutcome {
            accepted: deduped,
            audit,
        }
    }

    /// Group ids by their source table, keeping first-seen order.
    ///
    /// Every id must already be known to the catalog.
    fn group_by_source(&self, field_ids: &[String]) -> IndexMap<String, Vec<String>> {
        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for id in field_ids {
            if let Some(field) = self.catalog.lookup(id) {
                groups
                    .entry(field.datatable_id.clone())
                    .or_default()
                    .push(id.clone());
            }
        }
        groups
    }
}

/// Validate a selection with an injected clock.
///
/// Shorthand for building a [`GovernanceValidator`] for a single call.
pub fn validate<L, S>(catalog: &L, selection: &[S], clock: &dyn Clock) -> ValidationOutcome
where
    L: FieldLookup + ?Sized,
    S: AsRef<str>,
{
    GovernanceValidator::new(catalog)
        .with_clock(clock)
        .validate(selection)
}

/// Collapse duplicates to their first occurrence.
///
/// Returns the deduplicated ids and one warning per repeated id, in the
/// order the ids first repeated. Counts are total occurrences.
fn deduplicate(selection: &[String]) -> (Vec<String>, Vec<AuditWarning>) {
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    let mut repeated: IndexMap<&str, usize> = IndexMap::new();

    for id in selection {
        let count = seen.entry(id.as_str()).or_insert(0);
        *count += 1;
        if *count > 1 {
            repeated.insert(id.as_str(), *count);
        }
    }

    let deduped = seen.keys().map(|id| id.to_string()).collect();
    let warnings = repeated
        .into_iter()
        .map(|(id, count)| AuditWarning::duplicate_fields(id, count))
        .collect();
    (deduped, warnings)
}

fn pass(audit: &mut AuditResult, control: Control) {
    tracing::debug!(control = %control, "control passed");
    audit.pass(control);
}

fn block(
    mut audit: AuditResult,
    control: Control,
    error: ValidationError,
    accepted: Vec<String>,
) -> ValidationOutcome {
    tracing::info!(
        control = %control,
        code = %error.code(),
        "selection blocked"
    );
    audit.fail(control, error);
    ValidationOutcome { accepted, audit }
}
