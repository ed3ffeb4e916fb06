//! Audit record produced by one validation run.
//!
//! The serialized shape of [`AuditResult`] is a compatibility surface: it is
//! persisted verbatim as `audit.json` for every run, allowed or blocked.
//! `schemas/AuditResult.schema.json` describes it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorCode, ValidationError};

/// Version of the audit record layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Governance rule set version.
pub const GOVERNANCE_VERSION: &str = "V1";

/// Final decision of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allow,
    Block,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "ALLOW"),
            Decision::Block => write!(f, "BLOCK"),
        }
    }
}

/// Run status. Always consistent with [`Decision`]: ALLOW is OK, BLOCK is ERROR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

/// Named governance controls, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    NonEmptySelection,
    /// Shared by the field id syntax rule and the catalog membership rule.
    AllFieldsExist,
    NoDuplicates,
    SingleSource,
    ValidSourceName,
}

impl Control {
    /// Key used in the `controls` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Control::NonEmptySelection => "non_empty_selection",
            Control::AllFieldsExist => "all_fields_exist",
            Control::NoDuplicates => "no_duplicates",
            Control::SingleSource => "single_source",
            Control::ValidSourceName => "valid_source_name",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlStatus {
    Pass,
    Fail,
}

/// A non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    #[serde(flatten)]
    pub kind: WarningKind,
    pub message: String,
}

impl AuditWarning {
    /// A field id was requested more than once. `count` is the total number
    /// of occurrences.
    pub fn duplicate_fields(field_id: impl Into<String>, count: usize) -> Self {
        let field_id = field_id.into();
        let message = format!(
            "field_id '{field_id}' appears {count} times. Auto-deduplicated to single occurrence."
        );
        Self {
            kind: WarningKind::DuplicateFields { field_id, count },
            message,
        }
    }

    /// Machine-readable code of this warning.
    pub fn code(&self) -> &'static str {
        match self.kind {
            WarningKind::DuplicateFields { .. } => "DUPLICATE_FIELDS",
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    DuplicateFields { field_id: String, count: usize },
}

/// The outcome of one validation call.
///
/// Created fresh per call, filled in while the controls run, then handed to
/// the caller. Only `metaquery-policy` can build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub metaquery_version: String,
    pub schema_version: u32,
    /// UTC, second precision (`YYYY-MM-DDTHH:MM:SSZ`).
    #[serde(with = "utc_seconds")]
    pub timestamp: DateTime<Utc>,
    pub decision: Decision,
    pub status: Status,
    pub version: String,
    /// Resolved source table, set only on ALLOW.
    pub source: Option<String>,
    /// Raw selection, or the deduplicated list on ALLOW.
    pub fields_selected: Vec<String>,
    /// One entry per executed control, in execution order.
    pub controls: IndexMap<Control, ControlStatus>,
    pub warnings: Vec<AuditWarning>,
    /// Present iff the decision is BLOCK.
    pub error: Option<ValidationError>,
}

impl AuditResult {
    /// Start a blocked-by-default record for a raw selection.
    pub(crate) fn begin(
        metaquery_version: impl Into<String>,
        timestamp: DateTime<Utc>,
        selection: Vec<String>,
    ) -> Self {
        Self {
            metaquery_version: metaquery_version.into(),
            schema_version: SCHEMA_VERSION,
            // Truncate so the in-memory value equals what gets persisted
            timestamp: truncate_to_seconds(timestamp),
            decision: Decision::Block,
            status: Status::Error,
            version: GOVERNANCE_VERSION.to_string(),
            source: None,
            fields_selected: selection,
            controls: IndexMap::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn pass(&mut self, control: Control) {
        self.controls.insert(control, ControlStatus::Pass);
    }

    pub(crate) fn fail(&mut self, control: Control, error: ValidationError) {
        self.controls.insert(control, ControlStatus::Fail);
        self.error = Some(error);
        self.decision = Decision::Block;
        self.status = Status::Error;
    }

    pub(crate) fn allow(&mut self, source: String, accepted: Vec<String>) {
        self.source = Some(source);
        self.fields_selected = accepted;
        self.decision = Decision::Allow;
        self.status = Status::Ok;
        self.error = None;
    }

    /// Whether the selection was allowed.
    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }

    /// Code of the blocking error, if any.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(ValidationError::code)
    }

    /// Status recorded for a control, if it ran.
    pub fn control(&self, control: Control) -> Option<ControlStatus> {
        self.controls.get(&control).copied()
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.timestamp(), 0).unwrap_or(ts)
}

/// `YYYY-MM-DDTHH:MM:SSZ` (de)serialization.
mod utc_seconds {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
    }

    #[test]
    fn test_begin_defaults_to_block() {
        let audit = AuditResult::begin("0.1.0", fixed_time(), vec!["pd".to_string()]);
        assert_eq!(audit.decision, Decision::Block);
        assert_eq!(audit.status, Status::Error);
        assert_eq!(audit.version, "V1");
        assert_eq!(audit.schema_version, 1);
        assert!(audit.controls.is_empty());
        assert_eq!(audit.error_code(), None);
    }

    #[test]
    fn test_timestamp_second_precision() {
        let with_nanos = fixed_time() + chrono::Duration::milliseconds(750);
        let audit = AuditResult::begin("0.1.0", with_nanos, vec![]);
        let value = serde_json::to_value(&audit).unwrap();
        assert_eq!(value["timestamp"], "2024-03-01T12:30:45Z");
        assert_eq!(audit.timestamp, fixed_time());
    }

    #[test]
    fn test_controls_keep_insertion_order() {
        let mut audit = AuditResult::begin("0.1.0", fixed_time(), vec!["pd".to_string()]);
        audit.pass(Control::NonEmptySelection);
        audit.pass(Control::AllFieldsExist);
        audit.pass(Control::NoDuplicates);
        audit.pass(Control::SingleSource);
        audit.allow("MODELS".to_string(), vec!["pd".to_string()]);

        let json = serde_json::to_string(&audit).unwrap();
        let positions: Vec<usize> = [
            "non_empty_selection",
            "all_fields_exist",
            "no_duplicates",
            "single_source",
        ]
        .iter()
        .map(|k| json.find(k).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_allowed_record_json_shape() {
        let mut audit = AuditResult::begin("0.1.0", fixed_time(), vec!["pd".to_string()]);
        audit.pass(Control::NonEmptySelection);
        audit.allow("MODELS".to_string(), vec!["pd".to_string()]);

        assert_eq!(
            serde_json::to_value(&audit).unwrap(),
            json!({
                "metaquery_version": "0.1.0",
                "schema_version": 1,
                "timestamp": "2024-03-01T12:30:45Z",
                "decision": "ALLOW",
                "status": "OK",
                "version": "V1",
                "source": "MODELS",
                "fields_selected": ["pd"],
                "controls": {"non_empty_selection": "PASS"},
                "warnings": [],
                "error": null,
            })
        );
    }

    #[test]
    fn test_blocked_record_round_trip() {
        let mut audit = AuditResult::begin("0.1.0", fixed_time(), vec![]);
        audit.fail(Control::NonEmptySelection, ValidationError::empty_selection());

        let json = audit.to_json_pretty().unwrap();
        let back: AuditResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, audit);
        assert_eq!(back.control(Control::NonEmptySelection), Some(ControlStatus::Fail));
        assert_eq!(back.error_code(), Some(ErrorCode::EmptySelection));
        assert!(back.source.is_none());
    }

    #[test]
    fn test_duplicate_warning_shape() {
        let warning = AuditWarning::duplicate_fields("model_id", 3);
        assert_eq!(warning.code(), "DUPLICATE_FIELDS");
        assert_eq!(
            serde_json::to_value(&warning).unwrap(),
            json!({
                "code": "DUPLICATE_FIELDS",
                "field_id": "model_id",
                "count": 3,
                "message":
                    "field_id 'model_id' appears 3 times. Auto-deduplicated to single occurrence.",
            })
        );
    }

    #[test]
    fn test_record_validates_against_schema() {
        let selection = vec!["pd".to_string(), "pd".to_string()];
        let mut audit = AuditResult::begin("0.1.0", fixed_time(), selection);
        audit.pass(Control::NonEmptySelection);
        audit.pass(Control::AllFieldsExist);
        audit.pass(Control::NoDuplicates);
        audit.warnings.push(AuditWarning::duplicate_fields("pd", 2));
        let mut blocked = audit.clone();

        audit.pass(Control::SingleSource);
        audit.pass(Control::ValidSourceName);
        audit.allow("MODELS".to_string(), vec!["pd".to_string()]);

        let mut by_source = IndexMap::new();
        by_source.insert("MODELS".to_string(), vec!["pd".to_string()]);
        by_source.insert("CUSTOMERS".to_string(), vec!["customer_age".to_string()]);
        blocked.fail(
            Control::SingleSource,
            ValidationError::multi_source_not_allowed(by_source),
        );

        let schema: serde_json::Value =
            serde_json::from_str(include_str!("../../../schemas/AuditResult.schema.json"))
                .expect("schema must parse");
        let validator = jsonschema::draft202012::options()
            .build(&schema)
            .expect("schema must compile");

        for record in [&audit, &blocked] {
            let instance = serde_json::to_value(record).expect("audit must serialize");
            if !validator.is_valid(&instance) {
                let mut msgs = Vec::new();
                for (idx, err) in validator.iter_errors(&instance).take(20).enumerate() {
                    msgs.push(format!("{}: {}", idx + 1, err));
                }
                panic!("audit record did not validate: {}", msgs.join("; "));
            }
        }
    }
}
