//! MetaQuery governance validation.
//!
//! Decides whether a field selection may be turned into SQL and records why.
//! Validation is a pure computation over an already-loaded catalog: no I/O,
//! no shared state, and failures come back as data in the audit record.
//!
//! ```
//! use metaquery_core::{Field, FieldCatalog};
//! use metaquery_policy::{Decision, GovernanceValidator};
//!
//! let catalog = FieldCatalog::from_fields([
//!     Field::new("model_id", "MODELS", "model_id"),
//!     Field::new("pd", "MODELS", "pd"),
//! ])
//! .unwrap();
//!
//! let outcome = GovernanceValidator::new(&catalog).validate(&["model_id", "pd", "pd"]);
//! assert_eq!(outcome.audit.decision, Decision::Allow);
//! assert_eq!(outcome.accepted, vec!["model_id", "pd"]);
//! ```

pub mod audit;
pub mod clock;
pub mod error;
pub mod validator;

pub use audit::{
    AuditResult, AuditWarning, Control, ControlStatus, Decision, GOVERNANCE_VERSION,
    SCHEMA_VERSION, Status, WarningKind,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorCode, ValidationError, ValidationErrorKind};
pub use validator::{GovernanceValidator, ValidationOutcome, validate};
