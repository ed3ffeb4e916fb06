//! Identifier syntax rules.
//!
//! Field ids and source names end up inside generated SQL, so both are
//! restricted to a conservative character set.

use regex::Regex;
use std::sync::LazyLock;

/// Pattern for `field_id` values.
pub const FIELD_ID_PATTERN: &str = r"^[A-Za-z0-9_]+$";

/// Pattern for `datatable_id` (source) values.
pub const SOURCE_NAME_PATTERN: &str = r"^[A-Z0-9_]+$";

static FIELD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FIELD_ID_PATTERN).expect("field id pattern is valid"));

static SOURCE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SOURCE_NAME_PATTERN).expect("source name pattern is valid"));

/// Check whether `id` is a syntactically valid field id.
pub fn is_valid_field_id(id: &str) -> bool {
    FIELD_ID_RE.is_match(id)
}

/// Check whether `name` is a syntactically valid source table name.
pub fn is_valid_source_name(name: &str) -> bool {
    SOURCE_NAME_RE.is_match(name)
}
