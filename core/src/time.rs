//! Time related utils.

use crate::Error;
use chrono::format::StrftimeItems;
use chrono::NaiveDateTime;
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// ISO 8601 with a literal millisecond part: "2022-03-13T07:20:04.000Z"
const ISO8601_WITH_MILLIS: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into ISO 8601 with a fixed `.000Z` suffix: "2022-03-13T07:20:04.000Z"
///
/// Sub-second precision is dropped, the millisecond field is always `000`.
pub fn format_iso8601_millis(t: DateTime) -> String {
    t.format_with_items(StrftimeItems::new(ISO8601_WITH_MILLIS))
        .to_string()
}

/// Parse time from ISO 8601 with a fixed `.000Z` suffix.
pub fn parse_iso8601_millis(s: &str) -> crate::Result<DateTime> {
    let t = NaiveDateTime::parse_from_str(s, ISO8601_WITH_MILLIS).map_err(|e| {
        Error::unexpected("failed to parse timestamp")
            .with_source(e)
            .with_context(format!("value: {s}"))
    })?;
    Ok(t.and_utc())
}
