//! UTC timestamp formatting shared by event producers.

use chrono::{DateTime, Utc};

/// Current UTC time as ISO-8601 with microsecond precision and a `Z` suffix,
/// e.g. `2024-05-01T12:30:45.123456Z`.
pub fn utc_timestamp() -> String {
    format_utc(Utc::now())
}

/// Format an instant the same way [`utc_timestamp`] does.
pub fn format_utc(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
