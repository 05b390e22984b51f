//! Relative timestamp formatting for operator-facing summaries.

use chrono::{DateTime, Utc};

/// Formats an RFC 3339 timestamp as an age relative to `now`.
///
/// Returns an empty string when the timestamp is absent or unparseable.
/// Timestamps in the future read as "just now".
pub fn format_relative(ts: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = ts.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let Ok(parsed) = DateTime::parse_from_rfc3339(raw) else {
        return String::new();
    };

    let minutes = now.signed_duration_since(parsed).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}
