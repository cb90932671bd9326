//! Timestamp parsing for Jira responses.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::debug;

/// Timestamp layout Jira uses in responses and expects in requests.
pub const JIRA_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Parse a Jira timestamp.
///
/// Accepts Jira's `2024-01-01T10:00:00.000+0000` layout, RFC 3339 and a
/// bare `2024-01-01` date (midnight UTC). Missing, empty and unparseable
/// values give `None`.
pub fn parse_date(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc().fixed_offset())
        });

    if parsed.is_none() {
        debug!("Unrecognized timestamp: {}", value);
    }
    parsed
}

/// Current time in [`JIRA_TIMESTAMP_FORMAT`].
pub(crate) fn jira_now() -> String {
    Utc::now().format(JIRA_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jira_format() {
        let date = parse_date(Some("2024-01-01T10:00:00.000+0000")).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_jira_format_with_offset() {
        let date = parse_date(Some("2024-03-05T17:45:12.120+0530")).unwrap();
        assert_eq!(date.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn test_rfc3339() {
        let date = parse_date(Some("2024-01-01T10:00:00Z")).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_date_only() {
        let date = parse_date(Some("2024-02-29")).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-02-29T00:00:00+00:00");
    }

    #[test]
    fn test_missing_or_invalid() {
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("yesterday")), None);
    }

    #[test]
    fn test_jira_now_round_trips() {
        assert!(parse_date(Some(&jira_now())).is_some());
    }
}
