use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a dashboard date parameter.
///
/// Accepts RFC 3339 (`2024-01-08T12:00:00Z`), a naive date-time
/// (`2024-01-08T12:00:00`, read as UTC) or a bare date (`2024-01-08`,
/// read as UTC midnight).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a calendar date, accepting anything [`parse_instant`] accepts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_instant(raw).map(|dt| dt.date_naive()))
}
