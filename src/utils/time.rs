use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parses the timestamp shapes found in stored history entries: RFC 3339,
/// a naive `YYYY-MM-DD HH:MM:SS` (read as UTC) or a bare date (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Strings go through [`parse_instant`]; numbers are epoch milliseconds.
pub fn instant_from_json(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(s) => parse_instant(s),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Query parameter dates: `YYYY-MM-DD` or a full RFC 3339 instant, in which
/// case its calendar date in `offset` is used.
pub fn parse_date_param(raw: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let value = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&offset).date_naive())
}

pub fn calendar_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}
