use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Parses a backend timestamp. `None` marks an absent or invalid date.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00.000000Z`), the SQL style
/// `2024-05-01 10:00:00` and bare dates, the latter two read as UTC.
pub fn parse(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = value?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sort key for a parsed timestamp; invalid dates sort as the epoch.
pub fn sort_key(ts: Option<&DateTime<Utc>>) -> i64 {
    ts.map(DateTime::timestamp_millis).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn parses_backend_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        assert_eq!(parse(Some(&json!("2024-05-01T10:00:00.000000Z"))), Some(expected));
        assert_eq!(parse(Some(&json!("2024-05-01T17:00:00+07:00"))), Some(expected));
        assert_eq!(parse(Some(&json!("2024-05-01 10:00:00"))), Some(expected));
        assert_eq!(
            parse(Some(&json!("2024-05-01"))),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn invalid_dates_are_none_and_sort_first() {
        assert_eq!(parse(Some(&json!("kemarin"))), None);
        assert_eq!(parse(Some(&json!(1714557600))), None);
        assert_eq!(parse(None), None);
        assert_eq!(sort_key(None), 0);
    }
}
