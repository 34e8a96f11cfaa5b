//! Value formatting for report cells.
//!
//! Turns JSON leaves into display strings: Title Case labels, timestamps in
//! the theme's fixed zone, nested structures as indented JSON.

use super::style::DisplayZone;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use serde_json::Value;

/// Field names containing any of these (case-insensitive) hold timestamps.
const TEMPORAL_MARKERS: [&str; 3] = ["time", "date", "timestamp"];

/// Convert `snake_case` keys into Title Case headers.
///
/// Every run of letters starts uppercase and continues lowercase, so
/// `e2e_tests` becomes `E2E Tests`.
pub fn display_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_is_letter = false;

    for ch in key.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out
}

pub fn is_temporal_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    TEMPORAL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Parse an ISO-8601 timestamp and render it as `Jan 15, 2024 at 05:30 AM EST`.
///
/// Accepts RFC 3339 (`Z` or numeric offset), naive date-times (taken as UTC)
/// and bare dates. Anything else is returned unchanged.
pub fn format_timestamp(raw: &str, zone: &DisplayZone) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match parse_iso8601(trimmed) {
        Some(utc) => {
            let local = utc.with_timezone(&zone.offset());
            format!("{} {}", local.format("%b %d, %Y at %I:%M %p"), zone.label)
        }
        None => {
            warn!("Failed to format timestamp '{}': not ISO-8601", raw);
            raw.to_string()
        }
    }
}

fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
}

/// Footer line stamped on every report.
pub fn generated_on(now: DateTime<Utc>, zone: &DisplayZone) -> String {
    let local = now.with_timezone(&zone.offset());
    format!("Generated on {} {}", local.format("%B %d, %Y at %I:%M %p"), zone.label)
}

/// Render one leaf value under the field name `key`.
pub fn format_value(key: &str, value: &Value, zone: &DisplayZone) -> String {
    match value {
        Value::String(s) if is_temporal_key(key) => format_timestamp(s, zone),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

/// Flatten a `found_lines` value (`pattern -> line | [lines]`) into
/// `"pattern: line"` rows.
///
/// The value may arrive as an object or as a JSON string encoding one. When
/// it is neither, the raw value becomes a single row.
pub fn flatten_found_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => flatten_pattern_map(map),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => flatten_pattern_map(&map),
            Ok(_) => vec![raw.clone()],
            Err(e) => {
                warn!("found_lines is not valid JSON, showing raw value: {}", e);
                vec![raw.clone()]
            }
        },
        other => vec![plain_text(other)],
    }
}

fn flatten_pattern_map(map: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut rows = Vec::new();
    for (pattern, lines) in map {
        match lines {
            Value::Array(items) => {
                for line in items {
                    rows.push(format!("{}: {}", pattern, plain_text(line).trim()));
                }
            }
            other => rows.push(format!("{}: {}", pattern, plain_text(other).trim())),
        }
    }
    rows
}

/// A value as text without JSON string quoting.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("execution_details"), "Execution Details");
        assert_eq!(display_label("sha"), "Sha");
        assert_eq!(display_label("e2e_tests"), "E2E Tests");
        assert_eq!(display_label("ALREADY_UPPER"), "Already Upper");
    }

    #[test]
    fn test_is_temporal_key() {
        assert!(is_temporal_key("start_time"));
        assert!(is_temporal_key("Deploy_Date"));
        assert!(is_temporal_key("timestamp"));
        assert!(!is_temporal_key("duration"));
    }

    #[test]
    fn test_format_timestamp_zulu() {
        let zone = DisplayZone::default();
        assert_eq!(format_timestamp("2024-01-15T10:30:00Z", &zone), "Jan 15, 2024 at 05:30 AM EST");
    }

    #[test]
    fn test_format_timestamp_with_offset() {
        let zone = DisplayZone { utc_offset_minutes: 0, label: "UTC".to_string() };
        assert_eq!(format_timestamp("2024-01-15T10:30:00+02:00", &zone), "Jan 15, 2024 at 08:30 AM UTC");
    }

    #[test]
    fn test_format_timestamp_naive_and_date_only() {
        let zone = DisplayZone { utc_offset_minutes: 0, label: "UTC".to_string() };
        assert_eq!(format_timestamp("2024-03-01T14:05:00", &zone), "Mar 01, 2024 at 02:05 PM UTC");
        assert_eq!(format_timestamp("2024-03-01", &zone), "Mar 01, 2024 at 12:00 AM UTC");
    }

    #[test]
    fn test_format_timestamp_falls_back_to_raw() {
        let zone = DisplayZone::default();
        assert_eq!(format_timestamp("yesterday afternoon", &zone), "yesterday afternoon");
        assert_eq!(format_timestamp("", &zone), "");
    }

    #[test]
    fn test_format_value_by_field_name() {
        let zone = DisplayZone::default();
        let ts = json!("2024-01-15T10:30:00Z");
        assert_eq!(format_value("end_time", &ts, &zone), "Jan 15, 2024 at 05:30 AM EST");
        assert_eq!(format_value("sha", &ts, &zone), "2024-01-15T10:30:00Z");
        assert_eq!(format_value("count", &json!(42), &zone), "42");
        assert_eq!(format_value("ok", &json!(true), &zone), "true");
        assert_eq!(format_value("missing", &Value::Null, &zone), "");
    }

    #[test]
    fn test_format_value_nested_is_indented_json() {
        let zone = DisplayZone::default();
        let nested = json!({"a": 1});
        assert_eq!(format_value("config", &nested, &zone), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_generated_on() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 15, 30, 0).unwrap();
        assert_eq!(generated_on(now, &DisplayZone::default()), "Generated on January 15, 2024 at 10:30 AM EST");
    }

    #[test]
    fn test_flatten_found_lines_from_object() {
        let rows = flatten_found_lines(&json!({"TODO": ["  a.rs:1 TODO fix ", "b.rs:2"], "FIXME": "c.rs:3"}));
        assert_eq!(rows, vec!["TODO: a.rs:1 TODO fix", "TODO: b.rs:2", "FIXME: c.rs:3"]);
    }

    #[test]
    fn test_flatten_found_lines_from_json_string() {
        let rows = flatten_found_lines(&json!("{\"print\": [\"x.py:10\"]}"));
        assert_eq!(rows, vec!["print: x.py:10"]);
    }

    #[test]
    fn test_flatten_found_lines_malformed_falls_back() {
        let rows = flatten_found_lines(&json!("{not json"));
        assert_eq!(rows, vec!["{not json"]);
    }
}
