//! Conversion between typed field values and their string forms
//!
//! `parse_field_value` turns raw form input into the JSON value implied
//! by the field kind; `format_field_value_for_display` renders a stored
//! value for humans. The two are deliberately not exact inverses for
//! ambiguous kinds (multiselect, locale-formatted numbers): the formatter
//! targets display, not round-trip fidelity.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::definition::FieldOption;
use super::field_type::FieldKind;
use super::validation::is_empty_value;

/// Rendered in place of null/absent/empty values
pub const EMPTY_DISPLAY: &str = "—";

/// Accepted date inputs, most specific first: RFC 3339, common ISO
/// date-time variants, plain ISO date, day-first local date.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
        }
    }
    None
}

/// Parse raw string input into the JSON value implied by `kind`.
/// Unparsable input degrades to `Null`, never an error; empty input is
/// always `Null`.
pub fn parse_field_value(raw: &str, kind: FieldKind) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match kind {
        FieldKind::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldKind::Checkbox => Value::Bool(matches!(raw.trim(), "true" | "1")),
        FieldKind::Date | FieldKind::DateTime => parse_datetime(raw)
            .map(|dt| Value::String(dt.to_rfc3339()))
            .unwrap_or(Value::Null),
        FieldKind::Multiselect => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Value::Array(items),
            // fall back to comma-separated input
            _ => Value::Array(
                raw.split(',')
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect(),
            ),
        },
        _ => Value::String(raw.to_string()),
    }
}

/// Render a stored value for display. Option-backed kinds resolve the
/// matching option label, falling back to the raw value when unmatched.
pub fn format_field_value_for_display(
    value: &Value,
    kind: FieldKind,
    options: &[FieldOption],
) -> String {
    if is_empty_value(value) {
        return EMPTY_DISPLAY.to_string();
    }
    match kind {
        FieldKind::Select | FieldKind::Radio => {
            let raw = display_scalar(value);
            option_label(options, &raw).unwrap_or(raw)
        }
        FieldKind::Multiselect => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    let raw = display_scalar(item);
                    option_label(options, &raw).unwrap_or(raw)
                })
                .collect::<Vec<_>>()
                .join(", "),
            other => display_scalar(other),
        },
        FieldKind::Checkbox => match value {
            Value::Bool(true) => "Sí".to_string(),
            Value::Bool(false) => "No".to_string(),
            other => display_scalar(other),
        },
        FieldKind::Date => match value.as_str().and_then(parse_datetime) {
            Some(dt) => dt.format("%d/%m/%Y").to_string(),
            None => display_scalar(value),
        },
        FieldKind::DateTime => match value.as_str().and_then(parse_datetime) {
            Some(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
            None => display_scalar(value),
        },
        FieldKind::Number => match as_number(value) {
            Some(n) => format_number_display(n),
            None => display_scalar(value),
        },
        _ => display_scalar(value),
    }
}

/// Locale number rendering: dot-separated thousands, comma decimals
pub fn format_number_display(n: f64) -> String {
    let negative = n.is_sign_negative() && n != 0.0;
    let abs = n.abs();
    let s = if abs.fract() == 0.0 && abs < 1e15 {
        format!("{}", abs as i64)
    } else {
        format!("{}", abs)
    };
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (s, None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let mut result: String = grouped.chars().rev().collect();

    if let Some(frac) = frac_part {
        result.push(',');
        result.push_str(&frac);
    }
    if negative {
        result.insert(0, '-');
    }
    result
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn option_label(options: &[FieldOption], raw: &str) -> Option<String> {
    options
        .iter()
        .find(|o| o.value == raw)
        .map(|o| o.label.clone())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> Vec<FieldOption> {
        vec![
            FieldOption::new("eng", "Ingeniería"),
            FieldOption::new("ops", "Operaciones"),
        ]
    }

    #[test]
    fn test_parse_empty_is_null() {
        for kind in [FieldKind::Text, FieldKind::Number, FieldKind::Multiselect] {
            assert_eq!(parse_field_value("", kind), Value::Null);
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_field_value("42.5", FieldKind::Number), json!(42.5));
        assert_eq!(parse_field_value("abc", FieldKind::Number), Value::Null);
    }

    #[test]
    fn test_parse_checkbox() {
        assert_eq!(parse_field_value("true", FieldKind::Checkbox), json!(true));
        assert_eq!(parse_field_value("1", FieldKind::Checkbox), json!(true));
        assert_eq!(parse_field_value("no", FieldKind::Checkbox), json!(false));
    }

    #[test]
    fn test_parse_date_normalizes_to_iso() {
        let parsed = parse_field_value("2026-08-25", FieldKind::Date);
        let s = parsed.as_str().unwrap();
        assert!(s.starts_with("2026-08-25T00:00:00"));
        assert_eq!(parse_field_value("basura", FieldKind::Date), Value::Null);
    }

    #[test]
    fn test_parse_multiselect_json_then_comma_fallback() {
        assert_eq!(
            parse_field_value(r#"["eng","ops"]"#, FieldKind::Multiselect),
            json!(["eng", "ops"])
        );
        assert_eq!(
            parse_field_value("eng, ops", FieldKind::Multiselect),
            json!(["eng", "ops"])
        );
    }

    #[test]
    fn test_display_placeholder_for_empty() {
        assert_eq!(
            format_field_value_for_display(&Value::Null, FieldKind::Text, &[]),
            EMPTY_DISPLAY
        );
        assert_eq!(
            format_field_value_for_display(&json!(""), FieldKind::Select, &options()),
            EMPTY_DISPLAY
        );
    }

    #[test]
    fn test_display_select_label_lookup() {
        assert_eq!(
            format_field_value_for_display(&json!("eng"), FieldKind::Select, &options()),
            "Ingeniería"
        );
        // unmatched values fall back to the raw value
        assert_eq!(
            format_field_value_for_display(&json!("hr"), FieldKind::Select, &options()),
            "hr"
        );
    }

    #[test]
    fn test_display_multiselect_joined_labels() {
        assert_eq!(
            format_field_value_for_display(&json!(["eng", "hr"]), FieldKind::Multiselect, &options()),
            "Ingeniería, hr"
        );
    }

    #[test]
    fn test_display_checkbox_localized() {
        assert_eq!(
            format_field_value_for_display(&json!(true), FieldKind::Checkbox, &[]),
            "Sí"
        );
        assert_eq!(
            format_field_value_for_display(&json!(false), FieldKind::Checkbox, &[]),
            "No"
        );
    }

    #[test]
    fn test_display_dates() {
        assert_eq!(
            format_field_value_for_display(&json!("2026-08-25T10:30:00Z"), FieldKind::Date, &[]),
            "25/08/2026"
        );
        assert_eq!(
            format_field_value_for_display(&json!("2026-08-25T10:30:00Z"), FieldKind::DateTime, &[]),
            "25/08/2026 10:30"
        );
    }

    #[test]
    fn test_number_grouping() {
        assert_eq!(format_number_display(0.0), "0");
        assert_eq!(format_number_display(42.0), "42");
        assert_eq!(format_number_display(1234567.0), "1.234.567");
        assert_eq!(format_number_display(-1234.5), "-1.234,5");
    }

    #[test]
    fn test_number_display_is_not_invertible() {
        // known non-invertible case: the grouped display form does not
        // parse back as a number, it degrades to Null
        let shown = format_field_value_for_display(&json!(1234567), FieldKind::Number, &[]);
        assert_eq!(shown, "1.234.567");
        assert_eq!(parse_field_value(&shown, FieldKind::Number), Value::Null);
    }
}
