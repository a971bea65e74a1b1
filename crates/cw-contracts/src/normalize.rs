//! Coercion of loosely typed JSON values
//!
//! The admin forms submit whatever the browser had in its inputs: strings for
//! numbers, empty strings for missing dates, numbers for codes. These helpers
//! turn such values into typed fields, recording problems in a
//! [`ValidationErrors`] instead of failing fast.

use chrono::NaiveDate;
use cw_core::error::ValidationErrors;
use cw_core::types::DATE_FORMAT;
use cw_models::ProjectStatus;
use serde_json::Value;

pub const BLANK: &str = "can't be blank";

/// Optional text: trimmed, empty becomes `None`. Numbers and booleans are
/// accepted and rendered as text.
pub fn text(value: &Value, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => {
            errors.add(field, "must be text");
            None
        }
    }
}

/// Required text; blank values add a `can't be blank` error
pub fn required_text(value: &Value, field: &str, errors: &mut ValidationErrors) -> String {
    match text(value, field, errors) {
        Some(s) => s,
        None => {
            if !errors.has_error(field) {
                errors.add(field, BLANK);
            }
            String::new()
        }
    }
}

/// Add a length error when `value` exceeds `max` characters
pub fn max_chars(value: Option<&str>, max: usize, field: &str, errors: &mut ValidationErrors) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.add(field, format!("is too long (maximum is {} characters)", max));
        }
    }
}

/// Budget coercion.
///
/// Empty, null, and non-numeric input all mean "no budget" and yield `None`,
/// never `Some(0.0)`. Thousand separators (`,`, `_`, spaces) are ignored.
/// Negative amounts are rejected.
pub fn budget(value: &Value, field: &str, errors: &mut ValidationErrors) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, ',' | '_' | ' '))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    }
    .filter(|amount| amount.is_finite());

    match amount {
        Some(a) if a < 0.0 => {
            errors.add(field, "must not be negative");
            None
        }
        other => other,
    }
}

/// Optional calendar date in `YYYY-MM-DD`. A full timestamp is accepted and
/// truncated to its date.
pub fn date(value: &Value, field: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let raw = match value {
        Value::Null => return None,
        Value::String(s) => s.trim(),
        _ => {
            errors.add(field, "must be a date (YYYY-MM-DD)");
            return None;
        }
    };
    if raw.is_empty() {
        return None;
    }

    let date_part = match raw.find('T') {
        Some(10) => &raw[..10],
        _ => raw,
    };

    match NaiveDate::parse_from_str(date_part, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "must be a date (YYYY-MM-DD)");
            None
        }
    }
}

/// Project status; blank falls back to the default (`in_progress`)
pub fn status(value: &Value, field: &str, errors: &mut ValidationErrors) -> ProjectStatus {
    match text(value, field, errors) {
        None => ProjectStatus::default(),
        Some(raw) => ProjectStatus::parse(&raw).unwrap_or_else(|| {
            errors.add(
                field,
                "must be one of in_progress, suspended, completed",
            );
            ProjectStatus::default()
        }),
    }
}

/// Optional boolean flag. Accepts JSON booleans, `0`/`1`, and the strings
/// `true`/`false`/`yes`/`no`/`on`/`off`.
pub fn flag(value: &Value, field: &str, errors: &mut ValidationErrors) -> Option<bool> {
    let parsed = match value {
        Value::Null => return None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => return None,
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    };
    if parsed.is_none() {
        errors.add(field, "must be true or false");
    }
    parsed
}

/// Add an ordering error when `end` precedes `start`
pub fn date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    field: &str,
    errors: &mut ValidationErrors,
) {
    if !cw_core::types::DateRange::new(start, end).is_ordered() {
        errors.add(field, "must not be before the start date");
    }
}

/// Add an error unless `value` is an http(s) URL or a root-relative path
pub fn link(value: &str, field: &str, errors: &mut ValidationErrors) {
    if !is_link(value.trim()) {
        errors.add(field, "must be an http(s) URL or a local path");
    }
}

fn is_link(value: &str) -> bool {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    let lower = value.to_ascii_lowercase();
    if let Some(rest) = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
    {
        return rest
            .split(['/', '?', '#'])
            .next()
            .is_some_and(|host| !host.is_empty());
    }
    value.starts_with('/')
        && !value.starts_with("//")
        && !value.contains('\\')
        && !value.split(['/', '?', '#']).any(|segment| segment == "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn budget_of(value: Value) -> (Option<f64>, ValidationErrors) {
        let mut errors = ValidationErrors::new();
        let b = budget(&value, "budget", &mut errors);
        (b, errors)
    }

    #[test]
    fn test_budget_unset_is_not_zero() {
        assert_eq!(budget_of(json!(null)).0, None);
        assert_eq!(budget_of(json!("")).0, None);
        assert_eq!(budget_of(json!("   ")).0, None);
        assert_eq!(budget_of(json!("about a million")).0, None);
        assert_eq!(budget_of(json!(true)).0, None);
        assert_eq!(budget_of(json!("NaN")).0, None);
    }

    #[test]
    fn test_budget_numeric() {
        assert_eq!(budget_of(json!(0)).0, Some(0.0));
        assert_eq!(budget_of(json!("0")).0, Some(0.0));
        assert_eq!(budget_of(json!(1500.5)).0, Some(1500.5));
        assert_eq!(budget_of(json!("1,250,000")).0, Some(1_250_000.0));
        assert_eq!(budget_of(json!(" 42.75 ")).0, Some(42.75));
    }

    #[test]
    fn test_budget_negative_rejected() {
        let (b, errors) = budget_of(json!("-10"));
        assert_eq!(b, None);
        assert!(errors.has_error("budget"));
    }

    #[test]
    fn test_text_coercion() {
        let mut errors = ValidationErrors::new();
        assert_eq!(text(&json!("  BG045 "), "code", &mut errors), Some("BG045".into()));
        assert_eq!(text(&json!(45), "code", &mut errors), Some("45".into()));
        assert_eq!(text(&json!(""), "code", &mut errors), None);
        assert!(errors.is_empty());

        assert_eq!(text(&json!(["x"]), "code", &mut errors), None);
        assert!(errors.has_error("code"));
    }

    #[test]
    fn test_required_text_reports_once() {
        let mut errors = ValidationErrors::new();
        required_text(&json!({"a": 1}), "name", &mut errors);
        assert_eq!(errors.get("name").unwrap().len(), 1);
    }

    #[test]
    fn test_date_parsing() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            date(&json!("2026-01-01"), "start_date", &mut errors),
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
        assert_eq!(
            date(&json!("2026-02-01T00:00:00.000Z"), "end_date", &mut errors),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
        assert_eq!(date(&json!(""), "end_date", &mut errors), None);
        assert!(errors.is_empty());

        assert_eq!(date(&json!("01/02/2026"), "end_date", &mut errors), None);
        assert!(errors.has_error("end_date"));
    }

    #[test]
    fn test_flag() {
        let mut errors = ValidationErrors::new();
        assert_eq!(flag(&json!(true), "is_public", &mut errors), Some(true));
        assert_eq!(flag(&json!("off"), "is_public", &mut errors), Some(false));
        assert_eq!(flag(&json!(1), "is_public", &mut errors), Some(true));
        assert_eq!(flag(&json!(null), "is_public", &mut errors), None);
        assert!(errors.is_empty());

        assert_eq!(flag(&json!("maybe"), "is_public", &mut errors), None);
        assert!(errors.has_error("is_public"));
    }

    #[test]
    fn test_status_default_and_invalid() {
        let mut errors = ValidationErrors::new();
        assert_eq!(status(&json!(""), "status", &mut errors), ProjectStatus::InProgress);
        assert_eq!(status(&json!("Suspended"), "status", &mut errors), ProjectStatus::Suspended);
        assert!(errors.is_empty());

        status(&json!("abandoned"), "status", &mut errors);
        assert!(errors.has_error("status"));
    }

    #[test]
    fn test_link() {
        for ok in [
            "https://files.example.org/plan.pdf",
            "HTTP://town.gov",
            "/uploads/projects/1/plan.pdf",
        ] {
            let mut errors = ValidationErrors::new();
            link(ok, "url", &mut errors);
            assert!(errors.is_empty(), "{}", ok);
        }

        for bad in [
            "javascript:alert(1)",
            "data:text/html;base64,PHNjcmlwdD4=",
            "//evil.example.org/x",
            "https:///nohost",
            "/uploads/../secrets",
            "uploads/plan.pdf",
            "/uploads/a b.pdf",
        ] {
            let mut errors = ValidationErrors::new();
            link(bad, "url", &mut errors);
            assert!(errors.has_error("url"), "{}", bad);
        }
    }
}
