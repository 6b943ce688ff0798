//! Attribute value model and normalization.
//!
//! Samples carry heterogeneous raw values ([`AttrValue`]): free text typed
//! into a form, numbers, booleans, dates, and explicit nulls. Before any
//! comparison the raw value is normalized into a closed [`Comparable`]
//! variant, so filters never compare across kinds by accident: equality is
//! defined kind-wise, and ordering only exists for number/number and
//! text/text pairs. Everything else is a typed [`Error::InvalidComparison`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{Error, Result};

/// A raw attribute value as supplied by a collaborator.
///
/// Serializes untagged, so samples read as plain JSON objects. Dates use
/// RFC 3339 strings on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AttrValue {
    /// Explicit null / absent value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Finite or non-finite double.
    Number(f64),
    /// Timestamped value; normalizes to epoch milliseconds.
    Date(DateTime<Utc>),
    /// Free text, possibly encoding a number, date, or pseudo-list.
    Text(String),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// Kind tag for a normalized value, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Number,
    Text,
    Bool,
    Null,
    Undefined,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Number => write!(f, "number"),
            ValueKind::Text => write!(f, "text"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Null => write!(f, "null"),
            ValueKind::Undefined => write!(f, "undefined"),
        }
    }
}

/// A normalized, comparable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparable {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
    Undefined,
}

impl Comparable {
    /// Kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Comparable::Number(_) => ValueKind::Number,
            Comparable::Text(_) => ValueKind::Text,
            Comparable::Bool(_) => ValueKind::Bool,
            Comparable::Null => ValueKind::Null,
            Comparable::Undefined => ValueKind::Undefined,
        }
    }
}

/// Normalize a raw value into its comparable form.
///
/// Non-text values pass through unchanged, except dates, which convert to
/// their epoch-millisecond number. Text goes through the coercion ladder:
/// trim, sentinel words (`null`/`undefined`/`true`/`false`), date strings,
/// numeric strings, and finally plain text.
pub fn normalize(raw: &AttrValue) -> Comparable {
    match raw {
        AttrValue::Null => Comparable::Null,
        AttrValue::Bool(b) => Comparable::Bool(*b),
        AttrValue::Number(n) => Comparable::Number(*n),
        AttrValue::Date(dt) => Comparable::Number(dt.timestamp_millis() as f64),
        AttrValue::Text(s) => normalize_text(s),
    }
}

fn normalize_text(s: &str) -> Comparable {
    let t = s.trim();
    if t.is_empty() {
        return Comparable::Text(String::new());
    }
    match t.to_lowercase().as_str() {
        "null" => return Comparable::Null,
        "undefined" => return Comparable::Undefined,
        "true" => return Comparable::Bool(true),
        "false" => return Comparable::Bool(false),
        _ => {}
    }
    // YYYY-MM-DD or ISO datetime only; bare numbers with '-' fall through.
    if t.contains('-') || t.contains('T') {
        if let Some(millis) = parse_date_millis(t) {
            return Comparable::Number(millis as f64);
        }
    }
    if let Ok(n) = t.parse::<f64>() {
        if !n.is_nan() {
            return Comparable::Number(n);
        }
    }
    Comparable::Text(t.to_string())
}

/// Parse a date-looking string to epoch milliseconds.
///
/// Accepts RFC 3339, an ISO datetime without zone (taken as UTC), and a
/// plain `YYYY-MM-DD` (midnight UTC).
fn parse_date_millis(t: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    None
}

/// Strict equality of two raw values after normalization.
///
/// Same kind and same value; NaN is never equal to anything.
pub fn eq(a: &AttrValue, b: &AttrValue) -> bool {
    match (normalize(a), normalize(b)) {
        (Comparable::Number(x), Comparable::Number(y)) => x == y,
        (Comparable::Text(x), Comparable::Text(y)) => x == y,
        (Comparable::Bool(x), Comparable::Bool(y)) => x == y,
        (Comparable::Null, Comparable::Null) => true,
        (Comparable::Undefined, Comparable::Undefined) => true,
        _ => false,
    }
}

/// Order two raw values after normalization.
///
/// Defined for number/number and text/text pairs only. NaN admits no
/// ordering, so it is rejected the same way as a kind mismatch.
pub fn cmp(a: &AttrValue, b: &AttrValue) -> Result<Ordering> {
    let left = normalize(a);
    let right = normalize(b);
    match (&left, &right) {
        (Comparable::Number(x), Comparable::Number(y)) => {
            x.partial_cmp(y).ok_or(Error::InvalidComparison {
                left: left.kind(),
                right: right.kind(),
            })
        }
        (Comparable::Text(x), Comparable::Text(y)) => Ok(x.cmp(y)),
        _ => Err(Error::InvalidComparison {
            left: left.kind(),
            right: right.kind(),
        }),
    }
}

/// Coerce a possibly-missing raw value into a list of raw values.
///
/// Missing and null values become the empty list. Text is parsed as a
/// pseudo-list (see [`parse_array_like`]). Any other scalar becomes a
/// single-element list.
pub fn to_list(value: Option<&AttrValue>) -> Vec<AttrValue> {
    match value {
        None | Some(AttrValue::Null) => Vec::new(),
        Some(AttrValue::Text(s)) => parse_array_like(s),
        Some(other) => vec![other.clone()],
    }
}

/// Parse a string as a pseudo-list of raw values.
///
/// A bracketed string is tried as a JSON array first; on parse failure the
/// brackets are stripped and the body split on commas, trimming one layer
/// of surrounding quotes per element. An unbracketed string containing a
/// comma splits the same way; anything else is a single-element list. The
/// empty string is the empty list.
pub fn parse_array_like(s: &str) -> Vec<AttrValue> {
    let t = s.trim();
    if t.is_empty() {
        return Vec::new();
    }
    if t.starts_with('[') && t.ends_with(']') {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(t) {
            return items.iter().map(json_to_attr).collect();
        }
        let body = &t[1..t.len() - 1];
        return body
            .split(',')
            .map(|x| AttrValue::Text(strip_quotes(x.trim()).to_string()))
            .collect();
    }
    if t.contains(',') {
        return t
            .split(',')
            .map(|x| AttrValue::Text(strip_quotes(x.trim()).to_string()))
            .collect();
    }
    vec![AttrValue::Text(t.to_string())]
}

fn json_to_attr(value: &serde_json::Value) -> AttrValue {
    match value {
        serde_json::Value::Null => AttrValue::Null,
        serde_json::Value::Bool(b) => AttrValue::Bool(*b),
        serde_json::Value::Number(n) => AttrValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => AttrValue::Text(s.clone()),
        // Nested structures have no scalar meaning; keep their JSON text.
        other => AttrValue::Text(other.to_string()),
    }
}

/// Strip one leading and one trailing quote character, independently.
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['\'', '"']).unwrap_or(s);
    s.strip_suffix(['\'', '"']).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text(s: &str) -> AttrValue {
        AttrValue::Text(s.to_string())
    }

    #[test]
    fn normalize_passthrough_scalars() {
        assert_eq!(normalize(&AttrValue::Number(3.5)), Comparable::Number(3.5));
        assert_eq!(normalize(&AttrValue::Bool(true)), Comparable::Bool(true));
        assert_eq!(normalize(&AttrValue::Null), Comparable::Null);
    }

    #[test]
    fn normalize_date_to_epoch_millis() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let expected = dt.timestamp_millis() as f64;
        assert_eq!(normalize(&AttrValue::Date(dt)), Comparable::Number(expected));
    }

    #[test]
    fn normalize_text_sentinels() {
        assert_eq!(normalize(&text("  NULL ")), Comparable::Null);
        assert_eq!(normalize(&text("Undefined")), Comparable::Undefined);
        assert_eq!(normalize(&text("TRUE")), Comparable::Bool(true));
        assert_eq!(normalize(&text("false")), Comparable::Bool(false));
    }

    #[test]
    fn normalize_empty_string_stays_text() {
        assert_eq!(normalize(&text("   ")), Comparable::Text(String::new()));
    }

    #[test]
    fn normalize_numeric_strings() {
        assert_eq!(normalize(&text("42")), Comparable::Number(42.0));
        assert_eq!(normalize(&text(" -5 ")), Comparable::Number(-5.0));
        assert_eq!(normalize(&text("1e3")), Comparable::Number(1000.0));
    }

    #[test]
    fn normalize_nan_string_stays_text() {
        assert_eq!(normalize(&text("NaN")), Comparable::Text("NaN".to_string()));
    }

    #[test]
    fn normalize_date_strings() {
        let date = normalize(&text("2024-03-01"));
        let expected = Utc
            .with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
            .unwrap()
            .timestamp_millis() as f64;
        assert_eq!(date, Comparable::Number(expected));

        let iso = normalize(&text("2024-03-01T12:30:00Z"));
        let expected_iso = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
            .unwrap()
            .timestamp_millis() as f64;
        assert_eq!(iso, Comparable::Number(expected_iso));
    }

    #[test]
    fn normalize_plain_text() {
        assert_eq!(normalize(&text(" red ")), Comparable::Text("red".to_string()));
        // Contains '-' but is not a date and not a number.
        assert_eq!(
            normalize(&text("a-b")),
            Comparable::Text("a-b".to_string())
        );
    }

    #[test]
    fn eq_same_kind_only() {
        assert!(eq(&text("42"), &AttrValue::Number(42.0)));
        assert!(eq(&text("true"), &AttrValue::Bool(true)));
        assert!(eq(&text("null"), &AttrValue::Null));
        assert!(!eq(&text("42"), &text("forty-two")));
        assert!(!eq(&AttrValue::Bool(true), &AttrValue::Number(1.0)));
    }

    #[test]
    fn eq_nan_never_equal() {
        assert!(!eq(&AttrValue::Number(f64::NAN), &AttrValue::Number(f64::NAN)));
    }

    #[test]
    fn eq_date_against_date_string() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(eq(&AttrValue::Date(dt), &text("2024-03-01")));
    }

    #[test]
    fn cmp_numbers_and_text() {
        assert_eq!(
            cmp(&AttrValue::Number(1.0), &AttrValue::Number(2.0)).unwrap(),
            Ordering::Less
        );
        assert_eq!(cmp(&text("10"), &text("9")).unwrap(), Ordering::Greater);
        assert_eq!(cmp(&text("abc"), &text("abd")).unwrap(), Ordering::Less);
    }

    #[test]
    fn cmp_kind_mismatch_is_error() {
        let err = cmp(&text("abc"), &AttrValue::Number(1.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidComparison {
                left: ValueKind::Text,
                right: ValueKind::Number
            }
        ));
    }

    #[test]
    fn cmp_nan_is_error() {
        let err = cmp(&AttrValue::Number(f64::NAN), &AttrValue::Number(1.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidComparison { .. }));
    }

    #[test]
    fn to_list_missing_and_null() {
        assert!(to_list(None).is_empty());
        assert!(to_list(Some(&AttrValue::Null)).is_empty());
    }

    #[test]
    fn to_list_scalar_wraps() {
        assert_eq!(
            to_list(Some(&AttrValue::Number(5.0))),
            vec![AttrValue::Number(5.0)]
        );
        assert_eq!(to_list(Some(&text("red"))), vec![text("red")]);
    }

    #[test]
    fn parse_array_like_json_array() {
        assert_eq!(
            parse_array_like(r#"["a", 2, true]"#),
            vec![text("a"), AttrValue::Number(2.0), AttrValue::Bool(true)]
        );
        assert!(parse_array_like("[]").is_empty());
    }

    #[test]
    fn parse_array_like_bracket_fallback() {
        // Invalid JSON: single quotes. Falls back to split-and-strip.
        assert_eq!(
            parse_array_like("['a', 'b']"),
            vec![text("a"), text("b")]
        );
    }

    #[test]
    fn parse_array_like_comma_split() {
        assert_eq!(
            parse_array_like("a, b ,c"),
            vec![text("a"), text("b"), text("c")]
        );
        assert_eq!(parse_array_like(r#""a","b""#), vec![text("a"), text("b")]);
    }

    #[test]
    fn parse_array_like_single_and_empty() {
        assert_eq!(parse_array_like("solo"), vec![text("solo")]);
        assert!(parse_array_like("   ").is_empty());
    }

    #[test]
    fn attr_value_untagged_json() {
        let v: AttrValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(v, AttrValue::Number(3.5));
        let v: AttrValue = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(v, text("red"));
        let v: AttrValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, AttrValue::Null);
        let v: AttrValue = serde_json::from_str("\"2024-03-01T00:00:00Z\"").unwrap();
        assert!(matches!(v, AttrValue::Date(_)));
    }
}
