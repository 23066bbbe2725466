// 🔢 Typed Parse Step - Amounts and dates from loosely-typed wire data
//
// The Remote API hands back currency values as JSON numbers, numeric
// strings, or null, and dates as ISO strings that may be missing.
// Every value goes through one explicit step here:
//
//   invalid amount → 0.0
//   invalid date   → None
//
// so aggregate sums stay defined and nothing downstream sees NaN.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ============================================================================
// AMOUNTS
// ============================================================================

/// Parse a currency amount from any JSON value.
///
/// Numbers and numeric strings are accepted. `null`, booleans, objects,
/// empty or non-numeric strings and non-finite results all map to `0.0`.
pub fn parse_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => finite_or_zero(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => parse_amount_str(s),
        _ => 0.0,
    }
}

/// Parse a currency amount typed by a person or read from a text field.
pub fn parse_amount_str(input: &str) -> f64 {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    cleaned
        .parse::<f64>()
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ============================================================================
// DATES
// ============================================================================

/// Parse a calendar date.
///
/// Accepted shapes:
/// - `2025-01-15`
/// - `2025-01-15T08:30:00Z` / `2025-01-15T08:30:00` (date part is kept)
/// - `2025/01/15`
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y/%m/%d").ok()
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

/// `#[serde(deserialize_with = "lenient_amount")]`
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(parse_amount).unwrap_or(0.0))
}

/// `#[serde(deserialize_with = "lenient_date")]`
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let parsed = parse_date(&s);
            if parsed.is_none() {
                tracing::warn!(raw = %s, "unparseable date treated as missing");
            }
            parsed
        }
        _ => None,
    })
}

/// Serialize an optional date back as `YYYY-MM-DD` (or `null`).
pub fn serialize_date<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match date {
        Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
        None => serializer.serialize_none(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
