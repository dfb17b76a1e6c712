//! Lenient field decoding
//!
//! User snapshots come straight out of browser storage, so numeric and
//! date fields are coerced instead of rejected: a bad amount counts as 0,
//! a bad seed disables seeding, a bad due date is treated as absent.
//! Flags follow loose truthiness.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a finite number the way a loose `Number(x)` would.
pub fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };

    n.is_finite().then_some(n)
}

/// Truncate and wrap a number into 32 bits (`x >>> 0` semantics).
pub fn wrap_to_u32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Amounts: anything unparsable becomes 0.
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or(0.0))
}

/// Optional numbers (seed, maxSuggestions): anything unparsable becomes `None`.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => Ok(number_from_value(&other)),
    }
}

/// ISO calendar dates; empty or malformed strings become `None`.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_iso_date))
}

/// Strings where `null` should read as empty.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Optional strings (currency); non-strings read as absent.
pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Loose truthiness: `0`, `""`, `null` and `false` are false, anything else true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Booleans (`completed`) decoded by truthiness.
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

/// Millisecond timestamps; anything unparsable becomes 0.
pub fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).map(|n| n.trunc() as i64).unwrap_or(0))
}

/// Optional millisecond timestamps.
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => Ok(number_from_value(&other).map(|n| n.trunc() as i64)),
    }
}

/// Tag lists; non-string entries are dropped and `null` reads as empty.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Parse the date part of an ISO string (`2024-01-05` or `2024-01-05T...`).
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_coercion() {
        assert_eq!(number_from_value(&json!(12.5)), Some(12.5));
        assert_eq!(number_from_value(&json!(" 40 ")), Some(40.0));
        assert_eq!(number_from_value(&json!("")), Some(0.0));
        assert_eq!(number_from_value(&json!("12abc")), None);
        assert_eq!(number_from_value(&json!(null)), None);
        assert_eq!(number_from_value(&json!([1])), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!([])));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn test_wrap_to_u32() {
        assert_eq!(wrap_to_u32(1.0), 1);
        assert_eq!(wrap_to_u32(7.9), 7);
        assert_eq!(wrap_to_u32(-1.0), u32::MAX);
        assert_eq!(wrap_to_u32(4_294_967_297.0), 1);
        assert_eq!(wrap_to_u32(f64::NAN), 0);
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-01-05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_iso_date("2024-01-05T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_iso_date(""), None);
        assert_eq!(parse_iso_date("soon"), None);
    }
}
