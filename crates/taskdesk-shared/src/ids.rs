//! Numeric identifier handling for wire payloads.
//!
//! The backend and older caches disagree on whether ids travel as JSON
//! numbers or strings, so every id field goes through these helpers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a JSON value into a numeric id. Accepts integers, integral floats and
/// numeric strings; anything else yields `None`.
pub fn parse_numeric_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Required id field.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_numeric_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid id: {value}")))
}

/// Optional reference to another record. `null`, `0`, empty and non-numeric
/// strings all mean "no reference".
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(parse_numeric_id)
        .filter(|id| *id != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(parse_numeric_id(&json!(7)), Some(7));
        assert_eq!(parse_numeric_id(&json!(7.0)), Some(7));
        assert_eq!(parse_numeric_id(&json!("12")), Some(12));
        assert_eq!(parse_numeric_id(&json!(" 12 ")), Some(12));
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert_eq!(parse_numeric_id(&json!("abc")), None);
        assert_eq!(parse_numeric_id(&json!(1.5)), None);
        assert_eq!(parse_numeric_id(&json!(null)), None);
        assert_eq!(parse_numeric_id(&json!([1])), None);
    }

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        assigned_to: Option<i64>,
    }

    #[test]
    fn optional_id_treats_falsy_values_as_absent() {
        for raw in [json!({}), json!({"assigned_to": null}), json!({"assigned_to": 0}), json!({"assigned_to": ""})] {
            let probe: Probe = serde_json::from_value(raw).unwrap();
            assert_eq!(probe.assigned_to, None);
        }
        let probe: Probe = serde_json::from_value(json!({"assigned_to": "4"})).unwrap();
        assert_eq!(probe.assigned_to, Some(4));
    }
}
