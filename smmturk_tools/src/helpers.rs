//! Serde helpers. SMM panels are loose about JSON types: ids and counts show up as numbers in one response and as
//! strings in the next.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        },
        _ => None,
    }
}

/// Accepts `12`, `12.0` or `"12"`. Anything else is an error.
pub fn flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where D: Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    value_to_i64(&value).ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {value}")))
}

/// Like [`flexible_i64`], but `null`, missing and empty strings become `None`.
pub fn flexible_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => value_to_i64(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {v}"))),
    }
}

/// Accepts a string or a number and returns its string form. Used for opaque identifiers.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        v => Err(serde::de::Error::custom(format!("expected a string or number, got {v}"))),
    }
}

/// Booleans as `true`, `1`, `"1"`, `"true"` and friends. `null` and missing are `false`.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    })
}

/// An optional [`Price`](sg_common::Price). `null`, missing and empty strings become `None`.
pub fn flexible_opt_price<'de, D>(deserializer: D) -> Result<Option<sg_common::Price>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => serde_json::from_value(v).map(Some).map_err(serde::de::Error::custom),
    }
}
