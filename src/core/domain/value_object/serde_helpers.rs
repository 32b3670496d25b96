//! Serde helpers for the loosely-typed payloads the inventory backend returns.

use crate::availability::application::service::normalization::normalize_boolean;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes `null` as the type's default value instead of failing.
///
/// Combine with `#[serde(default)]` so an absent field behaves the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counters that may arrive as numbers, numeric strings, or garbage.
///
/// Anything that is not a non-negative integer is treated as absent.
pub mod lenient_count {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(to_count))
    }

    fn to_count(value: &Value) -> Option<u64> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
    }
}

/// Free-form text fields that some backends send as numbers or booleans.
pub mod lenient_string {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }
}

/// Flags sent as booleans, 0/1, or words such as "yes" and "disabled".
///
/// Values outside the boolean vocabularies count as `false`.
pub mod lenient_flag {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(normalize_boolean(value.as_ref()).unwrap_or(false))
    }
}
