//! Lenient deserializers for platform order payloads.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeSet;

/// Strips a platform global id (`gid://shop/Product/42`) down to its trailing component.
pub fn normalize_id(raw: &str) -> &str {
    if raw.starts_with("gid://") {
        raw.rsplit('/').next().unwrap_or(raw)
    } else {
        raw
    }
}

/// Turns a JSON string or number into a normalised id. Anything else is `None`.
pub(crate) fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(normalize_id(s).to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(super) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => id_from_value(&other)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

pub(super) fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number: '{}'", s))),
        other => Err(serde::de::Error::custom(format!("invalid number: {}", other))),
    }
}

/// Accepts either a list of tags or the comma-separated form platforms send.
pub(super) fn tags<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Csv(String),
    }

    let tags = match Option::<Tags>::deserialize(deserializer)? {
        None => BTreeSet::new(),
        Some(Tags::List(list)) => list.into_iter().collect(),
        Some(Tags::Csv(csv)) => csv
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    };
    Ok(tags)
}
