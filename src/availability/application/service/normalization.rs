//! Scalar normalization for loosely-typed inventory fields.

use serde_json::Value;

const TRUE_WORDS: &[&str] = &[
    "1",
    "true",
    "yes",
    "enabled",
    "ha",
    "clustered",
    "high availability",
    "high-availability",
    "highavailability",
    "on",
];

const FALSE_WORDS: &[&str] = &[
    "0",
    "false",
    "no",
    "disabled",
    "off",
    "standalone",
    "stand-alone",
    "stand alone",
    "not clustered",
    "not-clustered",
    "notclustered",
];

/// Texts that claim "no cluster" and must be treated as absence.
const CLUSTER_SENTINELS: &[&str] = &[
    "",
    "default",
    "standalone",
    "stand-alone",
    "stand alone",
    "none",
    "null",
    "n/a",
    "na",
    "not clustered",
    "not-clustered",
    "notclustered",
    "single host",
    "single-host",
    "singlehost",
];

/// Reduces a JSON value to `Some(true)`, `Some(false)` or unknown (`None`).
///
/// Numbers only count when they are exactly 0 or 1; strings are matched
/// trimmed and case-insensitively against fixed vocabularies.
pub fn normalize_boolean(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => normalize_boolean_str(s),
        _ => None,
    }
}

pub fn normalize_boolean_str(text: &str) -> Option<bool> {
    let word = text.trim().to_lowercase();
    if TRUE_WORDS.contains(&word.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Returns the trimmed cluster name, or `None` for blanks and "no cluster" sentinels.
///
/// Numbers are accepted as names; other JSON types are not names.
pub fn sanitize_cluster_name(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => sanitize_cluster_str(s),
        Value::Number(n) => sanitize_cluster_str(&n.to_string()),
        _ => None,
    }
}

pub fn sanitize_cluster_str(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if CLUSTER_SENTINELS.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }
    Some(trimmed.to_string())
}
