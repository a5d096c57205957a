//! Case-insensitive header name handling.
//!
//! HTTP header names arrive lower-cased, while schemas often declare them
//! with their conventional spelling (`X-Request-Id`). Before parsing, incoming
//! names are mapped back to the declared spelling; after parsing, every key of
//! the result is lower-cased so handlers can look headers up the way they
//! arrived.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Renames incoming keys to the declared spelling they match
/// case-insensitively.
///
/// Keys that match no declared name pass through unchanged. Non-object
/// values are returned as-is.
///
/// ```rust
/// use reqguard::header::restore_declared_case;
/// use serde_json::json;
///
/// let declared = vec!["X-Request-Id".to_string()];
/// let value = restore_declared_case(json!({"x-request-id": "abc", "accept": "*/*"}), &declared);
/// assert_eq!(value, json!({"X-Request-Id": "abc", "accept": "*/*"}));
/// ```
pub fn restore_declared_case(value: Value, declared: &[String]) -> Value {
    let Value::Object(fields) = value else {
        return value;
    };

    let by_lower: HashMap<String, &str> = declared
        .iter()
        .map(|name| (name.to_lowercase(), name.as_str()))
        .collect();

    let remapped: Map<String, Value> = fields
        .into_iter()
        .map(|(key, v)| match by_lower.get(&key.to_lowercase()) {
            Some(name) => (name.to_string(), v),
            None => (key, v),
        })
        .collect();

    Value::Object(remapped)
}

/// Lower-cases every top-level key. Non-object values are returned as-is.
pub fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, v)| (key.to_lowercase(), v))
                .collect(),
        ),
        other => other,
    }
}
