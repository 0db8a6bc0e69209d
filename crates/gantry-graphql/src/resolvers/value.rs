//! Conversions between JSON item envelopes and GraphQL values.

use async_graphql::{Name, Number, Value};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Convert a serde_json::Value to async_graphql::Value.
pub fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (Name::new(k), json_to_graphql_value(v)))
                .collect(),
        ),
    }
}

/// Convert an async_graphql::Value to serde_json::Value.
///
/// Enum values become strings and binary values base64 strings.
pub fn graphql_value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(Number::clone(n)),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Enum(name) => serde_json::Value::String(name.to_string()),
        Value::Binary(bytes) => serde_json::Value::String(STANDARD.encode(bytes)),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(graphql_value_to_json).collect())
        }
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.to_string(), graphql_value_to_json(v)))
                .collect(),
        ),
    }
}
