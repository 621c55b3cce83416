//! Canonical JSON: sorted object keys, no whitespace.
//!
//! Deterministic regardless of key insertion order, so two encoders that
//! agree on the field values always agree on the bytes.

use serde_json::Value;

use crate::error::CryptoError;

/// Canonical JSON serialization of `value`.
pub fn canonical_json(value: &Value) -> Result<String, CryptoError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        Value::Number(n) => {
            if n.as_f64().is_some_and(|f| !f.is_finite()) {
                return Err(CryptoError::MalformedInput(
                    "non-finite number is not representable in JSON".into(),
                ));
            }
            Ok(n.to_string())
        }
        Value::String(s) => encode_string(s),
        Value::Array(arr) => {
            let items: Result<Vec<String>, _> = arr.iter().map(canonical_json).collect();
            Ok(format!("[{}]", items?.join(",")))
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            let pairs: Result<Vec<String>, CryptoError> = keys
                .iter()
                .map(|k| Ok(format!("{}:{}", encode_string(k)?, canonical_json(&obj[*k])?)))
                .collect();
            Ok(format!("{{{}}}", pairs?.join(",")))
        }
    }
}

fn encode_string(s: &str) -> Result<String, CryptoError> {
    serde_json::to_string(s).map_err(|e| CryptoError::MalformedInput(e.to_string()))
}
