//! Uniform response envelope returned for every invocation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERROR: u16 = 500;

/// Status, headers, and a JSON-encoded body, in the gateway proxy shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub task: String,
    pub analysis: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub duration_seconds: f64,
    pub request_id: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub request_id: String,
}

/// Wrap a body into an envelope. Non-ASCII text is kept verbatim.
pub fn format_response<T: Serialize>(status_code: u16, body: &T) -> Envelope {
    let body = serde_json::to_string(body).unwrap_or_else(|e| {
        serde_json::json!({
            "error": format!("failed to serialize response body: {e}"),
            "type": "SerializationError",
        })
        .to_string()
    });

    Envelope {
        status_code,
        headers: default_headers(),
        body,
    }
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn envelope_shape() {
        let envelope = format_response(STATUS_OK, &json!({"a": 1}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        assert_eq!(value["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(value["body"], r#"{"a":1}"#);
    }

    #[test]
    fn unicode_is_not_escaped() {
        let envelope = format_response(STATUS_OK, &json!({"task": "Revisão ✓"}));
        assert!(envelope.body.contains("Revisão ✓"));
        assert!(!envelope.body.contains("\\u"));
    }

    #[test]
    fn formatting_is_idempotent() {
        let body = ErrorBody {
            error: "boom".to_string(),
            kind: "TimeoutError".to_string(),
            request_id: "r".to_string(),
        };
        let a = serde_json::to_string(&format_response(STATUS_ERROR, &body)).unwrap();
        let b = serde_json::to_string(&format_response(STATUS_ERROR, &body)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn error_body_uses_type_key() {
        let envelope = format_response(
            STATUS_ERROR,
            &ErrorBody {
                error: "boom".to_string(),
                kind: "RemoteCallError".to_string(),
                request_id: "req-9".to_string(),
            },
        );
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(
            body,
            json!({"error": "boom", "type": "RemoteCallError", "request_id": "req-9"})
        );
    }

    #[test]
    fn unserializable_body_degrades_to_error_json() {
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], "x");
        let envelope = format_response(STATUS_OK, &bad);
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["type"], "SerializationError");
    }
}
