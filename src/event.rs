//! Incoming event normalization.
//!
//! Events arrive either as the task itself (`{"title", "description"}`),
//! wrapped by a gateway with the task JSON-encoded in a `body` string, or
//! with `body` already decoded into an object.

use serde_json::{Map, Value};
use tracing::warn;

use crate::consts::DEFAULT_TITLE;

/// The task extracted from an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub title: String,
    pub description: String,
}

impl Task {
    /// Pull `title` and `description` out of a payload, defaulting missing
    /// ones to the placeholder title and an empty description.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            title: text_field(payload, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: text_field(payload, "description").unwrap_or_default(),
        }
    }

    pub fn from_event(event: &Value) -> Self {
        Self::from_payload(&parse_event_body(event))
    }
}

/// Extract the payload mapping from an event. Never fails: anything that
/// cannot be read as a mapping yields an empty one.
pub fn parse_event_body(event: &Value) -> Map<String, Value> {
    let Some(object) = event.as_object() else {
        warn!("event is not a JSON object, using defaults");
        return Map::new();
    };

    match object.get("body") {
        None => object.clone(),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(payload)) => payload,
            Ok(_) => {
                warn!("event body decoded to a non-object, using defaults");
                Map::new()
            }
            Err(e) => {
                warn!(error = %e, "could not decode event body as JSON");
                Map::new()
            }
        },
        Some(Value::Object(payload)) => payload.clone(),
        Some(_) => {
            warn!("event body is neither a string nor an object, using defaults");
            Map::new()
        }
    }
}

fn text_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected() -> Task {
        Task {
            title: "Plan launch".to_string(),
            description: "Draft outline".to_string(),
        }
    }

    #[test]
    fn flat_event() {
        let event = json!({"title": "Plan launch", "description": "Draft outline"});
        assert_eq!(Task::from_event(&event), expected());
    }

    #[test]
    fn string_body_event() {
        let event = json!({
            "body": "{\"title\": \"Plan launch\", \"description\": \"Draft outline\"}",
            "headers": {"content-type": "application/json"}
        });
        assert_eq!(Task::from_event(&event), expected());
    }

    #[test]
    fn object_body_event() {
        let event = json!({"body": {"title": "Plan launch", "description": "Draft outline"}});
        assert_eq!(Task::from_event(&event), expected());
    }

    #[test]
    fn undecodable_body_yields_empty_map() {
        let event = json!({"body": "{not json"});
        assert!(parse_event_body(&event).is_empty());
    }

    #[test]
    fn undecodable_body_falls_back_to_defaults() {
        let task = Task::from_event(&json!({"body": "title=x"}));
        assert_eq!(task.title, DEFAULT_TITLE);
        assert_eq!(task.description, "");
    }

    #[test]
    fn body_decoding_to_array_yields_empty_map() {
        assert!(parse_event_body(&json!({"body": "[1, 2]"})).is_empty());
    }

    #[test]
    fn null_body_yields_empty_map() {
        assert!(parse_event_body(&json!({"body": null})).is_empty());
    }

    #[test]
    fn non_object_event_yields_empty_map() {
        assert!(parse_event_body(&json!("just a string")).is_empty());
        assert!(parse_event_body(&json!(42)).is_empty());
    }

    #[test]
    fn empty_event_uses_defaults() {
        let task = Task::from_event(&json!({}));
        assert_eq!(task.title, "Tarefa Sem Título");
        assert_eq!(task.description, "");
    }

    #[test]
    fn unrelated_fields_are_ignored() {
        let task = Task::from_event(&json!({"title": "A", "priority": "high"}));
        assert_eq!(task.title, "A");
        assert_eq!(task.description, "");
    }

    #[test]
    fn null_fields_use_defaults() {
        let task = Task::from_event(&json!({"title": null, "description": null}));
        assert_eq!(task.title, DEFAULT_TITLE);
        assert_eq!(task.description, "");
    }

    #[test]
    fn non_string_fields_are_stringified() {
        let task = Task::from_event(&json!({"title": 7, "description": true}));
        assert_eq!(task.title, "7");
        assert_eq!(task.description, "true");
    }

    #[test]
    fn unicode_survives_string_body() {
        let event = json!({"body": "{\"title\": \"Revisão do orçamento\"}"});
        assert_eq!(Task::from_event(&event).title, "Revisão do orçamento");
    }
}
