//! Standalone invocation for trying the handler from a terminal.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::context::LocalContext;
use crate::handler::Handler;
use crate::inference::ModelClient;
use crate::response::Envelope;

/// One local run: either an event file or a title/description pair.
#[derive(Debug, Clone)]
pub struct LocalRun {
    pub event: Option<PathBuf>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub request_id: String,
    pub remaining_ms: u64,
}

impl LocalRun {
    /// The event to feed the handler. An event file wins over flags.
    pub fn build_event(&self) -> Result<Value> {
        if let Some(path) = &self.event {
            return load_event(path);
        }
        let mut event = json!({});
        if let Some(title) = &self.title {
            event["title"] = json!(title);
        }
        if let Some(description) = &self.description {
            event["description"] = json!(description);
        }
        Ok(event)
    }

    pub async fn execute<C: ModelClient>(&self, handler: &Handler<C>) -> Result<Envelope> {
        let event = self.build_event()?;
        let ctx = LocalContext::new(self.request_id.clone(), self.remaining_ms);
        Ok(handler.handle(&event, &ctx).await)
    }
}

pub fn load_event(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("event file {} is not valid JSON", path.display()))
}

/// Render an envelope for the terminal: status line, then the body
/// pretty-printed when it is JSON.
pub fn render(envelope: &Envelope) -> String {
    let body = serde_json::from_str::<Value>(&envelope.body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| envelope.body.clone());
    format!("status: {}\n{}", envelope.status_code, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientCache;
    use crate::config::Config;
    use crate::inference::mock::MockModelClient;

    fn run() -> LocalRun {
        LocalRun {
            event: None,
            title: Some("Teste Local Jarvis".to_string()),
            description: Some("Verificando integridade.".to_string()),
            request_id: "local-dev-123".to_string(),
            remaining_ms: 30_000,
        }
    }

    #[test]
    fn event_from_flags() {
        let event = run().build_event().unwrap();
        assert_eq!(
            event,
            json!({"title": "Teste Local Jarvis", "description": "Verificando integridade."})
        );
    }

    #[test]
    fn event_without_flags_is_empty_object() {
        let local = LocalRun {
            title: None,
            description: None,
            ..run()
        };
        assert_eq!(local.build_event().unwrap(), json!({}));
    }

    #[test]
    fn event_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"body": "{\"title\": \"from file\"}"}"#).unwrap();

        let local = LocalRun {
            event: Some(path),
            ..run()
        };
        assert_eq!(
            local.build_event().unwrap(),
            json!({"body": "{\"title\": \"from file\"}"})
        );
    }

    #[test]
    fn missing_event_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_event(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read event file"));
    }

    #[test]
    fn invalid_event_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{oops").unwrap();
        let err = load_event(&path).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn render_pretty_prints_json_body() {
        let envelope = crate::response::format_response(200, &json!({"task": "Revisão"}));
        let out = render(&envelope);
        assert!(out.starts_with("status: 200\n"));
        assert!(out.contains("\"task\": \"Revisão\""));
    }

    #[tokio::test]
    async fn execute_uses_local_context() {
        let mock = MockModelClient::with_text("Estimativa: 1h.");
        let factory_mock = mock.clone();
        let handler = Handler::new(
            Config::default(),
            ClientCache::new(move || Ok(factory_mock.clone())),
        );

        let envelope = run().execute(&handler).await.unwrap();
        assert_eq!(envelope.status_code, 200);
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["metadata"]["request_id"], "local-dev-123");
        assert_eq!(body["analysis"], "Estimativa: 1h.");
    }
}
