pub mod bedrock;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::consts::{ANTHROPIC_VERSION, MAX_TOKENS};
use crate::error::{Error, Result};
use crate::event::Task;
use crate::prompts::analysis::{build_system_prompt, build_user_message};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One "invoke model" call as the provider sees it.
#[derive(Debug, Clone)]
pub struct InvokeModelRequest {
    pub model_id: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub accept: String,
    /// Upper bound for the whole call, retries included.
    pub timeout: Duration,
}

/// The remote inference service. Could be the hosted endpoint or a test script.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Issue one model invocation and return the raw response body.
    async fn invoke_model(&self, request: InvokeModelRequest) -> Result<Vec<u8>>;
}

/// Token usage reported by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// What a successful invocation yields.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub stop_reason: Option<String>,
}

/// Ask the model to analyze a task and extract the first content block's text.
pub async fn invoke<C>(client: &C, model_id: &str, task: &Task, timeout: Duration) -> Result<Analysis>
where
    C: ModelClient + ?Sized,
{
    let system = build_system_prompt();
    let content = build_user_message(&task.title, &task.description);
    let body = build_request_body(&system, &content)?;

    info!(model = model_id, "invoking model");

    let raw = client
        .invoke_model(InvokeModelRequest {
            model_id: model_id.to_string(),
            body,
            content_type: JSON_CONTENT_TYPE.to_string(),
            accept: JSON_CONTENT_TYPE.to_string(),
            timeout,
        })
        .await?;

    let analysis = parse_response(&raw)?;

    if let Some(usage) = analysis.usage {
        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            stop_reason = analysis.stop_reason.as_deref().unwrap_or("unknown"),
            "model usage"
        );
    }

    Ok(analysis)
}

fn build_request_body(system: &str, content: &str) -> Result<Vec<u8>> {
    let request = ApiRequest {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens: MAX_TOKENS,
        system,
        messages: [Message {
            role: "user",
            content,
        }],
        temperature: 0.0,
    };
    serde_json::to_vec(&request).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a raw response body. An absent or empty `content` sequence is an
/// error, never an empty analysis.
fn parse_response(raw: &[u8]) -> Result<Analysis> {
    let response: ApiResponse = serde_json::from_slice(raw)
        .map_err(|e| Error::MalformedResponse(format!("response body is not valid JSON: {e}")))?;

    let first = response
        .content
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("model response was empty".to_string()))?;

    let text = first.text.ok_or_else(|| {
        Error::MalformedResponse(format!(
            "first content block has no text (type: {})",
            first.block_type.as_deref().unwrap_or("unknown")
        ))
    })?;

    Ok(Analysis {
        text,
        usage: response.usage,
        stop_reason: response.stop_reason,
    })
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<TokenUsage>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: Option<String>,
    text: Option<String>,
}
