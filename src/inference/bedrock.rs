use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::warn;

use super::{InvokeModelRequest, ModelClient};
use crate::config::Config;
use crate::consts::{CONNECT_TIMEOUT, ENV_API_KEY, MAX_ATTEMPTS, READ_TIMEOUT, RETRY_BASE_DELAY};
use crate::error::{Error, Result};

const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// How transient failures are retried inside a single invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: RETRY_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Backoff before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Client for the hosted model runtime's `InvokeModel` operation.
pub struct BedrockClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    retry: RetryPolicy,
}

impl BedrockClient {
    /// Build a client from configuration. Fails when credentials are missing
    /// or the endpoint is not a usable URL.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::ClientConstruction(format!(
                "no inference credentials found. Set {ENV_API_KEY}."
            ))
        })?;

        let endpoint_url = config.endpoint_url();
        let endpoint = Url::parse(&endpoint_url).map_err(|e| {
            Error::ClientConstruction(format!("invalid endpoint {endpoint_url}: {e}"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::ClientConstruction(format!(
                "invalid endpoint {endpoint_url}: not a base URL"
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| Error::ClientConstruction(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            retry: RetryPolicy::default(),
        })
    }

    /// Use a caller-built HTTP client (custom proxy or TLS settings).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `{endpoint}/model/{model_id}/invoke`, with the model id kept as a
    /// single path segment.
    pub fn invoke_url(&self, model_id: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| Error::ClientConstruction("endpoint cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("model")
            .push(model_id)
            .push("invoke");
        Ok(url)
    }

    async fn send_with_retry(&self, url: &Url, request: &InvokeModelRequest) -> Result<Vec<u8>> {
        let mut attempt = 1;
        loop {
            match self.send_once(url, request).await {
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient model invocation failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(&self, url: &Url, request: &InvokeModelRequest) -> Result<Vec<u8>> {
        let resp = self
            .http
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, &request.content_type)
            .header(ACCEPT, &request.accept)
            .body(request.body.clone())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let kind = resp
                .headers()
                .get(ERROR_TYPE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(error_type_name);
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: Some(status.as_u16()),
                kind,
                message: error_message(&text),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn invoke_model(&self, request: InvokeModelRequest) -> Result<Vec<u8>> {
        let url = self.invoke_url(&request.model_id)?;
        match tokio::time::timeout(request.timeout, self.send_with_retry(&url, &request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Remote {
                status: None,
                kind: None,
                message: format!(
                    "no response within the {}ms call budget",
                    request.timeout.as_millis()
                ),
            }),
        }
    }
}

/// `ThrottlingException:http://internal.amazon.com/...` → `ThrottlingException`.
fn error_type_name(header: &str) -> String {
    header.split(':').next().unwrap_or(header).trim().to_string()
}

/// The service's `message` field when the body is a JSON error, else the raw text.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("Message"))
            .and_then(|m| m.as_str())
    });
    match message {
        Some(m) => m.to_string(),
        None if body.trim().is_empty() => "empty error response".to_string(),
        None => body.trim().to_string(),
    }
}
