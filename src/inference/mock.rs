use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{InvokeModelRequest, ModelClient};
use crate::error::{Error, Result};

/// A scripted model client for tests. Returns pre-defined replies in order
/// and records every request it receives. Clones share the same script.
#[derive(Clone, Default)]
pub struct MockModelClient {
    replies: Arc<Mutex<VecDeque<Result<String>>>>,
    requests: Arc<Mutex<Vec<InvokeModelRequest>>>,
}

impl MockModelClient {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with a single text content block.
    pub fn with_text(text: &str) -> Self {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 34}
        });
        Self::new(vec![Ok(body.to_string())])
    }

    pub fn requests(&self) -> Vec<InvokeModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn invoke_model(&self, request: InvokeModelRequest) -> Result<Vec<u8>> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Internal(format!("MockModelClient: no more replies (called {call} times)")))?;
        reply.map(String::into_bytes)
    }
}
