//! What the hosting environment tells us about the current invocation.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::consts::{LOCAL_REMAINING_MS, LOCAL_REQUEST_ID};

/// Read-only view of one invocation's execution context.
pub trait ExecutionContext: Send + Sync {
    fn request_id(&self) -> &str;

    /// Milliseconds left before the host forcibly terminates the invocation.
    fn remaining_millis(&self) -> u64;
}

/// Context for standalone runs and tests: fixed id, fixed budget.
#[derive(Debug, Clone)]
pub struct LocalContext {
    request_id: String,
    remaining_ms: u64,
}

impl LocalContext {
    pub fn new(request_id: impl Into<String>, remaining_ms: u64) -> Self {
        Self {
            request_id: request_id.into(),
            remaining_ms,
        }
    }
}

impl Default for LocalContext {
    fn default() -> Self {
        Self::new(LOCAL_REQUEST_ID, LOCAL_REMAINING_MS)
    }
}

impl ExecutionContext for LocalContext {
    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn remaining_millis(&self) -> u64 {
        self.remaining_ms
    }
}

/// Context backed by the function runtime's deadline.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    request_id: String,
    /// Deadline in milliseconds since the Unix epoch.
    deadline_ms: u64,
}

impl RuntimeContext {
    pub fn new(request_id: impl Into<String>, deadline_ms: u64) -> Self {
        Self {
            request_id: request_id.into(),
            deadline_ms,
        }
    }

    fn remaining_at(&self, now_ms: u64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms)
    }
}

impl From<&lambda_runtime::Context> for RuntimeContext {
    fn from(ctx: &lambda_runtime::Context) -> Self {
        let request_id = if ctx.request_id.is_empty() {
            LOCAL_REQUEST_ID.to_string()
        } else {
            ctx.request_id.clone()
        };
        Self::new(request_id, ctx.deadline)
    }
}

impl ExecutionContext for RuntimeContext {
    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn remaining_millis(&self) -> u64 {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.remaining_at(now_ms)
    }
}
