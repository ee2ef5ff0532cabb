//! The invocation pipeline: normalize → gate → invoke → format.
//!
//! [`Handler::handle`] always returns an [`Envelope`]. Every step reports
//! failure through [`Error`], and panics are caught at this boundary, so
//! no fault reaches the hosting runtime.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{error, info};

use crate::client::ClientCache;
use crate::config::Config;
use crate::consts::{MIN_REMAINING_MS, round_seconds};
use crate::context::ExecutionContext;
use crate::deadline;
use crate::error::{Error, Result};
use crate::event::Task;
use crate::inference::bedrock::BedrockClient;
use crate::inference::{self, Analysis, ModelClient};
use crate::response::{
    Envelope, ErrorBody, Metadata, STATUS_ERROR, STATUS_OK, SuccessBody, format_response,
};

pub struct Handler<C> {
    config: Config,
    clients: ClientCache<C>,
    min_remaining_ms: u64,
}

impl Handler<BedrockClient> {
    /// Handler talking to the hosted endpoint described by `config`.
    pub fn bedrock(config: Config) -> Self {
        let clients = ClientCache::bedrock(config.clone());
        Self::new(config, clients)
    }
}

impl<C: ModelClient> Handler<C> {
    pub fn new(config: Config, clients: ClientCache<C>) -> Self {
        Self {
            config,
            clients,
            min_remaining_ms: MIN_REMAINING_MS,
        }
    }

    /// Override the deadline gate threshold.
    pub fn with_min_remaining_ms(mut self, min_remaining_ms: u64) -> Self {
        self.min_remaining_ms = min_remaining_ms;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one invocation end to end.
    pub async fn handle(&self, event: &Value, ctx: &dyn ExecutionContext) -> Envelope {
        let started = Instant::now();
        let request_id = ctx.request_id().to_string();
        info!(request_id = %request_id, "invocation started");

        let outcome = AssertUnwindSafe(self.process(event, ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Error::Internal(panic_message(panic.as_ref()))));

        match outcome {
            Ok((task, analysis)) => {
                let duration_seconds = round_seconds(started.elapsed().as_secs_f64());
                info!(request_id = %request_id, duration_seconds, "invocation succeeded");
                format_response(
                    STATUS_OK,
                    &SuccessBody {
                        task: task.title,
                        analysis: analysis.text,
                        metadata: Metadata {
                            duration_seconds,
                            request_id,
                            model: self.config.model_id.clone(),
                        },
                    },
                )
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    kind = e.kind(),
                    error = ?e,
                    "invocation failed: {e}"
                );
                format_response(
                    STATUS_ERROR,
                    &ErrorBody {
                        error: e.to_string(),
                        kind: e.kind().to_string(),
                        request_id,
                    },
                )
            }
        }
    }

    async fn process(&self, event: &Value, ctx: &dyn ExecutionContext) -> Result<(Task, Analysis)> {
        let task = Task::from_event(event);
        info!(request_id = ctx.request_id(), title = %task.title, "processing task");

        let remaining_ms = deadline::check(ctx, self.min_remaining_ms)?;

        let client = self.clients.get_client().await?;
        let analysis = inference::invoke(
            client.as_ref(),
            &self.config.model_id,
            &task,
            deadline::call_budget(remaining_ms),
        )
        .await?;

        Ok((task, analysis))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
