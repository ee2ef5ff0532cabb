//! Pre-flight deadline gate.
//!
//! The gate cannot interrupt a call that is already in flight, so it only
//! decides whether to start one, and how long that call may run.

use std::time::Duration;

use tracing::warn;

use crate::consts::{MIN_REMAINING_MS, READ_TIMEOUT, RESPONSE_RESERVE_MS};
use crate::context::ExecutionContext;
use crate::error::{Error, Result};

/// Refuse to proceed when less than `min_remaining_ms` is left.
/// Returns the remaining budget on success.
pub fn check(ctx: &dyn ExecutionContext, min_remaining_ms: u64) -> Result<u64> {
    let remaining_ms = ctx.remaining_millis();
    if remaining_ms < min_remaining_ms {
        warn!(
            request_id = ctx.request_id(),
            remaining_ms, "timeout imminent, aborting inference"
        );
        return Err(Error::Timeout {
            remaining_ms,
            required_ms: min_remaining_ms,
        });
    }
    Ok(remaining_ms)
}

/// [`check`] with the default threshold.
pub fn check_default(ctx: &dyn ExecutionContext) -> Result<u64> {
    check(ctx, MIN_REMAINING_MS)
}

/// How long the model call may run given the remaining budget: never past
/// the read timeout, and never into the reserve kept for the response.
pub fn call_budget(remaining_ms: u64) -> Duration {
    let usable = Duration::from_millis(remaining_ms.saturating_sub(RESPONSE_RESERVE_MS));
    usable.min(READ_TIMEOUT)
}
