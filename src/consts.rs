//! Project-wide constants.

use std::time::Duration;

/// Region used when neither `REGION_NAME` nor `AWS_REGION` is set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Hosted model invoked when `MODEL_ID` is not set.
pub const DEFAULT_MODEL: &str = "anthropic.claude-3-5-haiku-20241022-v1:0";

/// Messages API version tag expected by the hosted Claude models.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Upper bound on generated tokens per analysis.
pub const MAX_TOKENS: u32 = 1000;

/// Below this much remaining budget the handler refuses to call the model.
pub const MIN_REMAINING_MS: u64 = 15_000;

/// Budget kept back from the model call to format and return the envelope.
pub const RESPONSE_RESERVE_MS: u64 = 2_000;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Total attempts (first try included) for transient remote failures.
pub const MAX_ATTEMPTS: u32 = 2;
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Title used when the event does not carry one.
pub const DEFAULT_TITLE: &str = "Tarefa Sem Título";

/// Request id reported when there is no hosting runtime.
pub const LOCAL_REQUEST_ID: &str = "local-debug-id";

/// Remaining budget reported when there is no hosting runtime.
pub const LOCAL_REMAINING_MS: u64 = 90_000;

// Configuration keys.
pub const ENV_REGION: &str = "REGION_NAME";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_MODEL_ID: &str = "MODEL_ID";
pub const ENV_API_KEY: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const ENV_ENDPOINT: &str = "BEDROCK_ENDPOINT_URL";

/// Round seconds to two decimals for response metadata.
pub fn round_seconds(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
