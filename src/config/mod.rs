//! Environment-style configuration.
//!
//! Values are read through a lookup function so tests can feed a plain
//! map instead of mutating the process environment.

use crate::consts::{
    DEFAULT_MODEL, DEFAULT_REGION, ENV_API_KEY, ENV_AWS_REGION, ENV_ENDPOINT, ENV_MODEL_ID,
    ENV_REGION,
};

/// Settings shared by every invocation in the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub region: String,
    pub model_id: String,
    /// Bearer API key for the inference endpoint.
    pub api_key: Option<String>,
    /// Overrides the regional endpoint (private endpoints, tests).
    pub endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL.to_string(),
            api_key: None,
            endpoint: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            region: get(ENV_REGION)
                .or_else(|| get(ENV_AWS_REGION))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            model_id: get(ENV_MODEL_ID).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: get(ENV_API_KEY),
            endpoint: get(ENV_ENDPOINT),
        }
    }

    /// Base URL of the inference service, without a trailing slash.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}
