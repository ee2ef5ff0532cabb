//! Failure kinds of a single invocation.
//!
//! Every step of the pipeline returns [`Result`]; the handler turns any
//! variant into an error envelope labelled with [`Error::kind`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Not enough execution budget left to start a model call.
    #[error("insufficient time for cognitive processing: {remaining_ms}ms remaining, {required_ms}ms required")]
    Timeout { remaining_ms: u64, required_ms: u64 },

    /// The remote client could not be built (bad config, missing credentials).
    #[error("failed to create inference client: {0}")]
    ClientConstruction(String),

    /// Transport or service-side failure from the inference provider.
    #[error("model invocation failed{}: {message}", status_suffix(.status))]
    Remote {
        status: Option<u16>,
        kind: Option<String>,
        message: String,
    },

    /// The provider answered, but not with a usable content block.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A panic or other fault that escaped the pipeline steps.
    #[error("internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl Error {
    /// Category label reported in the error envelope's `type` field.
    pub fn kind(&self) -> &str {
        match self {
            Error::Timeout { .. } => "TimeoutError",
            Error::ClientConstruction(_) => "ClientConstructionError",
            Error::Remote { kind: Some(kind), .. } => kind,
            Error::Remote { kind: None, .. } => "RemoteCallError",
            Error::MalformedResponse(_) => "MalformedResponseError",
            Error::Serialization(_) => "SerializationError",
            Error::Internal(_) => "InternalError",
        }
    }

    /// Whether retrying the same remote call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Remote { status: None, .. } => true,
            Error::Remote {
                status: Some(status),
                ..
            } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Remote {
            status: e.status().map(|s| s.as_u16()),
            kind: None,
            message: e.to_string(),
        }
    }
}
