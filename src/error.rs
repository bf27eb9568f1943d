//! Error types shared across the request pipeline.
//!
//! The pipeline distinguishes three families of failure:
//!
//! - [`AuthError`] - no login strategy produced a session, or the session could
//!   not grant the scopes a bearer token needs. Always fatal.
//! - [`ApiError`] - the service answered with an error payload or a body that is
//!   not JSON. The API client retries these and hands the payload back as data;
//!   only the layers above decide to turn one into a hard failure.
//! - [`DownloadError`] - raised by the track download collaborator and
//!   propagated untouched through the orchestrator loops.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// One failed login strategy, kept for diagnostics.
#[derive(Debug)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    pub error: AuthError,
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("stored credentials are unusable: {0}")]
    InvalidCredentials(String),

    #[error("credential grant rejected: {0}")]
    GrantRejected(String),

    #[error("session is missing required scopes: {}", .0.join(", "))]
    MissingScopes(Vec<String>),

    #[error("authorization flow failed: {0}")]
    Authorization(String),

    #[error("authorization flow timed out after {0} seconds")]
    Timeout(u64),

    #[error("network error during authentication: {0}")]
    Network(#[from] reqwest::Error),

    #[error("no login strategy succeeded ({})", format_failures(.0))]
    NoStrategySucceeded(Vec<StrategyFailure>),
}

fn format_failures(failures: &[StrategyFailure]) -> String {
    if failures.is_empty() {
        return "none attempted".to_string();
    }
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// An error payload returned by the catalog service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Spotify API Error ({status}): {message}")]
pub struct ApiError {
    pub status: String,
    pub message: String,
}

impl ApiError {
    /// Reads the `error` member of a response body.
    ///
    /// Returns `None` when the body carries no `error` key. Both the object form
    /// (`{"status": 404, "message": "..."}`) and the bare string form used by
    /// the accounts service are understood.
    pub fn from_payload(json: &Value) -> Option<Self> {
        let error = json.get("error")?;
        let (status, message) = match error {
            Value::Object(map) => (
                map.get("status").map(value_to_string),
                map.get("message").map(value_to_string),
            ),
            other => (None, Some(value_to_string(other))),
        };

        Some(Self {
            status: status.unwrap_or_else(|| "unknown".to_string()),
            message: message.unwrap_or_else(|| "no message".to_string()),
        })
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("track {track_id} is unavailable: {reason}")]
    Unavailable { track_id: String, reason: String },

    #[error("track {track_id}: {source}")]
    Api {
        track_id: String,
        #[source]
        source: ApiError,
    },

    #[error("transfer failed: {0}")]
    Transfer(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("cannot load environment file {path}: {reason}")]
    EnvFile { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode credentials for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Crate-wide error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}
