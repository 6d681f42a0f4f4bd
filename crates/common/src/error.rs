//! Error types for vyconsole

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the console Error
pub type Result<T> = std::result::Result<T, Error>;

/// Structured payload for a non-success backend response.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub status_text: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    /// Build from a status line and whatever body the backend sent.
    ///
    /// The message is taken from the first string among `message`, `detail`
    /// and `error`; otherwise one is synthesized from the status line.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let data = serde_json::from_str::<serde_json::Value>(body).ok();

        let message = data
            .as_ref()
            .and_then(|d| {
                ["message", "detail", "error"]
                    .iter()
                    .find_map(|key| d.get(*key).and_then(|v| v.as_str()))
            })
            .map(String::from)
            .unwrap_or_else(|| {
                format!("Request failed with status {} {}", status.as_u16(), status_text)
                    .trim_end()
                    .to_string()
            });

        Self {
            status: status.as_u16(),
            status_text,
            message,
            data,
        }
    }
}

/// Failures of a single backend call.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Status(ApiError),

    #[error("Failed to parse response from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl ClientError {
    /// HTTP status of a `Status` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status(e) => Some(e.status),
            _ => None,
        }
    }

    /// Message suitable for an inline banner or toast.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status(e) => e.message.clone(),
            ClientError::Transport { .. } => "Unable to reach the backend".to_string(),
            other => other.to_string(),
        }
    }
}

/// vyconsole error types
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("No active instance; connect to an instance first")]
    NoActiveInstance,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Message shown to the operator when a workflow fails.
    pub fn user_message(&self) -> String {
        match self {
            Error::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
