//! Errors returned by the Resource Manager client.

use serde::Deserialize;
use thiserror::Error;

/// An error from a Resource Manager API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be built.
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or the response could not be read.
    #[error("sending request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("unexpected status {status} with error: {code}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The ARM error code, or the status reason when the body had none.
        code: String,
        /// The ARM error message.
        message: String,
    },

    /// The response body did not match the expected model.
    #[error("unmarshaling response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("building request URL: {0}")]
    Url(#[from] url::ParseError),

    /// A long-running operation reached a terminal state other than success.
    #[error("polling: long-running operation ended with status {status:?}: {message}")]
    OperationFailed {
        /// The terminal status reported by the service.
        status: String,
        /// The error message reported alongside the status.
        message: String,
    },
}

impl ApiError {
    /// Whether the service reported HTTP 404.
    pub fn was_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the service reported HTTP 409.
    pub fn was_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// The HTTP status code, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Build a status error from a response body, decoding the ARM error envelope when present.
    pub(crate) fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error);

        let (code, message) = match detail {
            Some(detail) => (
                detail.code.unwrap_or_else(|| status_reason(status)),
                detail.message.unwrap_or_default(),
            ),
            None => (status_reason(status), String::new()),
        };

        Self::Status {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

fn status_reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(|r| r.replace(' ', ""))
        .unwrap_or_else(|| status.as_u16().to_string())
}

/// The `{"error": {...}}` envelope ARM wraps failures in.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// Code and message of an ARM error.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
