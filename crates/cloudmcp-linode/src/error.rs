//! Error types for the Linode client.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`LinodeClient`](crate::LinodeClient).
#[derive(Debug, Error)]
pub enum LinodeError {
    /// The client was built without a token.
    #[error("missing API token")]
    MissingToken,

    /// The base URL could not be used.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// An identifier cannot be placed in a request path.
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: &'static str },

    /// Transport-level failure (connection refused, TLS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LinodeError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            LinodeError::Api { status, .. } => Some(*status),
            LinodeError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Build an API error from a status and the raw error body.
    ///
    /// Linode reports errors as `{"errors": [{"reason": "...", "field": "..."}]}`;
    /// anything else is passed through verbatim.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => parsed
                .errors
                .iter()
                .map(|e| match &e.field {
                    Some(field) => format!("{field}: {}", e.reason),
                    None => e.reason.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            _ if body.trim().is_empty() => "no error details".to_string(),
            _ => body.trim().to_string(),
        };
        LinodeError::Api { status, message }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ErrorReason {
    reason: String,
    #[serde(default)]
    field: Option<String>,
}
