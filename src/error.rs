//! Error types for photostudio.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading, editing, or saving an image.
#[derive(Debug, Error)]
pub enum EditError {
    /// The input is not something we can edit: a non-image file, an empty
    /// instruction, or a missing image.
    #[error("Invalid input: {0}")]
    InvalidInputKind(String),

    /// The source image could not be read from disk.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailure {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The remote editing service failed.
    #[error("Gemini API error: {0}")]
    Adapter(#[from] AdapterError),

    /// The service answered but returned neither an image nor text.
    #[error("API response did not contain an image or text{}", reason_suffix(.reason.as_deref()))]
    EmptyResponse {
        /// Block or finish reason reported by the service, if any.
        reason: Option<String>,
    },

    /// An edit is already in flight for this session.
    #[error("An edit is already in progress")]
    Busy,

    /// No API key configured.
    #[error("No Gemini API key. Set {env_var} or add it to the config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O error occurred while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),
}

/// Transport and service failures from the remote editing API.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The API returned a non-success status.
    #[error("({status}) {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body or message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The reply could not be understood.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// A failure replayed from a cassette.
    #[error("{0}")]
    Replayed(String),
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(" ({r})")).unwrap_or_default()
}

/// Cassette form of an [`EditError`], keeping enough to rebuild the variant
/// the caller branches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    /// Variant tag: `invalid_input`, `empty_response`, or `adapter`.
    pub kind: String,
    /// Detail: the invalid-input message, the empty-response reason, or
    /// the displayed adapter error.
    #[serde(default)]
    pub message: String,
}

impl From<&EditError> for RecordedError {
    fn from(err: &EditError) -> Self {
        let (kind, message) = match err {
            EditError::InvalidInputKind(msg) => ("invalid_input", msg.clone()),
            EditError::EmptyResponse { reason } => {
                ("empty_response", reason.clone().unwrap_or_default())
            }
            EditError::Adapter(inner) => ("adapter", inner.to_string()),
            other => ("adapter", other.to_string()),
        };
        Self { kind: kind.to_string(), message }
    }
}

impl From<RecordedError> for EditError {
    fn from(recorded: RecordedError) -> Self {
        match recorded.kind.as_str() {
            "invalid_input" => EditError::InvalidInputKind(recorded.message),
            "empty_response" => EditError::EmptyResponse {
                reason: Some(recorded.message).filter(|m| !m.is_empty()),
            },
            _ => EditError::Adapter(AdapterError::Replayed(recorded.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_error_carries_prefix() {
        let err = EditError::from(AdapterError::Api { status: 500, message: "boom".into() });
        assert_eq!(err.to_string(), "Gemini API error: (500) boom");
    }

    #[test]
    fn empty_response_with_reason() {
        let err = EditError::EmptyResponse { reason: Some("SAFETY".into()) };
        assert_eq!(err.to_string(), "API response did not contain an image or text (SAFETY)");

        let err = EditError::EmptyResponse { reason: None };
        assert_eq!(err.to_string(), "API response did not contain an image or text");
    }

    #[test]
    fn recorded_error_keeps_variant() {
        let recorded = RecordedError::from(&EditError::EmptyResponse { reason: Some("SAFETY".into()) });
        assert_eq!(recorded.kind, "empty_response");
        assert!(matches!(
            EditError::from(recorded),
            EditError::EmptyResponse { reason: Some(r) } if r == "SAFETY"
        ));

        let recorded = RecordedError::from(&EditError::EmptyResponse { reason: None });
        assert!(matches!(EditError::from(recorded), EditError::EmptyResponse { reason: None }));

        let recorded = RecordedError::from(&EditError::InvalidInputKind("blank".into()));
        assert!(matches!(EditError::from(recorded), EditError::InvalidInputKind(m) if m == "blank"));
    }

    #[test]
    fn recorded_adapter_error_replays_as_adapter() {
        let original = EditError::from(AdapterError::Api { status: 503, message: "overloaded".into() });
        let recorded = RecordedError::from(&original);
        assert_eq!(recorded.kind, "adapter");
        assert_eq!(recorded.message, "(503) overloaded");

        let replayed = EditError::from(recorded);
        assert!(matches!(replayed, EditError::Adapter(AdapterError::Replayed(_))));
        assert_eq!(replayed.to_string(), original.to_string());
    }
}
