//! Error types for Transcoder.
//!
//! Library crates use [`TranscoderError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Guidance appended to every failed classification call.
const SERVICE_GUIDANCE: &str =
    "Please confirm your endpoint, deployment name, API version, and key.";

/// Longest raw payload excerpt rendered in an error message.
const RAW_PREVIEW_CHARS: usize = 500;

/// Top-level error type for all Transcoder operations.
#[derive(Debug, thiserror::Error)]
pub enum TranscoderError {
    /// Service configuration is missing or malformed.
    #[error("config error: {message}")]
    Config { message: String },

    /// The source document has no extractable text.
    #[error("no text found in the document")]
    EmptyDocument,

    /// The remote classification call itself failed (network, auth, quota).
    #[error("Azure OpenAI call failed: {message}. {}", SERVICE_GUIDANCE)]
    ClassificationService { message: String },

    /// The service answered, but the payload could not be decoded.
    #[error("model response was not valid JSON ({reason}): {}", preview(.raw))]
    MalformedResponse { reason: String, raw: String },

    /// The document container could not be read or written.
    #[error("document error: {0}")]
    Document(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid caller input.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TranscoderError>;

impl TranscoderError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a classification service error from any displayable message.
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::ClassificationService {
            message: msg.into(),
        }
    }

    /// Create a malformed-response error, keeping the raw payload.
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= RAW_PREVIEW_CHARS {
        return raw.to_string();
    }
    let head: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TranscoderError::config("missing AZURE_OPENAI_API_KEY");
        assert_eq!(err.to_string(), "config error: missing AZURE_OPENAI_API_KEY");

        let err = TranscoderError::validation("max_chars must be positive");
        assert!(err.to_string().contains("max_chars"));
    }

    #[test]
    fn classification_error_carries_guidance() {
        let err = TranscoderError::classification("HTTP 401 Unauthorized");
        let msg = err.to_string();
        assert!(msg.contains("HTTP 401"));
        assert!(msg.contains("deployment name"));
    }

    #[test]
    fn malformed_response_keeps_raw_payload() {
        let raw = "not json at all";
        let err = TranscoderError::malformed("expected value", raw);
        assert!(err.to_string().contains(raw));
        match err {
            TranscoderError::MalformedResponse { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn malformed_response_display_is_truncated() {
        let raw = "x".repeat(2_000);
        let err = TranscoderError::malformed("eof", raw);
        assert!(err.to_string().len() < 700);
    }
}
