//! Transcript classification against a remote language model.
//!
//! This crate provides:
//! - [`ChatBackend`]: one JSON-mode chat completion (the remote boundary)
//! - [`AzureOpenAiClient`]: the Azure OpenAI implementation
//! - [`classify_chunk`]: prompt, single call, and validated parsing for one chunk

mod azure;
pub mod prompt;
pub mod response;

use async_trait::async_trait;
use tracing::{debug, instrument};

use transcoder_shared::{QuoteMatch, Result};

pub use azure::AzureOpenAiClient;
pub use response::parse_matches;

/// A chat model that answers with a JSON object.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one system + user exchange and return the raw message content.
    ///
    /// Transport and service failures map to
    /// [`TranscoderError::ClassificationService`](transcoder_shared::TranscoderError).
    async fn complete_json(&self, system: &str, user: &str) -> Result<String>;
}

/// Code one chunk of transcript text.
///
/// Calls the backend exactly once; any failure aborts without partial output.
#[instrument(skip_all, fields(chars = chunk.chars().count()))]
pub async fn classify_chunk(backend: &dyn ChatBackend, chunk: &str) -> Result<Vec<QuoteMatch>> {
    let system = prompt::system_prompt();
    let user = prompt::user_prompt(chunk);

    let raw = backend.complete_json(&system, &user).await?;
    let matches = parse_matches(&raw)?;

    debug!(matches = matches.len(), "chunk classified");
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use transcoder_shared::{Category, TranscoderError};

    use super::*;

    /// Records every exchange and replies with a fixed payload.
    struct Recording {
        reply: std::result::Result<String, String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatBackend for Recording {
        async fn complete_json(&self, system: &str, user: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.reply
                .clone()
                .map_err(TranscoderError::classification)
        }
    }

    #[tokio::test]
    async fn classify_chunk_sends_prompts_once() {
        let backend = Recording {
            reply: Ok(r#"{"matches":[{"category":"f","quotes":["next time"]}]}"#.into()),
            seen: Mutex::new(Vec::new()),
        };

        let matches = classify_chunk(&backend, "We would change it next time.").await.unwrap();
        assert_eq!(matches, vec![QuoteMatch::new(Category::F, "next time")]);

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.contains("Return JSON"));
        assert!(seen[0].1.ends_with("We would change it next time."));
    }

    #[tokio::test]
    async fn classify_chunk_propagates_service_error() {
        let backend = Recording {
            reply: Err("connection refused".into()),
            seen: Mutex::new(Vec::new()),
        };

        let err = classify_chunk(&backend, "text").await.unwrap_err();
        assert!(matches!(err, TranscoderError::ClassificationService { .. }));
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn classify_chunk_rejects_prose_reply() {
        let backend = Recording {
            reply: Ok("I could not find any quotes.".into()),
            seen: Mutex::new(Vec::new()),
        };

        let err = classify_chunk(&backend, "text").await.unwrap_err();
        assert!(matches!(err, TranscoderError::MalformedResponse { .. }));
    }
}
