//! Azure OpenAI chat-completions backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use transcoder_shared::{Result, ServiceConfig, TranscoderError};

use crate::ChatBackend;

/// User-Agent string for classification requests.
const USER_AGENT: &str = concat!("Transcoder/", env!("CARGO_PKG_VERSION"));

/// Longest error-body excerpt kept in a service error.
const ERROR_BODY_CHARS: usize = 300;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat-completions client bound to one Azure OpenAI deployment.
pub struct AzureOpenAiClient {
    client: Client,
    url: String,
    api_key: String,
    api_version: String,
}

impl AzureOpenAiClient {
    /// Build a client from resolved service settings.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TranscoderError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!(
                "{}/openai/deployments/{}/chat/completions",
                config.endpoint.trim_end_matches('/'),
                config.deployment
            ),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for AzureOpenAiClient {
    #[instrument(skip_all, fields(url = %self.url, chars = user.len()))]
    async fn complete_json(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranscoderError::classification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_BODY_CHARS).collect();
            return Err(TranscoderError::classification(format!(
                "HTTP {status}: {excerpt}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscoderError::classification(format!("failed to read body: {e}")))?;

        let envelope: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TranscoderError::malformed(e.to_string(), body.as_str()))?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TranscoderError::malformed("no message content", body.as_str()))?;

        debug!(chars = content.len(), "received completion");
        Ok(content)
    }
}
