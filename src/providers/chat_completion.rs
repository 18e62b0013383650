use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatProvider};
use crate::errors::ProviderError;

/// Client for OpenAI-compatible chat-completion endpoints
/// (DeepSeek and similar hosted APIs)
#[derive(Debug)]
pub struct ChatCompletionClient {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as a bearer token
    api_key: String,
    /// Fully resolved chat-completions URL
    url: String,
    /// Model identifier
    model: String,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    /// Model name to use
    model: &'a str,
    /// Messages of the conversation
    messages: &'a [ChatMessage],
    /// Streaming is never used by this client
    stream: bool,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    /// Completion choices, the first one carries the reply
    choices: Vec<ChatCompletionChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    /// The assistant message
    message: ChatMessage,
}

/// Error body shape returned by OpenAI-compatible servers
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ChatCompletionClient {
    /// Create a new client for the given endpoint.
    ///
    /// The endpoint may be a bare base URL (`https://api.deepseek.com`) or
    /// already point at the chat-completions route; the route is appended
    /// only when missing.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let endpoint = endpoint.into();
        let trimmed = endpoint.trim_end_matches('/');
        let url = if trimmed.ends_with("/chat/completions") {
            trimmed.to_string()
        } else {
            format!("{}/chat/completions", trimmed)
        };

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            url,
            model: model.into(),
        }
    }

    /// The fully resolved chat-completions URL this client posts to
    pub fn endpoint_url(&self) -> &str {
        &self.url
    }

    /// Pull a human-readable message out of an error response body
    fn extract_error_message(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody {
                error: Some(detail),
            }) => detail.message,
            _ => {
                let mut message = body.trim().to_string();
                if message.is_empty() {
                    message = "no error details provided".to_string();
                }
                message
            }
        }
    }

    /// Map a non-success HTTP status to the session's error categories
    fn categorize_status(status: u16, message: String) -> ProviderError {
        match status {
            402 => ProviderError::QuotaExhausted(message),
            429 => ProviderError::RateLimited(message),
            500 | 503 => ProviderError::ServerError {
                status_code: status,
                message,
            },
            _ => ProviderError::Api {
                status_code: status,
                message,
            },
        }
    }
}

#[async_trait]
impl ChatProvider for ChatCompletionClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ProviderError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::extract_error_message(&body);
            error!("Chat API error ({}): {}", status, message);
            return Err(Self::categorize_status(status.as_u16(), message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse chat response: {}. Raw response (first 500 chars): {}",
                e,
                body.chars().take(500).collect::<String>()
            );
            ProviderError::Parse(e.to_string())
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("response contained no choices".to_string()))?;

        Ok(choice.message)
    }
}
