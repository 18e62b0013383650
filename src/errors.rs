/*!
 * Error types for the subtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// How the translation session should react to a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Unrecoverable, abort the whole run (out of balance)
    Fatal,

    /// Wait the configured delay and retry the same call
    Backoff,

    /// Discard the conversation history and retry fresh
    Reset,
}

/// Errors that can occur when talking to the chat-completion provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Account balance or quota is exhausted (HTTP 402)
    #[error("provider quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Too many requests (HTTP 429)
    #[error("provider rate limit reached: {0}")]
    RateLimited(String),

    /// Transient server-side failure (HTTP 500/503)
    #[error("provider server error ({status_code}): {message}")]
    ServerError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Any other non-success response from the API
    #[error("provider API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("connection error: {0}")]
    Connection(String),

    /// Error when parsing an API response fails
    #[error("failed to parse API response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Classify this error for the session retry loop.
    ///
    /// Quota exhaustion is fatal. Rate limits and transient server errors are
    /// retried after a fixed delay with the conversation intact. Everything
    /// else is treated as context corruption: the history is reset and the
    /// call retried fresh.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::QuotaExhausted(_) => RetryClass::Fatal,
            Self::RateLimited(_) => RetryClass::Backoff,
            Self::ServerError { .. } => RetryClass::Backoff,
            Self::Api { .. } | Self::Connection(_) | Self::Parse(_) => RetryClass::Reset,
        }
    }
}

/// Errors raised while validating or loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// API key, endpoint or model missing
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// Context length must be a positive token count
    #[error("context length must be greater than zero")]
    InvalidContextLength,

    /// The system prompt template is empty
    #[error("a valid system prompt template is required")]
    EmptyPromptTemplate,

    /// The template uses a language placeholder with no configured value
    #[error("the {placeholder} placeholder is used but no language is configured")]
    MissingLanguage {
        /// Placeholder name as written in the template
        placeholder: &'static str,
    },

    /// Config file could not be read or parsed
    #[error("failed to load config file: {0}")]
    Load(String),
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A cue with no text reached the codec
    #[error("cue text cannot be empty")]
    EmptyCue,

    /// A batch with no cues reached the codec
    #[error("batch cannot be empty")]
    EmptyBatch,

    /// Malformed subtitle file content
    #[error("failed to parse subtitle file: {0}")]
    Parse(String),

    /// Extension is not one of the supported dialects
    #[error("unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// Batch size must be at least one cue
    #[error("batch size must be greater than 0")]
    InvalidBatchSize,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("file error: {0}")]
    File(String),

    /// Error from configuration loading or validation
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the provider
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Any other error
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
