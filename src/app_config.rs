use std::path::Path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source subtitle track language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target subtitle track language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Provider connection settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Translation behavior settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Connection settings for the chat-completion provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// API key used as a bearer token
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Chat-completion endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens the model accepts for one conversation
    #[serde(default = "default_context_length")]
    pub context_length: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            context_length: default_context_length(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation behavior settings applicable to every document
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// System prompt template for the chat session
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Number of cues translated per provider call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Fixed delay in milliseconds before retrying a failed call
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Optional cap on retry attempts per call (unbounded when absent)
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            batch_size: default_batch_size(),
            retry_delay_ms: default_retry_delay_ms(),
            max_attempts: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "th".to_string()
}

fn default_endpoint() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_context_length() -> usize {
    65536
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    100
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate each input line from \
     {source_language} to {target_language}. Keep exactly one output line per input \
     line, in the same order. Do not add explanations or notes. If a line cannot or \
     must not be translated, output <CNTL> for that line instead."
        .to_string()
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.api_key.is_empty() {
            return Err(ConfigError::MissingSetting("api_key"));
        }
        if self.provider.endpoint.is_empty() {
            return Err(ConfigError::MissingSetting("endpoint"));
        }
        if url::Url::parse(&self.provider.endpoint).is_err() {
            return Err(ConfigError::Load(format!(
                "invalid endpoint URL: {}",
                self.provider.endpoint
            )));
        }
        if self.provider.model.is_empty() {
            return Err(ConfigError::MissingSetting("model"));
        }
        if self.provider.context_length == 0 {
            return Err(ConfigError::InvalidContextLength);
        }
        if self.translation.system_prompt.is_empty() {
            return Err(ConfigError::EmptyPromptTemplate);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            provider: ProviderConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
