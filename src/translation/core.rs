/*!
 * Chat-session translation client.
 *
 * A session owns one conversation with the provider: the system prompt, the
 * accumulated exchanges, and the token budget that bounds them. Earlier
 * exchanges give the model context for consistent terminology, so they are
 * kept as long as the budget allows and evicted oldest-first when it does
 * not. A language change invalidates that context entirely and resets the
 * conversation.
 */

use std::time::Duration;

use log::{debug, error, warn};

use crate::app_config::Config;
use crate::errors::{ConfigError, ProviderError, RetryClass};
use crate::providers::chat_completion::ChatCompletionClient;
use crate::providers::{ChatMessage, ChatProvider};

/// Placeholder names recognized in the system prompt template
const SOURCE_PLACEHOLDER: &str = "{source_language}";
const TARGET_PLACEHOLDER: &str = "{target_language}";

/// Input to one logical translation call, shape-preserving: a batch comes
/// back as a batch, a single string as a single string.
#[derive(Debug, Clone)]
pub enum TranslateInput {
    /// One cue's content
    Single(String),
    /// Ordered batch contents, joined line-per-cue for the provider
    Batch(Vec<String>),
}

/// Output of one logical translation call, mirroring the input shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateOutput {
    Single(String),
    Batch(Vec<String>),
}

impl TranslateOutput {
    /// The batch lines, regardless of shape
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text],
            Self::Batch(lines) => lines,
        }
    }
}

/// Estimate the token count of a text.
///
/// Stands in for the provider tokenizer; one token per four characters is a
/// workable upper-bound heuristic for the models this tool targets, and it
/// only needs to be monotone in text length for the trimming loop to behave.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Builder for a translation session: explicit values override the loaded
/// configuration, mirroring how the CLI layers flags over `conf.json`.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    config: Config,
    api_key: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    context_length: Option<usize>,
    source_language: Option<String>,
    target_language: Option<String>,
    system_prompt: Option<String>,
}

impl SessionBuilder {
    /// Start from a loaded configuration
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn context_length(mut self, context_length: usize) -> Self {
        self.context_length = Some(context_length);
        self
    }

    pub fn source_language(mut self, lang: impl Into<String>) -> Self {
        self.source_language = Some(lang.into());
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.target_language = Some(lang.into());
        self
    }

    pub fn system_prompt(mut self, template: impl Into<String>) -> Self {
        self.system_prompt = Some(template.into());
        self
    }

    /// Build a session talking to the configured chat-completion endpoint
    pub fn build(self) -> Result<TranslationSession, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .unwrap_or_else(|| self.config.provider.api_key.clone());
        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| self.config.provider.endpoint.clone());
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| self.config.provider.model.clone());

        if api_key.is_empty() {
            return Err(ConfigError::MissingSetting("api_key"));
        }
        if endpoint.is_empty() {
            return Err(ConfigError::MissingSetting("endpoint"));
        }
        if model.is_empty() {
            return Err(ConfigError::MissingSetting("model"));
        }

        let timeout_secs = self.config.provider.timeout_secs;
        let client = ChatCompletionClient::new(api_key, endpoint, model, timeout_secs);
        self.build_with_provider(Box::new(client))
    }

    /// Build a session around an injected provider (tests, alternate
    /// transports). Credential checks are the transport's business and are
    /// skipped here; the prompt contract is still enforced.
    pub fn build_with_provider(
        self,
        provider: Box<dyn ChatProvider>,
    ) -> Result<TranslationSession, ConfigError> {
        let context_limit = self
            .context_length
            .unwrap_or(self.config.provider.context_length);
        if context_limit == 0 {
            return Err(ConfigError::InvalidContextLength);
        }

        let template = self
            .system_prompt
            .unwrap_or_else(|| self.config.translation.system_prompt.clone());
        if template.is_empty() {
            return Err(ConfigError::EmptyPromptTemplate);
        }

        let source_language = self
            .source_language
            .unwrap_or_else(|| self.config.source_language.clone());
        let target_language = self
            .target_language
            .unwrap_or_else(|| self.config.target_language.clone());

        let system_prompt = resolve_prompt(&template, &source_language, &target_language)?;

        let mut session = TranslationSession {
            source_language,
            target_language,
            system_prompt_template: template,
            system_prompt,
            history: Vec::new(),
            context_limit,
            retry_delay: Duration::from_millis(self.config.translation.retry_delay_ms),
            max_attempts: self.config.translation.max_attempts,
            provider,
        };
        session.reset_history();
        Ok(session)
    }
}

/// Resolve a prompt template against the active language pair, enforcing
/// that a used placeholder has a language to fill it
fn resolve_prompt(
    template: &str,
    source_language: &str,
    target_language: &str,
) -> Result<String, ConfigError> {
    if template.contains(SOURCE_PLACEHOLDER) && source_language.is_empty() {
        return Err(ConfigError::MissingLanguage {
            placeholder: SOURCE_PLACEHOLDER,
        });
    }
    if template.contains(TARGET_PLACEHOLDER) && target_language.is_empty() {
        return Err(ConfigError::MissingLanguage {
            placeholder: TARGET_PLACEHOLDER,
        });
    }

    Ok(template
        .replace(SOURCE_PLACEHOLDER, source_language)
        .replace(TARGET_PLACEHOLDER, target_language))
}

/// Stateful translator client over one provider conversation
pub struct TranslationSession {
    source_language: String,
    target_language: String,
    system_prompt_template: String,
    system_prompt: String,
    history: Vec<ChatMessage>,
    context_limit: usize,
    retry_delay: Duration,
    max_attempts: Option<u32>,
    provider: Box<dyn ChatProvider>,
}

impl TranslationSession {
    /// Start building a session from a configuration
    pub fn builder(config: Config) -> SessionBuilder {
        SessionBuilder::from_config(config)
    }

    /// The active source language
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// The active target language
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// The resolved system prompt
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The conversation as it would be sent on the next call
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Switch the source language. Prior exchanges are no context for a
    /// different language pair, so the conversation starts over.
    pub fn set_source_language(&mut self, lang: impl Into<String>) -> Result<(), ConfigError> {
        self.source_language = lang.into();
        self.refresh_prompt()
    }

    /// Switch the target language and start the conversation over
    pub fn set_target_language(&mut self, lang: impl Into<String>) -> Result<(), ConfigError> {
        self.target_language = lang.into();
        self.refresh_prompt()
    }

    fn refresh_prompt(&mut self) -> Result<(), ConfigError> {
        self.system_prompt = resolve_prompt(
            &self.system_prompt_template,
            &self.source_language,
            &self.target_language,
        )?;
        self.reset_history();
        Ok(())
    }

    /// Reset the conversation to just the system prompt
    fn reset_history(&mut self) {
        self.history = vec![ChatMessage::system(self.system_prompt.clone())];
    }

    /// Token estimate for the current history plus a pending message
    fn pending_tokens(&self, pending: &ChatMessage) -> usize {
        self.history
            .iter()
            .map(|m| estimate_tokens(&m.content))
            .sum::<usize>()
            + estimate_tokens(&pending.content)
    }

    /// Evict oldest non-system entries until the conversation plus the
    /// pending message fits the context limit. The system prompt at index 0
    /// is never evicted.
    fn trim_to_budget(&mut self, pending: &ChatMessage) {
        let mut evicted = 0;
        while self.pending_tokens(pending) > self.context_limit && self.history.len() > 1 {
            self.history.remove(1);
            evicted += 1;
        }
        if evicted > 0 {
            debug!(
                "Evicted {} history entries to fit the {}-token context limit",
                evicted, self.context_limit
            );
        }
    }

    /// Execute one logical translation call.
    ///
    /// The user payload is appended once; provider failures are then handled
    /// per their retry class without duplicating it. Quota exhaustion aborts
    /// immediately; rate limits and transient server errors wait the fixed
    /// delay and retry; any other failure resets the conversation around the
    /// pending message and retries fresh. Without a configured attempt cap
    /// the loop only ends on success or quota exhaustion.
    pub async fn translate(
        &mut self,
        input: TranslateInput,
    ) -> Result<TranslateOutput, ProviderError> {
        let payload = match &input {
            TranslateInput::Single(text) => text.clone(),
            TranslateInput::Batch(texts) => texts.join("\n"),
        };
        let pending = ChatMessage::user(payload);

        self.trim_to_budget(&pending);
        self.history.push(pending);

        let mut attempts: u32 = 0;
        let reply = loop {
            attempts += 1;
            match self.provider.chat(&self.history).await {
                Ok(reply) => break reply,
                Err(e) => {
                    let class = e.retry_class();
                    if class == RetryClass::Fatal {
                        error!("Provider quota exhausted, aborting: {}", e);
                        return Err(e);
                    }
                    if let Some(cap) = self.max_attempts {
                        if attempts >= cap {
                            error!("Giving up after {} attempts: {}", attempts, e);
                            return Err(e);
                        }
                    }
                    if class == RetryClass::Backoff {
                        warn!("Provider busy ({}), retrying in {:?}", e, self.retry_delay);
                        tokio::time::sleep(self.retry_delay).await;
                    } else {
                        warn!("Provider error ({}), resetting conversation and retrying", e);
                        let user_message = self.history.last().cloned();
                        self.reset_history();
                        if let Some(message) = user_message {
                            self.history.push(message);
                        }
                    }
                }
            }
        };

        let content = reply.content.clone();
        self.history.push(reply);

        match input {
            TranslateInput::Single(_) => Ok(TranslateOutput::Single(content)),
            TranslateInput::Batch(_) => Ok(TranslateOutput::Batch(
                content.split('\n').map(str::to_string).collect(),
            )),
        }
    }
}

impl std::fmt::Debug for TranslationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationSession")
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("context_limit", &self.context_limit)
            .field("history_len", &self.history.len())
            .finish()
    }
}
