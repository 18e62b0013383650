/*!
 * Provider implementations for the translation backend.
 *
 * All transports implement one capability: turn a conversation into the
 * assistant's next message. The session state machine never sees anything
 * transport-specific.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Role constants used in conversation messages
pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_SYSTEM.to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_ASSISTANT.to_string(),
            content: content.into(),
        }
    }
}

/// Common trait for chat-completion backends
///
/// Implementations differ only in transport; the conversation they receive is
/// owned and ordered by the translation session.
#[async_trait]
pub trait ChatProvider: Send + Sync + Debug {
    /// Complete the conversation and return the assistant's reply
    ///
    /// # Arguments
    /// * `messages` - The full conversation, system prompt first
    ///
    /// # Returns
    /// * `Result<ChatMessage, ProviderError>` - The assistant message or a categorized error
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ProviderError>;
}

pub mod chat_completion;
pub mod mock;
