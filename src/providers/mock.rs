/*!
 * Mock provider implementation for testing.
 *
 * The mock plays back a script of steps: each call to `chat` consumes the
 * next step, which is either a canned assistant reply or a provider error.
 * Once the script runs out it echoes the last user message, so tests that
 * don't care about content keep working.
 */

use async_trait::async_trait;
use std::sync::Mutex;

use super::{ChatMessage, ChatProvider};
use crate::errors::ProviderError;

/// One scripted step
#[derive(Debug)]
pub enum MockStep {
    /// Reply with this assistant content
    Reply(String),
    /// Fail with this error
    Fail(ProviderError),
}

/// Scripted mock provider for session and pipeline tests
#[derive(Debug)]
pub struct MockProvider {
    script: Mutex<Vec<MockStep>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockProvider {
    /// A provider that plays back the given steps in order
    pub fn scripted(steps: Vec<MockStep>) -> Self {
        Self {
            script: Mutex::new(steps),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider that always replies with the same content
    pub fn replying(content: impl Into<String>) -> Self {
        Self::scripted(vec![MockStep::Reply(content.into())])
    }

    /// Number of chat calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of the conversation passed to the n-th call
    pub fn conversation(&self, call: usize) -> Option<Vec<ChatMessage>> {
        self.calls.lock().unwrap().get(call).cloned()
    }
}

// Tests hold the mock through an Arc to inspect calls after the session
// takes ownership of its provider.
#[async_trait]
impl ChatProvider for std::sync::Arc<MockProvider> {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ProviderError> {
        self.as_ref().chat(messages).await
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ProviderError> {
        self.calls.lock().unwrap().push(messages.to_vec());

        let step = {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };

        match step {
            Some(MockStep::Reply(content)) => Ok(ChatMessage::assistant(content)),
            Some(MockStep::Fail(error)) => Err(error),
            None => {
                // Script exhausted: echo the newest user message
                let echo = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == super::ROLE_USER)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(ChatMessage::assistant(echo))
            }
        }
    }
}
