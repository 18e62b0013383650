/*!
 * Tests for the chat translation session: history ownership, token-budget
 * trimming and the provider-failure state machine
 */

use std::sync::Arc;

use subtrans::errors::{ConfigError, ProviderError};
use subtrans::providers::mock::{MockProvider, MockStep};
use subtrans::providers::{ROLE_SYSTEM, ROLE_USER};
use subtrans::translation::{TranslateInput, TranslateOutput, TranslationSession};

use crate::common;

fn session_with(
    mock: &Arc<MockProvider>,
    configure: impl FnOnce(subtrans::translation::SessionBuilder) -> subtrans::translation::SessionBuilder,
) -> TranslationSession {
    let builder = TranslationSession::builder(common::test_config());
    configure(builder)
        .build_with_provider(Box::new(Arc::clone(mock)))
        .unwrap()
}

/// The conversation starts as just the resolved system prompt
#[test]
fn test_build_withDefaults_shouldStartWithSystemOnly() {
    let mock = Arc::new(MockProvider::replying("ok"));
    let session = session_with(&mock, |b| b.source_language("en").target_language("fr"));

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].role, ROLE_SYSTEM);
    assert!(session.system_prompt().contains("en"));
    assert!(session.system_prompt().contains("fr"));
}

/// A used placeholder with no language value fails construction
#[test]
fn test_build_withMissingTargetLanguage_shouldFail() {
    let mock = Arc::new(MockProvider::replying("ok"));
    let result = TranslationSession::builder(common::test_config())
        .system_prompt("Translate to {target_language}.")
        .target_language("")
        .build_with_provider(Box::new(Arc::clone(&mock)));

    assert!(matches!(
        result,
        Err(ConfigError::MissingLanguage { .. })
    ));
}

/// An empty prompt template fails construction
#[test]
fn test_build_withEmptyTemplate_shouldFail() {
    let mock = Arc::new(MockProvider::replying("ok"));
    let result = TranslationSession::builder(common::test_config())
        .system_prompt("")
        .build_with_provider(Box::new(Arc::clone(&mock)));

    assert!(matches!(result, Err(ConfigError::EmptyPromptTemplate)));
}

/// A zero context limit fails construction
#[test]
fn test_build_withZeroContextLength_shouldFail() {
    let mock = Arc::new(MockProvider::replying("ok"));
    let result = TranslationSession::builder(common::test_config())
        .context_length(0)
        .build_with_provider(Box::new(Arc::clone(&mock)));

    assert!(matches!(result, Err(ConfigError::InvalidContextLength)));
}

/// Missing credentials fail the transport-building constructor
#[test]
fn test_build_withoutApiKey_shouldFail() {
    let result = TranslationSession::builder(common::test_config()).build();
    assert!(matches!(
        result,
        Err(ConfigError::MissingSetting("api_key"))
    ));
}

/// Single input comes back as a single string
#[tokio::test]
async fn test_translate_withSingleInput_shouldReturnSingle() {
    let mock = Arc::new(MockProvider::replying("Bonjour"));
    let mut session = session_with(&mock, |b| b);

    let output = session
        .translate(TranslateInput::Single("Hello".to_string()))
        .await
        .unwrap();

    assert_eq!(output, TranslateOutput::Single("Bonjour".to_string()));
    // One user message and one assistant reply joined the conversation
    assert_eq!(session.history().len(), 3);
}

/// Batch input joins on line breaks and splits the reply the same way
#[tokio::test]
async fn test_translate_withBatchInput_shouldPreserveShape() {
    let mock = Arc::new(MockProvider::replying("BONJOUR\nMONDE"));
    let mut session = session_with(&mock, |b| b);

    let input = TranslateInput::Batch(vec!["hello".to_string(), "world".to_string()]);
    let output = session.translate(input).await.unwrap();

    assert_eq!(
        output,
        TranslateOutput::Batch(vec!["BONJOUR".to_string(), "MONDE".to_string()])
    );
    let sent = mock.conversation(0).unwrap();
    assert_eq!(sent.last().unwrap().content, "hello\nworld");
}

/// Over-budget history evicts oldest non-system entries before the call
#[tokio::test]
async fn test_translate_withTightBudget_shouldEvictOldestExchange() {
    // "sys" estimates to 1 token; each 8-char payload to 2 tokens
    let mock = Arc::new(MockProvider::scripted(vec![
        MockStep::Reply("bbbbbbbb".to_string()),
        MockStep::Reply("dddddddd".to_string()),
    ]));
    let mut session = session_with(&mock, |b| b.system_prompt("sys").context_length(6));

    session
        .translate(TranslateInput::Single("aaaaaaaa".to_string()))
        .await
        .unwrap();
    // history now holds sys(1) + user(2) + assistant(2) = 5 tokens
    assert_eq!(session.history().len(), 3);

    session
        .translate(TranslateInput::Single("cccccccc".to_string()))
        .await
        .unwrap();

    // 5 + 2 pending exceeds 6: the first user message must have been evicted
    let sent = mock.conversation(1).unwrap();
    assert_eq!(sent[0].role, ROLE_SYSTEM);
    assert!(sent.iter().all(|m| m.content != "aaaaaaaa"));
    assert!(sent.iter().any(|m| m.content == "bbbbbbbb"));
}

/// The system entry survives even a budget nothing fits into
#[tokio::test]
async fn test_translate_withImpossibleBudget_shouldKeepSystemEntry() {
    let mock = Arc::new(MockProvider::replying("ok"));
    let mut session = session_with(&mock, |b| b.system_prompt("sys").context_length(1));

    session
        .translate(TranslateInput::Single("a very long line of text".to_string()))
        .await
        .unwrap();

    let sent = mock.conversation(0).unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].role, ROLE_SYSTEM);
    assert_eq!(sent[1].role, ROLE_USER);
}

/// Switching the target language resets the conversation and re-resolves
/// the prompt
#[tokio::test]
async fn test_setTargetLanguage_afterExchanges_shouldResetHistory() {
    let mock = Arc::new(MockProvider::replying("ok"));
    let mut session = session_with(&mock, |b| b.source_language("en").target_language("fr"));

    session
        .translate(TranslateInput::Single("Hello".to_string()))
        .await
        .unwrap();
    assert!(session.history().len() > 1);

    session.set_target_language("de").unwrap();

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].role, ROLE_SYSTEM);
    assert!(session.system_prompt().contains("de"));
    assert_eq!(session.target_language(), "de");
}

/// Quota exhaustion aborts immediately, with no retry
#[tokio::test]
async fn test_translate_withQuotaExhausted_shouldFailWithoutRetry() {
    let mock = Arc::new(MockProvider::scripted(vec![MockStep::Fail(
        ProviderError::QuotaExhausted("insufficient balance".to_string()),
    )]));
    let mut session = session_with(&mock, |b| b);

    let result = session
        .translate(TranslateInput::Single("Hello".to_string()))
        .await;

    assert!(matches!(result, Err(ProviderError::QuotaExhausted(_))));
    assert_eq!(mock.call_count(), 1);
}

/// A rate limit waits and retries the same logical call once per failure,
/// without duplicating the user message
#[tokio::test]
async fn test_translate_withRateLimit_shouldRetrySameCall() {
    let mock = Arc::new(MockProvider::scripted(vec![
        MockStep::Fail(ProviderError::RateLimited("slow down".to_string())),
        MockStep::Reply("Bonjour".to_string()),
    ]));
    let mut session = session_with(&mock, |b| b);

    let output = session
        .translate(TranslateInput::Single("Hello".to_string()))
        .await
        .unwrap();

    assert_eq!(output, TranslateOutput::Single("Bonjour".to_string()));
    assert_eq!(mock.call_count(), 2);

    // Identical conversation on both attempts: one user message, appended once
    let first = mock.conversation(0).unwrap();
    let second = mock.conversation(1).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        second.iter().filter(|m| m.role == ROLE_USER).count(),
        1
    );
}

/// Transient server errors behave like rate limits
#[tokio::test]
async fn test_translate_withServerError_shouldRetrySameCall() {
    let mock = Arc::new(MockProvider::scripted(vec![
        MockStep::Fail(ProviderError::ServerError {
            status_code: 503,
            message: "overloaded".to_string(),
        }),
        MockStep::Reply("done".to_string()),
    ]));
    let mut session = session_with(&mock, |b| b);

    let output = session
        .translate(TranslateInput::Single("Hello".to_string()))
        .await
        .unwrap();

    assert_eq!(output, TranslateOutput::Single("done".to_string()));
    assert_eq!(mock.call_count(), 2);
}

/// Any other provider error resets the conversation before retrying
#[tokio::test]
async fn test_translate_withOtherError_shouldResetHistoryAndRetry() {
    let mock = Arc::new(MockProvider::scripted(vec![
        MockStep::Reply("first".to_string()),
        MockStep::Fail(ProviderError::Api {
            status_code: 400,
            message: "bad request".to_string(),
        }),
        MockStep::Reply("second".to_string()),
    ]));
    let mut session = session_with(&mock, |b| b);

    session
        .translate(TranslateInput::Single("one".to_string()))
        .await
        .unwrap();

    let output = session
        .translate(TranslateInput::Single("two".to_string()))
        .await
        .unwrap();
    assert_eq!(output, TranslateOutput::Single("second".to_string()));

    // Second attempt of the second call ran on a reset conversation:
    // system prompt plus the pending user message only
    let retried = mock.conversation(2).unwrap();
    assert_eq!(retried.len(), 2);
    assert_eq!(retried[0].role, ROLE_SYSTEM);
    assert_eq!(retried[1].content, "two");
}

/// The optional attempt cap turns an endless retry loop into an error
#[tokio::test]
async fn test_translate_withAttemptCap_shouldGiveUp() {
    let mock = Arc::new(MockProvider::scripted(vec![
        MockStep::Fail(ProviderError::ServerError {
            status_code: 500,
            message: "down".to_string(),
        }),
        MockStep::Fail(ProviderError::ServerError {
            status_code: 500,
            message: "still down".to_string(),
        }),
    ]));

    let mut config = common::test_config();
    config.translation.max_attempts = Some(2);
    let mut session = TranslationSession::builder(config)
        .build_with_provider(Box::new(Arc::clone(&mock)))
        .unwrap();

    let result = session
        .translate(TranslateInput::Single("Hello".to_string()))
        .await;

    assert!(matches!(result, Err(ProviderError::ServerError { .. })));
    assert_eq!(mock.call_count(), 2);
}
