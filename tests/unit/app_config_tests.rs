/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use subtrans::app_config::{Config, LogLevel};
use subtrans::errors::ConfigError;

use crate::common;

/// Defaults cover everything except the API key
#[test]
fn test_default_shouldProvideWorkingDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "th");
    assert!(config.provider.api_key.is_empty());
    assert!(!config.provider.endpoint.is_empty());
    assert!(!config.provider.model.is_empty());
    assert!(config.provider.context_length > 0);
    assert_eq!(config.translation.batch_size, 100);
    assert!(config.translation.max_attempts.is_none());
    assert_eq!(config.log_level, LogLevel::Info);
}

/// The default prompt template carries both language placeholders and the
/// sentinel convention
#[test]
fn test_default_systemPrompt_shouldCarryPlaceholdersAndSentinel() {
    let config = Config::default();
    let prompt = &config.translation.system_prompt;

    assert!(prompt.contains("{source_language}"));
    assert!(prompt.contains("{target_language}"));
    assert!(prompt.contains("<CNTL>"));
}

/// A missing config file falls back to defaults
#[test]
fn test_loadOrDefault_withMissingFile_shouldUseDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = Config::load_or_default(dir.path().join("nope.json"))?;
    assert_eq!(config.source_language, "en");
    Ok(())
}

/// Save and reload round-trips every field
#[test]
fn test_saveAndLoad_shouldRoundTrip() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.source_language = "ja".to_string();
    config.provider.api_key = "sk-test".to_string();
    config.translation.batch_size = 25;
    config.save(&path)?;

    let loaded = Config::load_or_default(&path)?;
    assert_eq!(loaded.source_language, "ja");
    assert_eq!(loaded.provider.api_key, "sk-test");
    assert_eq!(loaded.translation.batch_size, 25);
    Ok(())
}

/// Partial config files inherit defaults for absent fields
#[test]
fn test_loadOrDefault_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{ "provider": { "api_key": "sk-partial" } }"#,
    )?;

    let config = Config::load_or_default(&path)?;
    assert_eq!(config.provider.api_key, "sk-partial");
    assert_eq!(config.provider.model, "deepseek-chat");
    assert_eq!(config.translation.batch_size, 100);
    Ok(())
}

/// Malformed JSON is a load error, not a silent fallback
#[test]
fn test_loadOrDefault_withMalformedFile_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_default(&path).is_err());
    Ok(())
}

/// Validation walks the required settings in order
#[test]
fn test_validate_withMissingFields_shouldNameTheField() {
    let mut config = Config::default();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingSetting("api_key"))
    ));

    config.provider.api_key = "sk-test".to_string();
    config.provider.model = String::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingSetting("model"))
    ));

    config.provider.model = "deepseek-chat".to_string();
    config.provider.context_length = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidContextLength)
    ));

    config.provider.context_length = 1000;
    config.translation.system_prompt = String::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyPromptTemplate)
    ));

    config.translation.system_prompt = "translate".to_string();
    assert!(config.validate().is_ok());
}

/// A non-URL endpoint fails validation
#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    config.provider.api_key = "sk-test".to_string();
    config.provider.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}
