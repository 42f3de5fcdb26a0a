/*!
 * Tests for application configuration functionality
 */

use epubtr::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};
use std::time::Duration;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.log_level, LogLevel::Info);

    let ollama_config = config
        .translation
        .get_provider_config(&TranslationProvider::Ollama)
        .expect("Ollama provider config should exist");
    assert_eq!(ollama_config.endpoint, "http://localhost:11434");
    assert_eq!(ollama_config.timeout_secs, 60);

    assert!(!config.book.batch_paragraphs);
    assert_eq!(config.book.batch_size, 20);
    assert_eq!(config.book.paragraph_tags, vec!["p".to_string()]);
    assert!(config.book.workspace_root.is_none());
    assert!(config.book.check_language_pair);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "123".to_string();
    assert!(config.validate().is_err());
    config.source_language = "zh-Hans".to_string();
    assert!(config.validate().is_ok());

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "fr".to_string();

    config.translation.provider = TranslationProvider::OpenAI;
    assert!(config.validate().is_err(), "OpenAI needs an API key");
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withBadBookSettings_shouldFail() {
    let mut config = Config::default();
    config.book.batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.book.paragraph_tags = vec![];
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.book.paragraph_tags = vec!["p".to_string(), "<div>".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_config_deserialize_withMissingBookSection_shouldUseDefaults() {
    let json = r#"{
        "source_language": "en",
        "target_language": "de",
        "translation": { "provider": "ollama" },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.target_language, "de");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.book.batch_size, 20);
    assert!(config.book.check_language_pair);
}

#[test]
fn test_config_serialization_roundtrip_shouldKeepBookSettings() {
    let mut config = Config::default();
    config.book.batch_paragraphs = true;
    config.book.paragraph_tags = vec!["p".to_string(), "li".to_string()];

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert!(parsed.book.batch_paragraphs);
    assert_eq!(parsed.book.paragraph_tags, config.book.paragraph_tags);
}

#[test]
fn test_activeProviderConfigMut_withMissingProvider_shouldInsertDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::Anthropic;

    config.translation.active_provider_config_mut().model = "custom-model".to_string();

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "custom-model");
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
}

#[test]
fn test_minRequestInterval_shouldUseLargerOfRateAndDelay() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    config.translation.active_provider_config_mut().rate_limit = Some(60);
    assert_eq!(config.translation.min_request_interval(), Duration::from_millis(1000));

    config.translation.common.rate_limit_delay_ms = 2500;
    assert_eq!(config.translation.min_request_interval(), Duration::from_millis(2500));

    config.translation.provider = TranslationProvider::Ollama;
    config.translation.common.rate_limit_delay_ms = 0;
    assert_eq!(config.translation.min_request_interval(), Duration::ZERO);
}

#[test]
fn test_providerConfig_new_shouldMatchProviderType() {
    let lmstudio = ProviderConfig::new(TranslationProvider::LMStudio);
    assert_eq!(lmstudio.provider_type, "lmstudio");
    assert_eq!(lmstudio.endpoint, "http://localhost:1234/v1");
    assert!(lmstudio.api_key.is_empty());
}

#[test]
fn test_translationProvider_fromStr_shouldAcceptKnownNames() {
    assert_eq!("openai".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("LMStudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert!("deepl".parse::<TranslationProvider>().is_err());
}
