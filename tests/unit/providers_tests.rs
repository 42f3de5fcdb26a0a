/*!
 * Tests for provider request/response shapes and the translation service
 * behavior that does not need a live backend
 */

use epubtr::app_config::{TranslationConfig, TranslationProvider};
use epubtr::errors::{ProviderError, TranslationError};
use epubtr::providers::anthropic::{Anthropic, AnthropicRequest, AnthropicResponse};
use epubtr::providers::mock::{MockBehavior, MockTranslator};
use epubtr::providers::ollama::{GenerationRequest, GenerationResponse, Ollama};
use epubtr::providers::openai::{OpenAIRequest, OpenAIResponse, OpenAI};
use epubtr::providers::Provider;
use epubtr::translation::{LanguagePairAvailability, PairStatus, TranslationService, Translator};

/// Ollama config pointing at a port nothing listens on
fn unreachable_config() -> TranslationConfig {
    let mut config = TranslationConfig::default();
    config.provider = TranslationProvider::Ollama;
    let provider = config.active_provider_config_mut();
    provider.endpoint = "http://127.0.0.1:9".to_string();
    provider.timeout_secs = 2;
    config
}

#[test]
fn test_ollamaRequest_serialization_shouldDisableStreaming() {
    let request = GenerationRequest::new("llama3.2:3b", "Hello")
        .system("Translate to French")
        .temperature(0.3);

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "llama3.2:3b");
    assert_eq!(json["prompt"], "Hello");
    assert_eq!(json["system"], "Translate to French");
    assert_eq!(json["stream"], false);
    assert!((json["options"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn test_ollamaResponse_extractText_shouldReturnResponseField() {
    let response: GenerationResponse =
        serde_json::from_str(r#"{"model":"m","response":"Bonjour","done":true}"#).unwrap();
    assert_eq!(Ollama::extract_text(&response), "Bonjour");
}

#[test]
fn test_openAIRequest_serialization_shouldSkipUnsetFields() {
    let request = OpenAIRequest::new("gpt-4o-mini")
        .add_message("system", "Translate")
        .add_message("user", "Hello");

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    assert_eq!(json["messages"][1]["content"], "Hello");
    assert!(json.get("temperature").is_none());
    assert!(json.get("max_tokens").is_none());
}

#[test]
fn test_openAIResponse_extractText_shouldUseFirstChoice() {
    let response: OpenAIResponse = serde_json::from_str(
        r#"{"choices":[{"message":{"role":"assistant","content":"Hola"},"finish_reason":"stop"}]}"#,
    )
    .unwrap();
    assert_eq!(OpenAI::extract_text(&response), "Hola");
}

#[test]
fn test_anthropicRequest_serialization_shouldCarrySystemAndMaxTokens() {
    let request = AnthropicRequest::new("claude-3-haiku-20240307", 1024)
        .system("Translate")
        .add_message("user", "Hello");

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["max_tokens"], 1024);
    assert_eq!(json["system"], "Translate");
    assert_eq!(json["messages"][0]["role"], "user");
}

#[test]
fn test_anthropicResponse_extractText_shouldJoinTextBlocks() {
    let response: AnthropicResponse = serde_json::from_str(
        r#"{"content":[{"type":"text","text":"Guten "},{"type":"text","text":"Tag"}],
            "usage":{"input_tokens":3,"output_tokens":2}}"#,
    )
    .unwrap();
    assert_eq!(Anthropic::extract_text(&response), "Guten Tag");
}

#[tokio::test]
async fn test_ollama_withUnreachableServer_shouldReportConnectionError() {
    let client = Ollama::from_url("http://127.0.0.1:9", 2);
    let result = client.test_connection().await;
    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
}

#[tokio::test]
async fn test_translationService_withCachedText_shouldNotContactProvider() {
    let service = TranslationService::new(unreachable_config()).unwrap();
    service.cache.store("Hello", "en", "fr", "Bonjour");

    let result = service.translate("Hello", "en", "fr").await.unwrap();
    assert_eq!(result, "Bonjour");
}

#[tokio::test]
async fn test_translationService_withUnreachableProvider_shouldFailTranslation() {
    let service = TranslationService::new(unreachable_config()).unwrap();

    let result = service.translate("Hello", "en", "fr").await;
    assert!(matches!(result, Err(TranslationError::Provider(_))));
}

#[tokio::test]
async fn test_translationService_status_withUnreachableProvider_shouldBeUnknown() {
    let service = TranslationService::new(unreachable_config()).unwrap();

    assert_eq!(service.status("en", "fr").await, PairStatus::Unknown);
    assert_eq!(service.status("en", "en").await, PairStatus::Unsupported);
}

#[tokio::test]
async fn test_mockTranslator_requests_shouldRecordLanguages() {
    let translator = MockTranslator::new(MockBehavior::Working).with_pair_status(PairStatus::Unknown);

    translator.translate("One", "en", "zh-Hant").await.unwrap();

    let requests = translator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target_language, "zh-Hant");
    assert_eq!(translator.status("en", "zh-Hant").await, PairStatus::Unknown);
}
