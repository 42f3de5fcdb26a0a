/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which translates
 * single text units using the configured AI provider and answers whether a
 * language pair can be handled at all.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Instant;
use tokio::sync::Mutex;
use url::Url;

use super::cache::TranslationCache;
use super::{LanguagePairAvailability, PairStatus, Translator};
use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::language_utils::{describe_language_tag, minimal_tag};
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;

/// Parse an endpoint string into host and port
fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?
        .to_string();

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    Ok((host, port))
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama { client: Ollama },

    /// OpenAI API service
    OpenAI { client: OpenAI },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio { client: OpenAI },

    /// Anthropic API service
    Anthropic { client: Anthropic },
}

impl TranslationProviderImpl {
    fn name(&self) -> &'static str {
        match self {
            Self::Ollama { .. } => "Ollama",
            Self::OpenAI { .. } => "OpenAI",
            Self::LMStudio { .. } => "LM Studio",
            Self::Anthropic { .. } => "Anthropic",
        }
    }
}

/// Translation service backed by one of the configured AI providers
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Translation cache for storing and retrieving translations
    pub cache: TranslationCache,

    /// Start of the previous provider request, for request spacing
    last_request: Mutex<Option<Instant>>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let timeout = config.get_timeout_secs();

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                let scheme = if config.get_endpoint().starts_with("https://") { "https" } else { "http" };
                TranslationProviderImpl::Ollama {
                    client: Ollama::new(format!("{}://{}", scheme, host), port, timeout),
                }
            }
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout),
            },
            ConfigTranslationProvider::LMStudio => {
                // LM Studio accepts any key
                let api_key = match config.get_api_key() {
                    key if key.is_empty() => "lm-studio".to_string(),
                    key => key,
                };
                TranslationProviderImpl::LMStudio {
                    client: OpenAI::compatible("LM Studio", api_key, config.get_endpoint(), timeout),
                }
            }
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), config.get_endpoint(), timeout),
            },
        };

        let cache = TranslationCache::new(config.common.cache_enabled);

        Ok(Self {
            provider,
            config,
            cache,
            last_request: Mutex::new(None),
        })
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        info!(
            "Testing connection to {} with model {}",
            self.provider.name(),
            self.config.get_model()
        );

        match &self.provider {
            TranslationProviderImpl::Ollama { client } => client.test_connection().await,
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                client.test_connection().await
            }
            TranslationProviderImpl::Anthropic { client } => client.test_connection().await,
        }
    }

    /// System prompt for a language pair, with the configured placeholders filled in
    pub fn system_prompt(&self, source_language: &str, target_language: &str) -> String {
        self.config
            .common
            .system_prompt
            .replace("{source_language}", &describe_language_tag(source_language))
            .replace("{target_language}", &describe_language_tag(target_language))
    }

    /// Translate a single text unit
    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        if let Some(cached) = self.cache.get(text, source_language, target_language) {
            return Ok(cached);
        }

        self.wait_for_slot().await;

        let start_time = Instant::now();
        let system_prompt = self.system_prompt(source_language, target_language);
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        let raw = match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(&model, text)
                    .system(&system_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ollama::extract_text(&response)
            }
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let request = OpenAIRequest::new(&model)
                    .add_message("system", &system_prompt)
                    .add_message("user", text)
                    .temperature(temperature)
                    .max_tokens(max_tokens_for_model(&model));
                let response = client.complete(request).await?;
                OpenAI::extract_text(&response)
            }
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(&model, max_tokens_for_model(&model))
                    .system(&system_prompt)
                    .add_message("user", text)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Anthropic::extract_text(&response)
            }
        };

        let translated = raw.trim().to_string();
        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        debug!(
            "{} translated {} chars in {:?}",
            self.provider.name(),
            text.chars().count(),
            start_time.elapsed()
        );

        self.cache.store(text, source_language, target_language, &translated);
        Ok(translated)
    }

    /// Sleep until the configured minimum interval since the previous request has passed
    async fn wait_for_slot(&self) {
        let interval = self.config.min_request_interval();
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Upper bound on generated tokens for a request
fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        m if m.starts_with("gpt-4o") || m.starts_with("gpt-4.1") => 16384,
        m if m.starts_with("gpt-4") => 4096,
        m if m.starts_with("claude-3-5") || m.starts_with("claude-3-7") => 8192,
        m if m.starts_with("claude") => 4096,
        _ => 4096,
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        self.translate_text(text, source_language, target_language).await
    }
}

#[async_trait]
impl LanguagePairAvailability for TranslationService {
    async fn status(&self, source_language: &str, target_language: &str) -> PairStatus {
        let (source, target) = match (minimal_tag(source_language), minimal_tag(target_language)) {
            (Ok(source), Ok(target)) => (source, target),
            _ => return PairStatus::Unsupported,
        };

        if source == target {
            return PairStatus::Unsupported;
        }

        match self.test_connection().await {
            Ok(()) => PairStatus::Supported,
            Err(e) => {
                warn!("Could not confirm {} is reachable: {}", self.provider.name(), e);
                PairStatus::Unknown
            }
        }
    }
}
