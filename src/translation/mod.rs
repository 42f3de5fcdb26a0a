/*!
 * Translation of individual text units.
 *
 * - `core`: `TranslationService`, which sends units to the configured AI provider
 * - `cache`: in-memory reuse of identical units within a run
 *
 * The session only depends on the two traits below, so any backend (or a
 * scripted mock) can drive a book through the pipeline.
 */

use async_trait::async_trait;

use crate::errors::TranslationError;

pub use self::cache::TranslationCache;
pub use self::core::TranslationService;

pub mod cache;
pub mod core;

/// Translates one unit of text between two language tags
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_language` to `target_language`.
    ///
    /// A failure is recoverable: the caller keeps the source text for that unit.
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError>;
}

/// Whether a backend can handle a given language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStatus {
    /// Availability could not be determined
    Unknown,
    Supported,
    Unsupported,
}

impl PairStatus {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported)
    }
}

/// Answers whether a language pair can be translated, consulted once before a run
#[async_trait]
pub trait LanguagePairAvailability: Send + Sync {
    async fn status(&self, source_language: &str, target_language: &str) -> PairStatus;
}
