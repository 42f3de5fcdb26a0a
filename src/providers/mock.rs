/*!
 * Mock translator for testing.
 *
 * This module provides a scripted translator that simulates different behaviors:
 * - `MockTranslator::working()` - Always succeeds with tagged text
 * - `MockTranslator::identity()` - Returns the input unchanged
 * - `MockTranslator::failing_on(&[..])` - Fails on the given call numbers
 * - `MockTranslator::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::Provider;
use crate::session::SessionControl;
use crate::translation::{LanguagePairAvailability, PairStatus, Translator};

/// Mock request for testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub text: String,
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[target] text`
    Working,
    /// Returns the source text unchanged
    Identity,
    /// Fails on these 0-based call numbers, works otherwise
    FailOnCalls(HashSet<usize>),
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Answers with an empty string
    Empty,
    /// Simulates a slow backend
    Slow { delay_ms: u64 },
}

/// Scripted translator recording every request it receives
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
    pair_status: PairStatus,
    stop_after: Option<(usize, SessionControl)>,
}

impl MockTranslator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            pair_status: PairStatus::Supported,
            stop_after: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn failing_on(calls: &[usize]) -> Self {
        Self::new(MockBehavior::FailOnCalls(calls.iter().copied().collect()))
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Status reported for every language pair
    pub fn with_pair_status(mut self, status: PairStatus) -> Self {
        self.pair_status = status;
        self
    }

    /// Request a stop on `control` once `calls` requests have been answered
    pub fn with_stop_after(mut self, calls: usize, control: SessionControl) -> Self {
        self.stop_after = Some((calls, control));
        self
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far, in order
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// What `Working` answers for `text`
    pub fn tagged(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    fn simulated_failure(call: usize) -> ProviderError {
        ProviderError::ApiError {
            status_code: 503,
            message: format!("Simulated failure (request #{})", call + 1),
        }
    }
}

#[async_trait]
impl Provider for MockTranslator {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: MockRequest) -> Result<MockResponse, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some((after, control)) = &self.stop_after {
            if call + 1 >= *after {
                control.request_stop();
            }
        }

        let text = match &self.behavior {
            MockBehavior::Working => Self::tagged(&request.text, &request.target_language),
            MockBehavior::Identity => request.text,
            MockBehavior::FailOnCalls(calls) => {
                if calls.contains(&call) {
                    return Err(Self::simulated_failure(call));
                }
                Self::tagged(&request.text, &request.target_language)
            }
            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && call % fail_every == fail_every - 1 {
                    return Err(Self::simulated_failure(call));
                }
                Self::tagged(&request.text, &request.target_language)
            }
            MockBehavior::Failing => {
                return Err(ProviderError::ConnectionError("Simulated provider failure".to_string()));
            }
            MockBehavior::Empty => String::new(),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Self::tagged(&request.text, &request.target_language)
            }
        };

        Ok(MockResponse { text })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated provider failure".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &MockResponse) -> String {
        response.text.clone()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let response = self
            .complete(MockRequest {
                text: text.to_string(),
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
            })
            .await?;

        let text = Self::extract_text(&response);
        if text.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl LanguagePairAvailability for MockTranslator {
    async fn status(&self, _source_language: &str, _target_language: &str) -> PairStatus {
        self.pair_status
    }
}
