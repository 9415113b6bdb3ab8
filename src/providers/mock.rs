/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock translators that simulate different behaviors:
 * - `MockTranslator::identity()` - echoes the input back unchanged
 * - `MockTranslator::failing()` - always fails with an error
 * - `MockTranslator::fail_first(n)` - fails the first n requests, then succeeds
 * - `MockTranslator::gender_pair(...)` - returns a flagged gender-variant pair
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{TranslationProvider, TranslationRequest, TranslationResponse};

/// Behavior mode for the mock translator
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Echo the request text back unchanged
    Identity,
    /// Always fails with an error
    Failing,
    /// Fail the first n requests, then echo
    FailFirst { failures: usize },
    /// Return a fixed gender-variant candidate pair
    GenderPair { masculine: String, feminine: String },
    /// Return fixed unflagged candidates
    Candidates { candidates: Vec<String> },
}

/// Mock translator for testing orchestration behavior
#[derive(Debug)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Requests seen so far
    request_count: Arc<AtomicUsize>,
    /// Close calls seen so far
    close_count: Arc<AtomicUsize>,
    /// Custom response generator (optional, overrides behavior on success)
    custom_response: Option<fn(&TranslationRequest) -> String>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            close_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create an identity mock that echoes input back
    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails the first `failures` requests, then echoes
    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Create a mock that returns a flagged gender-variant pair
    pub fn gender_pair(masculine: &str, feminine: &str) -> Self {
        Self::new(MockBehavior::GenderPair {
            masculine: masculine.to_string(),
            feminine: feminine.to_string(),
        })
    }

    /// Create a mock that returns fixed unflagged candidates
    pub fn candidates(candidates: &[&str]) -> Self {
        Self::new(MockBehavior::Candidates {
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&TranslationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate requests received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Number of close calls received
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    fn success_text(&self, request: &TranslationRequest) -> String {
        if let Some(generator) = self.custom_response {
            generator(request)
        } else {
            request.text.clone()
        }
    }
}

impl Clone for MockTranslator {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            close_count: Arc::clone(&self.close_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl TranslationProvider for MockTranslator {
    async fn translate(&self, request: TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Identity => Ok(TranslationResponse {
                candidates: vec![self.success_text(&request)],
                gender_variants: false,
            }),

            MockBehavior::Failing => Err(ProviderError::ElementNotFound(
                "simulated provider failure".to_string(),
            )),

            MockBehavior::FailFirst { failures } => {
                if count < *failures {
                    Err(ProviderError::Timeout(format!(
                        "simulated transient failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(TranslationResponse {
                        candidates: vec![self.success_text(&request)],
                        gender_variants: false,
                    })
                }
            }

            MockBehavior::GenderPair { masculine, feminine } => Ok(TranslationResponse {
                candidates: vec![masculine.clone(), feminine.clone()],
                gender_variants: true,
            }),

            MockBehavior::Candidates { candidates } => Ok(TranslationResponse {
                candidates: candidates.clone(),
                gender_variants: false,
            }),
        }
    }

    async fn close(&self) -> Result<(), ProviderError> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
