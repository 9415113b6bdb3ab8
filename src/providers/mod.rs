/*!
 * Translation provider boundary.
 *
 * This module defines the capability contract the orchestrator drives:
 * - WebDriver: browser-automation session against the translation web UI
 * - Mock: scripted providers for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One translation request: a single line or merged caption text
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// The text to translate
    pub text: String,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
}

impl TranslationRequest {
    pub fn new(text: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

/// Provider response: one or more candidate renderings of the translation
#[derive(Debug, Clone)]
pub struct TranslationResponse {
    /// Candidate translations, in page order
    pub candidates: Vec<String>,

    /// Whether the candidates are a gender-variant pair
    pub gender_variants: bool,
}

impl TranslationResponse {
    /// Pick the single canonical rendering from the candidates.
    ///
    /// When the provider flags a gender-variant situation and surfaces
    /// exactly two candidates, the second is preferred; otherwise all
    /// candidates are concatenated with a separating space and trimmed.
    pub fn canonical_text(&self) -> String {
        if self.gender_variants && self.candidates.len() == 2 {
            return self.candidates[1].trim().to_string();
        }

        self.candidates.join(" ").trim().to_string()
    }
}

/// Common trait for translation providers.
///
/// A provider is a single stateful session owned exclusively by the
/// orchestrator for the duration of one file. Calls block until the
/// provider returns, times out, or fails; every failure is transient from
/// the caller's point of view and subject to the orchestrator's retry
/// budget.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate one text for the given language pair
    async fn translate(&self, request: TranslationRequest) -> Result<TranslationResponse, ProviderError>;

    /// Release the underlying session. Must be safe to call on every exit
    /// path, including after failures.
    async fn close(&self) -> Result<(), ProviderError>;
}

pub mod webdriver;
pub mod mock;
