/*!
 * Tests for the translation provider boundary
 */

use tokio_test::block_on;

use subtranslate::errors::ProviderError;
use subtranslate::providers::mock::MockTranslator;
use subtranslate::providers::{TranslationProvider, TranslationRequest, TranslationResponse};

#[test]
fn test_identityProvider_shouldEchoRequestText() {
    let provider = MockTranslator::identity();
    let request = TranslationRequest::new("Hello world", "en", "pt");

    let response = block_on(provider.translate(request)).unwrap();
    assert_eq!(response.canonical_text(), "Hello world");
    assert!(!response.gender_variants);
}

#[test]
fn test_failingProvider_shouldSurfaceProviderError() {
    let provider = MockTranslator::failing();
    let request = TranslationRequest::new("Hello", "en", "pt");

    let result = block_on(provider.translate(request));
    assert!(matches!(result, Err(ProviderError::ElementNotFound(_))));
}

#[test]
fn test_close_shouldBeIdempotentlyCounted() {
    let provider = MockTranslator::identity();

    block_on(provider.close()).unwrap();
    block_on(provider.close()).unwrap();

    assert_eq!(provider.close_count(), 2);
}

#[test]
fn test_providerTraitObject_shouldBeUsableBehindDyn() {
    // The orchestrator holds providers as trait objects
    let provider = MockTranslator::identity();
    let provider: &dyn TranslationProvider = &provider;

    let response = block_on(provider.translate(TranslationRequest::new("x", "en", "pt"))).unwrap();
    assert_eq!(response.candidates, vec!["x".to_string()]);
}

#[test]
fn test_canonicalText_againstEmptyCandidates_shouldBeEmpty() {
    let response = TranslationResponse {
        candidates: Vec::new(),
        gender_variants: false,
    };

    assert_eq!(response.canonical_text(), "");
}
