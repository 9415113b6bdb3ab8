use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The translation web UI addresses languages by their ISO 639-1
/// (2-letter) codes, so that is the only form the configuration accepts.
/// Validate that a language code is a well-formed ISO 639-1 code
pub fn validate_language_code(code: &str) -> Result<()> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 && Language::from_639_1(&normalized_code).is_some() {
        return Ok(());
    }

    Err(anyhow!("Invalid ISO 639-1 language code: {}", code))
}

/// Get the English name of a language from its ISO 639-1 code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    Language::from_639_1(&normalized_code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Unknown language code: {}", code))
}
