/*!
 * Error types for the subtranslate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when driving the translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error establishing the browser automation session
    #[error("Failed to start WebDriver session: {0}")]
    SessionFailed(String),

    /// Error when an HTTP request to the WebDriver endpoint fails
    #[error("WebDriver request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a WebDriver response fails
    #[error("Failed to parse WebDriver response: {0}")]
    ParseError(String),

    /// Error returned by the WebDriver endpoint itself
    #[error("WebDriver error: {error} - {message}")]
    Protocol {
        /// W3C error code (e.g. "no such element")
        error: String,
        /// Human readable message from the driver
        message: String,
    },

    /// The translation result element was not present on the page
    #[error("Page element not found: {0}")]
    ElementNotFound(String),

    /// The request or page render did not complete in time
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The provider returned no usable translation candidates
    #[error("Empty translation result for input: {0}")]
    EmptyResult(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error parsing a subtitle file
    #[error("Subtitle parse error: {0}")]
    Parse(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
