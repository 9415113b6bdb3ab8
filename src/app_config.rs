use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO 639-1)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO 639-1)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation provider config
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Orchestration config (retry budget, throttling)
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Resume/checkpoint config
    #[serde(default)]
    pub resume: ResumeConfig,

    /// What to do when a file in directory mode fails to parse
    #[serde(default)]
    pub on_parse_error: ParseErrorPolicy,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// WebDriver-backed translation provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// WebDriver endpoint URL (chromedriver-compatible)
    #[serde(default = "default_webdriver_endpoint")]
    pub endpoint: String,

    /// Base URL of the translation web UI
    #[serde(default = "default_translate_url")]
    pub translate_url: String,

    /// Fixed wait after navigation for the page to render, in milliseconds
    #[serde(default = "default_render_wait_ms")]
    pub render_wait_ms: u64,

    /// How many times to re-read a result that still ends with an ellipsis
    #[serde(default = "default_render_poll_attempts")]
    pub render_poll_attempts: u32,

    /// Wait between result re-reads, in milliseconds
    #[serde(default = "default_render_poll_wait_ms")]
    pub render_poll_wait_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Run the browser headless
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_webdriver_endpoint(),
            translate_url: default_translate_url(),
            render_wait_ms: default_render_wait_ms(),
            render_poll_attempts: default_render_poll_attempts(),
            render_poll_wait_ms: default_render_poll_wait_ms(),
            timeout_secs: default_timeout_secs(),
            headless: true,
        }
    }
}

/// Orchestration configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Attempts per caption line before degrading to the error sentinel
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after every Nth caption completed since the resume cursor
    #[serde(default = "default_throttle_every")]
    pub throttle_every: usize,

    /// Duration of the unconditional throttle pause, in milliseconds
    #[serde(default = "default_throttle_pause_ms")]
    pub throttle_pause_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            throttle_every: default_throttle_every(),
            throttle_pause_ms: default_throttle_pause_ms(),
        }
    }
}

/// Resume/checkpoint configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResumeConfig {
    /// Reject a checkpoint whose timecodes disagree with the source.
    /// The pipeline never rewrites timecodes, so a mismatch means the
    /// checkpoint belongs to a different source file.
    #[serde(default = "default_true")]
    pub validate_timecodes: bool,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            validate_timecodes: true,
        }
    }
}

/// Policy for parse failures in directory mode
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorPolicy {
    /// Log the error and continue with the next file
    #[default]
    Skip,
    /// Stop the whole batch
    Abort,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "pt".to_string()
}

fn default_webdriver_endpoint() -> String {
    "http://localhost:9515".to_string()
}

fn default_translate_url() -> String {
    "https://translate.google.com/".to_string()
}

fn default_render_wait_ms() -> u64 {
    2000
}

fn default_render_poll_attempts() -> u32 {
    3
}

fn default_render_poll_wait_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}

fn default_throttle_every() -> usize {
    10
}

fn default_throttle_pause_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        crate::language_utils::validate_language_code(&self.source_language)?;
        crate::language_utils::validate_language_code(&self.target_language)?;

        if self.source_language.eq_ignore_ascii_case(&self.target_language) {
            return Err(anyhow!(
                "Source and target language are both '{}'",
                self.source_language
            ));
        }

        // Validate endpoints
        Url::parse(&self.provider.endpoint)
            .map_err(|e| anyhow!("Invalid WebDriver endpoint '{}': {}", self.provider.endpoint, e))?;
        Url::parse(&self.provider.translate_url)
            .map_err(|e| anyhow!("Invalid translate URL '{}': {}", self.provider.translate_url, e))?;

        if self.pipeline.max_attempts == 0 {
            return Err(anyhow!("pipeline.max_attempts must be at least 1"));
        }

        if self.pipeline.throttle_every == 0 {
            return Err(anyhow!("pipeline.throttle_every must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            provider: ProviderConfig::default(),
            pipeline: PipelineConfig::default(),
            resume: ResumeConfig::default(),
            on_parse_error: ParseErrorPolicy::default(),
            log_level: LogLevel::default(),
        }
    }
}
