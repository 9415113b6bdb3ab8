/*!
 * Browser-automation translation provider.
 *
 * Drives a chromedriver-compatible endpoint over the W3C WebDriver wire
 * protocol with plain HTTP: one session per file, navigate to the
 * translation web UI with the text in the query string, wait for the page
 * to render, read the result element's text.
 *
 * A single `translate` call is exactly one attempt; the bounded retry
 * budget lives in the orchestrator, not here. The only in-call waiting is
 * the fixed render wait plus a bounded re-poll while the result still ends
 * with an ellipsis (the page streams its translation in).
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use url::Url;

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::providers::{TranslationProvider, TranslationRequest, TranslationResponse};

/// W3C element identifier key in WebDriver responses
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Result span of the translation web UI
const RESULT_XPATH: &str = "//span[@class='tlid-translation translation']";

/// Label shown when the UI offers gender-specific translations
const GENDER_LABEL_XPATH: &str = "//*[contains(@class,'tlid-gender-translation-label')]";

/// WebDriver-backed translator session
#[derive(Debug)]
pub struct WebDriverTranslator {
    /// WebDriver endpoint URL
    endpoint: String,
    /// Base URL of the translation web UI
    translate_url: String,
    /// HTTP client for wire-protocol requests
    client: Client,
    /// Session id returned by the driver
    session_id: String,
    /// Fixed wait after navigation, ms
    render_wait_ms: u64,
    /// Re-reads allowed while the result still ends with an ellipsis
    render_poll_attempts: u32,
    /// Wait between re-reads, ms
    render_poll_wait_ms: u64,
    /// Whether the session has been deleted
    closed: AtomicBool,
}

impl WebDriverTranslator {
    /// Open a new browser session against the configured endpoint
    pub async fn connect(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::SessionFailed(e.to_string()))?;

        let mut args = vec!["--disable-gpu".to_string(), "--window-size=1280,900".to_string()];
        if config.headless {
            args.insert(0, "--headless=new".to_string());
        }

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let url = format!("{}/session", config.endpoint.trim_end_matches('/'));
        let value = Self::send(&client, Method::POST, &url, Some(capabilities)).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::SessionFailed("no sessionId in response".to_string()))?
            .to_string();

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            translate_url: config.translate_url.clone(),
            client,
            session_id,
            render_wait_ms: config.render_wait_ms,
            render_poll_attempts: config.render_poll_attempts,
            render_poll_wait_ms: config.render_poll_wait_ms,
            closed: AtomicBool::new(false),
        })
    }

    /// Build the translation page URL for one request
    fn build_translate_url(base: &str, request: &TranslationRequest) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            base,
            &[
                ("sl", request.source_language.as_str()),
                ("tl", request.target_language.as_str()),
                ("op", "translate"),
                ("text", request.text.as_str()),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("invalid translate URL: {}", e)))
    }

    /// Extract element ids from a find-elements response value
    fn parse_element_ids(value: &Value) -> Vec<String> {
        value
            .as_array()
            .map(|elements| {
                elements
                    .iter()
                    .filter_map(|e| e.get(ELEMENT_KEY).and_then(Value::as_str))
                    .map(|id| id.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Send one wire-protocol request and unwrap the W3C `value` envelope
    async fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> Result<Value, ProviderError> {
        let mut builder = client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(format!("request to {}", url))
            } else {
                ProviderError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        // W3C errors carry an error code and message inside `value`
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            return Err(Self::protocol_error(error.to_string(), message));
        }

        if !status.is_success() {
            return Err(ProviderError::RequestFailed(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        Ok(value)
    }

    /// Map a W3C error code to the provider error taxonomy
    fn protocol_error(error: String, message: String) -> ProviderError {
        match error.as_str() {
            "no such element" | "stale element reference" => ProviderError::ElementNotFound(message),
            "timeout" | "script timeout" => ProviderError::Timeout(message),
            _ => ProviderError::Protocol { error, message },
        }
    }

    /// Send a session-scoped command
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ProviderError> {
        let url = format!("{}/session/{}/{}", self.endpoint, self.session_id, path);
        Self::send(&self.client, method, &url, body).await
    }

    /// Find the result elements and read their texts, in page order
    async fn read_candidates(&self) -> Result<Vec<String>, ProviderError> {
        let found = self
            .command(
                Method::POST,
                "elements",
                Some(json!({ "using": "xpath", "value": RESULT_XPATH })),
            )
            .await?;

        let ids = Self::parse_element_ids(&found);
        if ids.is_empty() {
            return Err(ProviderError::ElementNotFound("translation result".to_string()));
        }

        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            let text = self
                .command(Method::GET, &format!("element/{}/text", id), None)
                .await?;
            if let Some(text) = text.as_str() {
                let text = text.trim();
                if !text.is_empty() {
                    candidates.push(text.to_string());
                }
            }
        }

        Ok(candidates)
    }

    /// Whether the page flags the current result as a gender-variant pair
    async fn has_gender_label(&self) -> bool {
        match self
            .command(
                Method::POST,
                "elements",
                Some(json!({ "using": "xpath", "value": GENDER_LABEL_XPATH })),
            )
            .await
        {
            Ok(found) => !Self::parse_element_ids(&found).is_empty(),
            Err(_) => false,
        }
    }

    /// Whether any candidate still ends with the streaming ellipsis
    fn still_rendering(candidates: &[String]) -> bool {
        candidates
            .iter()
            .any(|c| c.ends_with("...") || c.ends_with('…'))
    }
}

#[async_trait]
impl TranslationProvider for WebDriverTranslator {
    async fn translate(&self, request: TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        let page_url = Self::build_translate_url(&self.translate_url, &request)?;

        self.command(Method::POST, "url", Some(json!({ "url": page_url.as_str() })))
            .await?;

        // Give the page a moment to render the translation
        tokio::time::sleep(Duration::from_millis(self.render_wait_ms)).await;

        let mut candidates = self.read_candidates().await?;

        // The result streams in; re-read while it still ends with an ellipsis
        let mut polls = 0;
        while Self::still_rendering(&candidates) && polls < self.render_poll_attempts {
            tokio::time::sleep(Duration::from_millis(self.render_poll_wait_ms)).await;
            candidates = self.read_candidates().await?;
            polls += 1;
        }

        if candidates.is_empty() {
            return Err(ProviderError::EmptyResult(request.text));
        }

        let gender_variants = candidates.len() == 2 && self.has_gender_label().await;

        Ok(TranslationResponse {
            candidates,
            gender_variants,
        })
    }

    async fn close(&self) -> Result<(), ProviderError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        match Self::send(&self.client, Method::DELETE, &url, None).await {
            Ok(_) => Ok(()),
            // The driver may already have dropped the session
            Err(ProviderError::Protocol { error, .. }) if error == "invalid session id" => Ok(()),
            Err(e) => Err(e),
        }
    }
}
