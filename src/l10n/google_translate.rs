//! Google Translate API provider
//!
//! Talks to Google Translate API v2. The API key is read from the
//! `GOOGLE_TRANSLATE_API_KEY` environment variable by [`GoogleTranslateProvider::from_env`].
//!
//! Each call sends one phrase. The phrase cache runs one call per pending
//! phrase, so a rejected phrase fails alone and the rest keep their results.

use crate::l10n::error::{L10nError, L10nResult};
use crate::l10n::translator::{MachineTranslator, normalize_locale, validate_locale};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Per-string limit imposed by the API
    const MAX_CHARS_PER_STRING: usize = 30_000;

    pub fn new(api_key: String) -> L10nResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a provider against a non-default endpoint (proxies, test servers)
    pub fn with_base_url(api_key: String, base_url: String) -> L10nResult<Self> {
        if api_key.trim().is_empty() {
            return Err(L10nError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| L10nError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url,
        })
    }

    /// Create a provider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> L10nResult<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| {
            L10nError::ConfigError(
                "GOOGLE_TRANSLATE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(api_key)
    }

    fn check_length(text: &str) -> L10nResult<()> {
        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(L10nError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }
        Ok(())
    }

    async fn request(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> L10nResult<String> {
        let url = format!("{}?key={}", self.base_url, self.api_key);

        let body = json!({
            "q": [text],
            "source": normalize_locale(source_locale),
            "target": normalize_locale(target_locale),
            "format": "text"
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                L10nError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                L10nError::TranslationError(format!(
                    "API server error ({}): {}",
                    status, error_text
                ))
            });
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            L10nError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        first_translation(parsed)
    }
}

fn first_translation(response: TranslateResponse) -> L10nResult<String> {
    let count = response.data.translations.len();
    match response.data.translations.into_iter().next() {
        Some(t) if count == 1 => Ok(t.translated_text),
        _ => Err(L10nError::TranslationError(format!(
            "API returned {} translations for 1 text",
            count
        ))),
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> L10nResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }
        Self::check_length(text)?;

        self.request(text, source_locale, target_locale).await
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
