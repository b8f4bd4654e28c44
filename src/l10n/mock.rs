//! Mock Machine Translator for testing
//!
//! A deterministic, API-free translator for exercising the localization
//! pipeline without API keys or network access.
//!
//! # Example
//!
//! ```ignore
//! use catalog_l10n::l10n::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("Cotton Tee", "en", "fr").await.unwrap();
//!     assert_eq!(result, "Cotton Tee_fr");
//! }
//! ```

use crate::l10n::error::{L10nError, L10nResult};
use crate::l10n::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "Soft" → "Soft_fr"
    Suffix,

    /// Predefined (text, target_locale) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Reverse the order of space-separated words
    Reorder,

    /// Fail every call with the given message
    Error(String),

    /// Fail only for this exact phrase, suffix everything else
    FailOn(String),

    /// Return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share one call counter, so a test can hand a clone to the
/// pipeline and still observe how many provider calls were made.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a MockTranslator with simulated network delay per call
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `translate` calls so far, across all clones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, _source: &str, target: &str) -> L10nResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => Ok(text.split_whitespace().rev().collect::<Vec<_>>().join(" ")),
            MockMode::Error(msg) => Err(L10nError::TranslationError(msg.clone())),
            MockMode::FailOn(phrase) if phrase == text => Err(L10nError::TranslationError(
                format!("refused to translate `{}`", text),
            )),
            MockMode::FailOn(_) => Ok(format!("{}_{}", text, target)),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> L10nResult<String> {
        self.apply_delay().await;
        self.apply_translation(text, source_locale, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
