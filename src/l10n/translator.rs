//! Translation provider trait and locale helpers
//!
//! The pipeline never talks to a translation backend directly. It holds a
//! `MachineTranslator` trait object, so Google Translate, the mock used in
//! tests, or any other backend can be swapped in.
//!
//! # Example
//!
//! ```ignore
//! use catalog_l10n::l10n::{MachineTranslator, GoogleTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let result = provider.translate("Cotton Tee", "en", "fr").await?;
//!     println!("{}", result); // "T-shirt en coton"
//!     Ok(())
//! }
//! ```

use crate::l10n::error::{L10nError, L10nResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations must be safe to call concurrently: the cache resolves
/// every pending phrase in its own task, all sharing one provider.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single phrase from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The phrase to translate
    /// * `source_locale` - Source language code (e.g., "en", "en-US")
    /// * `target_locale` - Target language code (e.g., "fr", "fr-FR")
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> L10nResult<String>;

    /// Name used in logs to identify the provider
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `FR` → `fr`
pub fn normalize_locale(locale: &str) -> String {
    locale.split(['-', '_']).next().unwrap_or(locale).to_lowercase()
}

/// Validate that a locale code contains only alphanumerics, hyphens and underscores
pub fn validate_locale(locale: &str) -> L10nResult<()> {
    if locale.is_empty() {
        return Err(L10nError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(L10nError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

/// True when translating between the two locales is the identity
///
/// Catalog text written in the source language needs no round trip
/// through a provider when the target shares its base language.
pub fn is_same_language(source_locale: &str, target_locale: &str) -> bool {
    normalize_locale(source_locale) == normalize_locale(target_locale)
}
