/// Catalog Localization Module
///
/// Translates catalog text fields while keeping markup spans and brand names
/// verbatim. Each unique phrase in the whole catalog is translated exactly
/// once, and every field is then rebuilt in its original order from the
/// cached translations.
///
/// # Overview
///
/// 1. **Tokenizer** - Splits a field into literal, markup, brand and phrase segments
/// 2. **Phrase Cache** - Deduplicates phrases and resolves them through a translator
/// 3. **Reassembler** - Rebuilds a field from its segments and the cache
/// 4. **Pipeline** - Runs register, resolve and apply as barrier-separated phases
/// 5. **Providers & Stores** - Translator backends and snapshot persistence
///
/// # Example
///
/// ```ignore
/// use catalog_l10n::catalog::FieldSelector;
/// use catalog_l10n::l10n::{GoogleTranslateProvider, Pipeline, PhraseCache, ResolveOptions};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = Arc::new(PhraseCache::new());
///     let mut pipeline = Pipeline::new(cache, FieldSelector::default());
///     let provider = Arc::new(GoogleTranslateProvider::from_env()?);
///
///     let (translated, report) = pipeline
///         .run(products, provider, &ResolveOptions::new("en", "fr"))
///         .await?;
///     println!("{} products, cost {}", translated.len(), report.cost);
///     Ok(())
/// }
/// ```
pub mod cache;
pub mod cancel;
pub mod error;
pub mod google_translate;
pub mod mock;
pub mod pipeline;
pub mod reassembly;
pub mod store;
pub mod tokenizer;
pub mod translator;

#[cfg(test)]
mod integration_tests;

pub use cache::{CostEstimate, DEFAULT_RATE_PER_CHAR, PhraseCache, ResolveOptions, ResolveReport};
pub use cancel::CancelToken;
pub use error::{L10nError, L10nResult};
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use pipeline::{Pipeline, PipelineReport, PipelineState};
pub use reassembly::reassemble;
pub use store::{CacheStore, ExportSink, JsonFileSink, JsonFileStore, MemoryStore, cache_key};
pub use tokenizer::{Bag, Bags, Segment, TokenStream, phrases, tokenize};
pub use translator::{MachineTranslator, normalize_locale, validate_locale};
