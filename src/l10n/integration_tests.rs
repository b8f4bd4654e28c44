//! End-to-end tests for the localization pipeline
//!
//! These run the full register → resolve → apply flow against the mock
//! translator and the in-memory store. The Google Translate run is ignored
//! by default:
//!
//! ```bash
//! cargo test --lib l10n::integration_tests -- --ignored --nocapture
//! ```

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::catalog::{FieldSelector, Product};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn boxer_briefs() -> Vec<Product> {
        vec![
            Product::new("BB-100", "MyBrand", true)
                .with_attribute("AMZTitle", "Men's Weekday Boxer Brief Underwear-Small")
                .with_attribute("AMZDescription", "<p>Soft <b>MyBrand</b> stretch cotton.</p>")
                .with_attribute("FeatureBullet1", "Tag-free comfort")
                .with_attribute("AMZSize", "Small"),
            Product::new("BB-100-M", "MyBrand", false)
                .with_attribute("AMZTitle", "Men's Weekday Boxer Brief Underwear-Medium")
                .with_attribute("FeatureBullet1", "Tag-free comfort"),
        ]
    }

    #[tokio::test]
    async fn test_parent_title_is_one_phrase() {
        let cache = Arc::new(PhraseCache::new());
        let mut pipeline = Pipeline::new(Arc::clone(&cache), FieldSelector::new(["AMZTitle"]));
        let products = vec![
            Product::new("BB-100", "MyBrand", true)
                .with_attribute("AMZTitle", "Men's Weekday Boxer Brief Underwear-Small"),
        ];

        let (translated, _) = pipeline
            .run(
                products,
                Arc::new(MockTranslator::new(MockMode::Suffix)),
                &ResolveOptions::new("en", "FR"),
            )
            .await
            .unwrap();

        assert_eq!(
            translated[0].attribute("AMZTitle"),
            Some("Men's Weekday Boxer Brief Underwear-Small_FR")
        );
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_full_catalog_with_identity_translation() {
        let mut pipeline = Pipeline::new(Arc::new(PhraseCache::new()), FieldSelector::default());
        let products = boxer_briefs();

        let (translated, _) = pipeline
            .run(
                products.clone(),
                Arc::new(MockTranslator::new(MockMode::NoOp)),
                &ResolveOptions::new("en", "fr"),
            )
            .await
            .unwrap();

        assert_eq!(translated, products);
    }

    #[tokio::test]
    async fn test_each_unique_phrase_translated_once() {
        let mut products = Vec::new();
        for i in 0..200 {
            products.push(
                Product::new(&format!("SKU-{}", i), "MyBrand", true)
                    .with_attribute("AMZTitle", "MyBrand Cotton Tee")
                    .with_attribute("FeatureBullet1", "<b>Soft</b> and warm")
                    .with_attribute("FeatureBullet2", &format!("Style {}", i % 7)),
            );
        }

        let mock = MockTranslator::with_delay(MockMode::Suffix, 1);
        let mut pipeline = Pipeline::new(Arc::new(PhraseCache::new()), FieldSelector::default());
        let options = ResolveOptions::new("en", "de").with_max_concurrency(8);
        let (translated, report) = pipeline
            .run(products, Arc::new(mock.clone()), &options)
            .await
            .unwrap();

        // "Cotton Tee", "Soft", "and warm", "Style"
        assert_eq!(mock.call_count(), 4);
        assert_eq!(report.resolve.resolved, 4);
        assert_eq!(translated.len(), 200);
        assert_eq!(translated[42].sku, "SKU-42");
        assert_eq!(
            translated[42].attribute("FeatureBullet2"),
            Some("Style_de 0")
        );
        assert_eq!(
            translated[199].attribute("FeatureBullet1"),
            Some("<b>Soft_de</b> and warm_de")
        );
    }

    #[tokio::test]
    async fn test_second_run_uses_persisted_snapshot() {
        let store = MemoryStore::new();
        let key = cache_key("UK");

        // First run translates everything and persists the cache
        let first = MockTranslator::new(MockMode::Suffix);
        let cache = Arc::new(PhraseCache::from_snapshot(store.load(&key).await.unwrap()));
        let mut pipeline = Pipeline::new(Arc::clone(&cache), FieldSelector::default());
        pipeline
            .run(boxer_briefs(), Arc::new(first.clone()), &ResolveOptions::new("en", "fr"))
            .await
            .unwrap();
        store.save(&key, &cache.snapshot()).await.unwrap();
        assert!(first.call_count() > 0);

        // Second run over the same catalog costs nothing and calls no provider
        let second = MockTranslator::new(MockMode::Suffix);
        let cache = Arc::new(PhraseCache::from_snapshot(store.load(&key).await.unwrap()));
        assert_eq!(cache.cost_delta().amount(), 0.0);
        let mut pipeline = Pipeline::new(Arc::clone(&cache), FieldSelector::default());
        let (_, report) = pipeline
            .run(boxer_briefs(), Arc::new(second.clone()), &ResolveOptions::new("en", "fr"))
            .await
            .unwrap();

        assert_eq!(second.call_count(), 0);
        assert_eq!(report.cost.new_characters, 0);
    }

    #[tokio::test]
    async fn test_failed_run_persists_only_resolved_entries() {
        let mut snapshot = HashMap::new();
        snapshot.insert("Tag-free comfort".to_string(), "Sans étiquette".to_string());
        let cache = Arc::new(PhraseCache::from_snapshot(snapshot));
        let mut pipeline = Pipeline::new(Arc::clone(&cache), FieldSelector::default());

        let result = pipeline
            .run(
                boxer_briefs(),
                Arc::new(MockTranslator::new(MockMode::Error("quota exceeded".to_string()))),
                &ResolveOptions::new("en", "fr"),
            )
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().is_retryable());
        let persisted = cache.snapshot();
        assert_eq!(persisted.len(), 1);
        assert!(cache.pending_count() > 0);
    }

    #[tokio::test]
    async fn test_markup_and_brand_untouched_by_translation() {
        let mut pipeline = Pipeline::new(Arc::new(PhraseCache::new()), FieldSelector::default());
        let (translated, _) = pipeline
            .run(
                boxer_briefs(),
                Arc::new(MockTranslator::new(MockMode::Reorder)),
                &ResolveOptions::new("en", "ja"),
            )
            .await
            .unwrap();

        assert_eq!(
            translated[0].attribute("AMZDescription"),
            Some("<p>Soft <b>MyBrand</b> cotton stretch.</p>")
        );
        assert_eq!(translated[0].attribute("AMZSize"), Some("Small"));
    }

    #[tokio::test]
    async fn test_custom_title_attribute_translates_size_separately() {
        let selector =
            FieldSelector::new(["ItemName", "AMZTitle"]).with_title_attribute("ItemName");
        let mut pipeline = Pipeline::new(Arc::new(PhraseCache::new()), selector);
        let products = vec![
            Product::new("HAT-S", "MyBrand", false)
                .with_attribute("ItemName", "MyBrand Wool Hat-Small")
                .with_attribute("AMZTitle", "Wool Hat-Small"),
        ];

        let (translated, _) = pipeline
            .run(
                products,
                Arc::new(MockTranslator::new(MockMode::Suffix)),
                &ResolveOptions::new("en", "fr"),
            )
            .await
            .unwrap();

        assert_eq!(
            translated[0].attribute("ItemName"),
            Some("MyBrand Wool Hat_fr-Small_fr")
        );
        assert_eq!(translated[0].attribute("AMZTitle"), Some("Wool Hat-Small_fr"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_google_translate_end_to_end() {
        if std::env::var("GOOGLE_TRANSLATE_API_KEY").is_err() {
            eprintln!("Skipping: GOOGLE_TRANSLATE_API_KEY not set");
            return;
        }

        let provider = Arc::new(GoogleTranslateProvider::from_env().unwrap());
        let mut pipeline = Pipeline::new(Arc::new(PhraseCache::new()), FieldSelector::default());
        let (translated, report) = pipeline
            .run(boxer_briefs(), provider, &ResolveOptions::new("en", "fr"))
            .await
            .unwrap();

        println!("Cost: {}", report.cost);
        for product in &translated {
            println!("{:#?}", product.attributes);
        }
        let description = translated[0].attribute("AMZDescription").unwrap();
        assert!(description.contains("<b>MyBrand</b>"));
    }
}
