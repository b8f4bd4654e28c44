//! Pipeline controller
//!
//! Runs the three localization phases over a product set, each one a fan-out
//! of tokio tasks followed by a full join:
//!
//! 1. **Register** - one task per product tokenizes its translatable fields
//!    and registers every phrase in the shared [`PhraseCache`].
//! 2. **Resolve** - one task per unique pending phrase calls the translator.
//! 3. **Apply** - one task per product re-tokenizes its fields and rebuilds
//!    them from the cache, writing into its own output slot.
//!
//! No phase starts before the previous one has fully finished. Reassembly
//! depends on every registered phrase being resolved, so phases called out
//! of order fail with `InvalidState` instead of running.

use crate::catalog::{FieldParts, FieldSelector, Product};
use crate::l10n::cache::{CostEstimate, PhraseCache, ResolveOptions, ResolveReport};
use crate::l10n::error::{L10nError, L10nResult};
use crate::l10n::reassembly::reassemble;
use crate::l10n::tokenizer::{phrases, tokenize};
use crate::l10n::translator::MachineTranslator;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Registering,
    Resolving,
    Applying,
    Done,
    Failed,
}

/// Counts gathered over a full run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub products: usize,
    /// Phrases added to the cache by this run
    pub phrases_registered: usize,
    pub resolve: ResolveReport,
    pub cost: CostEstimate,
}

#[derive(Debug)]
pub struct Pipeline {
    cache: Arc<PhraseCache>,
    selector: Arc<FieldSelector>,
    state: PipelineState,
    phrases_registered: usize,
    resolve_report: ResolveReport,
}

impl Pipeline {
    pub fn new(cache: Arc<PhraseCache>, selector: FieldSelector) -> Self {
        Self {
            cache,
            selector: Arc::new(selector),
            state: PipelineState::Idle,
            phrases_registered: 0,
            resolve_report: ResolveReport::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn cache(&self) -> &Arc<PhraseCache> {
        &self.cache
    }

    fn enter(&mut self, allowed: &[PipelineState], next: PipelineState) -> L10nResult<()> {
        if !allowed.contains(&self.state) {
            return Err(L10nError::InvalidState(format!(
                "cannot enter {:?} from {:?}",
                next, self.state
            )));
        }
        self.state = next;
        Ok(())
    }

    fn finish<T>(&mut self, phase: &str, result: L10nResult<T>) -> L10nResult<T> {
        if let Err(err) = &result {
            error!(phase, error = %err, "Pipeline phase failed");
            self.state = PipelineState::Failed;
        }
        result
    }

    /// Phase 1: register the phrases of every product
    ///
    /// May be called several times to register products in batches.
    pub async fn register(&mut self, products: Arc<[Product]>) -> L10nResult<usize> {
        self.enter(
            &[PipelineState::Idle, PipelineState::Registering],
            PipelineState::Registering,
        )?;
        let start = Instant::now();

        let mut tasks = JoinSet::new();
        for index in 0..products.len() {
            let products = Arc::clone(&products);
            let selector = Arc::clone(&self.selector);
            let cache = Arc::clone(&self.cache);
            tasks.spawn(async move { register_product(&products[index], &selector, &cache) });
        }

        let mut inserted = 0;
        let mut outcome = Ok(());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(n) => inserted += n,
                Err(err) => {
                    outcome = Err(L10nError::from(err));
                    break;
                }
            }
        }
        let result = self.finish("register", outcome.map(|_| inserted))?;

        self.phrases_registered += result;
        info!(
            products = products.len(),
            new_phrases = result,
            cache_size = self.cache.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Registered phrases"
        );
        Ok(result)
    }

    /// Phase 2: translate every pending phrase
    pub async fn resolve(
        &mut self,
        translator: Arc<dyn MachineTranslator>,
        options: &ResolveOptions,
    ) -> L10nResult<ResolveReport> {
        self.enter(&[PipelineState::Registering], PipelineState::Resolving)?;
        let start = Instant::now();

        info!(cost = %self.cache.cost_delta(), "Estimated translation cost");
        let result = self.cache.resolve_all(translator, options).await;
        let report = self.finish("resolve", result)?;

        info!(
            resolved = report.resolved,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Resolved phrases"
        );
        self.resolve_report = report.clone();
        Ok(report)
    }

    /// Phase 3: rebuild every product's translatable fields from the cache
    ///
    /// Output order matches input order.
    pub async fn apply(&mut self, products: Arc<[Product]>) -> L10nResult<Vec<Product>> {
        self.enter(&[PipelineState::Resolving], PipelineState::Applying)?;
        let start = Instant::now();

        let result = self.apply_all(&products).await;
        let translated = self.finish("apply", result)?;

        self.state = PipelineState::Done;
        info!(
            products = translated.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Applied translations"
        );
        Ok(translated)
    }

    async fn apply_all(&self, products: &Arc<[Product]>) -> L10nResult<Vec<Product>> {
        let mut tasks = JoinSet::new();
        for index in 0..products.len() {
            let products = Arc::clone(products);
            let selector = Arc::clone(&self.selector);
            let cache = Arc::clone(&self.cache);
            tasks.spawn(async move {
                (index, apply_product(&products[index], &selector, &cache))
            });
        }

        let mut slots: Vec<Option<Product>> = vec![None; products.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, product) = joined?;
            slots[index] = Some(product?);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    L10nError::TaskError(format!("no output for product at index {}", index))
                })
            })
            .collect()
    }

    /// Register, resolve and apply in order
    pub async fn run(
        &mut self,
        products: Vec<Product>,
        translator: Arc<dyn MachineTranslator>,
        options: &ResolveOptions,
    ) -> L10nResult<(Vec<Product>, PipelineReport)> {
        let products: Arc<[Product]> = Arc::from(products);

        self.register(Arc::clone(&products)).await?;
        let cost = self.cache.cost_delta();
        self.resolve(translator, options).await?;
        let translated = self.apply(products).await?;

        let report = PipelineReport {
            products: translated.len(),
            phrases_registered: self.phrases_registered,
            resolve: self.resolve_report.clone(),
            cost,
        };
        Ok((translated, report))
    }
}

fn register_product(product: &Product, selector: &FieldSelector, cache: &PhraseCache) -> usize {
    let mut inserted = 0;
    for index in selector.select(product) {
        let parts = selector.parts(product, &product.attributes[index]);
        for part in parts.parts() {
            inserted += cache.register(phrases(part, &product.brand));
        }
    }
    inserted
}

fn apply_product(
    product: &Product,
    selector: &FieldSelector,
    cache: &PhraseCache,
) -> L10nResult<Product> {
    let mut translated = product.clone();
    for index in selector.select(product) {
        let parts = selector.parts(product, &product.attributes[index]);
        let head = reassemble(&tokenize(parts.head, &product.brand), cache)?;
        let size = parts
            .size
            .map(|size| reassemble(&tokenize(size, &product.brand), cache))
            .transpose()?;
        translated.attributes[index].value = FieldParts::join(head, size);
    }
    Ok(translated)
}
