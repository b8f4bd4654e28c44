//! Phrase cache
//!
//! Maps each unique source phrase to its translation so that every phrase in
//! a catalog is translated exactly once, however many products repeat it.
//!
//! An entry whose value is the empty string is *pending*: it has been
//! registered but not yet translated. The cache moves through three uses
//! per run:
//!
//! 1. `register` adds pending entries (many concurrent writers)
//! 2. `resolve_all` translates every pending entry (one task per phrase)
//! 3. `lookup` reads translations back (read-only)
//!
//! A cache loaded from a snapshot keeps its existing translations, so a run
//! only pays for phrases it has not seen before.

use crate::l10n::cancel::CancelToken;
use crate::l10n::error::{L10nError, L10nResult};
use crate::l10n::translator::{MachineTranslator, is_same_language, validate_locale};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Price per translated character in USD
pub const DEFAULT_RATE_PER_CHAR: f64 = 0.00002;

/// Marginal translation cost of the phrases added in this run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub new_characters: usize,
    pub rate: f64,
}

impl CostEstimate {
    pub fn amount(&self) -> f64 {
        self.rate * self.new_characters as f64
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "USD {:.4} ({} new characters)",
            self.amount(),
            self.new_characters
        )
    }
}

/// How the pending entries of a cache get translated
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub source_locale: String,
    pub target_locale: String,
    /// Upper bound on in-flight translations, 0 for unbounded
    pub max_concurrency: usize,
    /// Give up on the phase after this long
    pub deadline: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl ResolveOptions {
    pub fn new(source_locale: &str, target_locale: &str) -> Self {
        Self {
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
            max_concurrency: 0,
            deadline: None,
            cancel: None,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Outcome of a successful `resolve_all`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Entries that were pending and now carry a translation
    pub resolved: usize,
    /// Calls made to the translation provider
    pub translator_calls: usize,
}

/// Concurrency-safe map from source phrase to translation
#[derive(Debug)]
pub struct PhraseCache {
    entries: RwLock<HashMap<String, String>>,
    baseline_chars: usize,
    rate: f64,
}

fn char_len(entries: &HashMap<String, String>) -> usize {
    entries.keys().map(|k| k.chars().count()).sum()
}

impl PhraseCache {
    pub fn new() -> Self {
        Self::from_snapshot(HashMap::new())
    }

    /// Build a cache from a persisted snapshot, using its size as the cost baseline
    pub fn from_snapshot(snapshot: HashMap<String, String>) -> Self {
        let baseline_chars = char_len(&snapshot);
        Self {
            entries: RwLock::new(snapshot),
            baseline_chars,
            rate: DEFAULT_RATE_PER_CHAR,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    // A panic while holding the lock cannot leave a half-written String in
    // the map, so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert each phrase as pending unless it is already present
    ///
    /// Returns how many phrases were new. Safe to call from many tasks at once.
    pub fn register<I, S>(&self, phrases: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let missing: Vec<S> = {
            let entries = self.read();
            phrases
                .into_iter()
                .filter(|p| {
                    let key: &str = p.as_ref();
                    !entries.contains_key(key)
                })
                .collect()
        };
        if missing.is_empty() {
            return 0;
        }

        let mut entries = self.write();
        let mut inserted = 0;
        for phrase in &missing {
            let phrase: &str = phrase.as_ref();
            // Another producer may have inserted it between the two locks
            if !entries.contains_key(phrase) {
                entries.insert(phrase.to_string(), String::new());
                inserted += 1;
            }
        }
        inserted
    }

    /// Translate every pending entry, one task per phrase
    ///
    /// Entries that already carry a translation are left alone. On the first
    /// failure, cancellation or deadline the remaining tasks are aborted and
    /// the error is returned. Phrases not yet written back stay pending so a
    /// later run can retry them.
    pub async fn resolve_all(
        &self,
        translator: Arc<dyn MachineTranslator>,
        options: &ResolveOptions,
    ) -> L10nResult<ResolveReport> {
        let pending = self.pending();
        if pending.is_empty() {
            debug!("No pending phrases to resolve");
            return Ok(ResolveReport::default());
        }

        validate_locale(&options.source_locale)?;
        validate_locale(&options.target_locale)?;

        if is_same_language(&options.source_locale, &options.target_locale) {
            let mut entries = self.write();
            for phrase in &pending {
                entries.insert(phrase.clone(), phrase.clone());
            }
            info!(
                phrases = pending.len(),
                "Target shares the source language, phrases kept as-is"
            );
            return Ok(ResolveReport {
                resolved: pending.len(),
                translator_calls: 0,
            });
        }

        info!(
            phrases = pending.len(),
            provider = translator.provider_name(),
            target = %options.target_locale,
            "Resolving pending phrases"
        );

        let limiter = (options.max_concurrency > 0)
            .then(|| Arc::new(Semaphore::new(options.max_concurrency)));
        let translator_calls = pending.len();

        let mut tasks = JoinSet::new();
        for phrase in pending {
            let translator = Arc::clone(&translator);
            let limiter = limiter.clone();
            let source = options.source_locale.clone();
            let target = options.target_locale.clone();
            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => match limiter.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(e) => {
                            let err = L10nError::TaskError(format!("limiter closed: {}", e));
                            return (phrase, Err(err));
                        }
                    },
                    None => None,
                };
                let result = translator.translate(&phrase, &source, &target).await;
                (phrase, result)
            });
        }

        let deadline = options.deadline.map(|d| Instant::now() + d);
        let mut resolved = 0;

        let outcome: L10nResult<()> = loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    None => break Ok(()),
                    Some(Ok((phrase, Ok(translation)))) => {
                        if translation.is_empty() {
                            break Err(L10nError::TranslationError(format!(
                                "empty translation for `{}`",
                                phrase
                            )));
                        }
                        self.write().insert(phrase, translation);
                        resolved += 1;
                    }
                    Some(Ok((phrase, Err(err)))) => {
                        warn!(%phrase, error = %err, "Translation failed");
                        break Err(err);
                    }
                    Some(Err(err)) => break Err(err.into()),
                },
                _ = sleep_until(deadline) => {
                    break Err(L10nError::DeadlineExceeded(format!(
                        "{} of {} phrases resolved",
                        resolved, translator_calls
                    )));
                }
                _ = wait_cancelled(options.cancel.as_ref()) => {
                    break Err(L10nError::Cancelled(format!(
                        "{} of {} phrases resolved",
                        resolved, translator_calls
                    )));
                }
            }
        };

        if let Err(err) = outcome {
            tasks.abort_all();
            warn!(
                resolved,
                still_pending = self.pending_count(),
                "Resolution stopped early"
            );
            return Err(err);
        }

        info!(resolved, "All pending phrases resolved");
        Ok(ResolveReport {
            resolved,
            translator_calls,
        })
    }

    /// Translation for a phrase, which must have been registered and resolved
    pub fn lookup(&self, phrase: &str) -> L10nResult<String> {
        match self.read().get(phrase) {
            Some(translation) if !translation.is_empty() => Ok(translation.clone()),
            Some(_) => Err(L10nError::InvariantViolation(format!(
                "phrase `{}` is registered but was never resolved",
                phrase
            ))),
            None => Err(L10nError::InvariantViolation(format!(
                "phrase `{}` was never registered",
                phrase
            ))),
        }
    }

    /// Raw entry, pending entries included as `Some("")`
    pub fn get(&self, phrase: &str) -> Option<String> {
        self.read().get(phrase).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn pending(&self) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.read().values().filter(|v| v.is_empty()).count()
    }

    /// Total character length of all keys
    pub fn char_count(&self) -> usize {
        char_len(&self.read())
    }

    pub fn cost_delta(&self) -> CostEstimate {
        CostEstimate {
            new_characters: self.char_count().saturating_sub(self.baseline_chars),
            rate: self.rate,
        }
    }

    /// Resolved entries only, ready to be persisted
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.read()
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for PhraseCache {
    fn default() -> Self {
        Self::new()
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn wait_cancelled(cancel: Option<&CancelToken>) {
    match cancel {
        Some(cancel) => cancel.cancelled().await,
        None => std::future::pending().await,
    }
}
