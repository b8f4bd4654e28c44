//! Run configuration, read from `L10N_*` environment variables

use crate::l10n::cache::{DEFAULT_RATE_PER_CHAR, ResolveOptions};
use crate::l10n::error::{L10nError, L10nResult};
use crate::l10n::translator::validate_locale;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct L10nConfig {
    pub source_locale: String,
    pub target_locale: String,
    /// Channel tag of the target region; also names the cache snapshot
    pub channel_tag: String,
    /// 0 means one in-flight translation per pending phrase
    pub max_concurrency: usize,
    pub deadline: Option<Duration>,
    pub rate_per_char: f64,
    pub cache_dir: PathBuf,
}

impl Default for L10nConfig {
    fn default() -> Self {
        Self {
            source_locale: "en".to_string(),
            target_locale: "fr".to_string(),
            channel_tag: "FR".to_string(),
            max_concurrency: 64,
            deadline: None,
            rate_per_char: DEFAULT_RATE_PER_CHAR,
            cache_dir: PathBuf::from("cache"),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> L10nResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| L10nError::ConfigError(format!("{} has invalid value `{}`", name, value)))
}

impl L10nConfig {
    pub fn from_env() -> L10nResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> L10nResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("L10N_SOURCE_LOCALE") {
            config.source_locale = v;
        }
        if let Some(v) = lookup("L10N_TARGET_LOCALE") {
            config.target_locale = v;
        }
        if let Some(v) = lookup("L10N_CHANNEL_TAG") {
            config.channel_tag = v;
        }
        if let Some(v) = lookup("L10N_MAX_CONCURRENCY") {
            config.max_concurrency = parse_var("L10N_MAX_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("L10N_DEADLINE_SECS") {
            let secs: u64 = parse_var("L10N_DEADLINE_SECS", &v)?;
            config.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(v) = lookup("L10N_RATE_PER_CHAR") {
            config.rate_per_char = parse_var("L10N_RATE_PER_CHAR", &v)?;
        }
        if let Some(v) = lookup("L10N_CACHE_DIR") {
            config.cache_dir = PathBuf::from(v);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> L10nResult<()> {
        validate_locale(&self.source_locale)?;
        validate_locale(&self.target_locale)?;
        if self.channel_tag.trim().is_empty() {
            return Err(L10nError::ConfigError("channel tag cannot be empty".to_string()));
        }
        if !self.rate_per_char.is_finite() || self.rate_per_char < 0.0 {
            return Err(L10nError::ConfigError(format!(
                "rate per character must be a non-negative number, got {}",
                self.rate_per_char
            )));
        }
        Ok(())
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        let mut options = ResolveOptions::new(&self.source_locale, &self.target_locale)
            .with_max_concurrency(self.max_concurrency);
        if let Some(deadline) = self.deadline {
            options = options.with_deadline(deadline);
        }
        options
    }
}
