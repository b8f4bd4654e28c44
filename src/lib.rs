//! Catalog localization
//!
//! Translates product catalog text (titles, descriptions, bullet points) into
//! a target language, translating each unique phrase once and keeping markup
//! and brand names exactly as written.

pub mod catalog;
pub mod config;
pub mod l10n;

pub use catalog::{Attribute, FieldSelector, Product};
pub use config::L10nConfig;
pub use l10n::{L10nError, L10nResult, Pipeline, PhraseCache};
