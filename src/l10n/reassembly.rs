//! Reassembly of tokenized fields
//!
//! Walks a [`TokenStream`] in its original order. Literal, markup and brand
//! segments are copied through unchanged; each phrase is replaced by its
//! cached translation. Because the stream already records where every token
//! sits, there is no placeholder search-and-replace and no way for a
//! substitution to land in the wrong slot.

use crate::l10n::cache::PhraseCache;
use crate::l10n::error::L10nResult;
use crate::l10n::tokenizer::{Segment, TokenStream};

/// Rebuild a field from its token stream using translations from `cache`
///
/// Fails with `InvariantViolation` if any phrase is missing or still pending,
/// which means the cache was not fully resolved before reassembly.
pub fn reassemble(stream: &TokenStream, cache: &PhraseCache) -> L10nResult<String> {
    let mut result = String::new();

    for segment in stream.segments() {
        match segment {
            Segment::Literal(text) | Segment::Markup(text) | Segment::Brand(text) => {
                result.push_str(text)
            }
            Segment::Phrase(phrase) => result.push_str(&cache.lookup(phrase)?),
        }
    }

    Ok(result)
}
