//! Tokenizer for catalog text fields
//!
//! Splits a field into an ordered stream of segments so that markup spans and
//! brand names survive translation verbatim and only plain-language phrases
//! are sent to a translation provider.
//!
//! Segmentation happens in a fixed order:
//!
//! 1. Markup spans (`<...>`, shortest, non-nested) are cut out first.
//! 2. Literal brand occurrences are cut out of the text between markup spans.
//!    A brand can therefore never straddle or swallow a markup span.
//! 3. Maximal phrases (words joined by single spaces) are cut out of what is left.
//!
//! A phrase can never cross a markup or brand boundary, and markup or brand
//! text is never itself treated as a phrase.
//!
//! # Example
//!
//! ```ignore
//! use catalog_l10n::l10n::tokenize;
//!
//! let stream = tokenize("<b>Soft</b> MyBrand Cotton Tee", "MyBrand");
//! assert_eq!(stream.phrases(), vec!["Soft", "Cotton Tee"]);
//! assert_eq!(stream.template(), "<>{}<> [] {}");
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Anything between angle brackets, non-nested
pub const MARKUP_PATTERN: &str = r"<[^<>]*>";

/// A word: letters, apostrophes and hyphens, with at least one letter
pub const WORD_PATTERN: &str = r"[A-Za-z'-]*[A-Za-z][A-Za-z'-]*";

pub const MARKUP_PLACEHOLDER: &str = "<>";
pub const BRAND_PLACEHOLDER: &str = "[]";
pub const PHRASE_PLACEHOLDER: &str = "{}";

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MARKUP_PATTERN).expect("markup pattern is valid"));

static PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("({w})( {w})*", w = WORD_PATTERN)).expect("phrase pattern is valid")
});

/// One piece of a tokenized field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text between tokens (spaces, digits, punctuation), kept verbatim
    Literal(String),
    /// A markup span, kept verbatim
    Markup(String),
    /// A brand occurrence, kept verbatim
    Brand(String),
    /// A phrase to be replaced by its cached translation
    Phrase(String),
}

impl Segment {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(s) | Segment::Markup(s) | Segment::Brand(s) | Segment::Phrase(s) => s,
        }
    }
}

/// Ordered collection of same-category segments with their placeholder marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bag {
    pub items: Vec<String>,
    pub placeholder: &'static str,
    /// Items go through the phrase cache (phrases) or are reinserted literally
    pub translate: bool,
}

impl Bag {
    fn new(placeholder: &'static str, translate: bool) -> Self {
        Self {
            items: Vec::new(),
            placeholder,
            translate,
        }
    }
}

/// The three bags of a tokenized field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bags {
    pub markup: Bag,
    pub brand: Bag,
    pub phrase: Bag,
}

/// A tokenized text field, in original left-to-right order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    segments: Vec<Segment>,
}

impl TokenStream {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Phrases in extraction order, duplicates included
    pub fn phrases(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Phrase(p) => Some(p.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Rebuild the exact input text
    pub fn source(&self) -> String {
        self.segments.iter().map(Segment::as_str).collect()
    }

    /// The field with every token replaced by its placeholder
    pub fn template(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.as_str(),
                Segment::Markup(_) => MARKUP_PLACEHOLDER,
                Segment::Brand(_) => BRAND_PLACEHOLDER,
                Segment::Phrase(_) => PHRASE_PLACEHOLDER,
            })
            .collect()
    }

    /// Group segments into markup, brand and phrase bags
    pub fn bags(&self) -> Bags {
        let mut bags = Bags {
            markup: Bag::new(MARKUP_PLACEHOLDER, false),
            brand: Bag::new(BRAND_PLACEHOLDER, false),
            phrase: Bag::new(PHRASE_PLACEHOLDER, true),
        };
        for segment in &self.segments {
            match segment {
                Segment::Literal(_) => {}
                Segment::Markup(s) => bags.markup.items.push(s.clone()),
                Segment::Brand(s) => bags.brand.items.push(s.clone()),
                Segment::Phrase(s) => bags.phrase.items.push(s.clone()),
            }
        }
        bags
    }

    fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Merge adjacent literals so the stream stays canonical
        if let Some(Segment::Literal(prev)) = self.segments.last_mut() {
            prev.push_str(text);
        } else {
            self.segments.push(Segment::Literal(text.to_string()));
        }
    }
}

/// Markup and brand split, before phrase extraction
enum Piece<'a> {
    Markup(&'a str),
    Brand(&'a str),
    Text(&'a str),
}

fn split_markup_and_brand<'a>(text: &'a str, brand: &str) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for m in MARKUP.find_iter(text) {
        split_brand(&text[last..m.start()], brand, &mut pieces);
        pieces.push(Piece::Markup(m.as_str()));
        last = m.end();
    }
    split_brand(&text[last..], brand, &mut pieces);

    pieces
}

fn split_brand<'a>(text: &'a str, brand: &str, pieces: &mut Vec<Piece<'a>>) {
    if brand.is_empty() {
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        return;
    }

    let mut last = 0;
    for (start, matched) in text.match_indices(brand) {
        if start > last {
            pieces.push(Piece::Text(&text[last..start]));
        }
        pieces.push(Piece::Brand(matched));
        last = start + matched.len();
    }
    if last < text.len() {
        pieces.push(Piece::Text(&text[last..]));
    }
}

/// Tokenize a text field against a brand name
pub fn tokenize(text: &str, brand: &str) -> TokenStream {
    let mut stream = TokenStream::default();

    for piece in split_markup_and_brand(text, brand) {
        match piece {
            Piece::Markup(s) => stream.segments.push(Segment::Markup(s.to_string())),
            Piece::Brand(s) => stream.segments.push(Segment::Brand(s.to_string())),
            Piece::Text(s) => {
                let mut last = 0;
                for m in PHRASE.find_iter(s) {
                    stream.push_literal(&s[last..m.start()]);
                    stream.segments.push(Segment::Phrase(m.as_str().to_string()));
                    last = m.end();
                }
                stream.push_literal(&s[last..]);
            }
        }
    }

    stream
}

/// Extract only the phrases of a text field
///
/// Used while registering phrases, where the full stream is not needed.
/// Markup and brand text are still removed first.
pub fn phrases(text: &str, brand: &str) -> Vec<String> {
    split_markup_and_brand(text, brand)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Text(s) => Some(s),
            _ => None,
        })
        .flat_map(|s| PHRASE.find_iter(s).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_phrase_with_hyphen_and_apostrophe() {
        let text = "Men's Weekday Boxer Brief Underwear-Small";
        let stream = tokenize(text, "MyBrand");

        let bags = stream.bags();
        assert!(bags.markup.items.is_empty());
        assert!(bags.brand.items.is_empty());
        assert_eq!(bags.phrase.items, vec![text.to_string()]);
        assert_eq!(stream.template(), "{}");
    }

    #[test]
    fn test_markup_brand_and_phrases() {
        let stream = tokenize("<b>Soft</b> MyBrand Cotton Tee", "MyBrand");
        let bags = stream.bags();

        assert_eq!(bags.markup.items, vec!["<b>", "</b>"]);
        assert_eq!(bags.brand.items, vec!["MyBrand"]);
        assert_eq!(bags.phrase.items, vec!["Soft", "Cotton Tee"]);
        assert_eq!(stream.template(), "<>{}<> [] {}");
        assert!(bags.phrase.translate);
        assert!(!bags.markup.translate && !bags.brand.translate);
    }

    #[test]
    fn test_segments_in_order() {
        let stream = tokenize("<i>Warm</i> Hat", "");
        assert_eq!(
            stream.segments(),
            &[
                Segment::Markup("<i>".to_string()),
                Segment::Phrase("Warm".to_string()),
                Segment::Markup("</i>".to_string()),
                Segment::Literal(" ".to_string()),
                Segment::Phrase("Hat".to_string()),
            ]
        );
    }

    #[test]
    fn test_source_round_trip() {
        let inputs = [
            "",
            "   ",
            "<p>Breathable MyBrand mesh, 100% Cotton.</p><br/>",
            "MyBrand MyBrand MyBrand",
            "Size: 2-Pack (Large) & more!!",
            "<ul><li>Machine wash cold</li><li>Tumble dry low</li></ul>",
            "Café crème MyBrandX",
        ];
        for input in inputs {
            assert_eq!(tokenize(input, "MyBrand").source(), input);
        }
    }

    #[test]
    fn test_phrase_does_not_cross_markup() {
        let stream = tokenize("Soft<br>Cotton", "");
        assert_eq!(stream.phrases(), vec!["Soft", "Cotton"]);
    }

    #[test]
    fn test_markup_text_never_a_phrase() {
        let found = phrases(r#"<span class="note">Tee</span>"#, "");
        assert_eq!(found, vec!["Tee"]);
    }

    #[test]
    fn test_brand_text_never_a_phrase() {
        let found = phrases("Hanes Comfort Tee by Hanes Comfort", "Hanes Comfort");
        assert_eq!(found, vec!["Tee by"]);
    }

    #[test]
    fn test_empty_brand_is_noop() {
        let stream = tokenize("Cotton Tee", "");
        assert!(stream.bags().brand.items.is_empty());
        assert_eq!(stream.phrases(), vec!["Cotton Tee"]);
    }

    #[test]
    fn test_brand_repeated_three_times() {
        let stream = tokenize("MyBrand socks, MyBrand hat and MyBrand", "MyBrand");
        let bags = stream.bags();
        assert_eq!(bags.brand.items, vec!["MyBrand"; 3]);
        assert_eq!(stream.template(), "[] {}, [] {} []");
        assert_eq!(stream.phrases(), vec!["socks", "hat and"]);
    }

    #[test]
    fn test_brand_inside_markup_stays_markup() {
        let stream = tokenize(r#"<a title="MyBrand">Shop</a>"#, "MyBrand");
        let bags = stream.bags();
        assert_eq!(bags.markup.items.len(), 2);
        assert!(bags.brand.items.is_empty());
        assert_eq!(stream.phrases(), vec!["Shop"]);
    }

    #[test]
    fn test_digits_and_punctuation_split_phrases() {
        let found = phrases("100% Cotton, 2-Pack", "");
        assert_eq!(found, vec!["Cotton", "-Pack"]);
    }

    #[test]
    fn test_bare_punctuation_is_not_a_phrase() {
        let text = "Size 10 - 12 ' -- ";
        assert_eq!(phrases(text, ""), vec!["Size"]);
        assert_eq!(tokenize(text, "").source(), text);

        let found = phrases("Relaxed Fit Jeans - Dark Wash", "");
        assert_eq!(found, vec!["Relaxed Fit Jeans", "Dark Wash"]);
    }

    #[test]
    fn test_double_space_splits_phrases() {
        let found = phrases("Cotton  Tee", "");
        assert_eq!(found, vec!["Cotton", "Tee"]);
    }

    #[test]
    fn test_phrases_matches_stream() {
        let text = "<b>New</b> MyBrand Relaxed Fit Jeans - Dark Wash";
        let stream = tokenize(text, "MyBrand");
        assert_eq!(phrases(text, "MyBrand"), stream.phrases());
    }
}
