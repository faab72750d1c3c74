//! Tokenization and bionic emphasis of page text.
//!
//! A page is split into word and punctuation tokens. Each word whose fixation length reaches the
//! configured threshold gets its leading fixation-length characters wrapped in `<b>` tags; the
//! resulting markup is understood by [`crate::richtext::parse_markup`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::fixation::fixation_length;

/// Threshold used when no other minimum fixation length is configured.
pub const DEFAULT_MIN_FIXATION_LENGTH: usize = 3;

/// Punctuation tokens attached to the preceding token without a space.
pub const PUNCTUATION: &[&str] = &[".", ",", "’", ":", "[", "]", ";"];

/// Opening tag of an emphasized run.
pub const BOLD_OPEN: &str = "<b>";
/// Closing tag of an emphasized run.
pub const BOLD_CLOSE: &str = "</b>";

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.\.\.|--|\d+(?:[.,:]\d+)+|\w+(?:[-']\w+)*|[^\w\s]").unwrap()
});

/// Splits text into word and punctuation units.
pub trait Tokenizer {
    /// Returns the tokens of `text` in order. Tokens never contain whitespace.
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Word tokenizer in the spirit of the Treebank conventions.
///
/// Word characters joined by inner hyphens or ASCII apostrophes form one token, numbers keep
/// their inner `.`, `,` and `:` separators, `...` and `--` stay whole, and every other non-space
/// character becomes a token of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        WORD_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
    }
}

/// A classified token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Anything that is not one of the fixed punctuation marks.
    Word(&'a str),
    /// One of [`PUNCTUATION`].
    Punctuation(&'a str),
}

impl<'a> Token<'a> {
    /// Classifies a raw token.
    pub fn classify(raw: &'a str) -> Self {
        if PUNCTUATION.contains(&raw.trim()) {
            Token::Punctuation(raw)
        } else {
            Token::Word(raw)
        }
    }
}

/// Turns page text into bionic paragraph markup.
#[derive(Clone, Debug)]
pub struct BionicFormatter<T = WordTokenizer> {
    tokenizer: T,
    min_fixation_length: usize,
}

impl BionicFormatter<WordTokenizer> {
    /// Creates a formatter using the default [`WordTokenizer`].
    pub fn new(min_fixation_length: usize) -> Self {
        Self::with_tokenizer(WordTokenizer, min_fixation_length)
    }
}

impl Default for BionicFormatter<WordTokenizer> {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FIXATION_LENGTH)
    }
}

impl<T: Tokenizer> BionicFormatter<T> {
    /// Creates a formatter with a custom tokenizer.
    pub fn with_tokenizer(tokenizer: T, min_fixation_length: usize) -> Self {
        Self {
            tokenizer,
            min_fixation_length,
        }
    }

    /// Returns the minimum fixation length a word needs to be emphasized.
    pub fn min_fixation_length(&self) -> usize {
        self.min_fixation_length
    }

    /// Formats one page of text.
    ///
    /// Every word is preceded by a single space; punctuation marks are appended as-is. A word is
    /// emphasized when its fixation length is at least the configured minimum.
    pub fn format_page(&self, text: &str) -> String {
        let mut markup = String::with_capacity(text.len() * 2);

        for raw in self.tokenizer.tokenize(text) {
            match Token::classify(raw) {
                Token::Punctuation(mark) => markup.push_str(mark.trim()),
                Token::Word(word) => {
                    markup.push(' ');
                    self.push_word(&mut markup, word);
                }
            }
        }

        markup
    }

    fn push_word(&self, markup: &mut String, word: &str) {
        let fixation = fixation_length(word);
        if fixation < self.min_fixation_length {
            push_escaped(markup, word);
            return;
        }

        let split = word
            .char_indices()
            .nth(fixation)
            .map_or(word.len(), |(index, _)| index);
        let (head, tail) = word.split_at(split);

        markup.push_str(BOLD_OPEN);
        push_escaped(markup, head);
        markup.push_str(BOLD_CLOSE);
        push_escaped(markup, tail);
    }
}

fn push_escaped(markup: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => markup.push_str("&amp;"),
            '<' => markup.push_str("&lt;"),
            '>' => markup.push_str("&gt;"),
            _ => markup.push(ch),
        }
    }
}
