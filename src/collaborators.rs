/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module defines the boundaries to external linguistic tools: tokenization, sentence splitting,
//! entity labelling and part-of-speech tagging. Each is a trait; simple deterministic implementations
//! are provided for the first three.

use regex::Regex;

use crate::error::CorpusError;
use crate::span::{TextSpan, TokenSpan};

/// Splits a sentence into tokens. Spans are in characters relative to the start of the sentence.
pub trait Tokenizer {
    fn tokenize(&self, sentence: &str) -> Vec<TokenSpan>;
}

/// Splits a document into sentences. Spans are in characters relative to the start of the document,
/// ordered and non-overlapping.
pub trait SentenceSplitter {
    fn split(&self, text: &str) -> Vec<TextSpan>;
}

/// Assigns an entity label (or none) to every token
pub trait EntityLabeler {
    fn labels(&self, words: &[&str]) -> Vec<Option<String>>;
}

/// Assigns a part-of-speech tag to every token
pub trait PosTagger {
    fn tags(&self, words: &[&str]) -> Vec<String>;
}

/// The default token pattern: words (with inner hyphens and apostrophes), numbers, or single punctuation marks
pub const DEFAULT_TOKEN_PATTERN: &str = r"[\p{L}\p{N}]+(?:[-'.,][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]";

/// A tokenizer driven by one regular expression; every match is a token
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    pattern: Regex,
}

impl RegexTokenizer {
    pub fn new(pattern: &str) -> Result<Self, CorpusError> {
        let pattern = Regex::new(pattern).map_err(|e| {
            CorpusError::ParseError(format!("invalid token pattern: {}", e), "RegexTokenizer::new")
        })?;
        Ok(Self { pattern })
    }
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern must compile"),
        }
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, sentence: &str) -> Vec<TokenSpan> {
        let mut tokens = Vec::new();
        // regex offsets are bytes, tokens are in characters
        let mut charpos = 0;
        let mut bytepos = 0;
        for m in self.pattern.find_iter(sentence) {
            charpos += sentence[bytepos..m.start()].chars().count();
            let length = m.as_str().chars().count();
            tokens.push(TokenSpan::new(charpos, charpos + length, m.as_str()));
            charpos += length;
            bytepos = m.end();
        }
        tokens
    }
}

/// A tokenizer for pre-tokenized text: tokens are separated by whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, sentence: &str) -> Vec<TokenSpan> {
        let mut tokens = Vec::new();
        let mut begin: Option<usize> = None;
        let mut word = String::new();
        let mut length = 0;
        for (charpos, c) in sentence.chars().enumerate() {
            if c.is_whitespace() {
                if let Some(b) = begin.take() {
                    tokens.push(TokenSpan::new(b, charpos, std::mem::take(&mut word)));
                }
            } else {
                begin.get_or_insert(charpos);
                word.push(c);
            }
            length = charpos + 1;
        }
        if let Some(b) = begin {
            tokens.push(TokenSpan::new(b, length, word));
        }
        tokens
    }
}

/// Splits after `.`, `!` or `?` when followed by whitespace. Whitespace between sentences is not part of any sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSplitter;

impl SentenceSplitter for PunctuationSplitter {
    fn split(&self, text: &str) -> Vec<TextSpan> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut begin: Option<usize> = None;
        let mut last_nonspace = 0;
        for (i, c) in chars.iter().enumerate() {
            if c.is_whitespace() {
                let after_terminal = i > 0 && matches!(chars[i - 1], '.' | '!' | '?');
                if after_terminal {
                    if let Some(b) = begin.take() {
                        sentences.push(TextSpan::new(b, i));
                    }
                }
            } else {
                begin.get_or_insert(i);
                last_nonspace = i + 1;
            }
        }
        if let Some(b) = begin {
            sentences.push(TextSpan::new(b, last_nonspace));
        }
        sentences
    }
}

/// The label assigned by [`HeuristicLabeler`]
pub const PRODUCT_LABEL: &str = "PRODUCT";

const DETERMINERS: &[&str] = &["the", "a", "an", "my", "this"];

const BRANDS: &[&str] = &[
    "sony",
    "samsung",
    "bravia",
    "panasonic",
    "loewe",
    "freeview",
    "philips",
    "toshiba",
];

/// Labels likely product names with a handful of surface rules
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicLabeler;

fn is_capitalized(word: &str) -> bool {
    word != "I" && word.chars().next().map_or(false, |c| c.is_uppercase())
}

fn is_all_upper(word: &str) -> bool {
    word != "I" && !word.is_empty() && word.chars().all(|c| c.is_alphabetic() && c.is_uppercase())
}

fn is_number(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
        && word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

fn is_model_name(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit()) && word.chars().any(|c| c.is_alphabetic())
}

fn is_brand(word: &str) -> bool {
    let word = word.to_lowercase();
    BRANDS.iter().any(|brand| *brand == word)
}

impl EntityLabeler for HeuristicLabeler {
    fn labels(&self, words: &[&str]) -> Vec<Option<String>> {
        let mut labels: Vec<Option<String>> = vec![None; words.len()];
        for (i, word) in words.iter().enumerate() {
            let previous = if i > 0 { Some(words[i - 1]) } else { None };
            let after_determiner = previous
                .map(|p| DETERMINERS.contains(&p.to_lowercase().as_str()))
                .unwrap_or(false);
            if after_determiner && (is_all_upper(word) || is_number(word) || is_capitalized(word)) {
                labels[i] = Some(PRODUCT_LABEL.to_string());
            } else if previous.map_or(false, is_capitalized) && (is_number(word) || is_capitalized(word)) {
                labels[i - 1] = Some(PRODUCT_LABEL.to_string());
                labels[i] = Some(PRODUCT_LABEL.to_string());
            } else if is_brand(word) || is_model_name(word) {
                labels[i] = Some(PRODUCT_LABEL.to_string());
            }
        }
        labels
    }
}
