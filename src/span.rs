/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module maps character ranges and word sequences onto tokens.
//!
//! All character offsets are in unicode codepoints (not bytes!), 0-indexed, with exclusive ends.
//! Token positions are 1-based.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::token::{Mention, Token};

/// A character range `[begin, end)` in a document or sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TextSpan {
    pub begin: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    /// Is the character at `offset` inside this span?
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.begin && offset < self.end
    }

    /// Does this span fully enclose `[begin, end)`?
    pub fn encloses(&self, begin: usize, end: usize) -> bool {
        begin >= self.begin && end <= self.end
    }

    /// Returns the text covered by this span, or `None` if the span lies outside the text
    pub fn covered_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        char_slice(text, self.begin, self.end)
    }

    /// The smallest span covering all given spans
    pub fn covering<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> Option<TextSpan> {
        spans.into_iter().fold(None, |acc, span| match acc {
            None => Some(*span),
            Some(acc) => Some(TextSpan::new(
                acc.begin.min(span.begin),
                acc.end.max(span.end),
            )),
        })
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

/// One token as produced by a tokenizer: its span relative to the sentence start, and the covered text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenSpan {
    pub begin: usize,
    pub end: usize,
    pub text: String,
}

impl TokenSpan {
    pub fn new(begin: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            begin,
            end,
            text: text.into(),
        }
    }
}

/// How a mention is located inside one sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceResolution {
    /// The sentence must enclose `[begin, end)`
    Enclosing,
    /// The sentence must contain both the first (`begin`) and the last (`end - 1`) character
    FirstAndLast,
}

/// Returns the slice of `text` for a codepoint range, or `None` if the range lies outside the text
pub fn char_slice(text: &str, begin: usize, end: usize) -> Option<&str> {
    if begin > end {
        return None;
    }
    let byte_offset = |charpos: usize| -> Option<usize> {
        text.char_indices()
            .map(|(bytepos, _)| bytepos)
            .chain(std::iter::once(text.len()))
            .nth(charpos)
    };
    let byte_begin = byte_offset(begin)?;
    let byte_end = byte_offset(end)?;
    Some(&text[byte_begin..byte_end])
}

/// Finds the first sentence that holds the range `[begin, end)`.
/// Sentences are assumed to be ordered and non-overlapping.
pub fn find_sentence(
    sentences: &[TextSpan],
    begin: usize,
    end: usize,
    resolution: SentenceResolution,
) -> Option<usize> {
    sentences.iter().position(|sentence| match resolution {
        SentenceResolution::Enclosing => sentence.encloses(begin, end),
        SentenceResolution::FirstAndLast => {
            end > begin && sentence.contains(begin) && sentence.contains(end - 1)
        }
    })
}

/// Aligns the character range `[begin, end)` (in the same coordinates as `sentence_offset`) to the tokens of one sentence.
///
/// The range must start exactly at the beginning of a token and end exactly at the end of a token, otherwise
/// `None` is returned. Partial tokens are never matched. On success the tokens are returned with their 1-based positions.
pub fn align(
    begin: usize,
    end: usize,
    sentence_offset: usize,
    tokens: &[TokenSpan],
) -> Option<Mention> {
    let first = tokens
        .iter()
        .position(|token| sentence_offset + token.begin == begin)?;
    let last = tokens
        .iter()
        .position(|token| sentence_offset + token.end == end)?;
    if last < first {
        return None;
    }
    Some(
        tokens[first..=last]
            .iter()
            .enumerate()
            .map(|(i, token)| Token::new(token.text.as_str(), first + i + 1))
            .collect(),
    )
}

/// Locates a sequence of words in a tokenized sentence: the first contiguous run of tokens equal to the words.
/// Returns `None` if there is no such run or no words were given.
pub fn align_words<S, W>(tokens: &[S], words: &[W], case_sensitive: bool) -> Option<Mention>
where
    S: AsRef<str>,
    W: AsRef<str>,
{
    if words.is_empty() || words.len() > tokens.len() {
        return None;
    }
    let equal = |a: &str, b: &str| {
        if case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    };
    let start = (0..=tokens.len() - words.len()).find(|start| {
        words
            .iter()
            .enumerate()
            .all(|(i, word)| equal(tokens[start + i].as_ref(), word.as_ref().trim()))
    })?;
    Some(
        tokens[start..start + words.len()]
            .iter()
            .enumerate()
            .map(|(i, token)| Token::new(token.as_ref(), start + i + 1))
            .collect(),
    )
}
