/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

use sealed::sealed;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::slice::Iter;
use std::str::FromStr;

use crate::error::CorpusError;
use crate::types::*;

/// A word form bound to its 1-based position in a sentence's token stream.
/// Position 0 is reserved and never refers to a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Token {
    word: String,
    position: usize,
}

impl Token {
    pub fn new(word: impl Into<String>, position: usize) -> Self {
        Self {
            word: word.into(),
            position,
        }
    }

    pub fn word(&self) -> &str {
        self.word.as_str()
    }

    /// 1-based position in the sentence
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for Token {
    /// Renders the token as `position_word`
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_{}", self.position, self.word)
    }
}

impl FromStr for Token {
    type Err = CorpusError;

    /// Parses `position_word`. Only the first underscore separates, so words may contain underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (position, word) = s
            .split_once('_')
            .ok_or_else(|| CorpusError::MalformedToken(s.to_string()))?;
        let position: usize = position
            .parse()
            .map_err(|_| CorpusError::MalformedToken(s.to_string()))?;
        if position == 0 {
            return Err(CorpusError::MalformedToken(s.to_string()));
        }
        Ok(Self::new(word, position))
    }
}

#[sealed]
impl TypeInfo for Token {
    fn typeinfo() -> Type {
        Type::Token
    }
}

/// One occurrence of a predicate or argument: an ordered run of tokens with strictly increasing positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Mention(SmallVec<[Token; 2]>);

impl Mention {
    /// Creates an empty mention, this is only a valid state transiently
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn iter(&self) -> Iter<'_, Token> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Token> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Token> {
        self.0.last()
    }

    /// Position of the first token
    pub fn begin(&self) -> Option<usize> {
        self.0.first().map(|t| t.position())
    }

    /// Position of the last token
    pub fn end(&self) -> Option<usize> {
        self.0.last().map(|t| t.position())
    }

    /// Returns a mention with only the tokens in the given index range (indices into this mention, not positions)
    pub fn slice(&self, range: std::ops::Range<usize>) -> Self {
        self.0[range].iter().cloned().collect()
    }

    /// The words of this mention, space-joined
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(token.word());
        }
        out
    }
}

impl FromIterator<Token> for Mention {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Token>> for Mention {
    fn from(tokens: Vec<Token>) -> Self {
        Self(SmallVec::from_vec(tokens))
    }
}

impl<'a> IntoIterator for &'a Mention {
    type Item = &'a Token;
    type IntoIter = Iter<'a, Token>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Mention {
    /// Renders all tokens as `position_word`, space-joined
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for Mention {
    type Err = CorpusError;

    /// Parses space-separated `position_word` tokens. An empty string yields an empty mention.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mention = Mention::new();
        for part in s.split(' ').filter(|p| !p.is_empty()) {
            mention.push(part.parse()?);
        }
        Ok(mention)
    }
}

#[sealed]
impl TypeInfo for Mention {
    fn typeinfo() -> Type {
        Type::Mention
    }
}
