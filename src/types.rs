/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! Common enumerations, type tags and the logging helpers shared by all modules.

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::CorpusError;

/// The fine-grained type of a comparison
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateType {
    /// One entity is ranked above or below another ("X is bigger than Y")
    Ranked,
    /// Both entities are on par ("X is as good as Y")
    Equative,
    /// One entity ranks above or below all others ("X is the best")
    Superlative,
    /// Entities differ without an order being stated
    Difference,
    Undefined,
}

impl Default for PredicateType {
    fn default() -> Self {
        Self::Undefined
    }
}

impl PredicateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ranked => "ranked",
            Self::Equative => "equative",
            Self::Superlative => "superlative",
            Self::Difference => "difference",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for PredicateType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PredicateType {
    type Err = CorpusError;

    /// Parses a comparison type, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ranked" => Ok(Self::Ranked),
            "equative" => Ok(Self::Equative),
            "superlative" => Ok(Self::Superlative),
            "difference" => Ok(Self::Difference),
            "undefined" => Ok(Self::Undefined),
            _ => Err(CorpusError::ParseError(
                format!("unknown comparison type '{}'", s),
                "PredicateType::from_str",
            )),
        }
    }
}

/// The direction of a comparison, from the perspective of entity1
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredicateDirection {
    Superior,
    Inferior,
    Undefined,
}

impl Default for PredicateDirection {
    fn default() -> Self {
        Self::Undefined
    }
}

impl PredicateDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superior => "SUPERIOR",
            Self::Inferior => "INFERIOR",
            Self::Undefined => "UNDEFINED",
        }
    }

    /// Decodes the direction segment of a comparison header. Never fails: anything unknown is undefined.
    ///
    /// The sign encoding only looks at the first character: `>` or `+` is superior, `<` or `-` is inferior.
    /// The rendered names (as produced by [`Self::as_str()`]) are accepted too, in any case.
    pub fn decode(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("superior") {
            return Self::Superior;
        } else if s.eq_ignore_ascii_case("inferior") {
            return Self::Inferior;
        }
        match s.chars().next() {
            Some('>') | Some('+') => Self::Superior,
            Some('<') | Some('-') => Self::Inferior,
            _ => Self::Undefined,
        }
    }
}

impl fmt::Display for PredicateDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four argument slots of a comparison
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Entity1,
    Entity2,
    Aspect,
    Sentiment,
}

impl Role {
    /// All roles, in the fixed order used for serialisation and [`crate::ComparisonAnnotation::arguments()`]
    pub const ALL: [Role; 4] = [Role::Entity1, Role::Entity2, Role::Aspect, Role::Sentiment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity1 => "entity1",
            Self::Entity2 => "entity2",
            Self::Aspect => "aspect",
            Self::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How comparisons whose predicates start at the same token position are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum DuplicatePolicy {
    /// Only the first comparison added for a predicate position is retained
    Collapse,
    /// All comparisons are retained, later ones ordered after earlier ones with the same position
    Keep,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self::Collapse
    }
}

/// Canonical ordering of entity1 and entity2, applied during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityOrder {
    /// Leave entities as annotated
    Keep,
    /// entity1 is whichever entity comes first in the sentence
    Surface,
    /// entity1 is the preferred entity (swaps inferior ranked/superlative comparisons)
    Preferred,
}

impl Default for EntityOrder {
    fn default() -> Self {
        Self::Keep
    }
}

impl TryFrom<&str> for EntityOrder {
    type Error = CorpusError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "keep" | "none" => Ok(Self::Keep),
            "surface" | "id" => Ok(Self::Surface),
            "preferred" | "preference" => Ok(Self::Preferred),
            _ => Err(CorpusError::ParseError(
                format!("unknown entity order '{}'", s),
                "EntityOrder::try_from",
            )),
        }
    }
}

/// The format annotations are written in
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub enum DataFormat {
    /// One tab-separated canonical annotation line per sentence
    Canonical,
    /// One JSON document per sentence (JSON lines when compact)
    Json { compact: bool },
}

impl Default for DataFormat {
    fn default() -> Self {
        Self::Canonical
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Canonical => write!(f, "canonical"),
            Self::Json { compact: false } => write!(f, "json"),
            Self::Json { compact: true } => write!(f, "jsonl"),
        }
    }
}

impl TryFrom<&str> for DataFormat {
    type Error = CorpusError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "canonical" | "tsv" | "txt" => Ok(Self::Canonical),
            "json" => Ok(Self::Json { compact: false }),
            "jsonl" | "json-compact" => Ok(Self::Json { compact: true }),
            _ => Err(CorpusError::ParseError(
                format!("unknown data format '{}'", s),
                "DataFormat::try_from",
            )),
        }
    }
}

/// Type tags, used in messages and for introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Type {
    Config,
    Token,
    Mention,
    ComparisonAnnotation,
    SentenceAnnotation,
    MentionGraph,
    Statistics,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Config => "Config",
            Self::Token => "Token",
            Self::Mention => "Mention",
            Self::ComparisonAnnotation => "ComparisonAnnotation",
            Self::SentenceAnnotation => "SentenceAnnotation",
            Self::MentionGraph => "MentionGraph",
            Self::Statistics => "Statistics",
        };
        write!(f, "{}", s)
    }
}

/// Provides the type tag of a structure.
/// This is a sealed trait, not implementable outside this crate.
#[sealed(pub(crate))]
pub trait TypeInfo {
    fn typeinfo() -> Type;
}

/// Prints a debug message to standard error output, only if debug mode is enabled in the configuration.
/// The message is built lazily.
pub(crate) fn debug<F>(config: &Config, message_func: F)
where
    F: Fn() -> String,
{
    if config.debug() {
        eprintln!("[compcorpus debug] {}", message_func());
    }
}

/// Reports a recoverable annotation problem on standard error output
pub(crate) fn warn(label: &str, message: &str) {
    eprintln!("[{} warning] {}", label, message);
}
