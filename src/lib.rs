/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! ## Introduction
//!
//! This library builds a corpus of sentence-level comparison annotations from several source annotation
//! formats and normalizes them into one canonical, token-indexed schema. A comparison consists of a predicate
//! (e.g. *bigger*) and up to four argument roles: the two compared entities, the aspect they are compared on,
//! and a sentiment. The output is meant as training material for semantic role labelling.
//!
//! **What can you do with this library?**
//!
//! * Convert source annotations into canonical sentence annotations, via one [`Adapter`] per [`Format`]:
//!    * character-offset mention graphs (JDPA), with coreference fallback for arguments outside the sentence;
//!    * bracket-tagged review text (Jindal and Liu);
//!    * tab-separated review, phrase and relation tables (USAGE);
//!    * canonical annotation lines with a separate sentence table (IMS).
//! * Parse and serialize the canonical annotation line ([`SentenceAnnotation`], [`ComparisonAnnotation`]).
//! * Rewrite the token stream of a sentence (entity merging, literal substitution, truncation) while keeping
//!   every annotation consistent, via one immutable [`RemapPlan`] per sentence.
//! * Normalize predicates and entity order ([`Normalizer`], [`PredicateNormalizer`]).
//! * Validate annotations against their sentences.
//!
//! Every stage takes a mutable [`Statistics`] accumulator, which can be printed or serialized to JSON at the
//! end of a run. Recoverable problems with individual annotations are logged, counted, and recorded in the
//! error log of the affected sentence; only failures to read input or write output are returned as errors.
//!
//! Main types:
//! * [`Token`], [`Mention`]
//! * [`ComparisonAnnotation`], [`SentenceAnnotation`]
//! * [`RemapBuilder`], [`RemapPlan`]
//! * [`MentionGraph`]
//! * [`CorpusReader`], [`CorpusWriter`]
//! * [`Config`], [`Statistics`], [`CorpusError`]

mod adapters;
mod collaborators;
mod comparison;
mod config;
mod coref;
mod corpus;
mod error;
mod file;
mod json;
mod normalize;
mod remap;
mod sentence;
mod span;
mod stats;
mod token;
mod types;

#[cfg(feature = "validation")]
pub mod validation;

// flat public API, modules stay private

pub use adapters::*;
pub use collaborators::{
    EntityLabeler, HeuristicLabeler, PosTagger, PunctuationSplitter, RegexTokenizer, SentenceSplitter,
    Tokenizer, WhitespaceTokenizer, DEFAULT_TOKEN_PATTERN, PRODUCT_LABEL,
};
pub use comparison::{ComparisonAnnotation, UNSET_ENTITY_TYPE};
pub use config::{Config, Configurable, DEFAULT_TOKEN_LIMIT};
pub use coref::{MentionGraph, MentionHandle, MentionNode, INVERSE_REFERS_TO, REFERS_TO};
pub use corpus::{CorpusReader, CorpusRecord, CorpusWriter};
pub use error::CorpusError;
pub use file::*;
pub use json::{FromJson, ToJson};
pub use normalize::{Normalizer, PredicateNormalizer, EXCHANGE_PREDICATES};
pub use remap::{substitute_literal, RemapBuilder, RemapPlan, LITERAL_SUBSTITUTIONS, OUTSIDE_LABEL};
pub use sentence::SentenceAnnotation;
pub use span::{align, align_words, char_slice, find_sentence, SentenceResolution, TextSpan, TokenSpan};
pub use stats::Statistics;
pub use token::{Mention, Token};
pub use types::*;

#[cfg(test)]
mod tests;
