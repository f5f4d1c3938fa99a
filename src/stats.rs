/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Statistics`] accumulator that is passed through every processing stage.

use chrono::{DateTime, Utc};
use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::json::ToJson;
use crate::types::*;

/// Counters accumulated over one run. Every adapter and the normalization pipeline take a mutable
/// reference to this and only ever increase it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Statistics {
    pub started: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,

    /// Input documents (files, reviews) processed
    pub documents: usize,
    /// Sentences read
    pub sentences: usize,
    /// Sentences written with at least one comparison
    pub comparative_sentences: usize,
    /// Comparisons written
    pub comparisons: usize,

    pub predicates_not_found: usize,
    pub arguments_not_found: usize,

    /// Comparison fields or lines that could not be parsed
    pub malformed: usize,
    /// Other per-record errors (missing sentences, inconsistent input)
    pub errors: usize,
    /// Comparisons rejected because another one starts at the same predicate position
    pub collapsed: usize,
    /// Comparisons removed by filtering
    pub filtered: usize,
    /// Non-comparative sentences skipped
    pub skipped: usize,

    /// Tokens deleted by entity merging
    pub merged_tokens: usize,
    /// Placeholder tokens introduced by entity merging
    pub entities: usize,
    /// Sentences truncated to the token limit
    pub long_sentences: usize,
    /// Mentions repaired by the left-search rule
    pub repaired: usize,

    /// Entity pairs swapped
    pub reordered: usize,
    /// Predicates split into predicate and sentiment
    pub split_predicates: usize,
    /// Sentiment mentions added by predicate normalisation
    pub added_sentiment: usize,
    /// Predicates exchanged for the sentiment, per original predicate word
    pub exchanged: BTreeMap<String, usize>,

    /// Number of comparisons per source type tag
    pub types: BTreeMap<String, usize>,

    /// Problems found by validation
    pub validation_failures: usize,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            started: Utc::now(),
            finished: None,
            documents: 0,
            sentences: 0,
            comparative_sentences: 0,
            comparisons: 0,
            predicates_not_found: 0,
            arguments_not_found: 0,
            malformed: 0,
            errors: 0,
            collapsed: 0,
            filtered: 0,
            skipped: 0,
            merged_tokens: 0,
            entities: 0,
            long_sentences: 0,
            repaired: 0,
            reordered: 0,
            split_predicates: 0,
            added_sentiment: 0,
            exchanged: BTreeMap::new(),
            types: BTreeMap::new(),
            validation_failures: 0,
        }
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the end of the run
    pub fn finish(&mut self) {
        self.finished = Some(Utc::now());
    }

    /// Increments the counter for a type tag
    pub fn count_type(&mut self, tag: &str) {
        *self.types.entry(tag.to_string()).or_insert(0) += 1;
    }

    /// Increments the exchange counter for a predicate word
    pub fn count_exchange(&mut self, predicate: &str) {
        *self.exchanged.entry(predicate.to_string()).or_insert(0) += 1;
    }

    /// Total number of alignment failures
    pub fn not_found(&self) -> usize {
        self.predicates_not_found + self.arguments_not_found
    }
}

impl fmt::Display for Statistics {
    /// A human readable end-of-run summary
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "documents: {}", self.documents)?;
        writeln!(f, "sentences read: {}", self.sentences)?;
        writeln!(
            f,
            "comparative sentences written: {}",
            self.comparative_sentences
        )?;
        writeln!(f, "comparisons written: {}", self.comparisons)?;
        writeln!(
            f,
            "predicates not found: {}",
            self.predicates_not_found
        )?;
        writeln!(f, "arguments not found: {}", self.arguments_not_found)?;
        writeln!(f, "malformed: {}", self.malformed)?;
        writeln!(f, "errors: {}", self.errors)?;
        if self.collapsed > 0 {
            writeln!(f, "collapsed (same predicate position): {}", self.collapsed)?;
        }
        if self.filtered > 0 || self.skipped > 0 {
            writeln!(f, "filtered comparisons: {}", self.filtered)?;
            writeln!(f, "skipped non-comparative sentences: {}", self.skipped)?;
        }
        if self.merged_tokens > 0 || self.long_sentences > 0 || self.repaired > 0 {
            writeln!(
                f,
                "merged tokens: {} into {} entities",
                self.merged_tokens, self.entities
            )?;
            writeln!(f, "long sentences truncated: {}", self.long_sentences)?;
            writeln!(f, "mentions repaired: {}", self.repaired)?;
        }
        if self.reordered > 0 {
            writeln!(f, "entities reordered: {}", self.reordered)?;
        }
        if self.split_predicates > 0 || self.added_sentiment > 0 {
            writeln!(f, "split predicates: {}", self.split_predicates)?;
            writeln!(f, "added sentiment: {}", self.added_sentiment)?;
        }
        for (predicate, count) in self.exchanged.iter() {
            writeln!(f, "exchanged predicate '{}': {}", predicate, count)?;
        }
        for (tag, count) in self.types.iter() {
            writeln!(f, "type {}: {}", tag, count)?;
        }
        if self.validation_failures > 0 {
            writeln!(f, "validation failures: {}", self.validation_failures)?;
        }
        if let Some(finished) = self.finished {
            writeln!(
                f,
                "duration: {} ms",
                (finished - self.started).num_milliseconds()
            )?;
        }
        Ok(())
    }
}

#[sealed]
impl TypeInfo for Statistics {
    fn typeinfo() -> Type {
        Type::Statistics
    }
}

impl ToJson for Statistics {}
