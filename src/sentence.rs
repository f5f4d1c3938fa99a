/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains [`SentenceAnnotation`], all comparisons of one sentence, and the canonical annotation line:
//!
//! ```text
//! id \t 0|1 \t [comparison] \t ... \t sentence \t source \t comments
//! ```

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::comparison::ComparisonAnnotation;
use crate::error::CorpusError;
use crate::json::ToJson;
use crate::stats::Statistics;
use crate::types::*;

/// Separator used when appending to the error log
const ERROR_SEPARATOR: &str = " ; ";

/// The comparisons of one sentence plus provenance information.
///
/// Comparisons are kept ordered by the position of their first predicate token.
/// Whether two comparisons with the same predicate position can coexist is governed by the [`DuplicatePolicy`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SentenceAnnotation {
    id: String,
    comparative: bool,
    sentence: String,
    source: String,
    errors: String,
    comparisons: Vec<ComparisonAnnotation>,

    #[serde(skip)]
    policy: DuplicatePolicy,
}

impl Default for SentenceAnnotation {
    fn default() -> Self {
        Self {
            id: String::new(),
            comparative: false,
            sentence: String::new(),
            source: String::new(),
            errors: String::new(),
            comparisons: Vec::new(),
            policy: DuplicatePolicy::Collapse,
        }
    }
}

impl SentenceAnnotation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn with_comparative(mut self, comparative: bool) -> Self {
        self.comparative = comparative;
        self
    }

    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sentence = sentence.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn is_comparative(&self) -> bool {
        self.comparative
    }

    pub fn set_comparative(&mut self, comparative: bool) {
        self.comparative = comparative;
    }

    /// The (tokenized) sentence text
    pub fn sentence(&self) -> &str {
        self.sentence.as_str()
    }

    pub fn set_sentence(&mut self, sentence: impl Into<String>) {
        self.sentence = sentence.into();
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// The accumulated error log
    pub fn errors(&self) -> &str {
        self.errors.trim()
    }

    /// Appends a message to the error log, blank messages are ignored.
    /// Tabs and line breaks become spaces so the log stays one field of the annotation line.
    pub fn add_error(&mut self, message: &str) {
        let message = message.trim().replace(|c: char| c == '\t' || c == '\n' || c == '\r', " ");
        if message.is_empty() {
            return;
        }
        if self.errors.trim().is_empty() {
            self.errors = message;
        } else {
            self.errors.push_str(ERROR_SEPARATOR);
            self.errors.push_str(&message);
        }
    }

    pub fn comparisons(&self) -> &[ComparisonAnnotation] {
        &self.comparisons
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Adds a comparison at its ordered place. Returns false if it was rejected because another comparison
    /// with the same first predicate position exists and the policy is [`DuplicatePolicy::Collapse`].
    pub fn add_comparison(&mut self, comparison: ComparisonAnnotation) -> bool {
        let key = comparison.first_predicate_position();
        let index = self
            .comparisons
            .partition_point(|c| c.first_predicate_position() <= key);
        if self.policy == DuplicatePolicy::Collapse
            && index > 0
            && self.comparisons[index - 1].first_predicate_position() == key
        {
            return false;
        }
        self.comparisons.insert(index, comparison);
        true
    }

    /// Removes every comparison whose first predicate position equals that of an earlier one.
    /// Returns the number of removed comparisons.
    pub fn dedup_by_predicate_position(&mut self) -> usize {
        let before = self.comparisons.len();
        self.comparisons
            .dedup_by(|later, earlier| later.first_predicate_position() == earlier.first_predicate_position());
        before - self.comparisons.len()
    }

    /// Keeps only the comparisons for which the predicate returns true
    pub fn retain_comparisons<F>(&mut self, f: F)
    where
        F: FnMut(&ComparisonAnnotation) -> bool,
    {
        self.comparisons.retain(f);
    }

    /// Applies a modification to every comparison, then restores the ordering (stable, nothing is collapsed)
    pub fn update_comparisons<F>(&mut self, f: F)
    where
        F: FnMut(&mut ComparisonAnnotation),
    {
        self.comparisons.iter_mut().for_each(f);
        self.comparisons
            .sort_by_key(|c| c.first_predicate_position());
    }

    /// Replaces all comparisons. They are ordered stably and not collapsed.
    pub fn set_comparisons(&mut self, comparisons: Vec<ComparisonAnnotation>) {
        self.comparisons = comparisons;
        self.comparisons
            .sort_by_key(|c| c.first_predicate_position());
    }

    /// Parses one canonical annotation line.
    ///
    /// A line with fewer than five tab-separated fields is malformed as a whole. Comparison fields that fail to parse
    /// are skipped with a warning and counted, they do not affect the rest of the line.
    pub fn parse(
        line: &str,
        policy: DuplicatePolicy,
        stats: &mut Statistics,
    ) -> Result<Self, CorpusError> {
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            return Err(CorpusError::MalformedLine(
                format!(
                    "annotation line has {} fields, expected at least 5: {}",
                    fields.len(),
                    line
                ),
                "SentenceAnnotation::parse",
            ));
        }
        let n = fields.len();
        let mut annotation = SentenceAnnotation::new(fields[0]).with_policy(policy);
        annotation.comparative = match fields[1] {
            "1" => true,
            "0" => false,
            other => {
                warn(
                    "canonical",
                    &format!(
                        "comparative flag '{}' is neither 0 nor 1 in line {}",
                        other, fields[0]
                    ),
                );
                false
            }
        };
        annotation.sentence = fields[n - 3].to_string();
        annotation.source = fields[n - 2].to_string();
        annotation.add_error(fields[n - 1]);

        for field in &fields[2..n - 3] {
            if field.trim().is_empty() {
                continue;
            }
            match field.parse::<ComparisonAnnotation>() {
                Ok(comparison) => {
                    if !annotation.add_comparison(comparison) {
                        stats.collapsed += 1;
                    }
                }
                Err(e) => {
                    warn(
                        "canonical",
                        &format!("skipping comparison in line {}: {}", annotation.id, e),
                    );
                    stats.malformed += 1;
                }
            }
        }
        Ok(annotation)
    }
}

impl fmt::Display for SentenceAnnotation {
    /// Renders the canonical annotation line (without trailing newline).
    /// An empty error log is rendered as a single space.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t", self.id, if self.comparative { 1 } else { 0 })?;
        for comparison in self.comparisons.iter() {
            write!(f, "{}\t", comparison)?;
        }
        let errors = if self.errors.is_empty() {
            " "
        } else {
            self.errors.as_str()
        };
        write!(f, "{}\t{}\t{}", self.sentence, self.source, errors)
    }
}

impl FromStr for SentenceAnnotation {
    type Err = CorpusError;

    /// Parses a canonical annotation line with the default (collapsing) policy
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut stats = Statistics::default();
        Self::parse(s, DuplicatePolicy::default(), &mut stats)
    }
}

#[sealed]
impl TypeInfo for SentenceAnnotation {
    fn typeinfo() -> Type {
        Type::SentenceAnnotation
    }
}

impl ToJson for SentenceAnnotation {}
