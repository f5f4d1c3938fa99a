/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains the index remap engine. A [`RemapPlan`] describes, for one sentence, where every
//! old token position ends up (or that it is deleted) and which tokens get a replacement word. It is built once
//! by a [`RemapBuilder`] and then applied uniformly to every mention of every comparison in the sentence.
//!
//! The builder composes three rewrites in a fixed order:
//!
//! 1. literal substitution (`=` becomes `eq`), which never deletes tokens;
//! 2. entity merging, collapsing each run of equally labelled tokens into one placeholder;
//! 3. window truncation to a token budget around everything the annotations reference.

use crate::comparison::ComparisonAnnotation;
use crate::sentence::SentenceAnnotation;
use crate::stats::Statistics;
use crate::token::{Mention, Token};
use crate::types::*;

/// Words that are always replaced in the output token stream
pub const LITERAL_SUBSTITUTIONS: &[(&str, &str)] = &[("=", "eq")];

/// The label that marks a token as outside of any entity
pub const OUTSIDE_LABEL: &str = "O";

/// Returns the literal substitution for a word, or the word itself
pub fn substitute_literal(word: &str) -> &str {
    LITERAL_SUBSTITUTIONS
        .iter()
        .find(|(literal, _)| *literal == word)
        .map(|(_, replacement)| *replacement)
        .unwrap_or(word)
}

/// Builds a [`RemapPlan`]. All vectors are indexed by old position, index 0 is unused.
#[derive(Debug, Clone)]
pub struct RemapBuilder {
    words: Vec<String>,
    deleted: Vec<bool>,
    replacements: Vec<Option<String>>,
    merged_tokens: usize,
    entities: usize,
    truncated: bool,
}

impl RemapBuilder {
    /// Starts a plan for a sentence given as its words, applying the literal substitutions
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        let n = words.len();
        let mut builder = Self {
            words: Vec::with_capacity(n + 1),
            deleted: vec![false; n + 1],
            replacements: vec![None; n + 1],
            merged_tokens: 0,
            entities: 0,
            truncated: false,
        };
        builder.words.push(String::new());
        for (i, word) in words.iter().enumerate() {
            let word = word.as_ref();
            builder.words.push(word.to_string());
            let substituted = substitute_literal(word);
            if substituted != word {
                builder.replacements[i + 1] = Some(substituted.to_string());
            }
        }
        builder
    }

    /// Number of tokens in the original sentence
    pub fn len(&self) -> usize {
        self.words.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collapses every maximal run of equal entity labels into its first token, which gets the upper-cased label
    /// as replacement word. Tokens labelled `None` or `O` are left alone. Missing labels count as `None`.
    pub fn merge_entities<L: AsRef<str>>(mut self, labels: &[Option<L>]) -> Self {
        let mut current: Option<&str> = None;
        for position in 1..=self.len() {
            let label = labels
                .get(position - 1)
                .and_then(|label| label.as_ref())
                .map(|label| AsRef::<str>::as_ref(label))
                .filter(|label| !label.is_empty() && *label != OUTSIDE_LABEL);
            match label {
                Some(label) if current == Some(label) => {
                    self.deleted[position] = true;
                    self.merged_tokens += 1;
                }
                Some(label) => {
                    self.replacements[position] = Some(label.to_uppercase());
                    self.entities += 1;
                }
                None => {}
            }
            current = label;
        }
        self
    }

    /// Old positions of the tokens still alive
    fn live_positions(&self) -> Vec<usize> {
        (1..=self.len()).filter(|p| !self.deleted[*p]).collect()
    }

    /// Truncates the sentence to at most `limit` live tokens, keeping a window around all positions referenced
    /// by any predicate or argument of the annotation. Sentences within the budget are left alone.
    pub fn truncate(mut self, limit: usize, annotation: &SentenceAnnotation) -> Self {
        let live = self.live_positions();
        let m = live.len();
        if m <= limit || limit == 0 {
            return self;
        }
        // rank of an old position among the live tokens, deleted positions take the nearest live one to the left
        let rank = |position: usize| -> usize {
            live.partition_point(|p| *p <= position).max(1)
        };
        let referenced = annotation
            .comparisons()
            .iter()
            .flat_map(|c| c.referenced_tokens())
            .map(|token| token.position())
            .filter(|p| *p >= 1 && *p <= self.len())
            .map(rank);
        let (lo, hi) = referenced.fold((None, None), |(lo, hi): (Option<usize>, Option<usize>), r| {
            (
                Some(lo.map_or(r, |lo| lo.min(r))),
                Some(hi.map_or(r, |hi| hi.max(r))),
            )
        });
        let (start, end) = match (lo, hi) {
            (Some(lo), Some(hi)) => window(lo, hi, limit, m),
            _ => (1, limit),
        };
        for (i, position) in live.iter().enumerate() {
            let rank = i + 1;
            if rank < start || rank > end {
                self.deleted[*position] = true;
            }
        }
        self.truncated = true;
        self
    }

    /// Finalizes the plan, numbering the live tokens consecutively from 1, and records what was done
    pub fn build(self, stats: &mut Statistics) -> RemapPlan {
        stats.merged_tokens += self.merged_tokens;
        stats.entities += self.entities;
        if self.truncated {
            stats.long_sentences += 1;
        }
        let mut positions = vec![None; self.words.len()];
        let mut next = 1;
        for position in 1..=self.len() {
            if !self.deleted[position] {
                positions[position] = Some(next);
                next += 1;
            }
        }
        RemapPlan {
            positions,
            replacements: self.replacements,
            words: self.words,
        }
    }
}

/// Computes a window of exactly `budget` positions within `1..=n` (with `n > budget`) around `[lo, hi]`.
/// A reference range longer than the budget keeps its start. Otherwise the excess is distributed evenly,
/// any part that does not fit on one side moves to the other.
pub(crate) fn window(lo: usize, hi: usize, budget: usize, n: usize) -> (usize, usize) {
    let length = hi - lo + 1;
    if length >= budget {
        return (lo, (lo + budget - 1).min(n));
    }
    let excess = budget - length;
    let mut left = excess / 2;
    let mut right = excess - left;
    if left > lo - 1 {
        right += left - (lo - 1);
        left = lo - 1;
    }
    if hi + right > n {
        let overflow = hi + right - n;
        right -= overflow;
        left = (left + overflow).min(lo - 1);
    }
    (lo - left, hi + right)
}

/// An immutable mapping from old token positions to new ones, plus replacement words.
/// Indexed by old position; index 0 is always unused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapPlan {
    positions: Vec<Option<usize>>,
    replacements: Vec<Option<String>>,
    words: Vec<String>,
}

impl RemapPlan {
    /// A plan that only applies the literal substitutions
    pub fn identity<S: AsRef<str>>(words: &[S], stats: &mut Statistics) -> Self {
        RemapBuilder::new(words).build(stats)
    }

    /// Number of tokens in the original sentence
    pub fn len(&self) -> usize {
        self.words.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tokens in the rewritten sentence
    pub fn live_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    /// The new position of an old one, `None` if deleted or out of range
    pub fn position(&self, old: usize) -> Option<usize> {
        self.positions.get(old).copied().flatten()
    }

    /// The replacement word for an old position, if any
    pub fn replacement(&self, old: usize) -> Option<&str> {
        self.replacements.get(old).and_then(|r| r.as_deref())
    }

    /// The word a live old position has in the rewritten sentence
    fn output_word(&self, old: usize) -> &str {
        self.replacement(old)
            .unwrap_or_else(|| self.words[old].as_str())
    }

    /// The rewritten sentence: live tokens, space-joined
    pub fn sentence_text(&self) -> String {
        (1..=self.len())
            .filter(|p| self.positions[*p].is_some())
            .map(|p| self.output_word(p))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Nearest live old position at or left of `old`, together with its new position
    fn live_at_or_before(&self, old: usize) -> Option<(usize, usize)> {
        (1..=old.min(self.len()))
            .rev()
            .find_map(|p| self.positions[p].map(|new| (p, new)))
    }

    /// Rewrites one mention. Tokens on live positions are renumbered (taking the replacement word if there is one),
    /// deleted tokens are omitted. If the first tokens are all deleted, the nearest live token to the left stands in,
    /// so a mention never disappears merely because its token was merged away.
    pub fn remap_mention(&self, mention: &Mention, stats: &mut Statistics) -> Mention {
        let mut rebuilt = Mention::new();
        for token in mention.iter() {
            let old = token.position();
            match self.position(old) {
                Some(new) => {
                    let word = self.replacement(old).unwrap_or(token.word());
                    rebuilt.push(Token::new(word, new));
                }
                None if rebuilt.is_empty() => {
                    if let Some((live, new)) = self.live_at_or_before(old) {
                        rebuilt.push(Token::new(self.output_word(live), new));
                        stats.repaired += 1;
                    }
                }
                None => {}
            }
        }
        rebuilt
    }

    /// Rewrites all mentions of one comparison. Role mentions that end up empty are dropped.
    pub fn remap_comparison(
        &self,
        comparison: &ComparisonAnnotation,
        stats: &mut Statistics,
    ) -> ComparisonAnnotation {
        let mut result = comparison.clone();
        result.set_predicate(self.remap_mention(comparison.predicate(), stats));
        for role in Role::ALL {
            let mentions = comparison
                .role(role)
                .iter()
                .map(|mention| self.remap_mention(mention, stats))
                .filter(|mention| !mention.is_empty())
                .collect();
            result.set_role(role, mentions);
        }
        result
    }

    /// Produces the rewritten sentence annotation. Comparisons whose predicate cannot be placed anywhere in the
    /// rewritten sentence are dropped and logged in the error log.
    pub fn apply(&self, annotation: &SentenceAnnotation, stats: &mut Statistics) -> SentenceAnnotation {
        let mut result = SentenceAnnotation::new(annotation.id())
            .with_policy(annotation.policy())
            .with_comparative(annotation.is_comparative())
            .with_sentence(self.sentence_text())
            .with_source(annotation.source());
        result.add_error(annotation.errors());
        let mut comparisons = Vec::with_capacity(annotation.len());
        for comparison in annotation.comparisons() {
            let remapped = self.remap_comparison(comparison, stats);
            if remapped.is_valid() || !comparison.is_valid() {
                comparisons.push(remapped);
            } else {
                stats.predicates_not_found += 1;
                result.add_error(&format!(
                    "predicate '{}' lost by remapping",
                    comparison.predicate_text()
                ));
            }
        }
        result.set_comparisons(comparisons);
        result
    }
}
