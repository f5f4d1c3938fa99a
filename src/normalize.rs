/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains the normalization pipeline. It reads a sentence file (one space-tokenized sentence per
//! line) and, optionally, the annotation file alongside it, rewrites every sentence with one [`RemapPlan`]
//! and applies the predicate normalisations and the entity ordering to the remapped annotations.

use std::io::{BufRead, Write};

use crate::collaborators::{EntityLabeler, HeuristicLabeler, PosTagger};
use crate::comparison::ComparisonAnnotation;
use crate::config::{Config, Configurable};
use crate::corpus::{CorpusReader, CorpusWriter};
use crate::error::CorpusError;
use crate::remap::{RemapBuilder, RemapPlan};
use crate::sentence::SentenceAnnotation;
use crate::stats::Statistics;
use crate::token::{Mention, Token};
use crate::types::*;

/// Predicates that are exchanged for their sentiment when adjectives are annotated as predicates
pub const EXCHANGE_PREDICATES: &[&str] = &["more", "less", "as", "most", "least"];

/// Predicates that form regular multi-word comparatives and superlatives with a following adjective
const DEGREE_PREDICATES: &[&str] = &["more", "less", "most", "least"];

/// The part-of-speech tag of an adjective
const ADJECTIVE_TAG: &str = "JJ";

/// Rewrites the predicate of a comparison: splits multi-word predicates, moves adjectives into the sentiment role
/// and optionally makes the sentiment the predicate.
#[derive(Default)]
pub struct PredicateNormalizer {
    tagger: Option<Box<dyn PosTagger>>,
}

impl PredicateNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the part-of-speech tagger used to recognise adjectives after `more`/`less`/`most`/`least`.
    /// Without a tagger, those aspects are left alone.
    pub fn with_tagger(mut self, tagger: impl PosTagger + 'static) -> Self {
        self.tagger = Some(Box::new(tagger));
        self
    }

    /// Splits the predicate of one comparison. `words` are the words of the (remapped) sentence,
    /// indexed by position minus one.
    ///
    /// * `as X as` keeps the first `as` as predicate, `X` becomes a sentiment mention.
    /// * An aspect starting on a one-token predicate loses that token, a one-token aspect there is dropped.
    /// * For the predicate `as`, an aspect one or two tokens later becomes the sentiment. An aspect ending right
    ///   before it becomes the sentiment if there is an earlier `as`, which then becomes the predicate.
    /// * For `more`, `less`, `most` and `least`, an adjective aspect right after the predicate becomes the sentiment.
    ///
    /// Only the first aspect is considered.
    pub fn split_predicate<S: AsRef<str>>(
        &self,
        comparison: &mut ComparisonAnnotation,
        words: &[S],
        stats: &mut Statistics,
    ) {
        let predicate = comparison.predicate().clone();
        if predicate.len() > 1 {
            let first_as = predicate.first().map_or(false, |t| t.word() == "as");
            let last_as = predicate.last().map_or(false, |t| t.word() == "as");
            if first_as && last_as {
                let inner = predicate.slice(1..predicate.len() - 1);
                if !inner.is_empty() {
                    comparison.add_argument(Role::Sentiment, inner);
                    stats.added_sentiment += 1;
                }
                comparison.set_predicate(predicate.slice(0..1));
                stats.split_predicates += 1;
            }
            return;
        }
        let Some(token) = predicate.first() else {
            return;
        };
        let position = token.position();
        let word = token.word();

        let mut aspects = comparison.remove_role(Role::Aspect);
        let mut aspect = if aspects.is_empty() {
            None
        } else {
            Some(aspects.remove(0))
        };
        if let Some(current) = aspect.take() {
            if current.begin() != Some(position) {
                aspect = Some(current);
            } else if current.len() > 1 {
                aspect = Some(current.slice(1..current.len()));
            }
        }

        let mut to_sentiment = false;
        if let Some(current) = aspect.as_ref() {
            let begin = current.begin().unwrap_or_default();
            if word.eq_ignore_ascii_case("as") {
                if begin == position + 1 || begin == position + 2 {
                    to_sentiment = true;
                } else if current.end().map_or(false, |end| end + 1 == position) {
                    let upper = position.saturating_sub(2).min(begin.saturating_sub(1));
                    let earlier = (2..=upper).rev().find(|p| {
                        words
                            .get(p - 1)
                            .map_or(false, |w| w.as_ref().eq_ignore_ascii_case("as"))
                    });
                    if let Some(earlier) = earlier {
                        to_sentiment = true;
                        let word = words[earlier - 1].as_ref();
                        comparison.set_predicate(Mention::from(vec![Token::new(word, earlier)]));
                    }
                }
            } else if DEGREE_PREDICATES.iter().any(|p| word.eq_ignore_ascii_case(p)) && begin == position + 1 {
                to_sentiment = self.is_adjective(words, begin);
            }
        }

        if let Some(current) = aspect {
            if to_sentiment {
                comparison.add_argument(Role::Sentiment, current);
                stats.added_sentiment += 1;
            } else {
                aspects.insert(0, current);
            }
        }
        comparison.set_role(Role::Aspect, aspects);
    }

    fn is_adjective<S: AsRef<str>>(&self, words: &[S], position: usize) -> bool {
        let Some(tagger) = self.tagger.as_ref() else {
            return false;
        };
        let words: Vec<&str> = words.iter().map(|w| w.as_ref()).collect();
        tagger
            .tags(&words)
            .get(position - 1)
            .map_or(false, |tag| tag == ADJECTIVE_TAG)
    }

    /// Makes the first sentiment mention the predicate if the predicate is one of [`EXCHANGE_PREDICATES`].
    /// Returns true if the predicate was exchanged.
    pub fn exchange_predicate(&self, comparison: &mut ComparisonAnnotation, stats: &mut Statistics) -> bool {
        let text = comparison.predicate_text();
        if !EXCHANGE_PREDICATES.contains(&text.as_str()) {
            return false;
        }
        let Some(sentiment) = comparison.sentiment().first().cloned() else {
            return false;
        };
        stats.count_exchange(&text);
        comparison.set_predicate(sentiment);
        true
    }
}

/// Normalizes sentences and their annotations. Which steps run is governed by the [`Config`]:
/// entity merging (`merge_entities`), truncation (`token_limit`), predicate splitting (`split_predicate`),
/// predicate exchange (`annotate_adjective`) and entity ordering (`entity_order`).
pub struct Normalizer {
    config: Config,
    labeler: Box<dyn EntityLabeler>,
    predicates: PredicateNormalizer,
}

impl Normalizer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            labeler: Box::new(HeuristicLabeler),
            predicates: PredicateNormalizer::new(),
        }
    }

    /// Replaces the entity labeler used for merging
    pub fn with_labeler(mut self, labeler: impl EntityLabeler + 'static) -> Self {
        self.labeler = Box::new(labeler);
        self
    }

    /// Sets the part-of-speech tagger for predicate splitting
    pub fn with_tagger(mut self, tagger: impl PosTagger + 'static) -> Self {
        self.predicates = self.predicates.with_tagger(tagger);
        self
    }

    /// Builds the remap plan for one sentence
    pub fn plan(&self, words: &[&str], annotation: Option<&SentenceAnnotation>, stats: &mut Statistics) -> RemapPlan {
        let mut builder = RemapBuilder::new(words);
        if self.config.merge_entities() {
            let labels = self.labeler.labels(words);
            builder = builder.merge_entities(&labels);
        }
        let empty = SentenceAnnotation::default();
        let long_before = stats.long_sentences;
        let plan = builder
            .truncate(self.config.token_limit(), annotation.unwrap_or(&empty))
            .build(stats);
        if stats.long_sentences > long_before {
            warn(
                "normalize",
                &format!(
                    "Sentence is too long ({} tokens), cut to {} tokens: {}",
                    words.len(),
                    plan.live_count(),
                    words.join(" ")
                ),
            );
        }
        plan
    }

    /// Normalizes one sentence and (if given) its annotation. Returns the new sentence text and annotation.
    pub fn normalize(
        &self,
        sentence: &str,
        annotation: Option<&SentenceAnnotation>,
        stats: &mut Statistics,
    ) -> (String, Option<SentenceAnnotation>) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let plan = self.plan(&words, annotation, stats);
        let text = plan.sentence_text();
        let Some(annotation) = annotation else {
            return (text, None);
        };
        let mut result = plan.apply(annotation, stats);
        let new_words: Vec<&str> = text.split(' ').collect();
        result.update_comparisons(|comparison| self.normalize_comparison(comparison, &new_words, stats));
        (text, Some(result))
    }

    /// Applies predicate normalisation and entity ordering to one remapped comparison
    pub fn normalize_comparison(
        &self,
        comparison: &mut ComparisonAnnotation,
        words: &[&str],
        stats: &mut Statistics,
    ) {
        if self.config.split_predicate() {
            self.predicates.split_predicate(comparison, words, stats);
        }
        if self.config.annotate_adjective() {
            self.predicates.exchange_predicate(comparison, stats);
        }
        let swapped = match self.config.entity_order() {
            EntityOrder::Keep => false,
            EntityOrder::Surface => comparison.reorder_by_surface(),
            EntityOrder::Preferred => comparison.reorder_by_preference(),
        };
        if swapped {
            stats.reordered += 1;
        }
    }

    /// Normalizes a whole corpus. Annotation lines that cannot be parsed are replaced by a non-comparative
    /// annotation carrying the error, so both output files stay aligned line by line. A line that cannot be read
    /// at all becomes an empty sentence with such an annotation; the reader ends there.
    /// Only errors writing the output are returned.
    pub fn normalize_corpus<R: BufRead, W: Write>(
        &self,
        reader: CorpusReader<R>,
        writer: &mut CorpusWriter<W>,
        stats: &mut Statistics,
    ) -> Result<(), CorpusError> {
        for record in reader {
            stats.sentences += 1;
            let record = match record {
                Ok(record) => record,
                Err(error) => {
                    stats.errors += 1;
                    let message = error.message();
                    warn("normalize", &message);
                    let mut placeholder = SentenceAnnotation::default().with_policy(self.config.duplicate_policy());
                    placeholder.add_error(&message);
                    writer.write(&placeholder, stats)?;
                    continue;
                }
            };
            let annotation = match record.annotation.as_deref() {
                Some(line) => Some(self.parse_annotation(line, record.line, stats)),
                None => None,
            };
            let (sentence, annotation) = self.normalize(&record.sentence, annotation.as_ref(), stats);
            debug(&self.config, || format!("Normalizer: line {}: {}", record.line, sentence));
            match annotation {
                Some(mut annotation) => {
                    annotation.set_sentence(sentence);
                    writer.write(&annotation, stats)?;
                }
                None => writer.write_sentence(&sentence)?,
            }
        }
        writer.flush()
    }

    fn parse_annotation(&self, line: &str, lineno: usize, stats: &mut Statistics) -> SentenceAnnotation {
        match SentenceAnnotation::parse(line, self.config.duplicate_policy(), stats) {
            Ok(annotation) => annotation,
            Err(error) => {
                stats.malformed += 1;
                let message = error.message();
                warn("normalize", &format!("line {}: {}", lineno, message));
                let id = line.split('\t').next().unwrap_or_default();
                let mut annotation = SentenceAnnotation::new(id).with_policy(self.config.duplicate_policy());
                annotation.add_error(&message);
                annotation
            }
        }
    }
}

impl Configurable for Normalizer {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn set_config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }
}
