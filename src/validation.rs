/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module checks annotations against their sentences: every token of every mention must name the
//! sentence word at its position.

use std::io::BufRead;

use crate::comparison::ComparisonAnnotation;
use crate::config::Config;
use crate::corpus::CorpusReader;
use crate::error::CorpusError;
use crate::sentence::SentenceAnnotation;
use crate::stats::Statistics;
use crate::token::Mention;
use crate::types::*;

/// Returns the first token of the mention that does not match the sentence, as a message
fn check_mention<S: AsRef<str>>(mention: &Mention, words: &[S]) -> Option<String> {
    for token in mention.iter() {
        match words.get(token.position().wrapping_sub(1)) {
            Some(word) if word.as_ref() == token.word() => {}
            Some(word) => {
                return Some(format!(
                    "token {} does not match sentence word '{}'",
                    token,
                    word.as_ref()
                ))
            }
            None => {
                return Some(format!(
                    "token {} is outside of the sentence ({} tokens)",
                    token,
                    words.len()
                ))
            }
        }
    }
    None
}

/// Validates one comparison against the sentence words
pub fn validate_comparison<S: AsRef<str>>(comparison: &ComparisonAnnotation, words: &[S]) -> Vec<CorpusError> {
    let mut problems = Vec::new();
    if comparison.predicate().is_empty() {
        problems.push(CorpusError::PredicateNotFound(
            "predicate is empty".to_string(),
            "validate_comparison",
        ));
    } else if let Some(message) = check_mention(comparison.predicate(), words) {
        problems.push(CorpusError::PredicateNotFound(
            format!("predicate '{}': {}", comparison.predicate(), message),
            "validate_comparison",
        ));
    }
    for (role, mention) in comparison.arguments_with_roles() {
        if let Some(message) = check_mention(mention, words) {
            problems.push(CorpusError::ArgumentNotFound(
                format!("{} '{}': {}", role, mention, message),
                "validate_comparison",
            ));
        }
    }
    problems
}

/// Validates all comparisons of a sentence annotation against the given words.
/// The caller decides how to report and count the problems.
pub fn validate<S: AsRef<str>>(annotation: &SentenceAnnotation, words: &[S]) -> Vec<CorpusError> {
    annotation
        .comparisons()
        .iter()
        .flat_map(|comparison| validate_comparison(comparison, words))
        .collect()
}

/// Validates an annotation against its own sentence text
pub fn validate_self(annotation: &SentenceAnnotation) -> Vec<CorpusError> {
    let words: Vec<&str> = annotation.sentence().split(' ').collect();
    validate(annotation, &words)
}

/// Logs and counts the problems of one annotation. Returns true if it is valid.
pub fn report(annotation: &SentenceAnnotation, problems: &[CorpusError], stats: &mut Statistics) -> bool {
    for problem in problems {
        warn(
            "validation",
            &format!("{} in sentence {}", problem.message(), annotation.id()),
        );
    }
    stats.validation_failures += problems.len();
    problems.is_empty()
}

/// Validates a whole corpus (sentence file plus annotation file). Returns the number of invalid annotations.
/// A line that cannot be read counts as invalid; the reader ends there.
pub fn validate_corpus<R: BufRead>(
    reader: CorpusReader<R>,
    config: &Config,
    stats: &mut Statistics,
) -> usize {
    let mut invalid = 0;
    for record in reader {
        stats.sentences += 1;
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                stats.errors += 1;
                warn("validation", &error.message());
                invalid += 1;
                continue;
            }
        };
        let Some(line) = record.annotation.as_deref() else {
            continue;
        };
        let annotation = match SentenceAnnotation::parse(line, config.duplicate_policy(), stats) {
            Ok(annotation) => annotation,
            Err(error) => {
                stats.malformed += 1;
                warn("validation", &format!("line {}: {}", record.line, error.message()));
                invalid += 1;
                continue;
            }
        };
        let words: Vec<&str> = record.sentence.split(' ').collect();
        let problems = validate(&annotation, &words);
        if !report(&annotation, &problems, stats) {
            invalid += 1;
        }
        if !annotation.is_empty() {
            stats.comparative_sentences += 1;
            stats.comparisons += annotation.len();
        }
    }
    debug(config, || format!("validate_corpus: {} invalid annotations", invalid));
    invalid
}
