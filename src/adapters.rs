/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains the format adapters. Each adapter reads one kind of source annotation and produces
//! aligned [`SentenceAnnotation`]s in the canonical schema. See the submodules for the individual formats.

mod ims;
mod jdpa;
mod liu;
mod usage;

pub use ims::*;
pub use jdpa::*;
pub use liu::*;
pub use usage::*;

use std::collections::BTreeMap;
use std::fmt;

use crate::collaborators::Tokenizer;
use crate::config::Config;
use crate::error::CorpusError;
use crate::remap::substitute_literal;
use crate::sentence::SentenceAnnotation;
use crate::span::{TextSpan, TokenSpan};
use crate::stats::Statistics;
use crate::types::*;

/// Receiver of converted sentence annotations, see [`Adapter::convert_each()`]
pub type Emit<'a> = dyn FnMut(SentenceAnnotation, &mut Statistics) -> Result<(), CorpusError> + 'a;

/// A converter from one source annotation format to canonical sentence annotations
pub trait Adapter {
    /// Short label used in warnings
    fn label(&self) -> &'static str;

    /// Converts the given input files, which files are expected depends on the format. Every sentence annotation
    /// is passed to `emit` as soon as its document (or block, for line-based formats) is converted.
    ///
    /// Problems with individual annotations are logged, counted in `stats` and recorded in the error log of the
    /// affected sentence. A document that cannot be read is logged, counted and skipped. Errors are only returned
    /// for missing mandatory inputs (a sentence or review table) and for errors returned by `emit`.
    fn convert_each(&self, inputs: &[String], stats: &mut Statistics, emit: &mut Emit<'_>) -> Result<(), CorpusError>;

    /// Converts the given input files and collects all sentence annotations
    fn convert_files(
        &self,
        inputs: &[String],
        stats: &mut Statistics,
    ) -> Result<Vec<SentenceAnnotation>, CorpusError> {
        let mut result = Vec::new();
        self.convert_each(inputs, stats, &mut |annotation: SentenceAnnotation, _: &mut Statistics| {
            result.push(annotation);
            Ok(())
        })?;
        Ok(result)
    }
}

/// The supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Character-offset mention graphs (JDPA/Knowtator)
    Jdpa,
    /// Bracket-tagged review text (Jindal and Liu)
    Liu,
    /// Tab-separated review, phrase and relation tables (USAGE)
    Usage,
    /// Canonical annotation lines plus a sentence table (IMS)
    Ims,
}

impl Format {
    /// Instantiates the adapter for this format with the default collaborators
    pub fn adapter(&self, config: Config) -> Box<dyn Adapter> {
        match self {
            Self::Jdpa => Box::new(JdpaAdapter::new(config)),
            Self::Liu => Box::new(LiuAdapter::new(config)),
            Self::Usage => Box::new(UsageAdapter::new(config)),
            Self::Ims => Box::new(ImsAdapter::new(config)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jdpa => "jdpa",
            Self::Liu => "liu",
            Self::Usage => "usage",
            Self::Ims => "ims",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Format {
    type Error = CorpusError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "jdpa" | "knowtator" => Ok(Self::Jdpa),
            "liu" | "jindal" => Ok(Self::Liu),
            "usage" => Ok(Self::Usage),
            "ims" => Ok(Self::Ims),
            _ => Err(CorpusError::ParseError(
                format!("unknown format: {}", s),
                "Format::try_from",
            )),
        }
    }
}

/// Logs a failed annotation, counts it and appends it to the error log of the sentence (if there is one)
pub(crate) fn record_failure(
    label: &str,
    error: &CorpusError,
    context: &str,
    annotation: Option<&mut SentenceAnnotation>,
    stats: &mut Statistics,
) {
    match error {
        CorpusError::PredicateNotFound(..) => stats.predicates_not_found += 1,
        CorpusError::ArgumentNotFound(..) => stats.arguments_not_found += 1,
        CorpusError::MalformedLine(..) | CorpusError::MalformedToken(..) => stats.malformed += 1,
        _ => stats.errors += 1,
    }
    let message = error.message();
    warn(label, &format!("{} in {}", message, context.replace('\n', " ")));
    if let Some(annotation) = annotation {
        annotation.add_error(&message);
    }
}

/// Collects the sentence annotations of one document, keyed by sentence index.
/// Each sentence is tokenized once, when its first annotation arrives.
pub(crate) struct DocumentSentences<'a> {
    text: &'a str,
    spans: Vec<TextSpan>,
    entries: BTreeMap<usize, (SentenceAnnotation, Vec<TokenSpan>)>,
}

impl<'a> DocumentSentences<'a> {
    pub(crate) fn new(text: &'a str, spans: Vec<TextSpan>) -> Self {
        Self {
            text,
            spans,
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    /// The text of one sentence with line breaks replaced by spaces (offsets are preserved)
    pub(crate) fn sentence_text(&self, index: usize) -> String {
        covered_sentence(self.text, &self.spans, index)
    }

    /// Returns the annotation and the tokens of a sentence, creating both if needed
    pub(crate) fn entry(
        &mut self,
        index: usize,
        source: &str,
        config: &Config,
        tokenizer: &dyn Tokenizer,
    ) -> (&mut SentenceAnnotation, &[TokenSpan]) {
        let text = self.text;
        let spans = &self.spans;
        let entry = self.entries.entry(index).or_insert_with(|| {
            let tokens = tokenizer.tokenize(&covered_sentence(text, spans, index));
            let annotation = SentenceAnnotation::default()
                .with_policy(config.duplicate_policy())
                .with_comparative(true)
                .with_source(source);
            (annotation, tokens)
        });
        (&mut entry.0, entry.1.as_slice())
    }

    /// Finalizes all collected annotations in sentence order: ids become `name-index` and the sentence text
    /// is set to the tokens (with literal substitutions), space-joined.
    pub(crate) fn finish(self, name: &str) -> Vec<SentenceAnnotation> {
        self.entries
            .into_iter()
            .map(|(index, (mut annotation, tokens))| {
                annotation.set_id(format!("{}-{}", name, index));
                annotation.set_sentence(
                    tokens
                        .iter()
                        .map(|token| substitute_literal(token.text.as_str()))
                        .collect::<Vec<_>>()
                        .join(" "),
                );
                annotation
            })
            .collect()
    }
}

fn covered_sentence(text: &str, spans: &[TextSpan], index: usize) -> String {
    spans
        .get(index)
        .and_then(|span| span.covered_text(text))
        .unwrap_or_default()
        .replace('\n', " ")
}
