/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

use crate::adapters::{record_failure, Adapter, DocumentSentences, Emit};
use crate::collaborators::{PunctuationSplitter, RegexTokenizer, SentenceSplitter, Tokenizer};
use crate::comparison::ComparisonAnnotation;
use crate::config::{Config, Configurable};
use crate::coref::{MentionGraph, MentionHandle};
use crate::error::CorpusError;
use crate::file::*;
use crate::json::FromJson;
use crate::sentence::SentenceAnnotation;
use crate::span::{align, find_sentence, SentenceResolution, TextSpan, TokenSpan};
use crate::stats::Statistics;
use crate::token::Mention;
use crate::types::*;

/// Type tag of the mention graph nodes that are comparisons
pub const COMPARISON_NODE: &str = "Comparison";

/// String slot marking an equative comparison
const SAME_SLOT: &str = "Same";

/// Relation slots of a comparison node, in the order they are resolved
const MORE_SLOT: &str = "More";
const LESS_SLOT: &str = "Less";
const DIMENSION_SLOT: &str = "Dimension";

/// One source document: its plain text, its name and its mention graph
#[derive(Debug, Clone)]
pub struct JdpaDocument {
    pub name: String,
    pub text: String,
    pub graph: MentionGraph,
}

impl JdpaDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>, graph: MentionGraph) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            graph,
        }
    }

    /// Loads a document from a plain text file; the mention graph is read from the same path with `.json` appended.
    /// The document name is the file stem.
    pub fn from_file(filename: &str, config: &Config) -> Result<Self, CorpusError> {
        debug(config, || format!("JdpaDocument::from_file: {}", filename));
        let text = read_to_string(filename, config)?;
        let graph = MentionGraph::from_json_file(&format!("{}.json", filename), config)?;
        Ok(Self::new(document_name(filename), text, graph))
    }
}

/// Converts mention graphs (as exported from Knowtator for the JDPA corpus) into sentence annotations.
///
/// For every comparison node, the sentence containing its span is located and the predicate and the
/// `More` (entity1), `Less` (entity2) and `Dimension` (aspect) mentions are aligned to that sentence's tokens.
/// Argument mentions outside of the sentence are replaced by a coreferent mention inside it, if there is one.
pub struct JdpaAdapter {
    config: Config,
    tokenizer: Box<dyn Tokenizer>,
    splitter: Box<dyn SentenceSplitter>,
}

impl JdpaAdapter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tokenizer: Box::new(RegexTokenizer::default()),
            splitter: Box::new(PunctuationSplitter),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn with_splitter(mut self, splitter: impl SentenceSplitter + 'static) -> Self {
        self.splitter = Box::new(splitter);
        self
    }

    /// Converts one document. Sentences are returned in document order; each sentence with at least one
    /// comparison node is returned, even if aligning the node failed (the failure is in its error log).
    pub fn convert_document(
        &self,
        document: &JdpaDocument,
        stats: &mut Statistics,
    ) -> Vec<SentenceAnnotation> {
        stats.documents += 1;
        let mut sentences = DocumentSentences::new(&document.text, self.splitter.split(&document.text));
        stats.sentences += sentences.spans().len();

        for (handle, node) in document.graph.iter() {
            if node.kind != COMPARISON_NODE {
                continue;
            }
            let located = node.covering_span().and_then(|span| {
                find_sentence(sentences.spans(), span.begin, span.end, SentenceResolution::Enclosing)
                    .map(|index| (span, index))
            });
            let Some((span, index)) = located else {
                let error = CorpusError::PredicateNotFound(
                    format!("Predicate is not inside any sentence: {} ({})", node.text, node.id),
                    "JdpaAdapter::convert_document",
                );
                record_failure(self.label(), &error, &document.name, None, stats);
                continue;
            };
            let sentence_span = sentences.spans()[index];
            let context = format!("sentence '{}' of {}", sentences.sentence_text(index), document.name);
            let (annotation, tokens) =
                sentences.entry(index, &document.name, &self.config, self.tokenizer.as_ref());
            let comparison_type = comparison_type(&document.graph, handle);
            stats.count_type(comparison_type.as_str());
            match self.make_comparison(&document.graph, handle, span, &sentence_span, tokens, comparison_type) {
                Ok((comparison, failures)) => {
                    for error in failures.iter() {
                        record_failure(self.label(), error, &context, Some(&mut *annotation), stats);
                    }
                    if !annotation.add_comparison(comparison) {
                        stats.collapsed += 1;
                    }
                }
                Err(error) => record_failure(self.label(), &error, &context, Some(annotation), stats),
            }
        }
        sentences.finish(&document.name)
    }

    /// Builds the comparison for one node. Fails only if the predicate cannot be aligned;
    /// argument failures are returned alongside the comparison.
    fn make_comparison(
        &self,
        graph: &MentionGraph,
        handle: MentionHandle,
        span: TextSpan,
        sentence: &TextSpan,
        tokens: &[TokenSpan],
        comparison_type: PredicateType,
    ) -> Result<(ComparisonAnnotation, Vec<CorpusError>), CorpusError> {
        let node = graph
            .get(handle)
            .ok_or(CorpusError::OtherError("comparison node vanished from mention graph"))?;
        if node.text.trim().is_empty() {
            return Err(CorpusError::PredicateNotFound(
                format!("Predicate is empty: {}", node.id),
                "JdpaAdapter::make_comparison",
            ));
        }
        let predicate = align(span.begin, span.end, sentence.begin, tokens).ok_or_else(|| {
            CorpusError::PredicateNotFound(
                format!(
                    "Predicate annotation could not be mapped to tokens: {} ({})",
                    node.text, node.id
                ),
                "JdpaAdapter::make_comparison",
            )
        })?;

        let mut failures = Vec::new();
        let mut argument = |key: &str| match self.make_argument(graph, handle, key, sentence, tokens) {
            Ok(mention) => mention,
            Err(error) => {
                failures.push(error);
                None
            }
        };
        let mut more = argument(MORE_SLOT);
        let mut less = argument(LESS_SLOT);
        let dimension = argument(DIMENSION_SLOT);

        let less_first = matches!((&more, &less), (Some(m), Some(l)) if l.begin() < m.begin());
        if self.config.reorder_equatives() && comparison_type == PredicateType::Equative && less_first {
            std::mem::swap(&mut more, &mut less);
        }

        let mut comparison = ComparisonAnnotation::new(comparison_type).with_predicate(predicate);
        for (role, mention) in [(Role::Entity1, more), (Role::Entity2, less), (Role::Aspect, dimension)] {
            if let Some(mention) = mention {
                comparison.add_argument(role, mention);
            }
        }
        Ok((comparison, failures))
    }

    /// Resolves one relation slot of a comparison node to tokens of the sentence.
    /// Returns `Ok(None)` if the node has no such relation.
    fn make_argument(
        &self,
        graph: &MentionGraph,
        predicate: MentionHandle,
        key: &str,
        sentence: &TextSpan,
        tokens: &[TokenSpan],
    ) -> Result<Option<Mention>, CorpusError> {
        let Some(target) = graph.slot(predicate, key) else {
            return Ok(None);
        };
        let predicate_text = graph.get(predicate).map(|n| n.text.as_str()).unwrap_or_default();
        let resolved = graph
            .resolve_in_sentence(target, sentence, self.config.use_coref())
            .map_err(|_| {
                let (text, id) = graph
                    .get(target)
                    .map(|n| (n.text.as_str(), n.id.as_str()))
                    .unwrap_or_default();
                CorpusError::ArgumentNotFound(
                    format!(
                        "Argument {} of predicate {} not in same sentence: {} ({})",
                        key, predicate_text, text, id
                    ),
                    "JdpaAdapter::make_argument",
                )
            })?;
        let node = graph
            .get(resolved)
            .ok_or(CorpusError::OtherError("argument node vanished from mention graph"))?;
        node.covering_span()
            .and_then(|span| align(span.begin, span.end, sentence.begin, tokens))
            .map(Some)
            .ok_or_else(|| {
                CorpusError::ArgumentNotFound(
                    format!(
                        "Argument {} of predicate {}, annotation could not be mapped to tokens: {} ({})",
                        key, predicate_text, node.text, node.id
                    ),
                    "JdpaAdapter::make_argument",
                )
            })
    }
}

/// Equative if the `Same` slot is `true`, ranked otherwise
fn comparison_type(graph: &MentionGraph, handle: MentionHandle) -> PredicateType {
    match graph.get(handle).and_then(|node| node.string_slots.get(SAME_SLOT)) {
        Some(value) if value == "true" => PredicateType::Equative,
        _ => PredicateType::Ranked,
    }
}

impl Adapter for JdpaAdapter {
    fn label(&self) -> &'static str {
        "jdpa"
    }

    /// Every input is a plain text document, with its mention graph alongside (see [`JdpaDocument::from_file()`]).
    /// A document whose text or graph cannot be loaded is skipped.
    fn convert_each(&self, inputs: &[String], stats: &mut Statistics, emit: &mut Emit<'_>) -> Result<(), CorpusError> {
        for filename in inputs {
            let document = match JdpaDocument::from_file(filename, &self.config) {
                Ok(document) => document,
                Err(error) => {
                    record_failure(self.label(), &error, filename, None, stats);
                    continue;
                }
            };
            for annotation in self.convert_document(&document, stats) {
                emit(annotation, stats)?;
            }
        }
        Ok(())
    }
}

impl Configurable for JdpaAdapter {
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
