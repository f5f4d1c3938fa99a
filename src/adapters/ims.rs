/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

use std::collections::HashMap;
use std::io::BufRead;

use crate::adapters::{record_failure, Adapter, Emit};
use crate::comparison::ComparisonAnnotation;
use crate::config::{Config, Configurable};
use crate::error::CorpusError;
use crate::file::*;
use crate::sentence::SentenceAnnotation;
use crate::stats::Statistics;
use crate::types::*;

/// Selects comparative sentences from canonical annotation files, using a separate `id \t sentence` table
/// for the sentence text, and optionally filters the comparisons down to the positive ones.
pub struct ImsAdapter {
    config: Config,
}

impl ImsAdapter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Reads the sentence table. Lines without a tab are skipped and counted as malformed.
    /// A read error ends the table, it is logged and counted.
    pub fn read_sentences<R: BufRead>(
        &self,
        reader: R,
        source: &str,
        stats: &mut Statistics,
    ) -> HashMap<String, String> {
        let mut sentences = HashMap::new();
        for line in lossy_lines(reader) {
            let Some(line) = self.checked_line(line, source, "ImsAdapter::read_sentences", stats) else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((id, sentence)) => {
                    sentences.insert(id.trim().to_string(), sentence.trim().to_string());
                }
                None => {
                    let error = CorpusError::MalformedLine(
                        format!("sentence line without id: {}", line),
                        "ImsAdapter::read_sentences",
                    );
                    record_failure(self.label(), &error, source, None, stats);
                }
            }
        }
        sentences
    }

    fn checked_line(
        &self,
        line: std::io::Result<String>,
        source: &str,
        context: &'static str,
        stats: &mut Statistics,
    ) -> Option<String> {
        match line {
            Ok(line) => Some(line),
            Err(e) => {
                record_failure(self.label(), &CorpusError::IOError(e, source.to_string(), context), source, None, stats);
                None
            }
        }
    }

    /// Should this comparison be kept? Without `only_positive` everything is kept. Otherwise difference and
    /// undefined comparisons, inferior ranked or superlative ones, and (unless `use_equative`) equatives are dropped.
    pub fn keep_comparison(&self, comparison: &ComparisonAnnotation) -> bool {
        if !self.config.only_positive() {
            return true;
        }
        match comparison.comparison_type() {
            PredicateType::Equative => self.config.use_equative(),
            PredicateType::Ranked | PredicateType::Superlative => {
                comparison.direction() != PredicateDirection::Inferior
            }
            PredicateType::Difference | PredicateType::Undefined => false,
        }
    }

    /// Converts one annotation line. Returns `None` for non-comparative lines, lines without a sentence,
    /// malformed lines and lines without any remaining comparison.
    pub fn convert_line(
        &self,
        line: &str,
        sentences: &HashMap<String, String>,
        stats: &mut Statistics,
    ) -> Option<SentenceAnnotation> {
        stats.sentences += 1;
        let mut fields = line.split('\t');
        let id = fields.next().unwrap_or_default();
        if fields.next() == Some("0") {
            stats.skipped += 1;
            return None;
        }
        let Some(sentence) = sentences.get(id) else {
            let error = CorpusError::NotFound(
                format!("could not find sentence for annotation id {}", id),
                "ImsAdapter::convert_line",
            );
            record_failure(self.label(), &error, line, None, stats);
            return None;
        };
        let mut annotation = match SentenceAnnotation::parse(line, self.config.duplicate_policy(), stats) {
            Ok(annotation) => annotation,
            Err(error) => {
                record_failure(self.label(), &error, line, None, stats);
                return None;
            }
        };
        let before = annotation.len();
        annotation.retain_comparisons(|comparison| self.keep_comparison(comparison));
        stats.filtered += before - annotation.len();
        if annotation.is_empty() {
            debug(&self.config, || format!("ImsAdapter: ignoring {}, no comparison left", id));
            stats.skipped += 1;
            return None;
        }
        for comparison in annotation.comparisons() {
            stats.count_type(comparison.comparison_type().as_str());
        }
        annotation.set_sentence(sentence.as_str());
        Some(annotation)
    }

    /// Converts all lines of one annotation file and passes each kept annotation to `emit`.
    /// A read error ends the file, it is logged and counted.
    pub fn convert_reader<R: BufRead>(
        &self,
        reader: R,
        source: &str,
        sentences: &HashMap<String, String>,
        stats: &mut Statistics,
        emit: &mut Emit<'_>,
    ) -> Result<(), CorpusError> {
        stats.documents += 1;
        for line in lossy_lines(reader) {
            let Some(line) = self.checked_line(line, source, "ImsAdapter::convert_reader", stats) else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Some(annotation) = self.convert_line(&line, sentences, stats) {
                emit(annotation, stats)?;
            }
        }
        Ok(())
    }
}

impl Adapter for ImsAdapter {
    fn label(&self) -> &'static str {
        "ims"
    }

    /// The first input is the sentence table, every further input an annotation file. Without the sentence
    /// table nothing can be converted, so failing to open it is an error; an annotation file that cannot be
    /// opened is skipped.
    fn convert_each(&self, inputs: &[String], stats: &mut Statistics, emit: &mut Emit<'_>) -> Result<(), CorpusError> {
        let Some((sentencefile, annotationfiles)) = inputs.split_first() else {
            return Err(CorpusError::OtherError(
                "ims expects a sentence table followed by annotation files",
            ));
        };
        let sentences = self.read_sentences(open_file_reader(sentencefile, &self.config)?, sentencefile, stats);
        debug(&self.config, || format!("ImsAdapter: {} sentences read", sentences.len()));
        for filename in annotationfiles {
            match open_file_reader(filename, &self.config) {
                Ok(reader) => self.convert_reader(reader, filename, &sentences, stats, emit)?,
                Err(error) => record_failure(self.label(), &error, filename, None, stats),
            }
        }
        Ok(())
    }
}

impl Configurable for ImsAdapter {
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
