/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

use std::collections::HashMap;
use std::io::Read;

use crate::adapters::{record_failure, Adapter, DocumentSentences, Emit};
use crate::collaborators::{PunctuationSplitter, RegexTokenizer, SentenceSplitter, Tokenizer};
use crate::comparison::ComparisonAnnotation;
use crate::config::{Config, Configurable};
use crate::error::CorpusError;
use crate::file::*;
use crate::sentence::SentenceAnnotation;
use crate::span::{align, char_slice, find_sentence, SentenceResolution, TextSpan, TokenSpan};
use crate::stats::Statistics;
use crate::token::Mention;
use crate::types::*;

/// The only relation type that is converted: aspect (target) to subjective phrase
pub const TARGET_SUBJECTIVE_RELATION: &str = "TARG-SUBJ";

#[derive(Debug, Clone, PartialEq)]
pub struct UsageReview {
    pub id: String,
    pub text: String,
}

/// An annotated phrase, with character offsets into the review text
#[derive(Debug, Clone, PartialEq)]
pub struct UsagePhrase {
    pub class: String,
    pub begin: usize,
    pub end: usize,
    pub text: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageRelation {
    pub kind: String,
    pub phrase1: String,
    pub phrase2: String,
}

/// The three tables of the USAGE corpus, indexed by review
#[derive(Debug, Clone, Default)]
pub struct UsageTables {
    reviews: Vec<UsageReview>,
    phrases: HashMap<String, HashMap<String, UsagePhrase>>,
    relations: HashMap<String, Vec<UsageRelation>>,
}

fn tab_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader)
}

/// Reads all records of one table. A record that cannot be read (e.g. invalid UTF-8) is skipped and counted,
/// a read error ends the table.
fn table_records<R: Read>(reader: R, table: &str, stats: &mut Statistics) -> Vec<csv::StringRecord> {
    let mut records = Vec::new();
    for record in tab_reader(reader).records() {
        match record {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => {
                record_failure("usage", &CorpusError::from(e), &format!("{} table", table), None, stats);
                break;
            }
            Err(e) => {
                stats.malformed += 1;
                warn("usage", &format!("skipping unreadable {} record: {}", table, e));
            }
        }
    }
    records
}

fn malformed(table: &str, record: &csv::StringRecord, stats: &mut Statistics) {
    stats.malformed += 1;
    warn(
        "usage",
        &format!(
            "skipping malformed {} record: {}",
            table,
            record.iter().collect::<Vec<_>>().join("\t")
        ),
    );
}

impl UsageTables {
    /// Reads the review, phrase and relation tables. Malformed or unreadable records are skipped and counted.
    pub fn from_readers<R1: Read, R2: Read, R3: Read>(
        reviews: R1,
        phrases: R2,
        relations: R3,
        stats: &mut Statistics,
    ) -> Self {
        let mut tables = Self::default();

        for record in table_records(reviews, "review", stats) {
            let n = record.len();
            if n < 3 {
                malformed("review", &record, stats);
                continue;
            }
            tables.reviews.push(UsageReview {
                id: record[0].to_string(),
                text: format!("{} {}", &record[n - 2], &record[n - 1]),
            });
        }

        for record in table_records(phrases, "phrase", stats) {
            let offsets = (record.get(2).map(str::parse::<usize>), record.get(3).map(str::parse::<usize>));
            let (Some(Ok(begin)), Some(Ok(end))) = offsets else {
                malformed("phrase", &record, stats);
                continue;
            };
            if record.len() < 6 {
                malformed("phrase", &record, stats);
                continue;
            }
            let phrase = UsagePhrase {
                class: record[0].to_string(),
                begin,
                end,
                text: record[4].to_string(),
                id: record[5].to_string(),
            };
            let review = tables.phrases.entry(record[1].to_string()).or_default();
            if review.contains_key(&phrase.id) {
                warn("usage", &format!("overwriting annotation for phrase {}", phrase.id));
            }
            review.insert(phrase.id.clone(), phrase);
        }

        for record in table_records(relations, "relation", stats) {
            if record.len() < 4 {
                malformed("relation", &record, stats);
                continue;
            }
            if !record[0].eq_ignore_ascii_case(TARGET_SUBJECTIVE_RELATION) {
                continue;
            }
            let relation = UsageRelation {
                kind: record[0].to_string(),
                phrase1: record[2].to_string(),
                phrase2: record[3].to_string(),
            };
            let review = tables.relations.entry(record[1].to_string()).or_default();
            match review
                .iter()
                .position(|r| r.phrase1 == relation.phrase1 && r.phrase2 == relation.phrase2)
            {
                Some(existing) => {
                    warn(
                        "usage",
                        &format!(
                            "overwriting relation annotation for phrases {}_{}",
                            relation.phrase1, relation.phrase2
                        ),
                    );
                    review[existing] = relation;
                }
                None => review.push(relation),
            }
        }
        tables
    }

    /// Reads the tables from three files. All three are mandatory, failing to open one is an error.
    pub fn from_files(
        reviews: &str,
        phrases: &str,
        relations: &str,
        config: &Config,
        stats: &mut Statistics,
    ) -> Result<Self, CorpusError> {
        debug(config, || {
            format!("UsageTables::from_files: {}, {}, {}", reviews, phrases, relations)
        });
        Ok(Self::from_readers(
            open_file_reader(reviews, config)?,
            open_file_reader(phrases, config)?,
            open_file_reader(relations, config)?,
            stats,
        ))
    }

    pub fn reviews(&self) -> &[UsageReview] {
        &self.reviews
    }

    pub fn phrase(&self, review: &str, id: &str) -> Option<&UsagePhrase> {
        self.phrases.get(review).and_then(|phrases| phrases.get(id))
    }

    /// The target-subjective relations of a review, in file order
    pub fn relations(&self, review: &str) -> &[UsageRelation] {
        self.relations.get(review).map(|r| r.as_slice()).unwrap_or(&[])
    }
}

/// Converts the USAGE review corpus. Every target-subjective relation becomes a comparison of undefined type
/// whose predicate is the target (aspect) phrase and whose entity1 is the subjective phrase, or vice versa
/// when subjective heads are configured.
pub struct UsageAdapter {
    config: Config,
    tokenizer: Box<dyn Tokenizer>,
    splitter: Box<dyn SentenceSplitter>,
}

impl UsageAdapter {
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

    /// Converts all reviews in file order
    pub fn convert_tables(&self, tables: &UsageTables, stats: &mut Statistics) -> Vec<SentenceAnnotation> {
        tables
            .reviews()
            .iter()
            .flat_map(|review| self.convert_review(tables, review, stats))
            .collect()
    }

    /// Converts the relations of one review. Sentences are returned in document order.
    pub fn convert_review(
        &self,
        tables: &UsageTables,
        review: &UsageReview,
        stats: &mut Statistics,
    ) -> Vec<SentenceAnnotation> {
        stats.documents += 1;
        let text = review.text.as_str();
        let mut sentences = DocumentSentences::new(text, self.splitter.split(text));
        stats.sentences += sentences.spans().len();
        let context = format!("review {}", review.id);

        for relation in tables.relations(&review.id) {
            let phrases = (
                tables.phrase(&review.id, &relation.phrase1),
                tables.phrase(&review.id, &relation.phrase2),
            );
            let (Some(target), Some(subjective)) = phrases else {
                let error = CorpusError::NotFound(
                    format!("phrase of relation {}_{}", relation.phrase1, relation.phrase2),
                    "UsageAdapter::convert_review",
                );
                record_failure(self.label(), &error, &context, None, stats);
                continue;
            };
            let index = match self.common_sentence(sentences.spans(), target, subjective, text) {
                Ok(index) => index,
                Err(error) => {
                    record_failure(self.label(), &error, &context, None, stats);
                    continue;
                }
            };
            let (predicate, argument) = if self.config.subjective_head() {
                (subjective, target)
            } else {
                (target, subjective)
            };
            let sentence_begin = sentences.spans()[index].begin;
            let sentence_context = format!("sentence '{}' of {}", sentences.sentence_text(index), context);
            let (annotation, tokens) = sentences.entry(index, &review.id, &self.config, self.tokenizer.as_ref());

            let predicate = match self.phrase_tokens(predicate, text, sentence_begin, tokens) {
                Ok(mention) => mention,
                Err(message) => {
                    let error = CorpusError::PredicateNotFound(
                        format!("Predicate {}", message),
                        "UsageAdapter::convert_review",
                    );
                    record_failure(self.label(), &error, &sentence_context, Some(annotation), stats);
                    continue;
                }
            };
            let mut comparison = ComparisonAnnotation::new(PredicateType::Undefined).with_predicate(predicate);
            match self.phrase_tokens(argument, text, sentence_begin, tokens) {
                Ok(mention) => comparison.add_argument(Role::Entity1, mention),
                Err(message) => {
                    let error = CorpusError::ArgumentNotFound(
                        format!("Argument {}", message),
                        "UsageAdapter::convert_review",
                    );
                    record_failure(self.label(), &error, &sentence_context, Some(&mut *annotation), stats);
                }
            }
            stats.count_type(relation.kind.to_uppercase().as_str());
            if !annotation.add_comparison(comparison) {
                stats.collapsed += 1;
            }
        }
        sentences.finish(&review.id)
    }

    /// Both phrases of a relation must lie in the same sentence
    fn common_sentence(
        &self,
        spans: &[TextSpan],
        phrase1: &UsagePhrase,
        phrase2: &UsagePhrase,
        text: &str,
    ) -> Result<usize, CorpusError> {
        let locate = |phrase: &UsagePhrase| {
            find_sentence(spans, phrase.begin, phrase.end, SentenceResolution::FirstAndLast).ok_or_else(|| {
                CorpusError::PredicateNotFound(
                    format!(
                        "The annotation is outside of the text: offsets are {}-{} but text length is {} ({})",
                        phrase.begin,
                        phrase.end,
                        text.chars().count(),
                        phrase.id
                    ),
                    "UsageAdapter::common_sentence",
                )
            })
        };
        let index1 = locate(phrase1)?;
        let index2 = locate(phrase2)?;
        if index1 != index2 {
            return Err(CorpusError::ArgumentNotFound(
                format!(
                    "The annotations are not in the same sentence: {} ({}) is in {} vs. {} ({}) in {}",
                    phrase1.text, phrase1.id, index1, phrase2.text, phrase2.id, index2
                ),
                "UsageAdapter::common_sentence",
            ));
        }
        Ok(index1)
    }

    /// Checks that the phrase text matches the review text at its offsets (ignoring case) and aligns it to tokens.
    /// Returns the failure reason on error.
    fn phrase_tokens(
        &self,
        phrase: &UsagePhrase,
        text: &str,
        sentence_begin: usize,
        tokens: &[TokenSpan],
    ) -> Result<Mention, String> {
        if phrase.text.is_empty() {
            return Err(format!("is empty ({})", phrase.id));
        }
        let covered = char_slice(text, phrase.begin, phrase.end).unwrap_or_default();
        if covered.to_lowercase() != phrase.text.to_lowercase() {
            return Err(format!(
                "does not match annotation span: found '{}', expected '{}' ({})",
                covered, phrase.text, phrase.id
            ));
        }
        align(phrase.begin, phrase.end, sentence_begin, tokens).ok_or_else(|| {
            format!(
                "could not be mapped to tokens: {} ({})",
                phrase.text, phrase.id
            )
        })
    }
}

impl Adapter for UsageAdapter {
    fn label(&self) -> &'static str {
        "usage"
    }

    /// Expects exactly three inputs: the review, phrase and relation tables. Annotations are emitted per review.
    fn convert_each(&self, inputs: &[String], stats: &mut Statistics, emit: &mut Emit<'_>) -> Result<(), CorpusError> {
        let [reviews, phrases, relations] = inputs else {
            return Err(CorpusError::OtherError(
                "usage expects three inputs: reviews, phrases and relations",
            ));
        };
        let tables = UsageTables::from_files(reviews, phrases, relations, &self.config, stats)?;
        for review in tables.reviews() {
            for annotation in self.convert_review(&tables, review, stats) {
                emit(annotation, stats)?;
            }
        }
        Ok(())
    }
}

impl Configurable for UsageAdapter {
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
