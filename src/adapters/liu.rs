/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

use regex::Regex;
use std::io::BufRead;

use crate::adapters::{record_failure, Adapter, Emit};
use crate::collaborators::{RegexTokenizer, Tokenizer};
use crate::comparison::ComparisonAnnotation;
use crate::config::{Config, Configurable};
use crate::error::CorpusError;
use crate::file::*;
use crate::sentence::SentenceAnnotation;
use crate::span::align_words;
use crate::stats::Statistics;
use crate::token::Mention;
use crate::types::*;

/// Opening tags of a comparative block, e.g. `<cs-1>`
const START_TAG_PATTERN: &str = r"<cs-([1-4])>";

/// Closing tags; the second alternative tolerates a known typo in the corpus
const END_TAG_PATTERN: &str = r"</cs-.>|/cs-2>";

/// The role markers in an annotation line, e.g. `1_` in `1_this player 2_ipod 3_sound (better)`
const ROLE_MARKER_PATTERN: &str = r"(?:^|\s)([123])_";

/// The comparison type of a tag number
fn liu_type(tag: u8) -> PredicateType {
    match tag {
        1 => PredicateType::Ranked,
        2 => PredicateType::Equative,
        3 => PredicateType::Superlative,
        4 => PredicateType::Difference,
        _ => PredicateType::Undefined,
    }
}

/// The content of one annotation line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiuAnnotationLine {
    /// The raw predicate field, possibly several predicates separated by commas
    pub predicate: String,
    pub entity1: Vec<String>,
    pub entity2: Vec<String>,
    pub aspect: Vec<String>,
}

/// A comparative block being read: the tags, the sentence and the annotation lines
#[derive(Debug, Default)]
struct LiuBlock {
    tags: Vec<u8>,
    expected_lines: usize,
    sentence: Option<String>,
    lines: Vec<String>,
    closed: bool,
}

/// Reading state within one corpus file
#[derive(Debug, Default)]
struct LiuState {
    in_header: bool,
    block: Option<LiuBlock>,
}

impl LiuBlock {
    fn is_complete(&self) -> bool {
        self.closed && self.lines.len() >= self.expected_lines
    }
}

/// Converts the bracket-tagged comparative sentence corpus of Jindal and Liu.
///
/// The input consists of plain sentences, one per line. Comparative sentences are preceded by a line with
/// one or more `<cs-N>` tags and followed by a closing tag and one annotation line per tag of type 1 to 3.
/// Blocks of lines consisting only of stars are headers and are skipped.
pub struct LiuAdapter {
    config: Config,
    tokenizer: Box<dyn Tokenizer>,
    start_tag: Regex,
    end_tag: Regex,
    role_marker: Regex,
}

impl LiuAdapter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tokenizer: Box::new(RegexTokenizer::default()),
            start_tag: Regex::new(START_TAG_PATTERN).expect("start tag pattern must compile"),
            end_tag: Regex::new(END_TAG_PATTERN).expect("end tag pattern must compile"),
            role_marker: Regex::new(ROLE_MARKER_PATTERN).expect("role marker pattern must compile"),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Converts corpus text held in memory. Ids are numbered from 1.
    pub fn convert_str(&self, text: &str, source: &str, stats: &mut Statistics) -> Vec<SentenceAnnotation> {
        stats.documents += 1;
        let mut next_id = 1;
        let mut state = LiuState::default();
        let mut result: Vec<SentenceAnnotation> = text
            .lines()
            .filter_map(|line| self.feed(&mut state, line, source, &mut next_id, stats))
            .collect();
        result.extend(self.finish(state, source, &mut next_id, stats));
        result
    }

    /// Converts corpus text from a reader, passing each comparative sentence to `emit` as soon as its block is
    /// complete. `next_id` is the id of the next comparative block and is advanced. A read error ends the input
    /// (it is logged and counted), the blocks read up to that point are still converted.
    pub fn convert_reader<R: BufRead>(
        &self,
        reader: R,
        source: &str,
        next_id: &mut usize,
        stats: &mut Statistics,
        emit: &mut Emit<'_>,
    ) -> Result<(), CorpusError> {
        stats.documents += 1;
        let mut state = LiuState::default();
        for line in lossy_lines(reader) {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    let error = CorpusError::IOError(e, source.to_string(), "LiuAdapter::convert_reader");
                    record_failure(self.label(), &error, source, None, stats);
                    break;
                }
            };
            if let Some(annotation) = self.feed(&mut state, &line, source, next_id, stats) {
                emit(annotation, stats)?;
            }
        }
        if let Some(annotation) = self.finish(state, source, next_id, stats) {
            emit(annotation, stats)?;
        }
        Ok(())
    }

    /// Processes one input line. Returns the sentence annotation of a block once the block is complete.
    fn feed(
        &self,
        state: &mut LiuState,
        line: &str,
        source: &str,
        next_id: &mut usize,
        stats: &mut Statistics,
    ) -> Option<SentenceAnnotation> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.chars().all(|c| c == '*') {
            state.in_header = !state.in_header;
            return None;
        }
        if state.in_header {
            return None;
        }

        if let Some(current) = state.block.as_mut() {
            if current.closed {
                current.lines.push(line.to_string());
            } else if self.end_tag.is_match(line) {
                current.closed = true;
            } else {
                current.sentence = Some(line.to_string());
                stats.sentences += 1;
            }
            if current.is_complete() {
                let done = state.block.take()?;
                return self.flush(done, source, next_id, stats);
            }
            return None;
        }

        let tags: Vec<u8> = self
            .start_tag
            .captures_iter(line)
            .filter_map(|caps| caps[1].parse::<u8>().ok())
            .collect();
        if tags.is_empty() {
            stats.sentences += 1;
            return None;
        }
        for tag in tags.iter() {
            stats.count_type(&format!("cs-{}", tag));
        }
        state.block = Some(LiuBlock {
            expected_lines: tags.iter().filter(|tag| **tag != 4).count(),
            tags: tags
                .into_iter()
                .filter(|tag| *tag != 4 || self.config.use_type4())
                .collect(),
            ..LiuBlock::default()
        });
        None
    }

    /// Flushes a block left open at the end of the input
    fn finish(
        &self,
        state: LiuState,
        source: &str,
        next_id: &mut usize,
        stats: &mut Statistics,
    ) -> Option<SentenceAnnotation> {
        let done = state.block?;
        self.flush(done, source, next_id, stats)
    }

    fn flush(
        &self,
        block: LiuBlock,
        source: &str,
        next_id: &mut usize,
        stats: &mut Statistics,
    ) -> Option<SentenceAnnotation> {
        let id = *next_id;
        *next_id += 1;
        self.convert_block(&block, id, source, stats)
    }

    /// Parses one annotation line: role-marked entity strings followed by the predicate(s) in parentheses
    pub fn parse_annotation_line(&self, line: &str) -> Result<LiuAnnotationLine, CorpusError> {
        let (open, close) = match (line.rfind('('), line.rfind(')')) {
            (Some(open), Some(close)) if open < close => (open, close),
            _ => {
                return Err(CorpusError::MalformedLine(
                    format!("no predicate in parentheses: {}", line),
                    "LiuAdapter::parse_annotation_line",
                ))
            }
        };
        let mut content = LiuAnnotationLine {
            predicate: line[open + 1..close].to_string(),
            ..LiuAnnotationLine::default()
        };
        let head = &line[..open];
        let markers: Vec<(String, usize, usize)> = self
            .role_marker
            .captures_iter(head)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some((caps[1].to_string(), whole.start(), whole.end()))
            })
            .collect();
        for (i, (role, _, end)) in markers.iter().enumerate() {
            let next = markers.get(i + 1).map(|m| m.1).unwrap_or(head.len());
            let text = head[*end..next].trim().to_string();
            match role.as_str() {
                "1" => content.entity1.push(text),
                "2" => content.entity2.push(text),
                _ => content.aspect.push(text),
            }
        }
        Ok(content)
    }

    /// Locates a phrase in the tokenized sentence (case-insensitive, first occurrence)
    fn align_phrase(&self, phrase: &str, tokens: &[String]) -> Option<Mention> {
        let words: Vec<String> = self
            .tokenizer
            .tokenize(phrase)
            .into_iter()
            .map(|token| token.text)
            .collect();
        align_words(tokens, &words, false)
    }

    /// Converts one comparative block. Returns `None` if no comparison could be aligned.
    fn convert_block(
        &self,
        block: &LiuBlock,
        id: usize,
        source: &str,
        stats: &mut Statistics,
    ) -> Option<SentenceAnnotation> {
        let sentence = block.sentence.as_deref().unwrap_or_default().replace('\n', " ");
        let tokens: Vec<String> = self
            .tokenizer
            .tokenize(&sentence)
            .into_iter()
            .map(|token| token.text)
            .collect();
        let context = format!("sentence '{}' in {}", sentence, source);
        let mut annotation = SentenceAnnotation::new(id.to_string())
            .with_policy(self.config.duplicate_policy())
            .with_comparative(true)
            .with_source(source);

        let mut lines = block.lines.iter();
        for tag in block.tags.iter() {
            if *tag == 4 {
                if !annotation.add_comparison(ComparisonAnnotation::new(liu_type(*tag))) {
                    stats.collapsed += 1;
                }
                continue;
            }
            let Some(line) = lines.next() else {
                let error = CorpusError::MalformedLine(
                    format!("missing annotation line for <cs-{}>", tag),
                    "LiuAdapter::convert_block",
                );
                record_failure(self.label(), &error, &context, Some(&mut annotation), stats);
                continue;
            };
            match self.parse_annotation_line(line) {
                Ok(content) => {
                    self.add_comparisons(&mut annotation, liu_type(*tag), &content, &tokens, &context, stats)
                }
                Err(error) => record_failure(self.label(), &error, &context, Some(&mut annotation), stats),
            }
        }

        if annotation.is_empty() {
            debug(&self.config, || format!("LiuAdapter: no comparison aligned in block {}", id));
            return None;
        }
        annotation.set_sentence(tokens.join(" "));
        Some(annotation)
    }

    /// Adds the comparison(s) of one annotation line. The first predicate that aligns carries the arguments,
    /// every further predicate yields a copy with the same arguments.
    fn add_comparisons(
        &self,
        annotation: &mut SentenceAnnotation,
        comparison_type: PredicateType,
        content: &LiuAnnotationLine,
        tokens: &[String],
        context: &str,
        stats: &mut Statistics,
    ) {
        let predicates: Vec<&str> = content.predicate.split(',').collect();
        let mut tried = 0;
        let mut predicate = None;
        for candidate in predicates.iter() {
            tried += 1;
            match self.align_predicate(candidate, tokens) {
                Ok(mention) => {
                    predicate = Some(mention);
                    break;
                }
                Err(error) => record_failure(self.label(), &error, context, Some(&mut *annotation), stats),
            }
        }
        let Some(predicate) = predicate else {
            return;
        };

        let mut comparison = ComparisonAnnotation::new(comparison_type).with_predicate(predicate);
        for (role, phrases) in [
            (Role::Entity1, &content.entity1),
            (Role::Entity2, &content.entity2),
            (Role::Aspect, &content.aspect),
        ] {
            for phrase in phrases.iter() {
                match self.align_phrase(phrase, tokens) {
                    Some(mention) => comparison.add_argument(role, mention),
                    None => {
                        let error = CorpusError::ArgumentNotFound(
                            format!("Argument '{}' not found: {}", role, phrase),
                            "LiuAdapter::add_comparisons",
                        );
                        record_failure(self.label(), &error, context, Some(&mut *annotation), stats);
                    }
                }
            }
        }

        if predicates.len() > 1 {
            let message = format!("Split predicate: {}", content.predicate);
            warn(self.label(), &format!("{} in {}", message, context));
            annotation.add_error(&message);
        }

        let base = comparison.clone();
        if !annotation.add_comparison(comparison) {
            stats.collapsed += 1;
        }
        for candidate in predicates.iter().skip(tried) {
            match self.align_predicate(candidate, tokens) {
                Ok(mention) => {
                    let mut copy = ComparisonAnnotation::new(comparison_type).with_predicate(mention);
                    for role in [Role::Entity1, Role::Entity2, Role::Aspect] {
                        copy.set_role(role, base.role(role).to_vec());
                    }
                    if !annotation.add_comparison(copy) {
                        stats.collapsed += 1;
                    }
                }
                Err(error) => record_failure(self.label(), &error, context, Some(&mut *annotation), stats),
            }
        }
    }

    fn align_predicate(&self, phrase: &str, tokens: &[String]) -> Result<Mention, CorpusError> {
        if phrase.trim().is_empty() {
            return Err(CorpusError::PredicateNotFound(
                "predicate is empty".to_string(),
                "LiuAdapter::align_predicate",
            ));
        }
        self.align_phrase(phrase, tokens).ok_or_else(|| {
            CorpusError::PredicateNotFound(
                format!("predicate annotation could not be mapped to tokens: {}", phrase.trim()),
                "LiuAdapter::align_predicate",
            )
        })
    }
}

impl Adapter for LiuAdapter {
    fn label(&self) -> &'static str {
        "liu"
    }

    /// Every input is a corpus file; ids continue across files. A file that cannot be opened is skipped.
    fn convert_each(&self, inputs: &[String], stats: &mut Statistics, emit: &mut Emit<'_>) -> Result<(), CorpusError> {
        let mut next_id = 1;
        for filename in inputs {
            debug(&self.config, || format!("LiuAdapter: reading {}", filename));
            match open_file_reader(filename, &self.config) {
                Ok(reader) => self.convert_reader(reader, filename, &mut next_id, stats, emit)?,
                Err(error) => record_failure(self.label(), &error, filename, None, stats),
            }
        }
        Ok(())
    }
}

impl Configurable for LiuAdapter {
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
