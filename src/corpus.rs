/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains reading and writing of the corpus files: a sentence file with one tokenized sentence per
//! line, and an annotation file alongside it with one annotation per line (canonical or JSON).

use std::io::{BufRead, Write};

use crate::config::Config;
use crate::error::CorpusError;
use crate::file::*;
use crate::json::ToJson;
use crate::sentence::SentenceAnnotation;
use crate::stats::Statistics;
use crate::types::*;

/// Writes the two side-by-side corpus files
pub struct CorpusWriter<W: Write> {
    sentences: W,
    annotations: Option<W>,
    dataformat: DataFormat,
}

impl CorpusWriter<Box<dyn Write>> {
    /// Creates (or truncates) the output files. Without an annotation file only sentences are written.
    pub fn create(
        sentencefile: &str,
        annotationfile: Option<&str>,
        config: &Config,
    ) -> Result<Self, CorpusError> {
        debug(config, || {
            format!(
                "CorpusWriter::create: sentences={} annotations={:?}",
                sentencefile, annotationfile
            )
        });
        let sentences = open_file_writer(sentencefile, config)?;
        let annotations = match annotationfile {
            Some(filename) => Some(open_file_writer(filename, config)?),
            None => None,
        };
        Ok(Self::new(sentences, annotations, config.dataformat()))
    }
}

impl<W: Write> CorpusWriter<W> {
    pub fn new(sentences: W, annotations: Option<W>, dataformat: DataFormat) -> Self {
        Self {
            sentences,
            annotations,
            dataformat,
        }
    }

    /// Writes one line to the sentence file only
    pub fn write_sentence(&mut self, sentence: &str) -> Result<(), CorpusError> {
        writeln!(self.sentences, "{}", sentence)
            .map_err(|e| CorpusError::IOError(e, "sentences".to_string(), "CorpusWriter::write_sentence"))
    }

    /// Writes one annotation to the annotation file only
    pub fn write_annotation(&mut self, annotation: &SentenceAnnotation) -> Result<(), CorpusError> {
        let Some(writer) = self.annotations.as_mut() else {
            return Ok(());
        };
        match self.dataformat {
            DataFormat::Canonical => writeln!(writer, "{}", annotation)
                .map_err(|e| CorpusError::IOError(e, "annotations".to_string(), "CorpusWriter::write_annotation")),
            DataFormat::Json { compact } => {
                annotation.to_json_writer(&mut *writer, compact)?;
                writeln!(writer)
                    .map_err(|e| CorpusError::IOError(e, "annotations".to_string(), "CorpusWriter::write_annotation"))
            }
        }
    }

    /// Writes the sentence text of an annotation to the sentence file and the annotation itself to the
    /// annotation file, and counts what was written
    pub fn write(&mut self, annotation: &SentenceAnnotation, stats: &mut Statistics) -> Result<(), CorpusError> {
        self.write_sentence(annotation.sentence())?;
        self.write_annotation(annotation)?;
        if !annotation.is_empty() {
            stats.comparative_sentences += 1;
            stats.comparisons += annotation.len();
        }
        Ok(())
    }

    pub fn write_all<'a>(
        &mut self,
        annotations: impl IntoIterator<Item = &'a SentenceAnnotation>,
        stats: &mut Statistics,
    ) -> Result<(), CorpusError> {
        for annotation in annotations {
            self.write(annotation, stats)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<(), CorpusError> {
        self.sentences
            .flush()
            .map_err(|e| CorpusError::IOError(e, "sentences".to_string(), "CorpusWriter::flush"))?;
        if let Some(writer) = self.annotations.as_mut() {
            writer
                .flush()
                .map_err(|e| CorpusError::IOError(e, "annotations".to_string(), "CorpusWriter::flush"))?;
        }
        Ok(())
    }

    /// Returns the underlying writers
    pub fn into_inner(self) -> (W, Option<W>) {
        (self.sentences, self.annotations)
    }
}

/// One line of the corpus: a sentence and, if an annotation file is read, its annotation line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRecord {
    /// 1-based line number
    pub line: usize,
    pub sentence: String,
    pub annotation: Option<String>,
}

/// Reads the two side-by-side corpus files line by line. Iteration stops as soon as either file ends.
/// Invalid UTF-8 is replaced rather than failing (see [`LossyLines`]); a read error is returned once for the line
/// where it occurred, after which iteration stops.
pub struct CorpusReader<R: BufRead> {
    sentences: LossyLines<R>,
    annotations: Option<LossyLines<R>>,
    line: usize,
}

impl CorpusReader<Box<dyn BufRead>> {
    pub fn open(sentencefile: &str, annotationfile: Option<&str>, config: &Config) -> Result<Self, CorpusError> {
        debug(config, || {
            format!(
                "CorpusReader::open: sentences={} annotations={:?}",
                sentencefile, annotationfile
            )
        });
        let sentences = open_file_reader(sentencefile, config)?;
        let annotations = match annotationfile {
            Some(filename) => Some(open_file_reader(filename, config)?),
            None => None,
        };
        Ok(Self::new(sentences, annotations))
    }
}

impl<R: BufRead> CorpusReader<R> {
    pub fn new(sentences: R, annotations: Option<R>) -> Self {
        Self {
            sentences: lossy_lines(sentences),
            annotations: annotations.map(lossy_lines),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<CorpusRecord, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        let sentence = self.sentences.next()?;
        let annotation = match self.annotations.as_mut() {
            Some(lines) => Some(lines.next()?),
            None => None,
        };
        self.line += 1;
        let line = self.line;
        let result = sentence
            .map_err(|e| CorpusError::IOError(e, format!("sentences line {}", line), "CorpusReader"))
            .and_then(|sentence| {
                let annotation = annotation
                    .transpose()
                    .map_err(|e| CorpusError::IOError(e, format!("annotations line {}", line), "CorpusReader"))?;
                Ok(CorpusRecord {
                    line,
                    sentence,
                    annotation,
                })
            });
        Some(result)
    }
}
