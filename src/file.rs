/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! File helpers shared by the adapters and the corpus reader/writer. Relative names are looked up in the
//! configured working directory first, and `-` stands for standard input or output.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::CorpusError;
use crate::types::*;

/// Resolves a filename: absolute paths are kept, relative ones are taken from the working directory when they exist there
pub(crate) fn get_filepath(filename: &str, workdir: Option<&Path>) -> Result<PathBuf, CorpusError> {
    if filename == "-" {
        return Ok(filename.into());
    }
    if filename.is_empty() {
        return Err(CorpusError::OtherError("Empty filename"));
    }
    let path = if let Some(stripped) = filename.strip_prefix("file://") {
        PathBuf::from(stripped)
    } else {
        PathBuf::from(filename)
    };
    if path.is_absolute() {
        Ok(path)
    } else {
        if let Some(workdir) = workdir {
            let path = workdir.join(&path);
            if path.is_file() {
                return Ok(path);
            }
        }

        // relative to the process directory, existence is checked on open
        Ok(path)
    }
}

/// Opens an input file, resolved via [`get_filepath`]
pub(crate) fn open_file(filename: &str, config: &Config) -> Result<File, CorpusError> {
    let found_filename = get_filepath(filename, config.workdir())?;
    debug(config, || format!("reading {}", found_filename.display()));
    File::open(found_filename.as_path()).map_err(|e| {
        CorpusError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "open_file",
        )
    })
}

/// Creates (truncates) an output file, resolved via [`get_filepath`]
pub(crate) fn create_file(filename: &str, config: &Config) -> Result<File, CorpusError> {
    let found_filename = get_filepath(filename, config.workdir())?;
    debug(config, || format!("writing {}", found_filename.display()));
    File::create(found_filename.as_path()).map_err(|e| {
        CorpusError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "create_file",
        )
    })
}

/// Opens a file for buffered reading, `-` reads from standard input
pub fn open_file_reader(filename: &str, config: &Config) -> Result<Box<dyn BufRead>, CorpusError> {
    if filename == "-" {
        Ok(Box::new(std::io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(open_file(filename, config)?)))
    }
}

/// Opens a file for buffered writing, `-` writes to standard output
pub fn open_file_writer(filename: &str, config: &Config) -> Result<Box<dyn Write>, CorpusError> {
    if filename == "-" {
        Ok(Box::new(std::io::stdout()))
    } else {
        Ok(Box::new(BufWriter::new(create_file(filename, config)?)))
    }
}

/// Reads a whole file into a string. Invalid UTF-8 is replaced by U+FFFD rather than failing.
pub fn read_to_string(filename: &str, config: &Config) -> Result<String, CorpusError> {
    let mut reader = open_file_reader(filename, config)?;
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .map_err(|e| CorpusError::IOError(e, filename.to_string(), "read_to_string"))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Iterates over the lines of a reader without the line terminator (`\n` or `\r\n`).
/// Unlike [`BufRead::lines()`], a line with invalid UTF-8 does not fail: the bad bytes become U+FFFD.
/// Only real read errors are returned; the iterator ends after the first one.
pub struct LossyLines<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    failed: bool,
}

pub fn lossy_lines<R: BufRead>(reader: R) -> LossyLines<R> {
    LossyLines {
        reader,
        buffer: Vec::new(),
        failed: false,
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.last() == Some(&b'\n') {
                    self.buffer.pop();
                    if self.buffer.last() == Some(&b'\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buffer).into_owned()))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Returns the document name of a file: the file name without directories and without
/// anything from its first dot onwards (`data/cam/doc12.txt.knowtator.xml` gives `doc12`).
pub fn document_name(filename: &str) -> &str {
    let basename = match filename.rfind(|c: char| c == '/' || c == '\\') {
        Some(pos) => &filename[pos + 1..],
        None => filename,
    };
    match basename.find('.') {
        Some(pos) if pos > 0 => &basename[..pos],
        _ => basename,
    }
}
