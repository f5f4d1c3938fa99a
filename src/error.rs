/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains the error type used throughout the library.

use std::error::Error;
use std::fmt;
use std::io;

// ------------------------------ ERROR DEFINITIONS & IMPLEMENTATIONS -------------------------------------------------------------

/// Errors that can occur while converting, parsing, remapping or writing annotations.
/// Most variants carry a message and a static context string describing where the error arose.
#[derive(Debug)]
pub enum CorpusError {
    /// A predicate span or string could not be aligned to a contiguous run of tokens
    /// (empty span, boundary mismatch, or token-text mismatch)
    PredicateNotFound(String, &'static str),

    /// A single argument mention could not be aligned to tokens. The annotation keeps its predicate.
    ArgumentNotFound(String, &'static str),

    /// A canonical annotation line (or one comparison field in it) could not be parsed
    MalformedLine(String, &'static str),

    /// A single token (`position_word`) could not be parsed
    MalformedToken(String),

    /// Unknown comparison type, direction or data format
    ParseError(String, &'static str),

    IOError(io::Error, String, &'static str),
    JsonError(
        serde_path_to_error::Error<serde_json::Error>,
        String,
        &'static str,
    ),
    CsvError(String, &'static str),
    SerializationError(String),

    /// A referenced node does not exist in a mention graph
    NotFound(String, &'static str),

    OtherError(&'static str),
}

impl CorpusError {
    /// Returns true for the recoverable alignment errors, which are counted and logged rather than propagated
    pub fn is_alignment_error(&self) -> bool {
        matches!(
            self,
            Self::PredicateNotFound(..) | Self::ArgumentNotFound(..)
        )
    }

    /// Returns the bare message, without context or variant name.
    /// This is what gets appended to a sentence's error log.
    pub fn message(&self) -> String {
        match self {
            Self::PredicateNotFound(msg, _)
            | Self::ArgumentNotFound(msg, _)
            | Self::MalformedLine(msg, _)
            | Self::ParseError(msg, _)
            | Self::CsvError(msg, _)
            | Self::NotFound(msg, _) => msg.clone(),
            Self::MalformedToken(token) => format!("malformed token: {}", token),
            _ => String::from(self),
        }
    }
}

impl From<&CorpusError> for String {
    /// Returns the error message as a String
    fn from(error: &CorpusError) -> String {
        match error {
            CorpusError::PredicateNotFound(msg, contextmsg) => {
                format!("PredicateNotFound: {} ({})", msg, contextmsg)
            }
            CorpusError::ArgumentNotFound(msg, contextmsg) => {
                format!("ArgumentNotFound: {} ({})", msg, contextmsg)
            }
            CorpusError::MalformedLine(msg, contextmsg) => {
                format!("MalformedLine: {} ({})", msg, contextmsg)
            }
            CorpusError::MalformedToken(token) => {
                format!(
                    "MalformedToken: expected position_word, got '{}'",
                    token
                )
            }
            CorpusError::ParseError(msg, contextmsg) => {
                format!("ParseError: {} ({})", msg, contextmsg)
            }
            CorpusError::IOError(err, filename, contextmsg) => {
                format!("IOError: {} ({}): {}", filename, contextmsg, err)
            }
            CorpusError::JsonError(err, filename, contextmsg) => {
                format!(
                    "JsonError: {} ({}): {} at {}",
                    filename,
                    contextmsg,
                    err.inner(),
                    err.path()
                )
            }
            CorpusError::CsvError(msg, contextmsg) => {
                format!("CsvError: {} ({})", msg, contextmsg)
            }
            CorpusError::SerializationError(msg) => format!("SerializationError: {}", msg),
            CorpusError::NotFound(id, contextmsg) => {
                format!("NotFound: No such item: {} ({})", id, contextmsg)
            }
            CorpusError::OtherError(msg) => format!("OtherError: {}", msg),
        }
    }
}

impl fmt::Display for CorpusError {
    /// Formats the error message for printing
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let errmsg: String = String::from(self);
        write!(f, "[CorpusError] {}", errmsg)
    }
}

impl Error for CorpusError {}

impl From<csv::Error> for CorpusError {
    fn from(err: csv::Error) -> Self {
        CorpusError::CsvError(err.to_string(), "reading tab-separated table")
    }
}
