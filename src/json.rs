/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`ToJson`] and [`FromJson`] traits that are used
//! in serialisation to/from JSON. The actual serde derivations live alongside the data structures themselves.

use std::io::Write;

use crate::config::Config;
use crate::error::CorpusError;
use crate::file::*;
use crate::types::*;

pub trait ToJson
where
    Self: TypeInfo + serde::Serialize,
{
    /// Writes a JSON serialisation to any writer
    /// Lower-level function
    fn to_json_writer<W>(&self, writer: W, compact: bool) -> Result<(), CorpusError>
    where
        W: std::io::Write,
    {
        match compact {
            false => serde_json::to_writer_pretty(writer, &self).map_err(|e| {
                CorpusError::SerializationError(format!(
                    "Writing {} to file: {}",
                    Self::typeinfo(),
                    e
                ))
            }),
            true => serde_json::to_writer(writer, &self).map_err(|e| {
                CorpusError::SerializationError(format!(
                    "Writing {} to file: {}",
                    Self::typeinfo(),
                    e
                ))
            }),
        }
    }

    /// Writes this structure to a file.
    /// Output is compact only if the configured dataformat asks for compact JSON.
    fn to_json_file(&self, filename: &str, config: &Config) -> Result<(), CorpusError> {
        debug(config, || {
            format!("{}.to_json_file: filename={:?}", Self::typeinfo(), filename)
        });
        let compact = match config.dataformat() {
            DataFormat::Json { compact } => compact,
            DataFormat::Canonical => false,
        };
        let mut writer = open_file_writer(filename, config)?;
        self.to_json_writer(&mut writer, compact)?;
        writer
            .flush()
            .map_err(|e| CorpusError::IOError(e, filename.to_string(), "Flushing JSON output"))
    }

    /// Serializes this structure to one string.
    fn to_json_string(&self, compact: bool) -> Result<String, CorpusError> {
        let result = if compact {
            serde_json::to_string(&self)
        } else {
            serde_json::to_string_pretty(&self)
        };
        result.map_err(|e| {
            CorpusError::SerializationError(format!(
                "Writing {} to string: {}",
                Self::typeinfo(),
                e
            ))
        })
    }
}

pub trait FromJson
where
    Self: TypeInfo + Sized,
{
    fn from_json_file(filename: &str, config: &Config) -> Result<Self, CorpusError>;

    fn from_json_str(string: &str) -> Result<Self, CorpusError>;
}
