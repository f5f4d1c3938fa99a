/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CorpusError;
use crate::file::*;
use crate::json::*;
use crate::types::*;

/// Default token budget for length-window truncation
pub const DEFAULT_TOKEN_LIMIT: usize = 150;

pub trait Configurable: Sized {
    /// The configuration this component runs with
    fn config(&self) -> &Config;

    fn config_mut(&mut self) -> &mut Config;

    /// Replaces the configuration, builder style
    fn with_config(mut self, config: Config) -> Self {
        self.set_config(config);
        self
    }

    fn set_config(&mut self, config: Config) -> &mut Self;
}

/// Settings for all adapters and pipeline stages. Every key is optional in a configuration file.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Debug mode
    pub(crate) debug: bool,

    /// The working directory
    pub(crate) workdir: Option<PathBuf>,

    /// The chosen dataformat for writing annotations, defaults to canonical lines.
    pub(crate) dataformat: DataFormat,

    /// Sentences longer than this (in tokens) are truncated to a window around the annotations
    pub(crate) token_limit: usize,

    /// Follow coreference chains when an argument mention lies outside the predicate's sentence (mention graphs only)
    pub(crate) use_coref: bool,

    /// Put the entity that comes first in the sentence in entity1 for equative comparisons (mention graphs only)
    pub(crate) reorder_equatives: bool,

    /// Collapse runs of tokens with the same entity label into one placeholder token
    pub(crate) merge_entities: bool,

    /// Move material out of multi-word predicates and overlapping aspects into sentiment
    pub(crate) split_predicate: bool,

    /// Use the sentiment as predicate when the predicate is a bare more/less/as/most/least
    pub(crate) annotate_adjective: bool,

    /// Canonical ordering of entity1/entity2 during normalization
    pub(crate) entity_order: EntityOrder,

    /// Use the subjective phrase as predicate instead of the aspect (USAGE input)
    pub(crate) subjective_head: bool,

    /// Include comparisons of type 4 (difference, nothing annotated) from Liu input
    pub(crate) use_type4: bool,

    /// Only keep ranked and superlative comparisons (and equatives if `use_equative` is set) from IMS input
    pub(crate) only_positive: bool,

    /// Keep equatives when `only_positive` is set
    pub(crate) use_equative: bool,

    /// Retain comparisons whose predicates start at the same token instead of collapsing them
    pub(crate) keep_duplicate_predicates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            workdir: None,
            dataformat: DataFormat::Canonical,
            token_limit: DEFAULT_TOKEN_LIMIT,
            use_coref: true,
            reorder_equatives: true,
            merge_entities: false,
            split_predicate: false,
            annotate_adjective: false,
            entity_order: EntityOrder::Keep,
            subjective_head: false,
            use_type4: false,
            only_positive: false,
            use_equative: true,
            keep_duplicate_predicates: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// In debug mode, opened files and per-line processing details are reported on standard error
    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Sets the working directory, relative input and output files are resolved against it
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(|x| x.as_path())
    }

    /// Output format for the annotation file
    pub fn with_dataformat(mut self, value: DataFormat) -> Self {
        self.dataformat = value;
        self
    }

    pub fn dataformat(&self) -> DataFormat {
        self.dataformat
    }

    /// Set the token budget for length-window truncation
    pub fn with_token_limit(mut self, value: usize) -> Self {
        self.token_limit = value;
        self
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    pub fn with_use_coref(mut self, value: bool) -> Self {
        self.use_coref = value;
        self
    }

    /// Follow coreference chains for arguments outside the predicate's sentence?
    pub fn use_coref(&self) -> bool {
        self.use_coref
    }

    pub fn with_reorder_equatives(mut self, value: bool) -> Self {
        self.reorder_equatives = value;
        self
    }

    pub fn reorder_equatives(&self) -> bool {
        self.reorder_equatives
    }

    /// Enable/disable collapsing of labelled entity runs into placeholder tokens
    pub fn with_merge_entities(mut self, value: bool) -> Self {
        self.merge_entities = value;
        self
    }

    pub fn merge_entities(&self) -> bool {
        self.merge_entities
    }

    pub fn with_split_predicate(mut self, value: bool) -> Self {
        self.split_predicate = value;
        self
    }

    pub fn split_predicate(&self) -> bool {
        self.split_predicate
    }

    pub fn with_annotate_adjective(mut self, value: bool) -> Self {
        self.annotate_adjective = value;
        self
    }

    pub fn annotate_adjective(&self) -> bool {
        self.annotate_adjective
    }

    pub fn with_entity_order(mut self, value: EntityOrder) -> Self {
        self.entity_order = value;
        self
    }

    pub fn entity_order(&self) -> EntityOrder {
        self.entity_order
    }

    pub fn with_subjective_head(mut self, value: bool) -> Self {
        self.subjective_head = value;
        self
    }

    pub fn subjective_head(&self) -> bool {
        self.subjective_head
    }

    pub fn with_use_type4(mut self, value: bool) -> Self {
        self.use_type4 = value;
        self
    }

    pub fn use_type4(&self) -> bool {
        self.use_type4
    }

    pub fn with_only_positive(mut self, value: bool) -> Self {
        self.only_positive = value;
        self
    }

    pub fn only_positive(&self) -> bool {
        self.only_positive
    }

    pub fn with_use_equative(mut self, value: bool) -> Self {
        self.use_equative = value;
        self
    }

    pub fn use_equative(&self) -> bool {
        self.use_equative
    }

    pub fn with_keep_duplicate_predicates(mut self, value: bool) -> Self {
        self.keep_duplicate_predicates = value;
        self
    }

    /// The deduplication policy for comparisons sharing a predicate position
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.keep_duplicate_predicates {
            DuplicatePolicy::Keep
        } else {
            DuplicatePolicy::Collapse
        }
    }

    /// Loads configuration from a JSON file. Missing keys take their default values.
    pub fn from_file(filename: &str) -> Result<Self, CorpusError> {
        let reader = open_file_reader(filename, &Config::default())?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            CorpusError::JsonError(e, filename.to_string(), "Reading config from file")
        })
    }
}

#[sealed]
impl TypeInfo for Config {
    fn typeinfo() -> Type {
        Type::Config
    }
}

impl ToJson for Config {}
