/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`MentionGraph`]: mention nodes with character spans and named relation slots,
//! as exported from a stand-off annotation tool, and the traversal of coreference chains over it.

use sealed::sealed;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::Config;
use crate::error::CorpusError;
use crate::file::*;
use crate::json::*;
use crate::span::TextSpan;
use crate::types::*;

/// Slot name of a coreference edge
pub const REFERS_TO: &str = "RefersTo";

/// Slot name of an explicitly stored inverse coreference edge
pub const INVERSE_REFERS_TO: &str = "inverse_of_RefersTo_";

/// A lightweight reference to a node in a [`MentionGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MentionHandle(u32);

impl MentionHandle {
    pub fn new(intid: usize) -> Self {
        Self(intid as u32)
    }

    /// Returns the internal index
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// One mention in the source annotation graph
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MentionNode {
    pub id: String,

    /// The type tag, e.g. `Comparison` or `Mention`
    #[serde(rename = "type")]
    pub kind: String,

    /// Document-relative character spans, usually one
    pub spans: SmallVec<[TextSpan; 1]>,

    /// The text covered by the spans
    #[serde(default)]
    pub text: String,

    /// Literal-valued slots, e.g. `Same` = `true`
    #[serde(default)]
    pub string_slots: BTreeMap<String, String>,

    /// Relation slots, mapping a relation name to the id of another node
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
}

impl MentionNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, span: TextSpan) -> Self {
        let mut spans = SmallVec::new();
        spans.push(span);
        Self {
            id: id.into(),
            kind: kind.into(),
            spans,
            text: String::new(),
            string_slots: BTreeMap::new(),
            slots: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_string_slot(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.string_slots.insert(key.into(), value.into());
        self
    }

    /// Adds a relation to another node, referenced by its id
    pub fn with_slot(mut self, key: impl Into<String>, target: impl Into<String>) -> Self {
        self.slots.insert(key.into(), target.into());
        self
    }

    /// The smallest span covering all spans of this node
    pub fn covering_span(&self) -> Option<TextSpan> {
        TextSpan::covering(self.spans.iter())
    }
}

/// A graph of mentions connected by named relation slots.
///
/// Besides the explicit slots, the graph keeps a reverse index of incoming coreference edges,
/// so coreference chains can be followed in both directions regardless of whether inverse slots were exported.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MentionGraph {
    #[serde(rename = "mentions")]
    nodes: Vec<MentionNode>,

    #[serde(skip)]
    ids: HashMap<String, MentionHandle>,

    /// For each node, the nodes whose `RefersTo` slot points at it
    #[serde(skip)]
    referred_by: Vec<Vec<MentionHandle>>,

    /// Incoming coreference edges to ids that have not been added yet
    #[serde(skip)]
    pending: HashMap<String, Vec<MentionHandle>>,
}

#[derive(Deserialize)]
struct MentionGraphJson {
    mentions: Vec<MentionNode>,
}

impl MentionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from nodes, in order
    pub fn from_nodes(nodes: impl IntoIterator<Item = MentionNode>) -> Result<Self, CorpusError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add(node)?;
        }
        Ok(graph)
    }

    /// Adds a node. Fails if a node with the same id exists.
    pub fn add(&mut self, node: MentionNode) -> Result<MentionHandle, CorpusError> {
        if self.ids.contains_key(&node.id) {
            return Err(CorpusError::OtherError(
                "Duplicate mention id in mention graph",
            ));
        }
        let handle = MentionHandle::new(self.nodes.len());
        if let Some(target) = node.slots.get(REFERS_TO) {
            if let Some(target_handle) = self.ids.get(target) {
                self.referred_by[target_handle.as_usize()].push(handle);
            } else {
                self.pending.entry(target.clone()).or_default().push(handle);
            }
        }
        self.referred_by
            .push(self.pending.remove(&node.id).unwrap_or_default());
        self.ids.insert(node.id.clone(), handle);
        self.nodes.push(node);
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, handle: MentionHandle) -> Option<&MentionNode> {
        self.nodes.get(handle.as_usize())
    }

    /// Resolves a public id
    pub fn resolve_id(&self, id: &str) -> Option<MentionHandle> {
        self.ids.get(id).copied()
    }

    /// Returns the node an id refers to
    pub fn node(&self, id: &str) -> Result<&MentionNode, CorpusError> {
        self.resolve_id(id)
            .and_then(|handle| self.get(handle))
            .ok_or_else(|| CorpusError::NotFound(id.to_string(), "MentionGraph::node"))
    }

    /// Iterates over all nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (MentionHandle, &MentionNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (MentionHandle::new(i), node))
    }

    /// Follows a relation slot. Slots pointing at unknown ids yield `None`.
    pub fn slot(&self, handle: MentionHandle, key: &str) -> Option<MentionHandle> {
        self.get(handle)
            .and_then(|node| node.slots.get(key))
            .and_then(|target| self.resolve_id(target))
    }

    /// Direct coreference neighbours: outgoing and explicit inverse slots first, then incoming edges
    fn coreference_neighbours(&self, handle: MentionHandle) -> Vec<MentionHandle> {
        let mut neighbours: Vec<MentionHandle> = [REFERS_TO, INVERSE_REFERS_TO]
            .iter()
            .filter_map(|key| self.slot(handle, key))
            .collect();
        if let Some(incoming) = self.referred_by.get(handle.as_usize()) {
            neighbours.extend(incoming.iter().copied());
        }
        neighbours
    }

    /// Returns all mentions transitively coreferent with the given one, in depth-first order.
    /// The mention itself is not included. Cycles are handled by tracking visited nodes.
    pub fn coreferent(&self, handle: MentionHandle) -> Vec<MentionHandle> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(handle);
        self.collect_coreferent(handle, &mut visited, &mut chain);
        chain
    }

    fn collect_coreferent(
        &self,
        handle: MentionHandle,
        visited: &mut HashSet<MentionHandle>,
        chain: &mut Vec<MentionHandle>,
    ) {
        for neighbour in self.coreference_neighbours(handle) {
            if visited.insert(neighbour) {
                chain.push(neighbour);
                self.collect_coreferent(neighbour, visited, chain);
            }
        }
    }

    /// Finds the mention to use for `handle` within `sentence`: the mention itself if the sentence encloses it,
    /// otherwise (if `use_coref` is set) the first coreferent mention the sentence encloses.
    pub fn resolve_in_sentence(
        &self,
        handle: MentionHandle,
        sentence: &TextSpan,
        use_coref: bool,
    ) -> Result<MentionHandle, CorpusError> {
        let enclosed = |h: MentionHandle| {
            self.get(h)
                .and_then(|node| node.covering_span())
                .map(|span| sentence.encloses(span.begin, span.end))
                .unwrap_or(false)
        };
        if enclosed(handle) {
            return Ok(handle);
        }
        if use_coref {
            if let Some(found) = self.coreferent(handle).into_iter().find(|h| enclosed(*h)) {
                return Ok(found);
            }
        }
        let (text, id) = self
            .get(handle)
            .map(|node| (node.text.as_str(), node.id.as_str()))
            .unwrap_or_default();
        Err(CorpusError::ArgumentNotFound(
            format!("mention not in same sentence: {} ({})", text, id),
            "MentionGraph::resolve_in_sentence",
        ))
    }
}

impl FromJson for MentionGraph {
    /// Loads a mention graph from a JSON file of the form `{ "mentions": [ ... ] }`
    fn from_json_file(filename: &str, config: &Config) -> Result<Self, CorpusError> {
        debug(config, || format!("MentionGraph::from_json_file: {}", filename));
        let reader = open_file_reader(filename, config)?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<MentionGraphJson, _> = serde_path_to_error::deserialize(deserializer);
        let document = result.map_err(|e| {
            CorpusError::JsonError(e, filename.to_string(), "Reading mention graph from file")
        })?;
        Self::from_nodes(document.mentions)
    }

    fn from_json_str(string: &str) -> Result<Self, CorpusError> {
        let deserializer = &mut serde_json::Deserializer::from_str(string);
        let result: Result<MentionGraphJson, _> = serde_path_to_error::deserialize(deserializer);
        let document = result.map_err(|e| {
            CorpusError::JsonError(e, "(string)".to_string(), "Reading mention graph from string")
        })?;
        Self::from_nodes(document.mentions)
    }
}

#[sealed]
impl TypeInfo for MentionGraph {
    fn typeinfo() -> Type {
        Type::MentionGraph
    }
}

impl ToJson for MentionGraph {}
