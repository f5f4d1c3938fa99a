/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

//! This module contains [`ComparisonAnnotation`], one comparison (predicate plus arguments) in a sentence,
//! and its canonical text encoding:
//!
//! ```text
//! [type_e1e2_DIRECTION; [entity1 , entity1]; [entity2]; [aspect]; [sentiment]; predicate]
//! ```
//!
//! where each mention is a space-separated sequence of `position_word` tokens.

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CorpusError;
use crate::json::ToJson;
use crate::token::{Mention, Token};
use crate::types::*;

/// The entity type code of an entity that has no explicit type
pub const UNSET_ENTITY_TYPE: char = '-';

/// Separator between the parts of a comparison field
const PART_SEPARATOR: &str = "; ";

/// Separator between multiple mentions of the same role
const MENTION_SEPARATOR: &str = " , ";

/// One comparison: a predicate with up to four kinds of arguments.
/// A comparison is only meaningful once its predicate is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ComparisonAnnotation {
    #[serde(rename = "type")]
    comparison_type: PredicateType,
    direction: PredicateDirection,
    entity1_type: char,
    entity2_type: char,
    predicate: Mention,
    entity1: Vec<Mention>,
    entity2: Vec<Mention>,
    aspect: Vec<Mention>,
    sentiment: Vec<Mention>,
}

impl Default for ComparisonAnnotation {
    fn default() -> Self {
        Self {
            comparison_type: PredicateType::Undefined,
            direction: PredicateDirection::Undefined,
            entity1_type: UNSET_ENTITY_TYPE,
            entity2_type: UNSET_ENTITY_TYPE,
            predicate: Mention::new(),
            entity1: Vec::new(),
            entity2: Vec::new(),
            aspect: Vec::new(),
            sentiment: Vec::new(),
        }
    }
}

impl ComparisonAnnotation {
    pub fn new(comparison_type: PredicateType) -> Self {
        Self {
            comparison_type,
            ..Self::default()
        }
    }

    pub fn comparison_type(&self) -> PredicateType {
        self.comparison_type
    }

    pub fn set_comparison_type(&mut self, comparison_type: PredicateType) {
        self.comparison_type = comparison_type;
    }

    pub fn direction(&self) -> PredicateDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: PredicateDirection) {
        self.direction = direction;
    }

    pub fn with_direction(mut self, direction: PredicateDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Entity type codes of entity1 and entity2
    pub fn entity_types(&self) -> (char, char) {
        (self.entity1_type, self.entity2_type)
    }

    pub fn set_entity_types(&mut self, entity1_type: char, entity2_type: char) {
        self.entity1_type = entity1_type;
        self.entity2_type = entity2_type;
    }

    pub fn predicate(&self) -> &Mention {
        &self.predicate
    }

    pub fn set_predicate(&mut self, predicate: Mention) {
        self.predicate = predicate;
    }

    pub fn with_predicate(mut self, predicate: Mention) -> Self {
        self.predicate = predicate;
        self
    }

    /// The predicate words, space-joined
    pub fn predicate_text(&self) -> String {
        self.predicate.text()
    }

    /// Position of the first predicate token, this is what comparisons are ordered by.
    /// `None` (empty predicate) orders before any position.
    pub fn first_predicate_position(&self) -> Option<usize> {
        self.predicate.begin()
    }

    /// A comparison is valid once it has a predicate
    pub fn is_valid(&self) -> bool {
        !self.predicate.is_empty()
    }

    /// Returns all mentions of the given role
    pub fn role(&self, role: Role) -> &[Mention] {
        match role {
            Role::Entity1 => &self.entity1,
            Role::Entity2 => &self.entity2,
            Role::Aspect => &self.aspect,
            Role::Sentiment => &self.sentiment,
        }
    }

    fn role_mut(&mut self, role: Role) -> &mut Vec<Mention> {
        match role {
            Role::Entity1 => &mut self.entity1,
            Role::Entity2 => &mut self.entity2,
            Role::Aspect => &mut self.aspect,
            Role::Sentiment => &mut self.sentiment,
        }
    }

    /// Adds a mention to one role, other roles are untouched
    pub fn add_argument(&mut self, role: Role, mention: Mention) {
        self.role_mut(role).push(mention);
    }

    /// Builder variant of [`Self::add_argument()`]
    pub fn with_argument(mut self, role: Role, mention: Mention) -> Self {
        self.add_argument(role, mention);
        self
    }

    /// Replaces all mentions of one role
    pub fn set_role(&mut self, role: Role, mentions: Vec<Mention>) {
        *self.role_mut(role) = mentions;
    }

    /// Removes and returns all mentions of one role
    pub fn remove_role(&mut self, role: Role) -> Vec<Mention> {
        std::mem::take(self.role_mut(role))
    }

    pub fn entity1(&self) -> &[Mention] {
        &self.entity1
    }

    pub fn entity2(&self) -> &[Mention] {
        &self.entity2
    }

    pub fn aspect(&self) -> &[Mention] {
        &self.aspect
    }

    pub fn sentiment(&self) -> &[Mention] {
        &self.sentiment
    }

    /// All argument mentions regardless of role, in the order entity1, entity2, aspect, sentiment
    pub fn arguments(&self) -> Vec<&Mention> {
        Role::ALL
            .iter()
            .flat_map(|role| self.role(*role).iter())
            .collect()
    }

    /// Iterates over all argument mentions together with their role
    pub fn arguments_with_roles(&self) -> impl Iterator<Item = (Role, &Mention)> {
        Role::ALL
            .into_iter()
            .flat_map(move |role| self.role(role).iter().map(move |m| (role, m)))
    }

    /// Iterates over every token referenced by the predicate or any argument
    pub fn referenced_tokens(&self) -> impl Iterator<Item = &Token> {
        self.predicate
            .iter()
            .chain(self.arguments_with_roles().flat_map(|(_, m)| m.iter()))
    }

    /// Swaps entity1 and entity2 if entity1 starts later in the sentence than entity2.
    /// Returns true if a swap happened.
    pub fn reorder_by_surface(&mut self) -> bool {
        let first1 = self.entity1.first().and_then(|m| m.begin());
        let first2 = self.entity2.first().and_then(|m| m.begin());
        if let (Some(first1), Some(first2)) = (first1, first2) {
            if first1 > first2 {
                std::mem::swap(&mut self.entity1, &mut self.entity2);
                return true;
            }
        }
        false
    }

    /// Swaps entity1 and entity2 for inferior ranked or superlative comparisons, so entity1 is always the preferred one.
    /// Returns true if a swap happened.
    pub fn reorder_by_preference(&mut self) -> bool {
        if self.entity1.is_empty() || self.entity2.is_empty() {
            return false;
        }
        let inferior = self.direction == PredicateDirection::Inferior;
        match self.comparison_type {
            PredicateType::Ranked | PredicateType::Superlative if inferior => {
                std::mem::swap(&mut self.entity1, &mut self.entity2);
                true
            }
            _ => false,
        }
    }

    /// Checks the explicit entity type codes of a parsed header against the entity lists: the number of codes
    /// other than `-` must equal the number of non-empty entity lists, unless there are no such codes at all.
    /// Returns a warning message on mismatch.
    pub(crate) fn check_entity_types(&self, codes: &str) -> Option<String> {
        let explicit = codes.chars().filter(|c| *c != UNSET_ENTITY_TYPE).count();
        let expected = (!self.entity1.is_empty()) as usize + (!self.entity2.is_empty()) as usize;
        if explicit == 0 || explicit == expected {
            None
        } else {
            Some(format!(
                "entity types '{}' do not match the {} annotated entities",
                codes, expected
            ))
        }
    }
}

/// Removes the enclosing square brackets (at most one on each side) and surrounding whitespace.
/// Brackets inside, as in a token `5_]`, are kept.
fn strip_brackets(s: &str) -> &str {
    let s = s.trim();
    let s = s.strip_prefix('[').unwrap_or(s);
    s.strip_suffix(']').unwrap_or(s).trim()
}

/// Parses one bracketed role group into its mentions
fn parse_role(group: &str) -> Result<Vec<Mention>, CorpusError> {
    let group = strip_brackets(group);
    if group.is_empty() {
        return Ok(Vec::new());
    }
    let mut mentions = Vec::new();
    for part in group.split(MENTION_SEPARATOR) {
        let mention: Mention = part.trim().parse()?;
        if !mention.is_empty() {
            mentions.push(mention);
        }
    }
    Ok(mentions)
}

fn write_role(f: &mut fmt::Formatter, mentions: &[Mention]) -> fmt::Result {
    write!(f, "[")?;
    for (i, mention) in mentions.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", MENTION_SEPARATOR)?;
        }
        write!(f, "{}", mention)?;
    }
    write!(f, "]")
}

impl fmt::Display for ComparisonAnnotation {
    /// Renders the canonical encoding of this comparison
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}_{}{}_{}",
            self.comparison_type, self.entity1_type, self.entity2_type, self.direction
        )?;
        for role in Role::ALL {
            write!(f, "{}", PART_SEPARATOR)?;
            write_role(f, self.role(role))?;
        }
        write!(f, "{}{}]", PART_SEPARATOR, self.predicate)
    }
}

impl FromStr for ComparisonAnnotation {
    type Err = CorpusError;

    /// Parses one comparison field of a canonical annotation line.
    /// Fields with fewer than five parts, an unknown type or malformed tokens fail as a whole.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(PART_SEPARATOR).collect();
        if parts.len() < 5 {
            return Err(CorpusError::MalformedLine(
                format!(
                    "comparison has {} parts, expected at least 5: {}",
                    parts.len(),
                    s
                ),
                "ComparisonAnnotation::from_str",
            ));
        }

        let header = strip_brackets(parts[0]);
        let mut header_parts = header.split('_');
        let comparison_type: PredicateType = header_parts.next().unwrap_or_default().parse()?;
        let codes = header_parts.next().unwrap_or_default();
        let direction = header_parts
            .next()
            .map(PredicateDirection::decode)
            .unwrap_or_default();

        let mut comparison = ComparisonAnnotation::new(comparison_type).with_direction(direction);
        comparison.entity1 = parse_role(parts[1])?;
        comparison.entity2 = parse_role(parts[2])?;
        comparison.aspect = parse_role(parts[3])?;
        if parts.len() > 5 {
            comparison.sentiment = parse_role(parts[4])?;
        }
        comparison.predicate = strip_brackets(parts[parts.len() - 1]).parse()?;

        let codechars: Vec<char> = codes.chars().collect();
        match codechars.len() {
            0 => {}
            1 => {
                let code = codechars[0];
                if !comparison.entity1.is_empty() {
                    comparison.entity1_type = code;
                }
                if !comparison.entity2.is_empty() {
                    comparison.entity2_type = code;
                }
            }
            _ => comparison.set_entity_types(codechars[0], codechars[1]),
        }
        if let Some(message) = comparison.check_entity_types(codes) {
            warn("canonical", &format!("{} in {}", message, s));
        }
        Ok(comparison)
    }
}

#[sealed]
impl TypeInfo for ComparisonAnnotation {
    fn typeinfo() -> Type {
        Type::ComparisonAnnotation
    }
}

impl ToJson for ComparisonAnnotation {}
