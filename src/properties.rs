//! [crate::properties] contains the basic building blocks of the hierarchy model: note
//! identifiers, the closed set of edge directions, implied-rule identifiers and the per-hierarchy
//! configuration that ties them together.
pub use enumset::EnumSet;
use enumset::*;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
};

use crate::error::CrumbsError;

pub(crate) mod dir_fields {
    // Direction keys go through their string form; not every format's map-key serializer accepts
    // enum variants.
    use crate::properties::Direction;
    use serde::{ser::SerializeMap, Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub(crate) fn serialize<S: Serializer>(
        dirs: &BTreeMap<Direction, Vec<String>>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = ser.serialize_map(Some(dirs.len()))?;
        for (dir, fields) in dirs.iter() {
            map.serialize_entry(dir.as_str(), fields)?;
        }
        map.end()
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<BTreeMap<Direction, Vec<String>>, D::Error> {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(de)?;
        let mut dirs = BTreeMap::new();
        for (name, fields) in raw {
            let dir = Direction::try_from(&name[..]).map_err(serde::de::Error::custom)?;
            dirs.entry(dir).or_insert_with(Vec::new).extend(fields);
        }
        Ok(dirs)
    }
}

pub(crate) mod implied_toggles {
    // Hierarchies persist their rule toggles as a `{ rule_name = bool }` table. Keys are written
    // as plain strings so any self-describing format (TOML, JSON) can round them.
    use crate::properties::ImpliedKind;
    use enumset::EnumSet;
    use serde::{ser::SerializeMap, Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub(crate) fn serialize<S: Serializer>(
        set: &EnumSet<ImpliedKind>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = ser.serialize_map(Some(ImpliedKind::all().len()))?;
        for kind in ImpliedKind::all() {
            map.serialize_entry(kind.as_str(), &set.contains(*kind))?;
        }
        map.end()
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<EnumSet<ImpliedKind>, D::Error> {
        let raw = BTreeMap::<String, bool>::deserialize(de)?;
        let mut accum = EnumSet::<ImpliedKind>::new();
        for (name, enabled) in raw {
            let kind = ImpliedKind::try_from(&name[..]).map_err(serde::de::Error::custom)?;
            if enabled {
                accum |= kind;
            }
        }
        Ok(accum)
    }
}

/// Stable note identifier, usually the vault-relative path of the note.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        NoteId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file name without folders or a trailing `.md`, used when rendering links.
    pub fn basename(&self) -> &str {
        let name = self.0.rsplit('/').next().unwrap_or(&self.0);
        name.strip_suffix(".md").unwrap_or(name)
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NoteId {
    fn from(src: &str) -> Self {
        NoteId(src.to_string())
    }
}

impl From<String> for NoteId {
    fn from(src: String) -> Self {
        NoteId(src)
    }
}

impl From<&NoteId> for NoteId {
    fn from(src: &NoteId) -> Self {
        src.clone()
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NoteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The logical role of an edge within a hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Same,
    Down,
    Next,
    #[serde(alias = "previous")]
    Prev,
}

impl Direction {
    pub fn all() -> &'static [Direction] {
        &[
            Direction::Up,
            Direction::Same,
            Direction::Down,
            Direction::Next,
            Direction::Prev,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Same => "same",
            Direction::Down => "down",
            Direction::Next => "next",
            Direction::Prev => "prev",
        }
    }

    /// The direction an edge would carry if asserted from its target back to its source.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Same => Direction::Same,
            Direction::Down => Direction::Up,
            Direction::Next => Direction::Prev,
            Direction::Prev => Direction::Next,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Direction {
    type Error = CrumbsError;

    fn try_from(src: &str) -> Result<Direction, CrumbsError> {
        match &src.to_lowercase()[..] {
            "up" => Ok(Direction::Up),
            "same" => Ok(Direction::Same),
            "down" => Ok(Direction::Down),
            "next" => Ok(Direction::Next),
            "prev" | "previous" => Ok(Direction::Prev),
            _ => Err(CrumbsError::Config(format!(
                "Invalid str for Direction. Received {src}. Valid options: up, same, down, next, prev"
            ))),
        }
    }
}

/// Identifies the closure rule that produced an implied edge. [Hierarchy] carries an [EnumSet]
/// of these to toggle each rule independently.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[serde(rename_all = "snake_case")]
pub enum ImpliedKind {
    SelfIsSibling,
    SameParentIsSibling,
    SameSiblingIsSibling,
    CousinIsSibling,
    SiblingsParentIsParent,
    ParentsSiblingIsParent,
}

impl ImpliedKind {
    pub fn all() -> &'static [ImpliedKind] {
        &[
            ImpliedKind::SelfIsSibling,
            ImpliedKind::SameParentIsSibling,
            ImpliedKind::SameSiblingIsSibling,
            ImpliedKind::CousinIsSibling,
            ImpliedKind::SiblingsParentIsParent,
            ImpliedKind::ParentsSiblingIsParent,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpliedKind::SelfIsSibling => "self_is_sibling",
            ImpliedKind::SameParentIsSibling => "same_parent_is_sibling",
            ImpliedKind::SameSiblingIsSibling => "same_sibling_is_sibling",
            ImpliedKind::CousinIsSibling => "cousin_is_sibling",
            ImpliedKind::SiblingsParentIsParent => "siblings_parent_is_parent",
            ImpliedKind::ParentsSiblingIsParent => "parents_sibling_is_parent",
        }
    }
}

impl Display for ImpliedKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ImpliedKind {
    type Error = CrumbsError;

    fn try_from(src: &str) -> Result<ImpliedKind, CrumbsError> {
        ImpliedKind::all()
            .iter()
            .find(|kind| kind.as_str() == src)
            .copied()
            .ok_or_else(|| {
                CrumbsError::Config(format!(
                    "Unknown implied relationship '{src}'. Valid options: {}",
                    ImpliedKind::all()
                        .iter()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// Position of a [Hierarchy] within the configured hierarchy list.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct HierarchyIdx(u16);

impl HierarchyIdx {
    pub fn new(idx: u16) -> Self {
        HierarchyIdx(idx)
    }

    pub fn index(&self) -> usize {
        usize::from(self.0)
    }
}

impl Display for HierarchyIdx {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for HierarchyIdx {
    type Error = CrumbsError;

    fn try_from(src: usize) -> Result<HierarchyIdx, CrumbsError> {
        u16::try_from(src).map(HierarchyIdx).map_err(|_| {
            CrumbsError::Config(format!(
                "Hierarchy index {src} exceeds the maximum of {}",
                u16::MAX
            ))
        })
    }
}

/// A user-defined relationship-set: which field names express each [Direction], and which
/// implied rules run over it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(default, with = "dir_fields")]
    pub dirs: BTreeMap<Direction, Vec<String>>,
    #[serde(default, with = "implied_toggles")]
    pub implied_relationships: EnumSet<ImpliedKind>,
}

impl Hierarchy {
    pub fn with_fields(mut self, dir: Direction, fields: &[&str]) -> Self {
        self.dirs
            .insert(dir, fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn with_rule(mut self, kind: ImpliedKind) -> Self {
        self.implied_relationships |= kind;
        self
    }

    pub fn fields(&self, dir: Direction) -> &[String] {
        self.dirs.get(&dir).map(|f| &f[..]).unwrap_or_default()
    }

    /// An empty field list disables the direction entirely.
    pub fn is_enabled(&self, dir: Direction) -> bool {
        !self.fields(dir).is_empty()
    }

    /// The field implied edges in `dir` are labelled with.
    pub fn primary_field(&self, dir: Direction) -> Option<&str> {
        self.fields(dir).first().map(|f| f.as_str())
    }

    pub fn rule_enabled(&self, kind: ImpliedKind) -> bool {
        self.implied_relationships.contains(kind)
    }

    pub fn direction_of_field(&self, field: &str) -> Option<Direction> {
        self.dirs
            .iter()
            .find(|(_, fields)| fields.iter().any(|f| f == field))
            .map(|(dir, _)| *dir)
    }

    pub fn validate(&self, idx: HierarchyIdx) -> Result<(), CrumbsError> {
        if Direction::all().iter().all(|dir| !self.is_enabled(*dir)) {
            return Err(CrumbsError::Config(format!(
                "Hierarchy {idx} has no direction with a configured field"
            )));
        }
        let mut seen = BTreeSet::new();
        for (dir, fields) in self.dirs.iter() {
            for field in fields {
                if field.trim().is_empty() {
                    return Err(CrumbsError::Config(format!(
                        "Hierarchy {idx} has an empty field name in direction '{dir}'"
                    )));
                }
                if !seen.insert(field.as_str()) {
                    return Err(CrumbsError::Config(format!(
                        "Hierarchy {idx} uses field '{field}' for more than one direction"
                    )));
                }
            }
        }
        Ok(())
    }
}
