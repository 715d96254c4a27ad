use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::properties::NoteId;

/// Node lifecycle notifications fired by the note store. They map one-to-one onto graph store
/// operations and never trigger implied-edge inference on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphEvent {
    NodeCreated(NoteId),
    /// From ID, To ID
    NodeRenamed(NoteId, NoteId),
    NodeDeleted(NoteId),
}

impl Display for GraphEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            GraphEvent::NodeCreated(id) => write!(f, "NodeCreated({id})"),
            GraphEvent::NodeRenamed(from, to) => write!(f, "NodeRenamed({from} -> {to})"),
            GraphEvent::NodeDeleted(id) => write!(f, "NodeDeleted({id})"),
        }
    }
}
