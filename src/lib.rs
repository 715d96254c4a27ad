//! # crumbs-core
//!
//! A Rust library for maintaining a typed, multi-relational graph over a collection of notes and
//! answering structural queries over it: breadcrumb trails up a hierarchy, sibling sets, and
//! nested indices of everything below a note.
//!
//! ## Overview
//!
//! Notes are related through user-defined **hierarchies**. Each hierarchy maps the five
//! [`properties::Direction`]s (`up`, `same`, `down`, `next`, `prev`) to the field names that
//! express them. Edges asserted by note content are **explicit**; the closure rules of
//! [`implied`] derive further **implied** edges from them (siblings share a parent, a parent's
//! sibling is also a parent, and so on).
//!
//! ### Key Features
//!
//! - **True multigraph**: parallel edges between the same pair of notes are kept
//! - **Phased chain-walk**: one traversal primitive shared by inference and queries
//! - **Declarative rules**: every implied rule is a [`implied::RuleDescriptor`] run by one engine
//! - **Snapshot reads**: [`handle::GraphHandle`] publishes immutable graph versions
//! - **Stable text encoding**: [`codec`] renders edges for diffing and tests
//!
//! ## Architecture
//!
//! - **[`properties`]**: Directions, rule kinds, hierarchies and note ids
//! - **[`graph`]**: The multigraph store (`CrumbGraph`) and the chain-walk
//! - **[`implied`]**: The rule catalog and inference engine
//! - **[`rebuild`]**: Full rebuild from explicit edges
//! - **[`handle`]**: Versioned ownership of the live graph
//! - **[`trail`]**, **[`list_index`]**, **[`freeze`]**: Query builders over a built graph
//! - **[`config`]**: TOML settings
//!
//! ## Quick Start
//!
//! ```rust
//! use crumbs_core::{
//!     config::Settings,
//!     properties::NoteId,
//!     rebuild::{rebuild, ExplicitEdge},
//!     trail::build_trail,
//! };
//!
//! # fn main() -> Result<(), crumbs_core::CrumbsError> {
//! let settings = Settings::from_toml_str(
//!     r#"
//! [[hierarchies]]
//! dirs = { up = ["parent"], same = ["sibling"], down = ["child"] }
//! implied_relationships = { same_parent_is_sibling = true }
//! "#,
//! )?;
//! let edges = vec![
//!     ExplicitEdge::from_field(&settings, "note_a", "parent", "topic")?,
//!     ExplicitEdge::from_field(&settings, "note_b", "parent", "topic")?,
//!     ExplicitEdge::from_field(&settings, "topic", "parent", "index")?,
//! ];
//! let (graph, report) = rebuild(&settings, Vec::<NoteId>::new(), edges)?;
//! assert_eq!(report.implied_edges(), 2);
//!
//! let trail = build_trail(&graph, "note_a", &settings.trail);
//! assert_eq!(trail.render(" > "), vec!["index > topic > note_a"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **default**: The graph engine and query builders
//! - **bin**: The `crumbs` command line tool (`clap`, `tracing-subscriber`)

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod freeze;
pub mod graph;
pub mod handle;
pub mod implied;
pub mod list_index;
pub mod properties;
pub mod rebuild;
#[cfg(test)]
mod tests;
pub mod trail;

pub use error::*;
