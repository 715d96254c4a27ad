//! Graph module: the typed note multigraph and its traversal primitive.
//!
//! # Module Organization
//!
//! - [`store`]: The multigraph store (`CrumbGraph`) together with its node and edge types
//! - [`chain`]: The phased chain-walk used by the implied-edge rules and by trail queries
//!
//! # Public API
//!
//! ```rust
//! use crumbs_core::graph::{ChainQuery, CrumbGraph, EdgeAttrs, PathMode};
//! ```

mod chain;
mod store;


pub use chain::{ChainQuery, Orientation, Path, PathMode, Step};
pub use store::{CrumbGraph, Edge, EdgeAttrs, EdgeRef, Node};
