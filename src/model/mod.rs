//! Data model for rooted phylogenetic trees.
//!
//! # Tree representation
//! Trees are represented by [Tree], which uses the arena pattern to store
//! [Vertex] nodes referenced by [VertexIndex]. Each vertex stores its
//! children (any number, in parsed order) and its parent as plain indices,
//! so the parent link never owns anything.
//!
//! # Vertex data
//! - label (synthetic `leaf_<k>` for unlabelled leaves after parsing)
//! - [BranchLength], non-negative, zero if absent
//! - [Annotations] decoded from NHX blocks (see [annotation])

pub mod annotation;
pub mod tree;
pub mod vertex;

pub use annotation::Annotations;
pub use tree::{Tree, VertexIndex};
pub use vertex::{BranchLength, Vertex};
