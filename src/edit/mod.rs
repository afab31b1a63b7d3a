//! Structural edits of a [Tree](crate::model::Tree).
//!
//! * [prune] - removes a vertex (and its subtree) from the tree
//! * [prune_leaf] - same, resolving the leaf by label first
//!
//! Edits rewrite indices in the arena; detached vertices stay in the arena
//! but are no longer reachable from the root.

mod prune;

pub use prune::{PruneError, prune, prune_leaf};
