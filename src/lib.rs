//! nhxtree is a library for phylogenetic trees given as Newick/NHX strings.
//!
//! Core functionality provided:
//! - Newick/NHX: Parse a single Newick string into a rooted [Tree], optionally
//!   decoding NHX annotation blocks (`[&&NHX:key=value:...]`).
//! - Tree model: Arena of vertices with any number of children, labels,
//!   branch lengths and annotations. See [crate::model] for more details.
//! - Layout: Radial or rectangular coordinates for every vertex, fitted to
//!   caller-supplied bounds. See [crate::layout].
//! - Editing: Prune a leaf or subtree, merging branch lengths of dissolved
//!   vertices. See [crate::edit].
//! - Distances: Leaf-to-leaf path lengths via lowest common ancestors,
//!   sequential or on the rayon thread pool. See [crate::distance].
//! - PHYLIP: Read square or lower-triangular distance matrices and write
//!   square ones. See [crate::matrix].
//! - Configurability:
//!   - Plain Newick or NHX mode
//!   - Lenient (malformed branch length becomes 0) or strict branch lengths
//!   - Policy for leaves sharing a label
//!
//! Limitations:
//! - Only a single tree per string
//! - No Newick writer
//!
//! # Usage patterns
//! 1. Quick functions with default settings: [parse_newick_str],
//!    [parse_nhx_str], [parse_phylip_str].
//! 2. Configure a [NewickParser](crate::newick::NewickParser) for full
//!    control over dialect and branch length handling.
//!
//! ## Example
//! ```
//! use nhxtree::{distance_matrix, parse_nhx_str, prune_leaf};
//!
//! let mut tree = parse_nhx_str("(A:0.1[&&NHX:S=human],(B:0.2,C:0.3):0.4);")?;
//! assert_eq!(tree.num_leaves(), 3);
//!
//! let a = tree.find_leaf("A").unwrap();
//! assert_eq!(tree[a].annotation("S"), Some("human"));
//!
//! prune_leaf(&mut tree, "B")?;
//! let matrix = distance_matrix(&tree)?;
//! assert!((matrix.distance("A", "C").unwrap() - 0.8).abs() < 1e-12);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Example Parser Configuration
//! ```
//! use nhxtree::newick::{LengthPolicy, NewickParser};
//!
//! let mut parser = NewickParser::new()
//!     .with_nhx()                              // Decode NHX blocks
//!     .with_length_policy(LengthPolicy::Strict) // Reject malformed lengths
//!     .with_num_leaves(4);                     // Capacity hint
//!
//! let tree = parser.parse("((A:1,B:2),(C:3,D:4));")?;
//! assert!(tree.is_valid());
//! # Ok::<(), nhxtree::parser::ParsingError>(())
//! ```

pub mod distance;
pub mod edit;
pub mod layout;
pub mod matrix;
pub mod model;
pub mod newick;
pub mod parser;

pub use distance::{DuplicateLabelPolicy, distance_matrix};
pub use edit::{prune, prune_leaf};
pub use layout::{LayoutOptions, layout};
pub use matrix::DistanceMatrix;
pub use model::Tree;

use crate::matrix::MatrixFormatError;
use crate::parser::ParsingError;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parse a Newick string using default settings, returning a [Tree].
///
/// See [`newick::parse_str`] for full documentation of this convenience function.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    newick::parse_str(newick)
}

/// Parse a Newick string with NHX annotations, returning a [Tree].
///
/// See [`newick::parse_nhx_str`] for full documentation of this convenience function.
pub fn parse_nhx_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    newick::parse_nhx_str(newick)
}

// ============================================================================
// Quick PHYLIP API
// ============================================================================
/// Parse a square or lower-triangular PHYLIP distance matrix.
///
/// See [`matrix::parse_phylip`] for full documentation.
pub fn parse_phylip_str<S: AsRef<str>>(text: S) -> Result<DistanceMatrix, MatrixFormatError> {
    matrix::parse_phylip(text.as_ref())
}
