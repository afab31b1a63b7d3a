//! Newick/NHX format parser for phylogenetic trees.
//!
//! This module provides [NewickParser] to parse Newick format strings into
//! a [Tree]. With [`NewickParser::with_nhx`] it also decodes NHX annotation
//! blocks of the form `[&&NHX:key=value:...]`.
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_str`] - parses plain Newick, bracket blocks are kept in labels
//! * [`parse_nhx_str`] - parses Newick with NHX annotations decoded
//!
//! # Full API
//! For more control, configure a [NewickParser] and provide data via a
//! [ByteParser](crate::parser::ByteParser):
//! * [`NewickParser::parse_str`] - parse a single tree
//! * [`NewickParser::fallbacks`] - inspect branch lengths replaced by 0
//!
//! # Format
//! The Newick format has the following grammar:
//! * `tree ::= vertex [';']`
//! * `vertex ::= internal_vertex | leaf`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length] [block]`
//! * `leaf ::= [label] [branch_length] [block]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements
//! * `[...]` blocks are opaque: in a label they are label text (or NHX
//!   annotations in NHX mode), after a branch length they are comments
//!   (or NHX annotations in NHX mode)
//!
//! For example, in NHX mode
//! * `(A[&&NHX:S=human]:0.1,B:0.2[&&NHX:S=mouse])`
//!
//! yields leaves `A` and `B` with annotation `S` set to `human` and `mouse`.

mod defs;
pub mod parser;

pub use parser::{LengthFallback, LengthPolicy, NewickParser};

use crate::model::Tree;
use crate::parser::ParsingError;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string into a [Tree] using default settings.
///
/// Bracket blocks attached to labels stay part of the label and malformed
/// branch lengths become 0.
///
/// # Example
/// ```
/// use nhxtree::newick::parse_str;
///
/// let tree = parse_str("(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));")?;
/// assert_eq!(tree.num_leaves(), 3);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    NewickParser::new().parse(newick.as_ref())
}

/// Parses a single Newick string with NHX annotations into a [Tree].
///
/// # Example
/// ```
/// use nhxtree::newick::parse_nhx_str;
///
/// let tree = parse_nhx_str("(A[&&NHX:S=human],B[&&NHX:S=mouse]);")?;
/// let b = tree.find_leaf("B").unwrap();
/// assert_eq!(tree[b].annotation("S"), Some("mouse"));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_nhx_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    NewickParser::new().with_nhx().parse(newick.as_ref())
}
