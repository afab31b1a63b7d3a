//! Structs and logic to parse Newick and NHX strings.
//!
//! This module provides the [NewickParser] struct, a single-pass recursive
//! descent parser that builds a [Tree] from a [ByteParser].

use crate::model::annotation::{decode_nhx, Annotations};
use crate::model::{BranchLength, Tree, VertexIndex};
use crate::newick::defs::{BRANCH_LENGTH_DELIMITERS, DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_source::ByteSource;
use crate::parser::{ByteParser, ParsingError, ParsingErrorType};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

// =#========================================================================#=
// CONFIGURATION TYPES
// =#========================================================================#=
/// How the parser treats a branch length that is not a non-negative number,
/// e.g. `B:abc`, `B:` or `B:-0.2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthPolicy {
    /// Use a branch length of 0 and record a [LengthFallback].
    #[default]
    Lenient,
    /// Fail with [ParsingErrorType::InvalidBranchLength].
    Strict,
}

/// Record of a malformed branch length that was replaced by 0.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthFallback {
    /// Byte offset of the start of the malformed token
    pub position: usize,
    /// The token as it appeared in the input (possibly empty)
    pub token: String,
}

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================#=
/// Parser (configuration) for Newick format phylogenetic trees, with
/// optional NHX annotation decoding.
///
/// # Configuration
/// * [`with_nhx()`](Self::with_nhx)
///     - Decodes `[&&NHX:key=value:...]` blocks into vertex annotations.
///       Without it, bracket blocks attached to a label stay part of the label
///       and blocks after a branch length are dropped as comments.
/// * [`with_length_policy(policy)`](Self::with_length_policy)
///     - Leniency for malformed branch lengths, see [LengthPolicy].
/// * [`with_num_leaves(num_leaves)`](Self::with_num_leaves)
///     - Expected number of leaves, used to pre-allocate the arena.
///
/// # Format
/// * `tree ::= vertex [';']`
/// * `vertex ::= '(' vertex (',' vertex)* ')' [label] [':' length] [block]`
/// * `vertex ::= [label] [':' length] [block]`
///
/// Furthermore:
/// * Whitespace and newlines can occur between elements
/// * Unquoted labels run up to the next `(`, `)`, `,`, `:` or `;` and are trimmed;
///   `[...]` inside a label is opaque
/// * Quoted labels use single quotes, with `''` as escaped quote
/// * Text after the terminating `;` is ignored; the `;` itself is optional
///
/// # Example
/// ```
/// use nhxtree::newick::NewickParser;
/// use nhxtree::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("(A[&&NHX:S=human],B[&&NHX:S=mouse]);");
/// let mut newick_parser = NewickParser::new().with_nhx();
///
/// let tree = newick_parser.parse_str(&mut byte_parser).unwrap();
/// let a = tree.find_leaf("A").unwrap();
/// assert_eq!(tree[a].annotation("S"), Some("human"));
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    nhx: bool,
    length_policy: LengthPolicy,
    num_leaves: usize,
    fallbacks: Vec<LengthFallback>,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a new [NewickParser] with default settings:
    /// plain Newick (no NHX decoding) and [LengthPolicy::Lenient].
    pub fn new() -> Self {
        Self {
            nhx: false,
            length_policy: LengthPolicy::default(),
            num_leaves: DEFAULT_NUM_LEAVES_GUESS,
            fallbacks: Vec::new(),
        }
    }

    /// Configures the parser to decode NHX annotation blocks.
    pub fn with_nhx(mut self) -> Self {
        self.nhx = true;
        self
    }

    /// Sets the policy for malformed branch lengths.
    pub fn with_length_policy(mut self, length_policy: LengthPolicy) -> Self {
        self.length_policy = length_policy;
        self
    }

    /// Sets the expected number of leaves in each parsed tree.
    ///
    /// This allows pre-allocation of the vertex arena.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = num_leaves;
        self
    }

    /// Returns whether NHX decoding is enabled.
    pub fn is_nhx(&self) -> bool {
        self.nhx
    }

    /// Returns the branch lengths that were replaced by 0 during the last parse.
    pub fn fallbacks(&self) -> &[LengthFallback] {
        &self.fallbacks
    }
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Parses a single Newick tree from a string.
    pub fn parse(&mut self, newick: &str) -> Result<Tree, ParsingError> {
        let mut byte_parser = ByteParser::for_str(newick);
        self.parse_str(&mut byte_parser)
    }

    /// Parses a single Newick tree from the given [ByteParser].
    ///
    /// After parsing, every unlabelled leaf receives a synthetic label
    /// (see [Tree::assign_synthetic_labels]).
    ///
    /// # Arguments
    /// * `parser` - The byte parser positioned at the start of a Newick tree string
    ///
    /// # Returns
    /// * `Ok(Tree)` - The parsed phylogenetic tree
    /// * `Err(ParsingError)` - If the Newick format is invalid
    #[instrument(level = "trace", skip_all, fields(nhx = self.nhx))]
    pub fn parse_str<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<Tree, ParsingError> {
        self.fallbacks.clear();

        parser.skip_whitespace();
        if parser.is_eof() || parser.peek_is(b';') {
            return Err(parser.error(ParsingErrorType::EmptyInput));
        }

        let mut tree = Tree::new(self.num_leaves);
        let root_index = self.parse_vertex(parser, &mut tree)?;

        // Consume the optional terminating semicolon
        parser.skip_whitespace();
        if !parser.consume_if(b';') {
            if let Some(b) = parser.peek() {
                let msg = if b == b')' {
                    "')' without matching '('".to_string()
                } else {
                    format!("{:?} after end of tree", char::from(b))
                };
                return Err(parser.error(ParsingErrorType::UnexpectedCharacter(msg)));
            }
        }

        tree.set_root(root_index);
        let num_synthetic = tree.assign_synthetic_labels();

        // Having parsed a full tree, use its size as guess for the next one
        let num_leaves = tree.num_leaves();
        self.num_leaves = num_leaves;

        debug!(
            vertices = tree.num_vertices(),
            leaves = num_leaves,
            synthetic_labels = num_synthetic,
            length_fallbacks = self.fallbacks.len(),
            "parsed Newick tree"
        );

        Ok(tree)
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl NewickParser {
    /// Parses a vertex (with its subtree, if any), adds it to tree and returns its index:
    /// - `[(children)] [label] [:branch_length] [block]`
    /// - Skips leading whitespace
    fn parse_vertex<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree: &mut Tree,
    ) -> Result<VertexIndex, ParsingError> {
        parser.skip_whitespace();
        let children = if parser.peek_is(b'(') {
            self.parse_children(parser, tree)?
        } else {
            Vec::new()
        };

        let (label, mut annotations) = self.parse_label(parser)?;
        let branch_length = self.parse_branch_length(parser)?;
        self.parse_trailing_block(parser, &mut annotations)?;

        let index = tree.add_internal(children, label, branch_length);
        if !annotations.is_empty() {
            tree.set_annotations(index, annotations);
        }

        Ok(index)
    }

    /// Parses children `(first, second, ...)` and returns their indices:
    /// - Expects parser at opening `(`
    ///
    /// # Returns
    /// - vertex indices of child vertices, in input order
    /// - [ParsingError] if the list is not closed or malformed
    fn parse_children<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree: &mut Tree,
    ) -> Result<Vec<VertexIndex>, ParsingError> {
        // Parse: "(first"
        parser.consume_if(b'(');
        let mut children = vec![self.parse_vertex(parser, tree)?];

        // Parse: ",next" until ")"
        loop {
            parser.skip_whitespace();
            match parser.peek() {
                Some(b',') => {
                    parser.next_byte();
                    children.push(self.parse_vertex(parser, tree)?);
                }
                Some(b')') => {
                    parser.next_byte();
                    return Ok(children);
                }
                // The document ends before the list is closed
                None | Some(b';') => {
                    return Err(parser.error(ParsingErrorType::UnbalancedParentheses));
                }
                Some(b) => {
                    let msg = format!("Expected ',' or ')' but found {:?}", char::from(b));
                    return Err(parser.error(ParsingErrorType::UnexpectedCharacter(msg)));
                }
            }
        }
    }

    /// Parses the optional label of a vertex (quoted or unquoted) together
    /// with any bracket block attached to it.
    ///
    /// # Returns
    /// - The final label (NHX-stripped and quote-stripped in NHX mode,
    ///   verbatim otherwise) and the decoded annotations
    fn parse_label<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<(String, Annotations), ParsingError> {
        parser.skip_whitespace();
        let mut annotations = Annotations::new();

        if parser.peek_is(b'\'') {
            let quoted = parser.parse_quoted_label()?;
            let attached = parser.parse_unquoted_label(NEWICK_LABEL_DELIMITERS)?;
            let attached = attached.trim();
            let rest = if self.nhx {
                decode_nhx(attached, &mut annotations)
            } else {
                attached.to_string()
            };
            return Ok((quoted + &rest, annotations));
        }

        let raw = parser.parse_unquoted_label(NEWICK_LABEL_DELIMITERS)?;
        let label = if self.nhx {
            decode_nhx(&raw, &mut annotations)
        } else {
            raw.trim().to_string()
        };

        Ok((label, annotations))
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips whitespace before and after `:`
    /// - Supports signs and scientific notation (e.g., `1.5e-10`)
    ///
    /// # Returns
    /// - [BranchLength::ZERO] if no branch length is given
    /// - The parsed branch length, or zero with a recorded [LengthFallback]
    ///   if it is malformed under [LengthPolicy::Lenient]
    /// - [ParsingError] if it is malformed under [LengthPolicy::Strict]
    fn parse_branch_length<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<BranchLength, ParsingError> {
        parser.skip_whitespace();
        if !parser.consume_if(b':') {
            return Ok(BranchLength::ZERO);
        }
        parser.skip_whitespace();

        let start = parser.position();
        let token = parser.parse_unquoted_label(BRANCH_LENGTH_DELIMITERS)?;

        if let Some(branch_length) = token.parse::<f64>().ok().and_then(BranchLength::try_new) {
            return Ok(branch_length);
        }

        match self.length_policy {
            LengthPolicy::Strict => {
                parser.set_position(start);
                Err(parser.error(ParsingErrorType::InvalidBranchLength(token)))
            }
            LengthPolicy::Lenient => {
                warn!(position = start, token = %token, "malformed branch length, using 0");
                self.fallbacks.push(LengthFallback { position: start, token });
                Ok(BranchLength::ZERO)
            }
        }
    }

    /// Parses an optional bracket block following the branch length.
    ///
    /// In NHX mode it is decoded into `annotations`; otherwise it is a comment.
    fn parse_trailing_block<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        annotations: &mut Annotations,
    ) -> Result<(), ParsingError> {
        parser.skip_whitespace();
        if !parser.peek_is(b'[') {
            return Ok(());
        }

        let block = parser.parse_bracket_block()?;
        if self.nhx {
            decode_nhx(&block, annotations);
        } else {
            trace!(block = %block, "skipping bracket comment");
        }

        Ok(())
    }
}
