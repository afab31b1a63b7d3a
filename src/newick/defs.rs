//! Constants for the Newick parser.

/// Newick label delimiters: parentheses, comma, colon, semicolon
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"(),:;";

/// Branch length delimiters: structural characters, bracket block start, whitespace
pub(crate) const BRANCH_LENGTH_DELIMITERS: &[u8] = b"(),:;[ \t\n\r";

/// Default guess for number of leaves, when unknown
pub(crate) const DEFAULT_NUM_LEAVES_GUESS: usize = 10;
