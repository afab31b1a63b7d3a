//! Error types for the Newick/NHX parser.
//!
//! This module provides [ParsingError] and [ParsingErrorType] for representing
//! and reporting errors that occur while parsing tree descriptions.

use thiserror::Error;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================#=
/// Error types that can occur during Newick parsing.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum ParsingErrorType {
    /// Input contains nothing but whitespace
    #[error("Empty input")]
    EmptyInput,
    /// A `(` was never closed
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,
    /// A character that cannot appear at this point
    #[error("Unexpected character - {0}")]
    UnexpectedCharacter(String),
    /// A quoted label without closing quote
    #[error("Unterminated quoted label")]
    UnterminatedQuote,
    /// A `[` block without closing `]`
    #[error("Unterminated bracket block")]
    UnterminatedBlock,
    /// A branch length that is not a non-negative number (strict mode only)
    #[error("Invalid branch length '{0}'")]
    InvalidBranchLength(String),
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================#=
/// Parsing error with contextual information (byte offset and upcoming input).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at position {position}{}", format_context(.context))]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    context: String,
}

fn format_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!("\n  Context (next {} bytes): {}", context.len(), context)
    }
}

impl ParsingError {
    /// Creates a [ParsingError] from an error type, position and context.
    ///
    /// Usually created via [ByteParser::error](crate::parser::ByteParser::error),
    /// which fills in position and context from the parser state.
    pub fn new(kind: ParsingErrorType, position: usize, context: String) -> Self {
        Self { kind, position, context }
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Get the byte offset where the error occurred
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the input following the error position (up to 50 bytes)
    pub fn context(&self) -> &str {
        &self.context
    }
}
