//! Basic low-level byte parser functionality.
//!
//! Provides the cursor ([ByteParser] over a [ByteSource]) and the error type
//! ([ParsingError]) shared by the Newick parser.

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;

pub use byte_parser::ByteParser;
pub use byte_source::{ByteSource, InMemoryByteSource};
pub use parsing_error::{ParsingError, ParsingErrorType};
