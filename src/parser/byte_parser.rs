//! Low-level byte-by-byte parser for Newick text.
//!
//! This module provides [ByteParser] for text-based tree formats with support
//! for peeking, consuming, quote-aware label parsing and
//! opaque bracket blocks. Used as the foundation of the
//! [NewickParser](crate::newick::NewickParser).

use crate::parser::byte_source::{ByteSource, InMemoryByteSource};
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};

/// Default length of context provided by errors from the parser
pub(crate) const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser with support for peeking and consuming.
///
/// Structural characters of Newick are ASCII, so the parser works on bytes and
/// only turns collected label bytes back into (UTF-8) strings.
///
/// # Features
/// - Whitespace skipping
/// - Quote-aware label parsing (single quotes with `''` escaping)
/// - Opaque bracket blocks inside labels (`A[&&NHX:S=x]`)
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use nhxtree::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  (A,B);");
/// parser.skip_whitespace();
/// assert!(parser.consume_if(b'('));
/// assert_eq!(parser.position(), 3);
/// ```
pub struct ByteParser<S: ByteSource = InMemoryByteSource> {
    source: S,
}

impl ByteParser<InMemoryByteSource> {
    /// Creates a new [ByteParser] from a string slice by copying it.
    pub fn for_str(input: &str) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.as_bytes().to_vec()))
    }

    /// Creates a new [ByteParser] from a byte slice by copying it.
    pub fn for_bytes(input: &[u8]) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.to_vec()))
    }
}

impl<S: ByteSource> ByteParser<S> {
    /// Creates a new [ByteParser] from a byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Peeks at the current byte without consuming it.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    /// Skips (consumes) all consecutive whitespace characters.
    ///
    /// Whitespace includes: space, tab, newline, and carriage return.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.next_byte();
            } else {
                break;
            }
        }
    }

    /// Checks if the current byte is exactly `ch`.
    #[inline]
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek() == Some(ch)
    }

    /// Consumes the current byte if it is exactly `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.next_byte();
            true
        } else {
            false
        }
    }

    /// Consumes bytes up to and including the target byte.
    ///
    /// # Returns
    /// `true` if the target was found, `false` if EOF was reached first
    ///
    /// # Example
    /// ```
    /// use nhxtree::parser::ByteParser;
    ///
    /// let mut parser = ByteParser::for_str("A[&&NHX:S=human]:0.1");
    /// assert!(parser.consume_until(b']'));
    /// assert_eq!(parser.peek(), Some(b':'));
    /// assert!(!parser.consume_until(b']'));
    /// ```
    pub fn consume_until(&mut self, target: u8) -> bool {
        while let Some(b) = self.next_byte() {
            if b == target {
                return true;
            }
        }
        false
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Sets the position in the byte stream.
    pub fn set_position(&mut self, pos: usize) {
        self.source.set_position(pos);
    }

    /// Returns the input from `start` to the current position,
    /// or an empty slice if not available.
    pub fn slice_from(&self, start: usize) -> &[u8] {
        self.source.slice_from(start).unwrap_or(&[])
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        String::from_utf8_lossy(self.source.peek_slice(k)).into_owned()
    }

    /// Creates a [ParsingError] of the given kind at the current position.
    pub fn error(&self, kind: ParsingErrorType) -> ParsingError {
        ParsingError::new(kind, self.position(), self.get_context_as_string(DEFAULT_CONTEXT_LENGTH))
    }

    /// Parses a quoted label enclosed in single quotes with escape support.
    ///
    /// Expects the parser at the opening quote. Single quotes within the label
    /// are escaped by doubling them (e.g., `'Wilson''s'` becomes `Wilson's`).
    ///
    /// # Errors
    /// [ParsingErrorType::UnterminatedQuote] (reported at the opening quote)
    /// if the input ends before the closing quote.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        let start = self.position();
        self.next_byte(); // consume opening '

        let mut bytes = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') => {
                    if self.peek() == Some(b'\'') {
                        bytes.push(b'\'');
                        self.next_byte();
                    } else {
                        break;
                    }
                }
                Some(b) => bytes.push(b),
                None => {
                    self.set_position(start);
                    return Err(self.error(ParsingErrorType::UnterminatedQuote));
                }
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Parses an opaque bracket block `[...]`, up to and including the first `]`.
    ///
    /// Expects the parser at the opening `[`. Returns the raw block including
    /// both brackets.
    ///
    /// # Errors
    /// [ParsingErrorType::UnterminatedBlock] (reported at the opening bracket)
    /// if the block runs to the end of the input.
    pub fn parse_bracket_block(&mut self) -> Result<String, ParsingError> {
        let start = self.position();
        if !self.consume_until(b']') {
            self.set_position(start);
            return Err(self.error(ParsingErrorType::UnterminatedBlock));
        }
        Ok(String::from_utf8_lossy(self.slice_from(start)).into_owned())
    }

    /// Parses an unquoted label until any of the given delimiters is encountered.
    ///
    /// Bracket blocks are opaque: delimiters inside `[...]` do not end the label,
    /// so `A[&&NHX:S=human]` is read as a single label. The result is not trimmed.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        let start = self.position();

        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            if b == b'[' {
                self.parse_bracket_block()?;
            } else {
                self.next_byte();
            }
        }

        Ok(String::from_utf8_lossy(self.slice_from(start)).into_owned())
    }
}
