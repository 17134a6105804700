//! Error types for parsing and serialization.
//!
//! Every failure surfaces as one [`Error`] value; the first error aborts the
//! in-progress parse or write with no recovery or resynchronization. Variants
//! carry the byte offset of the offending input or the limit that was hit, so
//! the CLI can print a single descriptive line.

use thiserror::Error;

/// Errors produced while parsing or serializing JSON.
#[derive(Debug, Error)]
pub enum Error {
    /// Structural token mismatch: an unexpected byte where a value, name,
    /// separator, or closing delimiter was required.
    #[error("syntax error at byte {offset}: {reason}")]
    Syntax {
        /// Byte offset of the offending input.
        offset: usize,
        /// What the parser expected or found.
        reason: &'static str,
    },

    /// End of input before the closing quote of a string literal.
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),

    /// End of input before the closing delimiter of an object or array.
    #[error("unterminated {kind} starting at byte {offset}")]
    UnterminatedContainer {
        /// Byte offset of the opening delimiter.
        offset: usize,
        /// Either "object" or "array".
        kind: &'static str,
    },

    /// Malformed numeric literal.
    #[error("malformed number at byte {offset}: {reason}")]
    NumberSyntax {
        /// Byte offset where the number started.
        offset: usize,
        /// What made the literal invalid.
        reason: &'static str,
    },

    /// A `\` followed by an unrecognized escape, or a non-hex digit in `\u`.
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),

    /// The value arena ran out of slots.
    #[error("value storage exhausted ({0} slots)")]
    OutOfSlots(usize),

    /// Nesting exceeded the configured depth limit.
    #[error("nesting depth {0} exceeds limit {1}")]
    TooDeep(u64, u64),

    /// A read from the input or write to the output stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_single_line() {
        let errors = [
            Error::Syntax {
                offset: 3,
                reason: "expected ':'",
            },
            Error::UnterminatedString(0),
            Error::UnterminatedContainer {
                offset: 1,
                kind: "object",
            },
            Error::NumberSyntax {
                offset: 2,
                reason: "no digits",
            },
            Error::InvalidEscape(7),
            Error::OutOfSlots(16),
            Error::TooDeep(33, 32),
        ];
        for e in errors {
            let msg = e.to_string();
            assert!(!msg.is_empty());
            assert!(!msg.contains('\n'), "multi-line message: {msg:?}");
        }
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
