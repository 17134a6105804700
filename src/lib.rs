//! Canonical JSON parsing and serialization.
//!
//! This crate parses a single JSON document into an arena-backed value tree
//! and re-serializes it in one deterministic textual form, so that repeated
//! serialization of equal values is byte-identical. An optional pretty mode
//! indents the output without changing what it means.
//!
//! # Architecture
//!
//! - [`types`] - the value model: tagged values, numbers, 16-bit-unit strings
//! - [`arena`] - bump-allocated value storage addressed by handles
//! - [`limits`] - explicit resource limits for one parse
//! - [`codec`] - escape and digit conversions shared by reader and writer
//! - [`parser`] - recursive-descent parser producing a [`Document`]
//! - [`canon`] - the canonical serializer and its formatting options
//! - [`error`] - error types
//!
//! # Example
//!
//! ```
//! use jcanon::{canonicalize, parse};
//!
//! let doc = parse(b"{ \"b\" : 2.50, \"a\" : 1 }").unwrap();
//! assert_eq!(canonicalize(&doc), b"{\"b\":0.25e1,\"a\":1}\n");
//! ```

// Library code propagates errors; nothing here may panic on malformed input.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod arena;
pub mod canon;
pub mod codec;
pub mod error;
pub mod limits;
pub mod parser;
pub mod types;

pub use arena::{Arena, Handle};
pub use canon::{canonicalize, write_value, WriteOptions};
pub use error::{Error, Result};
pub use limits::Limits;
pub use parser::{parse, parse_with_limits, Document};
pub use types::{Basic, JsonString, Member, Number, Value};

use std::io::Write;

/// What a run does with the parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Parse and discard; success is the only output.
    Parse,
    /// Parse and write the canonical form.
    ParseAndCanonicalize,
    /// Parse for validity; never writes.
    ValidateOnly,
}

/// One run's configuration, as derived from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// What to do with the parsed document.
    pub mode: Mode,
    /// Formatting for `ParseAndCanonicalize`.
    pub write: WriteOptions,
}

/// Parse `input` and, in canonicalize mode, write its canonical form to
/// `out`. The first error aborts the run.
pub fn run<W: Write>(input: &[u8], out: W, config: &Config) -> Result<()> {
    let doc = parse(input)?;
    match config.mode {
        Mode::Parse | Mode::ValidateOnly => Ok(()),
        Mode::ParseAndCanonicalize => write_value(&doc, doc.root(), out, config.write),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_validate_writes_nothing() {
        let mut out = Vec::new();
        let config = Config {
            mode: Mode::ValidateOnly,
            write: WriteOptions::compact(),
        };
        run(b"[1,2,3]", &mut out, &config).unwrap();
        assert!(out.is_empty());

        assert!(run(b"[1,2,", &mut out, &config).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_canonicalize() {
        let mut out = Vec::new();
        let config = Config {
            mode: Mode::ParseAndCanonicalize,
            write: WriteOptions::compact(),
        };
        run(b" [ 1 , 2 ] ", &mut out, &config).unwrap();
        assert_eq!(out, b"[1,2]");
    }

    #[test]
    fn test_run_pretty() {
        let mut out = Vec::new();
        let config = Config {
            mode: Mode::ParseAndCanonicalize,
            write: WriteOptions::pretty(2),
        };
        run(b"[1,2,3]", &mut out, &config).unwrap();
        assert_eq!(out, b"[\n  1,\n  2,\n  3\n]");
    }
}
