//! Canonical JSON serializer.
//!
//! Walks a parsed tree and writes one deterministic textual form: repeated
//! serialization of equal values is byte-identical. Output is a stream of
//! 8-bit bytes (directly-embeddable code units are written as single bytes),
//! so the sink is `io::Write`, not a UTF-8 string.
//!
//! With `pretty` set, elements and members are placed one per line and
//! indented by a fixed width per nesting level; the canonical compact form
//! uses no whitespace at all. A single trailing newline follows a top-level
//! object.

use std::io::Write;

use crate::arena::Handle;
use crate::codec;
use crate::error::Result;
use crate::parser::Document;
use crate::types::{JsonString, Member, Number, Value};

/// Maximum significant mantissa digits in canonical float output.
pub const FLOAT_PRECISION: usize = 17;

/// Output formatting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Emit newlines and indentation.
    pub pretty: bool,
    /// Spaces added per nesting level when pretty; the CLI accepts 0..=15.
    pub indent_width: u8,
}

impl WriteOptions {
    /// The canonical compact form: no whitespace.
    pub fn compact() -> Self {
        Self::default()
    }

    /// Pretty-printing with the given indent width.
    pub fn pretty(indent_width: u8) -> Self {
        Self {
            pretty: true,
            indent_width,
        }
    }
}

/// Serialize the value at `handle` to `out`.
///
/// Fails only if the sink fails. A trailing newline is emitted when the
/// written value is an object, closing the document.
pub fn write_value<W: Write>(
    doc: &Document,
    handle: Handle,
    out: W,
    options: WriteOptions,
) -> Result<()> {
    let mut writer = Writer {
        doc,
        out,
        options,
        indent: 0,
    };
    writer.write(handle)?;
    if doc.get(handle).is_object() {
        writer.out.write_all(b"\n")?;
    }
    Ok(())
}

/// The compact canonical bytes of a whole document.
pub fn canonicalize(doc: &Document) -> Vec<u8> {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_value(doc, doc.root(), &mut buf, WriteOptions::compact());
    buf
}

struct Writer<'a, W: Write> {
    doc: &'a Document,
    out: W,
    options: WriteOptions,
    indent: usize,
}

impl<W: Write> Writer<'_, W> {
    fn write(&mut self, handle: Handle) -> Result<()> {
        let doc = self.doc;
        match doc.get(handle) {
            // An unpopulated slot has no textual form.
            Value::Absent => Ok(()),
            Value::Basic(basic) => {
                self.out.write_all(basic.keyword().as_bytes())?;
                Ok(())
            }
            Value::Number(number) => self.write_number(*number),
            Value::String(s) => self.write_string(s),
            Value::Array(elements) => self.write_array(elements),
            Value::Object(members) => self.write_object(members),
        }
    }

    fn write_indent(&mut self) -> Result<()> {
        for _ in 0..self.indent {
            self.out.write_all(b" ")?;
        }
        Ok(())
    }

    fn write_array(&mut self, elements: &[Handle]) -> Result<()> {
        self.out.write_all(b"[")?;
        if elements.is_empty() {
            self.out.write_all(b"]")?;
            return Ok(());
        }
        let width = usize::from(self.options.indent_width);
        if self.options.pretty {
            self.indent += width;
            self.out.write_all(b"\n")?;
        }
        for (i, &element) in elements.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
                if self.options.pretty {
                    self.out.write_all(b"\n")?;
                }
            }
            if self.options.pretty {
                self.write_indent()?;
            }
            self.write(element)?;
        }
        if self.options.pretty {
            self.out.write_all(b"\n")?;
            self.indent -= width;
            self.write_indent()?;
        }
        self.out.write_all(b"]")?;
        Ok(())
    }

    fn write_object(&mut self, members: &[Member]) -> Result<()> {
        self.out.write_all(b"{")?;
        if members.is_empty() {
            self.out.write_all(b"}")?;
            return Ok(());
        }
        let width = usize::from(self.options.indent_width);
        if self.options.pretty {
            self.indent += width;
            self.out.write_all(b"\n")?;
        }
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
                if self.options.pretty {
                    self.out.write_all(b"\n")?;
                }
            }
            if self.options.pretty {
                self.write_indent()?;
            }
            self.write_string(&member.name)?;
            self.out.write_all(b":")?;
            if self.options.pretty {
                self.out.write_all(b" ")?;
            }
            self.write(member.value)?;
        }
        if self.options.pretty {
            self.out.write_all(b"\n")?;
            self.indent -= width;
            self.write_indent()?;
        }
        self.out.write_all(b"}")?;
        Ok(())
    }

    fn write_string(&mut self, s: &JsonString) -> Result<()> {
        self.out.write_all(b"\"")?;
        for &unit in s.units() {
            if let Some(letter) = codec::short_escape_for(unit) {
                self.out.write_all(&[b'\\', letter])?;
            } else if codec::is_direct(unit) {
                self.out.write_all(&[unit as u8])?;
            } else {
                self.out.write_all(&codec::unicode_escape(unit))?;
            }
        }
        self.out.write_all(b"\"")?;
        Ok(())
    }

    fn write_number(&mut self, number: Number) -> Result<()> {
        match number {
            Number::Int(v) => {
                self.out.write_all(v.to_string().as_bytes())?;
                Ok(())
            }
            Number::Float(v) => self.write_float(v),
        }
    }

    /// Write the normalized form `0.<digits>e<exponent>` such that
    /// `value == 0.digits * 10^exponent`, with no leading or trailing zero
    /// digits in the mantissa and a multi-digit decimal exponent.
    fn write_float(&mut self, v: f64) -> Result<()> {
        if v == 0.0 {
            self.out.write_all(b"0.0")?;
            return Ok(());
        }
        if v < 0.0 {
            self.out.write_all(b"-")?;
        }
        // Shortest round-trip digits, then shift the decimal point from
        // `d.ddd e n` to `0.dddd e n+1`.
        let formatted = format!("{:e}", v.abs());
        let (mantissa, exp) = match formatted.split_once('e') {
            Some(parts) => parts,
            None => (formatted.as_str(), "0"),
        };
        let exp: i32 = exp.parse().unwrap_or(0);
        let mut digits: String = mantissa.chars().filter(|c| *c != '.').collect();
        digits.truncate(FLOAT_PRECISION);
        while digits.len() > 1 && digits.ends_with('0') {
            digits.pop();
        }
        self.out.write_all(b"0.")?;
        self.out.write_all(digits.as_bytes())?;
        self.out.write_all(b"e")?;
        self.out.write_all((exp + 1).to_string().as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn canon_str(input: &[u8]) -> String {
        let doc = parse(input).unwrap();
        String::from_utf8_lossy(&canonicalize(&doc)).into_owned()
    }

    fn pretty_str(input: &[u8], width: u8) -> String {
        let doc = parse(input).unwrap();
        let mut buf = Vec::new();
        write_value(&doc, doc.root(), &mut buf, WriteOptions::pretty(width)).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_basics() {
        assert_eq!(canon_str(b"null"), "null");
        assert_eq!(canon_str(b"true"), "true");
        assert_eq!(canon_str(b"false"), "false");
    }

    #[test]
    fn test_integers() {
        assert_eq!(canon_str(b"0"), "0");
        assert_eq!(canon_str(b"42"), "42");
        assert_eq!(canon_str(b"-123"), "-123");
        assert_eq!(canon_str(b"-0"), "0");
        assert_eq!(canon_str(b"9223372036854775807"), "9223372036854775807");
    }

    #[test]
    fn test_floats_normalized() {
        assert_eq!(canon_str(b"-0.5e+1"), "-0.5e1");
        assert_eq!(canon_str(b"12.5"), "0.125e2");
        assert_eq!(canon_str(b"0.05"), "0.5e-1");
        assert_eq!(canon_str(b"1e2"), "0.1e3");
        assert_eq!(canon_str(b"100.0"), "0.1e3");
        assert_eq!(canon_str(b"0.0"), "0.0");
        assert_eq!(canon_str(b"-0.0"), "0.0");
        assert_eq!(canon_str(b"0.5"), "0.5e0");
    }

    #[test]
    fn test_float_multi_digit_exponent() {
        assert_eq!(canon_str(b"1e100"), "0.1e101");
        assert_eq!(canon_str(b"1e-100"), "0.1e-99");
    }

    #[test]
    fn test_float_and_integer_forms_stay_distinct() {
        assert_ne!(canon_str(b"100"), canon_str(b"100.0"));
    }

    #[test]
    fn test_strings() {
        assert_eq!(canon_str(br#""hello""#), r#""hello""#);
        assert_eq!(canon_str(b"\"a\\nb\""), "\"a\\nb\"");
        assert_eq!(canon_str(br#""q\"q""#), r#""q\"q""#);
        assert_eq!(canon_str(br#""s\\s""#), r#""s\\s""#);
    }

    #[test]
    fn test_string_escape_normalization() {
        // \u0041 is a directly-embeddable unit and comes back verbatim.
        assert_eq!(canon_str(br#""\u0041""#), r#""A""#);
        // Control characters take their short escapes over \u forms.
        assert_eq!(canon_str(br#""\u0009""#), "\"\\t\"");
        // Other controls keep the \u form, lowercase and zero-padded.
        assert_eq!(canon_str(br#""\u001F""#), r#""\u001f""#);
        // 0xff is not directly embeddable in either direction.
        assert_eq!(canon_str(br#""\u00FF""#), r#""\u00ff""#);
        assert_eq!(canon_str(br#""\uBEEF""#), r#""\ubeef""#);
    }

    #[test]
    fn test_high_bytes_written_verbatim() {
        let doc = parse(b"\"\xFE\"").unwrap();
        assert_eq!(canonicalize(&doc), b"\"\xFE\"");
    }

    #[test]
    fn test_arrays_compact() {
        assert_eq!(canon_str(b"[]"), "[]");
        assert_eq!(canon_str(b"[1,2,3]"), "[1,2,3]");
        assert_eq!(canon_str(b"[ 1 , [ 2 ] , 3 ]"), "[1,[2],3]");
    }

    #[test]
    fn test_objects_compact() {
        assert_eq!(canon_str(b"{}"), "{}\n");
        assert_eq!(canon_str(br#"{"a": 1, "b": 2}"#), "{\"a\":1,\"b\":2}\n");
        // Nested objects get no interior newline.
        assert_eq!(canon_str(br#"{"a": {"b": 1}}"#), "{\"a\":{\"b\":1}}\n");
        assert_eq!(canon_str(br#"[{"a": 1}]"#), "[{\"a\":1}]");
    }

    #[test]
    fn test_member_order_and_duplicates_preserved() {
        assert_eq!(canon_str(br#"{"b":2,"a":1}"#), "{\"b\":2,\"a\":1}\n");
        assert_eq!(canon_str(br#"{"a":1,"a":2}"#), "{\"a\":1,\"a\":2}\n");
    }

    #[test]
    fn test_pretty_array() {
        assert_eq!(pretty_str(b"[1,2,3]", 2), "[\n  1,\n  2,\n  3\n]");
        assert_eq!(pretty_str(b"[]", 2), "[]");
    }

    #[test]
    fn test_pretty_nested_array() {
        assert_eq!(
            pretty_str(b"[1,[2,3]]", 2),
            "[\n  1,\n  [\n    2,\n    3\n  ]\n]"
        );
    }

    #[test]
    fn test_pretty_object() {
        assert_eq!(
            pretty_str(br#"{"a":1,"b":2}"#, 2),
            "{\n  \"a\": 1,\n  \"b\": 2\n}\n"
        );
        assert_eq!(pretty_str(b"{}", 2), "{}\n");
    }

    #[test]
    fn test_pretty_zero_width() {
        assert_eq!(pretty_str(b"[1,2]", 0), "[\n1,\n2\n]");
    }

    #[test]
    fn test_empty_member_name_serializes() {
        assert_eq!(canon_str(br#"{"":1}"#), "{\"\":1}\n");
    }

    #[test]
    fn test_lone_surrogate_round_trips() {
        assert_eq!(canon_str(br#""\ud800""#), r#""\ud800""#);
    }
}
