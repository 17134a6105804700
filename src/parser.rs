//! Recursive-descent JSON parser.
//!
//! The parser walks a byte slice with a one-byte cursor and builds the value
//! tree in an arena sized from [`Limits`]. A composite's slot is claimed
//! before its children are read, so parents always precede children in
//! allocation order. The first error aborts the parse.
//!
//! String reading has two explicit entry points — [`Parser::parse_value`]
//! reaches string values through one path, object member names through
//! another — rather than a shared mode flag. Number reading is a single
//! forward pass that leaves the terminating delimiter unconsumed for the
//! enclosing loop.

use crate::arena::{Arena, Handle};
use crate::codec;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::types::{Basic, JsonString, Member, Number, Value};

/// A parsed document: the arena holding every value plus the root handle.
#[derive(Debug)]
pub struct Document {
    arena: Arena,
    root: Handle,
}

impl Document {
    /// Handle of the document's root value.
    pub fn root(&self) -> Handle {
        self.root
    }

    /// The arena holding the document's values.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Look up a value by handle.
    pub fn get(&self, handle: Handle) -> &Value {
        self.arena.get(handle)
    }
}

/// Parse one JSON document with [`Limits::standard`].
pub fn parse(input: &[u8]) -> Result<Document> {
    parse_with_limits(input, Limits::standard())
}

/// Parse one JSON document with explicit limits.
pub fn parse_with_limits(input: &[u8], limits: Limits) -> Result<Document> {
    let mut parser = Parser::new(input, limits);
    let root = parser.parse_document()?;
    Ok(Document {
        arena: parser.arena,
        root,
    })
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    arena: Arena,
    limits: Limits,
    depth: u64,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8], limits: Limits) -> Self {
        Self {
            input,
            pos: 0,
            arena: Arena::with_capacity(limits.max_values),
            limits,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn syntax(&self, reason: &'static str) -> Error {
        Error::Syntax {
            offset: self.pos,
            reason,
        }
    }

    /// Bump the nesting depth on entry to a container.
    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_nesting_depth {
            return Err(Error::TooDeep(self.depth, self.limits.max_nesting_depth));
        }
        Ok(())
    }

    /// Parse the root value and require that only whitespace follows it.
    fn parse_document(&mut self) -> Result<Handle> {
        let root = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.syntax("trailing content after value"));
        }
        Ok(root)
    }

    /// Parse a single value, dispatching on its first byte.
    fn parse_value(&mut self) -> Result<Handle> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.syntax("unexpected end of input")),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string_value(),
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number(),
            Some(b't') => self.parse_literal("true", Basic::True),
            Some(b'f') => self.parse_literal("false", Basic::False),
            Some(b'n') => self.parse_literal("null", Basic::Null),
            Some(_) => Err(self.syntax("expected a value")),
        }
    }

    /// Match a keyword byte-for-byte.
    fn parse_literal(&mut self, keyword: &'static str, basic: Basic) -> Result<Handle> {
        for &expected in keyword.as_bytes() {
            if self.advance() != Some(expected) {
                return Err(Error::Syntax {
                    offset: self.pos.saturating_sub(1),
                    reason: "invalid literal",
                });
            }
        }
        let handle = self.arena.allocate_next()?;
        *self.arena.get_mut(handle) = Value::Basic(basic);
        Ok(handle)
    }

    fn parse_object(&mut self) -> Result<Handle> {
        let open = self.pos;
        self.enter()?;
        self.advance();

        // Claim the object's slot before reading children.
        let handle = self.arena.allocate_next()?;
        *self.arena.get_mut(handle) = Value::Object(Vec::new());

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.advance();
            self.depth -= 1;
            return Ok(handle);
        }

        let mut members = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(Error::UnterminatedContainer {
                        offset: open,
                        kind: "object",
                    })
                }
                Some(b'"') => {}
                Some(_) => return Err(self.syntax("expected member name")),
            }
            let name = self.parse_member_name()?;

            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(Error::UnterminatedContainer {
                        offset: open,
                        kind: "object",
                    })
                }
                Some(b':') => {
                    self.advance();
                }
                Some(_) => return Err(self.syntax("expected ':' after member name")),
            }

            let value = self.parse_value()?;
            members.push(Member { name, value });

            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(Error::UnterminatedContainer {
                        offset: open,
                        kind: "object",
                    })
                }
                Some(b',') => {
                    self.advance();
                }
                Some(b'}') => {
                    self.advance();
                    break;
                }
                Some(_) => return Err(self.syntax("expected ',' or '}'")),
            }
        }

        *self.arena.get_mut(handle) = Value::Object(members);
        self.depth -= 1;
        Ok(handle)
    }

    fn parse_array(&mut self) -> Result<Handle> {
        let open = self.pos;
        self.enter()?;
        self.advance();

        let handle = self.arena.allocate_next()?;
        *self.arena.get_mut(handle) = Value::Array(Vec::new());

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.advance();
            self.depth -= 1;
            return Ok(handle);
        }

        let mut elements = Vec::new();
        loop {
            let element = self.parse_value()?;
            elements.push(element);

            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(Error::UnterminatedContainer {
                        offset: open,
                        kind: "array",
                    })
                }
                Some(b',') => {
                    self.advance();
                    // A trailing comma leaves the next dispatch staring at ']'.
                    self.skip_whitespace();
                    if self.peek() == Some(b']') {
                        return Err(self.syntax("expected a value"));
                    }
                }
                Some(b']') => {
                    self.advance();
                    break;
                }
                Some(_) => return Err(self.syntax("expected ',' or ']'")),
            }
        }

        *self.arena.get_mut(handle) = Value::Array(elements);
        self.depth -= 1;
        Ok(handle)
    }

    /// Parse a string literal appearing in value position.
    fn parse_string_value(&mut self) -> Result<Handle> {
        let s = self.scan_string()?;
        let handle = self.arena.allocate_next()?;
        *self.arena.get_mut(handle) = Value::String(s);
        Ok(handle)
    }

    /// Parse a string literal appearing as an object member name.
    ///
    /// Names are not values: they occupy no arena slot and may be empty.
    fn parse_member_name(&mut self) -> Result<JsonString> {
        self.scan_string()
    }

    /// Scan a quoted string. The cursor is on the opening quote.
    fn scan_string(&mut self) -> Result<JsonString> {
        let open = self.pos;
        self.advance();
        let mut s = JsonString::new();
        loop {
            let b = match self.advance() {
                None => return Err(Error::UnterminatedString(open)),
                Some(b) => b,
            };
            match b {
                b'"' => return Ok(s),
                b'\\' => {
                    let unit = self.scan_escape(open)?;
                    s.push(unit);
                }
                // Directly-embeddable bytes; 0x1F and below and 0xFF must
                // travel as escapes.
                0x20..=0xFE => s.push(u16::from(b)),
                _ => {
                    return Err(Error::Syntax {
                        offset: self.pos - 1,
                        reason: "unescaped byte outside 0x20..=0xfe in string",
                    })
                }
            }
        }
    }

    /// Decode one escape. The cursor is just past the backslash.
    fn scan_escape(&mut self, open: usize) -> Result<u16> {
        let escape_pos = self.pos - 1;
        let b = match self.advance() {
            None => return Err(Error::UnterminatedString(open)),
            Some(b) => b,
        };
        if let Some(unit) = codec::decode_short_escape(b) {
            return Ok(unit);
        }
        if b != b'u' {
            return Err(Error::InvalidEscape(escape_pos));
        }
        // Exactly four hex digits, combined big-endian into one 16-bit unit.
        // Surrogate halves pass through uncombined.
        let mut unit: u16 = 0;
        for _ in 0..4 {
            let h = match self.advance() {
                None => return Err(Error::UnterminatedString(open)),
                Some(h) => h,
            };
            let nibble = match codec::decode_hex_nibble(h) {
                None => return Err(Error::InvalidEscape(escape_pos)),
                Some(n) => n,
            };
            unit = (unit << 4) | u16::from(nibble);
        }
        Ok(unit)
    }

    /// Scan a numeric literal in a single forward pass.
    ///
    /// The scan validates the grammar and accumulates the exact integer
    /// magnitude; literals with a fraction or exponent keep only the
    /// floating form, converted from the scanned text so the result is
    /// correctly rounded. The terminating byte is left unconsumed.
    fn parse_number(&mut self) -> Result<Handle> {
        let start = self.pos;
        let number_error = |reason: &'static str| Error::NumberSyntax {
            offset: start,
            reason,
        };

        let mut negative = false;
        if self.peek() == Some(b'-') {
            self.advance();
            negative = true;
        }

        let mut int_mag: u64 = 0;
        let mut int_overflow = false;
        let mut int_digits = 0u32;
        let mut first_is_zero = false;
        while let Some(d) = self.peek().and_then(codec::digit_value) {
            self.advance();
            if int_digits == 1 && first_is_zero {
                return Err(number_error("leading zero"));
            }
            if int_digits == 0 && d == 0 {
                first_is_zero = true;
            }
            int_digits += 1;
            if !int_overflow {
                match int_mag
                    .checked_mul(10)
                    .and_then(|m| m.checked_add(u64::from(d)))
                {
                    Some(m) => int_mag = m,
                    None => int_overflow = true,
                }
            }
        }
        if int_digits == 0 {
            return Err(number_error("no digits"));
        }

        let mut has_fraction = false;
        if self.peek() == Some(b'.') {
            self.advance();
            has_fraction = true;
            let mut fraction_digits = 0u32;
            while self.peek().and_then(codec::digit_value).is_some() {
                self.advance();
                fraction_digits += 1;
            }
            if fraction_digits == 0 {
                return Err(number_error("fraction with no digits"));
            }
        }

        let mut has_exponent = false;
        if let Some(b'e' | b'E') = self.peek() {
            self.advance();
            has_exponent = true;
            if let Some(b'+' | b'-') = self.peek() {
                self.advance();
            }
            let mut exp_digits = 0u32;
            while self.peek().and_then(codec::digit_value).is_some() {
                self.advance();
                exp_digits += 1;
            }
            if exp_digits == 0 {
                return Err(number_error("exponent with no digits"));
            }
        }

        let number = if !has_fraction && !has_exponent && !int_overflow {
            match exact_int(negative, int_mag) {
                Some(n) => Number::Int(n),
                None => Number::Float(self.float_value(start)?),
            }
        } else {
            Number::Float(self.float_value(start)?)
        };

        let handle = self.arena.allocate_next()?;
        *self.arena.get_mut(handle) = Value::Number(number);
        Ok(handle)
    }

    /// The floating value of the literal scanned from `start` to the cursor.
    ///
    /// The grammar is a subset of what `f64::from_str` accepts, and the
    /// conversion is correctly rounded, which keeps the canonical text of a
    /// float unique. A magnitude beyond f64 range is an error rather than an
    /// infinity the serializer could not represent.
    fn float_value(&self, start: usize) -> Result<f64> {
        let text = &self.input[start..self.pos];
        let value = std::str::from_utf8(text)
            .ok()
            .and_then(|t| t.parse::<f64>().ok())
            .ok_or(Error::NumberSyntax {
                offset: start,
                reason: "unrepresentable value",
            })?;
        if !value.is_finite() {
            return Err(Error::NumberSyntax {
                offset: start,
                reason: "value out of range",
            });
        }
        Ok(value)
    }
}

/// Apply a sign to a u64 magnitude, if the result fits in i64.
fn exact_int(negative: bool, mag: u64) -> Option<i64> {
    if negative {
        if mag <= i64::MAX as u64 + 1 {
            Some((mag as i64).wrapping_neg())
        } else {
            None
        }
    } else {
        i64::try_from(mag).ok()
    }
}
