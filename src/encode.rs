//! jsonb encoding: JSON text → bytes.
//!
//! A single left-to-right pass over the input, driven by the context on top
//! of a [`ContextStack`]. No recursion is involved, so nesting depth is bounded
//! only by memory (or by the configured depth limit).

use bytes::{BufMut, Bytes, BytesMut};

use crate::context::{ContextKind, ContextStack};
use crate::error::JsonbError;
use crate::format::tag;

/// Encodes a JSON document into jsonb.
pub fn encode(text: &str) -> Result<Bytes, JsonbError> {
    encode_with_limit(text, None)
}

pub(crate) fn encode_with_limit(text: &str, max_depth: Option<usize>) -> Result<Bytes, JsonbError> {
    Encoder::new(text, max_depth)?.run()
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

struct Encoder<'a> {
    text: &'a str,
    input: &'a [u8],
    out: BytesMut,
    stack: ContextStack,
}

impl<'a> Encoder<'a> {
    fn new(text: &'a str, max_depth: Option<usize>) -> Result<Self, JsonbError> {
        Ok(Self {
            text,
            input: text.as_bytes(),
            out: BytesMut::with_capacity(text.len()),
            stack: ContextStack::for_document(max_depth)?,
        })
    }

    fn run(mut self) -> Result<Bytes, JsonbError> {
        let mut i = 0;
        while i < self.input.len() {
            let c = self.input[i];
            let Some(op) = self.stack.top().copied() else {
                if is_whitespace(c) {
                    i += 1;
                    continue;
                }
                return Err(JsonbError::ExcessiveInput { offset: i });
            };

            // Each step returns the next offset to process. Returning `i`
            // unchanged reprocesses the byte in the new top context.
            i = match op.kind {
                ContextKind::Literal => self.literal(i, c)?,
                ContextKind::String => self.string(i, c, op.start)?,
                ContextKind::Number => self.number(i, c, op.start)?,
                ContextKind::Array => self.array(i, c)?,
                ContextKind::Object => self.object(i, c)?,
                ContextKind::Key => self.key(i, c)?,
                ContextKind::KeyValueSeparator => self.key_value_separator(i, c)?,
            };
        }
        self.finish()
    }

    fn finish(mut self) -> Result<Bytes, JsonbError> {
        // A number is only closed by the byte after it, so one still pending
        // at end of input is complete.
        if let Some(op) = self.stack.top().copied() {
            if op.kind == ContextKind::Number {
                self.flush_number(op.start, self.input.len())?;
            }
        }
        if let Some(op) = self.stack.top() {
            return Err(op.unterminated());
        }

        tracing::trace!(
            input_len = self.input.len(),
            output_len = self.out.len(),
            "encoded jsonb document"
        );
        Ok(self.out.freeze())
    }

    fn literal(&mut self, i: usize, c: u8) -> Result<usize, JsonbError> {
        match c {
            _ if is_whitespace(c) => Ok(i + 1),
            b'f' => self.keyword(i, "false", tag::FALSE),
            b't' => self.keyword(i, "true", tag::TRUE),
            b'n' => self.keyword(i, "null", tag::NULL),
            b'"' => {
                self.out.put_u8(tag::STRING);
                self.transition(ContextKind::String, i);
                Ok(i + 1)
            }
            b'[' => {
                self.out.put_u8(tag::ARRAY);
                self.transition(ContextKind::Array, i);
                self.stack.push(ContextKind::Literal, i + 1)?;
                Ok(i + 1)
            }
            b'{' => {
                self.out.put_u8(tag::OBJECT);
                self.transition(ContextKind::Object, i);
                self.stack.push(ContextKind::Key, i + 1)?;
                Ok(i + 1)
            }
            // Empty array: the element context opened by '[' is closed along
            // with the array itself.
            b']' if self.stack.parent_kind() == Some(ContextKind::Array) => {
                self.out.put_u8(tag::TERMINATOR);
                self.stack.pop_n(2);
                Ok(i + 1)
            }
            b'-' | b'0'..=b'9' => {
                self.transition(ContextKind::Number, i);
                Ok(i + 1)
            }
            _ => Err(self.syntax(i, "a value")),
        }
    }

    fn keyword(&mut self, i: usize, keyword: &'static str, tag: u8) -> Result<usize, JsonbError> {
        let end = i + keyword.len();
        match self.input.get(i..end) {
            Some(found) if found == keyword.as_bytes() => {
                self.out.put_u8(tag);
                self.stack.pop();
                Ok(end)
            }
            _ => Err(JsonbError::MalformedKeyword {
                keyword,
                found: self.text[i..].chars().take(keyword.len()).collect(),
                offset: i,
            }),
        }
    }

    fn string(&mut self, i: usize, c: u8, start: usize) -> Result<usize, JsonbError> {
        match c {
            0x00 => Err(JsonbError::NullByteInString { offset: i }),
            // Escapes are copied verbatim; the escaped byte never closes the string.
            b'\\' => match self.input.get(i + 1) {
                Some(0x00) => Err(JsonbError::NullByteInString { offset: i + 1 }),
                _ => Ok(i + 2),
            },
            b'"' => {
                self.out.put_slice(&self.input[start + 1..i]);
                self.out.put_u8(tag::TERMINATOR);
                self.stack.pop();
                Ok(i + 1)
            }
            _ => Ok(i + 1),
        }
    }

    fn number(&mut self, i: usize, c: u8, start: usize) -> Result<usize, JsonbError> {
        if c.is_ascii_digit() || c == b'.' {
            return Ok(i + 1);
        }
        self.flush_number(start, i)?;
        Ok(i)
    }

    fn flush_number(&mut self, start: usize, end: usize) -> Result<(), JsonbError> {
        let text = &self.text[start..end];
        let invalid = || JsonbError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        };
        let value: f64 = text.parse().map_err(|_| invalid())?;
        // Digit runs beyond the double range parse as infinity.
        if !value.is_finite() {
            return Err(invalid());
        }
        self.out.put_u8(tag::NUMBER);
        self.out.put_f64(value);
        self.stack.pop();
        Ok(())
    }

    fn array(&mut self, i: usize, c: u8) -> Result<usize, JsonbError> {
        match c {
            _ if is_whitespace(c) => Ok(i + 1),
            b']' => {
                self.out.put_u8(tag::TERMINATOR);
                self.stack.pop();
                Ok(i + 1)
            }
            b',' => {
                self.stack.push(ContextKind::Literal, i + 1)?;
                Ok(i + 1)
            }
            _ => Err(self.syntax(i, "',' or ']'")),
        }
    }

    fn object(&mut self, i: usize, c: u8) -> Result<usize, JsonbError> {
        match c {
            _ if is_whitespace(c) => Ok(i + 1),
            b'}' => {
                self.out.put_u8(tag::TERMINATOR);
                self.stack.pop();
                Ok(i + 1)
            }
            b',' => {
                self.stack.push(ContextKind::Key, i + 1)?;
                Ok(i + 1)
            }
            _ => Err(self.syntax(i, "',' or '}'")),
        }
    }

    fn key(&mut self, i: usize, c: u8) -> Result<usize, JsonbError> {
        match c {
            _ if is_whitespace(c) => Ok(i + 1),
            b'}' => {
                self.out.put_u8(tag::TERMINATOR);
                self.stack.pop_n(2);
                Ok(i + 1)
            }
            b'"' => {
                self.out.put_u8(tag::STRING);
                self.transition(ContextKind::KeyValueSeparator, i);
                self.stack.push(ContextKind::String, i)?;
                Ok(i + 1)
            }
            _ => Err(self.syntax(i, "a string key or '}'")),
        }
    }

    fn key_value_separator(&mut self, i: usize, c: u8) -> Result<usize, JsonbError> {
        match c {
            _ if is_whitespace(c) => Ok(i + 1),
            b':' => {
                self.transition(ContextKind::Literal, i + 1);
                Ok(i + 1)
            }
            _ => Err(self.syntax(i, "':'")),
        }
    }

    fn transition(&mut self, kind: ContextKind, start: usize) {
        if let Some(op) = self.stack.top_mut() {
            op.transition(kind, start);
        }
    }

    fn syntax(&self, offset: usize, expected: &'static str) -> JsonbError {
        let found = self
            .text
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        tracing::debug!(offset, ?found, expected, "rejected JSON text");
        JsonbError::Syntax {
            offset,
            found,
            expected,
        }
    }
}
