//! jsonb decoding: bytes → JSON text.
//!
//! The mirror image of the encoder: one tag byte at a time, driven by the
//! context on top of a [`ContextStack`]. Containers do not consume the first
//! byte of their first element, so separators are inserted by the container
//! context right before it hands each following element to a fresh child.

use bytes::Buf;

use crate::context::{ContextKind, ContextStack};
use crate::error::JsonbError;
use crate::format::tag::{self, Tag};

/// Decodes a jsonb document into JSON text.
pub fn decode(bytes: &[u8]) -> Result<String, JsonbError> {
    decode_with_limit(bytes, None)
}

pub(crate) fn decode_with_limit(bytes: &[u8], max_depth: Option<usize>) -> Result<String, JsonbError> {
    Decoder::new(bytes, max_depth)?.run()
}

struct Decoder<'a> {
    input: &'a [u8],
    out: String,
    stack: ContextStack,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8], max_depth: Option<usize>) -> Result<Self, JsonbError> {
        Ok(Self {
            input,
            out: String::with_capacity(input.len() * 2),
            stack: ContextStack::for_document(max_depth)?,
        })
    }

    fn run(mut self) -> Result<String, JsonbError> {
        let mut i = 0;
        while i < self.input.len() {
            let c = self.input[i];
            let Some(op) = self.stack.top().copied() else {
                return Err(JsonbError::ExcessiveInput { offset: i });
            };

            i = match op.kind {
                ContextKind::Literal => self.literal(i, c)?,
                ContextKind::String => self.string(i, c, op.start)?,
                ContextKind::Array => self.element(i, ContextKind::Literal)?,
                ContextKind::Object => self.element(i, ContextKind::Key)?,
                ContextKind::Key => self.key(i, c)?,
                ContextKind::KeyValueSeparator => {
                    self.out.push(':');
                    self.transition(ContextKind::Literal, i);
                    i
                }
                // Number payloads are consumed whole by the literal step.
                ContextKind::Number => return Err(op.unterminated()),
            };
        }

        if let Some(op) = self.stack.top() {
            return Err(op.unterminated());
        }

        tracing::trace!(
            input_len = self.input.len(),
            output_len = self.out.len(),
            "decoded jsonb document"
        );
        Ok(self.out)
    }

    fn literal(&mut self, i: usize, c: u8) -> Result<usize, JsonbError> {
        match Tag::from_byte(c) {
            Some(Tag::String) => {
                self.transition(ContextKind::String, i + 1);
                Ok(i + 1)
            }
            Some(keyword @ (Tag::False | Tag::Null | Tag::True)) => {
                self.out.push_str(keyword.name());
                self.stack.pop();
                Ok(i + 1)
            }
            Some(Tag::Number) => {
                let value = self.number_payload(i)?;
                self.out.push_str(&value.to_string());
                self.stack.pop();
                Ok(i + 1 + tag::NUMBER_PAYLOAD_LEN)
            }
            Some(Tag::Array) => {
                self.out.push('[');
                self.transition(ContextKind::Array, i);
                self.stack.push(ContextKind::Literal, i + 1)?;
                Ok(i + 1)
            }
            Some(Tag::Object) => {
                self.out.push('{');
                self.transition(ContextKind::Object, i);
                self.stack.push(ContextKind::Key, i + 1)?;
                Ok(i + 1)
            }
            None if c == tag::TERMINATOR
                && self.stack.parent_kind() == Some(ContextKind::Array) =>
            {
                self.close_container(']');
                Ok(i + 1)
            }
            None => {
                tracing::debug!(byte = c, offset = i, "rejected jsonb input");
                Err(JsonbError::UnknownTag { byte: c, offset: i })
            }
        }
    }

    fn number_payload(&self, i: usize) -> Result<f64, JsonbError> {
        let start = i + 1;
        let end = start + tag::NUMBER_PAYLOAD_LEN;
        let Some(mut payload) = self.input.get(start..end) else {
            return Err(JsonbError::TruncatedPayload {
                offset: start,
                needed: tag::NUMBER_PAYLOAD_LEN,
                remaining: self.input.len().saturating_sub(start),
            });
        };
        let value = payload.get_f64();
        if !value.is_finite() {
            return Err(JsonbError::NonFiniteNumber { offset: i });
        }
        Ok(value)
    }

    fn string(&mut self, i: usize, c: u8, start: usize) -> Result<usize, JsonbError> {
        if c == tag::TERMINATOR {
            let text = std::str::from_utf8(&self.input[start..i]).map_err(|e| {
                JsonbError::InvalidUtf8 {
                    offset: start + e.valid_up_to(),
                }
            })?;
            self.out.push('"');
            self.out.push_str(text);
            self.out.push('"');
            self.stack.pop();
        }
        Ok(i + 1)
    }

    /// Separates the next array element or object member from the previous
    /// one and reprocesses the current byte in a fresh child context.
    fn element(&mut self, i: usize, child: ContextKind) -> Result<usize, JsonbError> {
        self.out.push(',');
        self.stack.push(child, i)?;
        Ok(i)
    }

    fn key(&mut self, i: usize, c: u8) -> Result<usize, JsonbError> {
        match c {
            tag::TERMINATOR => {
                self.close_container('}');
                Ok(i + 1)
            }
            tag::STRING => {
                self.transition(ContextKind::KeyValueSeparator, i);
                self.stack.push(ContextKind::String, i + 1)?;
                Ok(i + 1)
            }
            _ => Err(JsonbError::UnexpectedTag {
                byte: c,
                offset: i,
                expected: "string key or object terminator",
            }),
        }
    }

    /// Closes a container from inside its child context, dropping the
    /// separator written for an element that never came.
    fn close_container(&mut self, close: char) {
        if self.out.ends_with(',') {
            self.out.pop();
        }
        self.out.push(close);
        self.stack.pop_n(2);
    }

    fn transition(&mut self, kind: ContextKind, start: usize) {
        if let Some(op) = self.stack.top_mut() {
            op.transition(kind, start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    fn number(value: f64) -> Vec<u8> {
        let mut bytes = vec![tag::NUMBER];
        bytes.extend_from_slice(&value.to_bits().to_be_bytes());
        bytes
    }

    #[test]
    fn decode_keywords() {
        assert_eq!(decode(&[tag::NULL]).unwrap(), "null");
        assert_eq!(decode(&[tag::TRUE]).unwrap(), "true");
        assert_eq!(decode(&[tag::FALSE]).unwrap(), "false");
    }

    #[test]
    fn decode_numbers_in_shortest_form() {
        assert_eq!(decode(&number(123.0)).unwrap(), "123");
        assert_eq!(decode(&number(-0.5)).unwrap(), "-0.5");
        assert_eq!(decode(&number(0.1)).unwrap(), "0.1");
        assert_eq!(decode(&number(-0.0)).unwrap(), "-0");
        assert_eq!(decode(&number(1e21)).unwrap(), "1000000000000000000000");
    }

    #[test]
    fn decode_string() {
        assert_eq!(decode(b"\x07abc\x00").unwrap(), "\"abc\"");
        assert_eq!(decode(b"\x07\x00").unwrap(), "\"\"");
        assert_eq!(decode("\x07日本\x00".as_bytes()).unwrap(), "\"日本\"");
    }

    #[test]
    fn decode_array() {
        let mut bytes = vec![tag::ARRAY];
        bytes.extend(number(1.0));
        bytes.extend(number(2.0));
        bytes.push(tag::TERMINATOR);
        assert_eq!(decode(&bytes).unwrap(), "[1,2]");
    }

    #[test]
    fn decode_object() {
        let mut bytes = vec![tag::OBJECT, tag::STRING, b'a', tag::TERMINATOR];
        bytes.extend(number(1.0));
        bytes.extend_from_slice(b"\x07b\x00\x05\x03\x02\x00");
        bytes.push(tag::TERMINATOR);
        assert_eq!(decode(&bytes).unwrap(), r#"{"a":1,"b":[true,null]}"#);
    }

    #[test]
    fn decode_empty_containers() {
        assert_eq!(decode(&[tag::ARRAY, tag::TERMINATOR]).unwrap(), "[]");
        assert_eq!(decode(&[tag::OBJECT, tag::TERMINATOR]).unwrap(), "{}");
        assert_eq!(
            decode(b"\x05\x05\x00\x04\x00\x00").unwrap(),
            "[[],{}]"
        );
    }

    #[test]
    fn decode_strings_ending_in_comma() {
        assert_eq!(decode(b"\x05\x07a,\x00\x00").unwrap(), r#"["a,"]"#);
        assert_eq!(decode(b"\x04\x07k\x00\x07,\x00\x00").unwrap(), r#"{"k":","}"#);
    }

    #[test]
    fn decode_encoded_document() {
        let text = r#"{"k":[true,{"n":null},"s",-12.25],"e":{},"f":false}"#;
        assert_eq!(decode(&encode(text).unwrap()).unwrap(), text);
    }

    #[test]
    fn reject_unknown_tag() {
        assert!(matches!(
            decode(&[0x08]).unwrap_err(),
            JsonbError::UnknownTag { byte: 0x08, offset: 0 }
        ));
        assert!(matches!(
            decode(&[tag::TERMINATOR]).unwrap_err(),
            JsonbError::UnknownTag { byte: 0x00, offset: 0 }
        ));
        assert!(matches!(
            decode(b"\x04\x07a\x00\xFF\x00").unwrap_err(),
            JsonbError::UnknownTag { byte: 0xFF, offset: 4 }
        ));
    }

    #[test]
    fn reject_non_string_key() {
        assert!(matches!(
            decode(&[tag::OBJECT, tag::TRUE, tag::TRUE, tag::TERMINATOR]).unwrap_err(),
            JsonbError::UnexpectedTag { byte: 0x03, offset: 1, .. }
        ));
    }

    #[test]
    fn reject_truncated_number() {
        let bytes = number(1.5);
        for cut in 1..=tag::NUMBER_PAYLOAD_LEN {
            let err = decode(&bytes[..bytes.len() - cut]).unwrap_err();
            assert!(
                matches!(err, JsonbError::TruncatedPayload { offset: 1, needed: 8, .. }),
                "cut {cut}: {err:?}"
            );
        }
    }

    #[test]
    fn reject_non_finite_number() {
        assert!(matches!(
            decode(&number(f64::NAN)).unwrap_err(),
            JsonbError::NonFiniteNumber { offset: 0 }
        ));
        assert!(matches!(
            decode(&number(f64::NEG_INFINITY)).unwrap_err(),
            JsonbError::NonFiniteNumber { offset: 0 }
        ));
    }

    #[test]
    fn reject_unterminated() {
        assert!(matches!(
            decode(&[]).unwrap_err(),
            JsonbError::Unterminated { kind: ContextKind::Literal, offset: 0 }
        ));
        assert!(matches!(
            decode(b"\x07abc").unwrap_err(),
            JsonbError::Unterminated { kind: ContextKind::String, offset: 1 }
        ));
        assert!(matches!(
            decode(b"\x05\x03").unwrap_err(),
            JsonbError::Unterminated { kind: ContextKind::Array, offset: 0 }
        ));
        assert!(matches!(
            decode(b"\x04\x07a\x00").unwrap_err(),
            JsonbError::Unterminated { kind: ContextKind::KeyValueSeparator, offset: 1 }
        ));
    }

    #[test]
    fn reject_excessive_bytes() {
        assert!(matches!(
            decode(&[tag::NULL, tag::TRUE]).unwrap_err(),
            JsonbError::ExcessiveInput { offset: 1 }
        ));
    }

    #[test]
    fn reject_invalid_utf8() {
        assert!(matches!(
            decode(b"\x07ab\xFF\x00").unwrap_err(),
            JsonbError::InvalidUtf8 { offset: 3 }
        ));
    }

    #[test]
    fn depth_limit() {
        assert_eq!(decode_with_limit(b"\x05\x05\x00\x00", Some(3)).unwrap(), "[[]]");
        assert!(matches!(
            decode_with_limit(b"\x05\x05\x05\x00\x00\x00", Some(3)).unwrap_err(),
            JsonbError::DepthLimitExceeded { limit: 3, offset: 3 }
        ));
    }
}
