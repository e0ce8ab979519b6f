//! Configurable codec front end.

use bytes::Bytes;

use crate::decode::decode_with_limit;
use crate::encode::encode_with_limit;
use crate::error::JsonbError;

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// JSON text → jsonb.
    Encode,
    /// jsonb → JSON text.
    Decode,
}

/// A jsonb codec with optional limits.
///
/// The default codec is unbounded and behaves exactly like the free
/// [`encode`](crate::encode()) and [`decode`](crate::decode()) functions.
/// A codec holds no state between calls and may be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonbCodec {
    max_depth: Option<usize>,
}

impl JsonbCodec {
    /// Creates a new codec builder.
    pub fn builder() -> CodecBuilder {
        CodecBuilder::default()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn encode(&self, text: &str) -> Result<Bytes, JsonbError> {
        encode_with_limit(text, self.max_depth)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, JsonbError> {
        decode_with_limit(bytes, self.max_depth)
    }

    /// Converts one whole document in the given direction.
    ///
    /// Input to [`Mode::Encode`] must be UTF-8.
    pub fn transcode(&self, mode: Mode, input: &[u8]) -> Result<Bytes, JsonbError> {
        let output = match mode {
            Mode::Encode => {
                let text = std::str::from_utf8(input).map_err(|e| JsonbError::InvalidUtf8 {
                    offset: e.valid_up_to(),
                })?;
                self.encode(text)?
            }
            Mode::Decode => Bytes::from(self.decode(input)?),
        };
        tracing::debug!(
            ?mode,
            input_len = input.len(),
            output_len = output.len(),
            "transcoded document"
        );
        Ok(output)
    }
}

/// Builder for configuring a [`JsonbCodec`].
#[derive(Debug, Default)]
pub struct CodecBuilder {
    max_depth: Option<usize>,
}

impl CodecBuilder {
    /// Sets the maximum nesting depth. The top-level value counts as depth 1,
    /// so the limit is never lower than 1.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit.max(1));
        self
    }

    pub fn build(self) -> JsonbCodec {
        JsonbCodec {
            max_depth: self.max_depth,
        }
    }
}
