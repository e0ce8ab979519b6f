//! Error types for jsonb encoding and decoding.

use crate::context::ContextKind;

/// Errors that can occur while converting between JSON text and jsonb.
///
/// Every error is terminal for the call that produced it; offsets are byte
/// offsets into that call's input.
#[derive(Debug, thiserror::Error)]
pub enum JsonbError {
    #[error("unexpected character {found:?} at {offset}, expected {expected}")]
    Syntax {
        offset: usize,
        found: char,
        expected: &'static str,
    },

    #[error("expected keyword '{keyword}' at {offset} but found '{found}'")]
    MalformedKeyword {
        keyword: &'static str,
        found: String,
        offset: usize,
    },

    #[error("invalid number '{text}' at {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected null byte in string at {offset}")]
    NullByteInString { offset: usize },

    #[error("unknown byte 0x{byte:02X} at {offset}")]
    UnknownTag { byte: u8, offset: usize },

    #[error("unexpected byte 0x{byte:02X} at {offset}, expected {expected}")]
    UnexpectedTag {
        byte: u8,
        offset: usize,
        expected: &'static str,
    },

    #[error("truncated payload at {offset}: need {needed} bytes but only {remaining} remaining")]
    TruncatedPayload {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unterminated {kind} operation, started at {offset}")]
    Unterminated { kind: ContextKind, offset: usize },

    #[error("excessive input at {offset}")]
    ExcessiveInput { offset: usize },

    #[error("invalid UTF-8 at {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("number at {offset} is not finite")]
    NonFiniteNumber { offset: usize },

    #[error("nesting depth limit of {limit} exceeded at {offset}")]
    DepthLimitExceeded { limit: usize, offset: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JsonbError {
    /// Returns the input offset the error points at, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. }
            | Self::MalformedKeyword { offset, .. }
            | Self::InvalidNumber { offset, .. }
            | Self::NullByteInString { offset }
            | Self::UnknownTag { offset, .. }
            | Self::UnexpectedTag { offset, .. }
            | Self::TruncatedPayload { offset, .. }
            | Self::Unterminated { offset, .. }
            | Self::ExcessiveInput { offset }
            | Self::InvalidUtf8 { offset }
            | Self::NonFiniteNumber { offset }
            | Self::DepthLimitExceeded { offset, .. } => Some(*offset),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_offset_and_context() {
        let err = JsonbError::Syntax {
            offset: 3,
            found: 'x',
            expected: "',' or ']'",
        };
        assert_eq!(err.to_string(), "unexpected character 'x' at 3, expected ',' or ']'");

        let err = JsonbError::Unterminated {
            kind: ContextKind::KeyValueSeparator,
            offset: 7,
        };
        assert_eq!(
            err.to_string(),
            "unterminated object key-value separator operation, started at 7"
        );

        let err = JsonbError::UnknownTag { byte: 0x2A, offset: 0 };
        assert_eq!(err.to_string(), "unknown byte 0x2A at 0");
    }

    #[test]
    fn offset_accessor() {
        assert_eq!(JsonbError::ExcessiveInput { offset: 9 }.offset(), Some(9));
        let io = JsonbError::from(std::io::Error::other("boom"));
        assert_eq!(io.offset(), None);
    }
}
