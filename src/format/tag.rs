//! jsonb tag byte constants.
//!
//! Tag values follow the RFC 7159 value-kind ordering, so raw tag bytes can
//! be compared directly: false < null < true < object < array < number < string.

// Closes the nearest open string, array or object.
pub const TERMINATOR: u8 = 0x00;

// Keywords
pub const FALSE: u8 = 0x01;
pub const NULL: u8 = 0x02;
pub const TRUE: u8 = 0x03;

// Containers (terminated)
pub const OBJECT: u8 = 0x04;
pub const ARRAY: u8 = 0x05;

// Number (IEEE 754 double-precision, big-endian)
pub const NUMBER: u8 = 0x06;

// String (raw UTF-8, terminated)
pub const STRING: u8 = 0x07;

/// Size of a number payload following the `NUMBER` tag.
pub const NUMBER_PAYLOAD_LEN: usize = 8;

/// A jsonb value tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tag {
    False = FALSE,
    Null = NULL,
    True = TRUE,
    Object = OBJECT,
    Array = ARRAY,
    Number = NUMBER,
    String = STRING,
}

impl Tag {
    /// All value tags in byte order.
    pub const ALL: [Tag; 7] = [
        Tag::False,
        Tag::Null,
        Tag::True,
        Tag::Object,
        Tag::Array,
        Tag::Number,
        Tag::String,
    ];

    /// Maps a raw byte to its value tag. The terminator is not a value tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            FALSE => Some(Self::False),
            NULL => Some(Self::Null),
            TRUE => Some(Self::True),
            OBJECT => Some(Self::Object),
            ARRAY => Some(Self::Array),
            NUMBER => Some(Self::Number),
            STRING => Some(Self::String),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::False => "false",
            Self::Null => "null",
            Self::True => "true",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
