//! The jsonb binary format.
//!
//! A jsonb document is a sequence of tagged values with no length prefixes.
//! Strings, arrays and objects run until a single `0x00` terminator; numbers
//! carry a fixed 8-byte big-endian IEEE-754 payload.

pub mod tag;

pub use tag::Tag;
