//! jsonb — a codec between JSON text and a compact tagged binary encoding.
//!
//! jsonb stores every JSON value behind a one-byte tag. Keywords are the tag
//! alone, numbers are 8-byte big-endian doubles, and strings, arrays and
//! objects run until a `0x00` terminator. There are no length prefixes, no
//! header and no version byte.
//!
//! ```
//! let binary = jsonb::encode(r#"{"a":[1,true]}"#)?;
//! assert_eq!(jsonb::decode(&binary)?, r#"{"a":[1,true]}"#);
//! # Ok::<(), jsonb::JsonbError>(())
//! ```
//!
//! # Architecture
//!
//! - **`format`** — Tag byte constants and the closed [`Tag`] enumeration
//! - **`context`** — The explicit context stack both directions run on
//! - **`encode`** / **`decode`** — The two iterative automata
//! - **`codec`** — [`JsonbCodec`] with optional nesting limits
//! - **`io`** — Whole-document async read/write helpers
//!
//! # Limitations
//!
//! String escapes are copied through verbatim in both directions, and all
//! numbers pass through `f64`, so integers beyond 2^53 lose precision.

pub mod codec;
pub mod context;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod io;

pub use codec::{CodecBuilder, JsonbCodec, Mode};
pub use decode::decode;
pub use encode::encode;
pub use error::JsonbError;
pub use format::Tag;
