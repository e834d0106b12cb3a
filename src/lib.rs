//! Schema-driven JSON parsing and serialization.
//!
//! A [`FieldDescriptor`] describes the JSON shape of one value: its kind
//! (number, string, object, array, map, variant, ...), whether it may be
//! null, and per-kind options. Objects are described by a [`Schema`], an
//! ordered table of member descriptors. The same descriptor drives both
//! directions:
//!
//! - [`parse`] walks the input once, guided by the descriptor, and produces
//!   a [`Value`] shaped exactly like it. No generic JSON tree is built.
//!   Object members may appear in any order; unknown members are skipped
//!   without being parsed.
//! - [`serialize`] writes a [`Value`] back out under a
//!   [`SerializationPolicy`].
//!
//! Typed code usually goes through [`FromJson`] / [`ToJson`], implemented
//! for the standard scalars and collections and generated for structs by
//! [`json_link!`]:
//!
//! ```rust
//! use jsonlink::{json_link, from_str, to_string};
//!
//! #[derive(Debug, PartialEq)]
//! struct Config {
//!     name: String,
//!     retries: u8,
//!     tags: Vec<String>,
//! }
//!
//! json_link! {
//!     Config {
//!         "name" => name: String,
//!         "retries" => retries: u8,
//!         "tags" => tags: Vec<String>,
//!     }
//! }
//!
//! let config: Config = from_str(r#"{"tags": ["a"], "retries": 3, "name": "x"}"#).unwrap();
//! assert_eq!(config.retries, 3);
//! assert_eq!(to_string(&config).unwrap(), r#"{"name":"x","retries":3,"tags":["a"]}"#);
//! ```

mod appender;
mod cursor;
mod datetime;
mod deserialize;
mod error;
mod escape;
mod iter;
mod lemire;
mod link;
mod numbers;
mod options;
mod path;
mod resolver;
mod schema;
mod serialize;
mod skip;
mod span;
mod value;

pub use appender::{Appender, collect_into};
pub use cursor::Cursor;
pub use datetime::{Civil, Timestamp, civil_from_days, days_from_civil, parse_timestamp};
pub use deserialize::{
    JsonDeserializer, from_slice, from_slice_with_options, from_str, from_str_with_options, parse,
    parse_with_options,
};
pub use error::{JsonError, JsonErrorKind, Result, SerializeError, SerializeErrorKind};
pub use escape::{decode_string, unescape, write_escaped};
pub use iter::{ArrayIter, JsonLines};
pub use lemire::parse_f64 as parse_real_precise;
pub use link::{FromJson, JsonDescriptor, ToJson};
pub use numbers::parse_real_fast;
pub use options::{
    CommentPolicy, Indentation, NewLineDelimiter, ParseOptions, RestrictedStringOutput,
    SerializationFormat, SerializationPolicy,
};
pub use path::{from_slice_at, parse_at};
pub use schema::{
    Classifier, CustomEncoding, CustomFns, CustomParse, CustomWrite, Discriminator, EightBitMode,
    FieldDescriptor, Kind, LiteralAsString, Nullability, NumberOptions, NumberRepr, Schema,
    StringOptions, Switcher,
};
pub use serialize::{
    IoWriter, SliceWriter, serialize, serialize_to_writer, to_string, to_string_pretty,
    to_vec_with_policy, to_writer, to_writer_with_policy,
};
pub use skip::skip_value;
pub use span::{LocatedSpan, Pos, Span};
pub use value::Value;

#[doc(hidden)]
pub mod __private {
    pub use crate::link::mismatch;
}

/// A sink for serialized JSON bytes.
pub trait JsonWrite {
    /// Append `buf` to the output.
    fn write(&mut self, buf: &[u8]) -> core::result::Result<(), SerializeError>;
}

impl JsonWrite for Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<(), SerializeError> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

impl<W: JsonWrite + ?Sized> JsonWrite for &mut W {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<(), SerializeError> {
        (**self).write(buf)
    }
}

/// Write `s` as a quoted, escaped JSON string.
pub(crate) fn write_json_string<W: JsonWrite + ?Sized>(
    writer: &mut W,
    s: &str,
    restricted: RestrictedStringOutput,
) -> core::result::Result<(), SerializeError> {
    writer.write(b"\"")?;
    write_escaped(writer, s, restricted)?;
    writer.write(b"\"")
}
