//! Descriptor-driven JSON writer.

use log::trace;

use crate::JsonWrite;
use crate::error::{SerializeError, SerializeErrorKind};
use crate::link::ToJson;
use crate::options::SerializationPolicy;
use crate::schema::{CustomEncoding, FieldDescriptor, Kind, LiteralAsString, Nullability, NumberOptions};
use crate::value::Value;

/// Serializes a value implementing [`ToJson`] to a compact JSON string.
pub fn to_string<T: ToJson>(value: &T) -> Result<String, SerializeError> {
    into_string(to_vec_with_policy(value, &SerializationPolicy::minified())?)
}

/// Serializes a value implementing [`ToJson`] to a pretty-printed JSON string.
pub fn to_string_pretty<T: ToJson>(value: &T) -> Result<String, SerializeError> {
    into_string(to_vec_with_policy(value, &SerializationPolicy::pretty())?)
}

/// Serializes a value implementing [`ToJson`] with an explicit policy.
pub fn to_vec_with_policy<T: ToJson>(
    value: &T,
    policy: &SerializationPolicy,
) -> Result<Vec<u8>, SerializeError> {
    serialize(&T::descriptor(), &value.to_value(), policy)
}

/// Serializes a value implementing [`ToJson`] and writes it to the given writer.
pub fn to_writer<T: ToJson, W: JsonWrite>(value: &T, writer: W) -> Result<(), SerializeError> {
    to_writer_with_policy(value, &SerializationPolicy::minified(), writer)
}

/// Serializes a value implementing [`ToJson`] with an explicit policy and
/// writes it to the given writer.
pub fn to_writer_with_policy<T: ToJson, W: JsonWrite>(
    value: &T,
    policy: &SerializationPolicy,
    mut writer: W,
) -> Result<(), SerializeError> {
    serialize_to_writer(&T::descriptor(), &value.to_value(), policy, &mut writer)
}

fn into_string(bytes: Vec<u8>) -> Result<String, SerializeError> {
    String::from_utf8(bytes)
        .map_err(|e| SerializeError::new(SerializeErrorKind::Custom(e.to_string())))
}

/// Write `value` as described by `desc` into a fresh buffer.
///
/// # Examples
///
/// ```rust
/// use jsonlink::{FieldDescriptor, Schema, SerializationPolicy, Value, serialize};
///
/// let desc = FieldDescriptor::class("", Schema::new(vec![
///     FieldDescriptor::signed("i"),
///     FieldDescriptor::string("s"),
/// ]));
/// let value = Value::Class(vec![Value::Signed(55), Value::String("yo".into())]);
/// let out = serialize(&desc, &value, &SerializationPolicy::minified()).unwrap();
/// assert_eq!(out, br#"{"i":55,"s":"yo"}"#);
/// ```
pub fn serialize(
    desc: &FieldDescriptor,
    value: &Value<'_>,
    policy: &SerializationPolicy,
) -> Result<Vec<u8>, SerializeError> {
    let mut out = Vec::new();
    serialize_to_writer(desc, value, policy, &mut out)?;
    Ok(out)
}

/// Write `value` as described by `desc` to `writer`.
pub fn serialize_to_writer<W: JsonWrite + ?Sized>(
    desc: &FieldDescriptor,
    value: &Value<'_>,
    policy: &SerializationPolicy,
    writer: &mut W,
) -> Result<(), SerializeError> {
    serialize_value(desc, value, writer, policy, 0)
}

// ============================================================================
// Sinks
// ============================================================================

/// A sink over a fixed buffer that fails once the buffer is full.
///
/// ```rust
/// use jsonlink::{JsonWrite, SliceWriter};
///
/// let mut buf = [0u8; 4];
/// let mut w = SliceWriter::new(&mut buf);
/// w.write(b"null").unwrap();
/// assert!(w.write(b"!").is_err());
/// assert_eq!(w.written(), b"null");
/// ```
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, len: 0 }
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl JsonWrite for SliceWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<(), SerializeError> {
        let end = self.len + buf.len();
        if end > self.buf.len() {
            return Err(SerializeError::new(SerializeErrorKind::CapacityExceeded {
                capacity: self.buf.len(),
            }));
        }
        self.buf[self.len..end].copy_from_slice(buf);
        self.len = end;
        Ok(())
    }
}

/// Adapts any [`std::io::Write`] into a [`JsonWrite`].
#[derive(Debug)]
pub struct IoWriter<W> {
    inner: W,
}

impl<W: std::io::Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        IoWriter { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: std::io::Write> JsonWrite for IoWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<(), SerializeError> {
        self.inner.write_all(buf)?;
        Ok(())
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Write indentation for pretty printing
fn write_indent<W: JsonWrite + ?Sized>(
    writer: &mut W,
    policy: &SerializationPolicy,
    depth: usize,
) -> Result<(), SerializeError> {
    if policy.is_pretty() {
        let unit = policy.indent.unit();
        for _ in 0..depth {
            writer.write(unit.as_bytes())?;
        }
    }
    Ok(())
}

/// Write a newline for pretty printing
fn write_newline<W: JsonWrite + ?Sized>(
    writer: &mut W,
    policy: &SerializationPolicy,
) -> Result<(), SerializeError> {
    if policy.is_pretty() {
        writer.write(policy.newline.as_bytes())?;
    }
    Ok(())
}

/// Write a space after colon for pretty printing
fn write_colon<W: JsonWrite + ?Sized>(
    writer: &mut W,
    policy: &SerializationPolicy,
) -> Result<(), SerializeError> {
    if policy.is_pretty() {
        writer.write(b": ")
    } else {
        writer.write(b":")
    }
}

/// Start the next member or element of a container.
fn write_item_start<W: JsonWrite + ?Sized>(
    writer: &mut W,
    policy: &SerializationPolicy,
    first: &mut bool,
    depth: usize,
) -> Result<(), SerializeError> {
    if !*first {
        writer.write(b",")?;
    }
    *first = false;
    write_newline(writer, policy)?;
    write_indent(writer, policy, depth + 1)
}

/// Close a container opened at `depth`.
fn write_close<W: JsonWrite + ?Sized>(
    writer: &mut W,
    policy: &SerializationPolicy,
    first: bool,
    depth: usize,
    close: &[u8],
) -> Result<(), SerializeError> {
    if !first {
        if policy.trailing_comma {
            writer.write(b",")?;
        }
        write_newline(writer, policy)?;
        write_indent(writer, policy, depth)?;
    }
    writer.write(close)
}

fn serialize_value<W: JsonWrite + ?Sized>(
    desc: &FieldDescriptor,
    value: &Value<'_>,
    writer: &mut W,
    policy: &SerializationPolicy,
    depth: usize,
) -> Result<(), SerializeError> {
    trace!("Serializing {} as {}", value.type_name(), desc.kind.expected());

    if let Kind::Null { inner, .. } = &desc.kind {
        return if value.is_null() {
            writer.write(b"null")
        } else {
            serialize_value(inner, value, writer, policy, depth)
        };
    }

    match (&desc.kind, value) {
        (Kind::Number(opts), _) => serialize_number(opts, value, writer),
        (Kind::Bool(mode), Value::Bool(b)) => {
            let text: &[u8] = match (mode, b) {
                (LiteralAsString::Always, true) => b"\"true\"",
                (LiteralAsString::Always, false) => b"\"false\"",
                (_, true) => b"true",
                (_, false) => b"false",
            };
            writer.write(text)
        }
        (Kind::String(_), Value::String(s)) => {
            crate::write_json_string(writer, s, policy.restricted_strings)
        }
        (Kind::StringRaw(_), Value::String(s)) => {
            writer.write(b"\"")?;
            writer.write(s.as_bytes())?;
            writer.write(b"\"")
        }
        (Kind::Date, Value::Timestamp(t)) => {
            writer.write(b"\"")?;
            writer.write(t.to_string().as_bytes())?;
            writer.write(b"\"")
        }
        (Kind::Class(schema), Value::Class(members)) => {
            if members.len() != schema.len() {
                return Err(SerializeError::mismatch(
                    "an object",
                    "a class with the wrong number of members",
                ));
            }
            writer.write(b"{")?;
            let mut first = true;
            for (field, member) in schema.fields().iter().zip(members) {
                if member.is_null() && omitted_when_null(field) {
                    trace!("omitting null member {}", field.name);
                    continue;
                }
                write_item_start(writer, policy, &mut first, depth)?;
                crate::write_json_string(writer, &field.name, policy.restricted_strings)?;
                write_colon(writer, policy)?;
                serialize_value(field, member, writer, policy, depth + 1)?;
            }
            write_close(writer, policy, first, depth, b"}")
        }
        (Kind::Array(element), Value::Array(items)) => {
            writer.write(b"[")?;
            let mut first = true;
            for item in items {
                write_item_start(writer, policy, &mut first, depth)?;
                serialize_value(element, item, writer, policy, depth + 1)?;
            }
            write_close(writer, policy, first, depth, b"]")
        }
        (Kind::KeyValue { key, value }, Value::Map(pairs)) => {
            writer.write(b"{")?;
            let mut first = true;
            for (k, v) in pairs {
                write_item_start(writer, policy, &mut first, depth)?;
                serialize_map_key(key, k, writer, policy)?;
                write_colon(writer, policy)?;
                serialize_value(value, v, writer, policy, depth + 1)?;
            }
            write_close(writer, policy, first, depth, b"}")
        }
        (Kind::KeyValueArray { key, value }, Value::Map(pairs)) => {
            writer.write(b"[")?;
            let mut first = true;
            for (k, v) in pairs {
                write_item_start(writer, policy, &mut first, depth)?;
                writer.write(b"{")?;
                let mut first_member = true;
                for (desc, member) in [(key, k), (value, v)] {
                    if member.is_null() && omitted_when_null(desc) {
                        continue;
                    }
                    write_item_start(writer, policy, &mut first_member, depth + 1)?;
                    crate::write_json_string(writer, &desc.name, policy.restricted_strings)?;
                    write_colon(writer, policy)?;
                    serialize_value(desc, member, writer, policy, depth + 2)?;
                }
                write_close(writer, policy, first_member, depth + 1, b"}")?;
            }
            write_close(writer, policy, first, depth, b"]")
        }
        (Kind::Custom { encoding, fns }, _) => {
            let text = (fns.write)(value)
                .map_err(|message| SerializeError::new(SerializeErrorKind::Custom(message)))?;
            match encoding {
                CustomEncoding::String => {
                    crate::write_json_string(writer, &text, policy.restricted_strings)
                }
                CustomEncoding::Literal | CustomEncoding::Any => writer.write(text.as_bytes()),
            }
        }
        (
            Kind::Variant(alternatives) | Kind::VariantTagged { alternatives, .. },
            Value::Variant { index, value },
        ) => {
            let alternative = alternatives
                .get(*index)
                .ok_or_else(|| SerializeError::mismatch("a declared alternative", "an unknown variant index"))?;
            trace!("Active alternative index is {index}");
            serialize_value(alternative, value, writer, policy, depth)
        }
        (kind, value) => Err(SerializeError::mismatch(kind.expected(), value.type_name())),
    }
}

/// Whether a null member is left out of its object.
fn omitted_when_null(field: &FieldDescriptor) -> bool {
    matches!(
        field.kind,
        Kind::Null {
            visibility: Nullability::Nullable,
            ..
        }
    )
}

fn serialize_number<W: JsonWrite + ?Sized>(
    opts: &NumberOptions,
    value: &Value<'_>,
    writer: &mut W,
) -> Result<(), SerializeError> {
    let quoted = opts.literal_as_string == LiteralAsString::Always;
    let mut itoa_buf = itoa::Buffer::new();
    let mut ryu_buf = ryu::Buffer::new();
    let text = match *value {
        Value::Signed(v) => itoa_buf.format(v),
        Value::Unsigned(v) => itoa_buf.format(v),
        // narrowed before the check, a finite f64 can overflow f32
        Value::Real(v) if opts.width == 32 && (v as f32).is_finite() => {
            ryu_buf.format_finite(v as f32)
        }
        Value::Real(v) if opts.width != 32 && v.is_finite() => ryu_buf.format_finite(v),
        Value::Real(v) if opts.allow_special_values => {
            let special: &[u8] = if v.is_nan() {
                b"\"NaN\""
            } else if v > 0.0 {
                b"\"Infinity\""
            } else {
                b"\"-Infinity\""
            };
            return writer.write(special);
        }
        Value::Real(_) => return writer.write(b"null"),
        ref other => return Err(SerializeError::mismatch("a number", other.type_name())),
    };
    if quoted {
        writer.write(b"\"")?;
        writer.write(text.as_bytes())?;
        writer.write(b"\"")
    } else {
        writer.write(text.as_bytes())
    }
}

/// Member names are always strings; non-string keys are quoted.
fn serialize_map_key<W: JsonWrite + ?Sized>(
    key: &FieldDescriptor,
    value: &Value<'_>,
    writer: &mut W,
    policy: &SerializationPolicy,
) -> Result<(), SerializeError> {
    if let Value::String(s) = value {
        return crate::write_json_string(writer, s, policy.restricted_strings);
    }
    let mut rendered = Vec::new();
    serialize_value(key.base(), value, &mut rendered, &SerializationPolicy::minified(), 0)?;
    if rendered.first() == Some(&b'"') {
        writer.write(&rendered)
    } else {
        writer.write(b"\"")?;
        writer.write(&rendered)?;
        writer.write(b"\"")
    }
}
