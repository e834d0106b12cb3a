//! Recursive descent JSON parser driven by field descriptors.

use std::borrow::Cow;

use crate::appender::Appender;
use crate::cursor::{Cursor, describe_byte};
use crate::datetime::parse_timestamp;
use crate::error::{JsonError, JsonErrorKind, Result};
use crate::escape::decode_string;
use crate::link::FromJson;
use crate::numbers::{number_from_text, parse_number};
use crate::options::ParseOptions;
use crate::resolver::{Member, MemberResolver, find_member, next_member};
use crate::schema::{
    CustomEncoding, CustomFns, Discriminator, FieldDescriptor, Kind, LiteralAsString, Schema,
    StringOptions, Switcher,
};
use crate::skip::{StringSpan, scan_literal, scan_string, scan_value};
use crate::span::Span;
use crate::value::Value;

/// Name of the JSON type that starts with `b`, for type mismatch errors.
pub(crate) fn json_type_name(b: u8) -> &'static str {
    match b {
        b'"' => "a string",
        b'{' => "an object",
        b'[' => "an array",
        b't' | b'f' => "a boolean",
        b'n' => "null",
        _ => "a number",
    }
}

/// Short rendering of a tag value for `UnknownVariantTag`.
fn describe_value(value: &Value<'_>) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Signed(v) => v.to_string(),
        Value::Unsigned(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::String(s) => format!("{s:?}"),
        Value::Timestamp(t) => t.to_string(),
        other => other.type_name().into(),
    }
}

// ============================================================================
// Deserializer
// ============================================================================

/// JSON parser using recursive descent over one input buffer.
///
/// Every routine starts at the first byte of a value and leaves the cursor
/// just past it. Object members are located by [`MemberResolver`] and parsed
/// through sub-cursors bounded to their spans.
pub struct JsonDeserializer<'input> {
    cursor: Cursor<'input>,
    options: ParseOptions,
    depth: usize,
}

impl<'input> JsonDeserializer<'input> {
    /// Create a new deserializer for the given input.
    pub fn new(input: &'input [u8], options: ParseOptions) -> Self {
        JsonDeserializer {
            cursor: Cursor::new(input, options.comments),
            options,
            depth: 0,
        }
    }

    /// A deserializer limited to `start..end` of `input`. Offsets in errors
    /// stay relative to the whole of `input`.
    pub(crate) fn over(
        input: &'input [u8],
        start: usize,
        end: usize,
        options: ParseOptions,
    ) -> Self {
        JsonDeserializer {
            cursor: Cursor::new(input, options.comments).slice(start, end),
            options,
            depth: 0,
        }
    }

    /// Current absolute offset in the input.
    pub fn position(&self) -> usize {
        self.cursor.pos()
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut Cursor<'input> {
        &mut self.cursor
    }

    /// Check that only whitespace follows the root value, if the options ask
    /// for it.
    pub fn finish(&mut self) -> Result<()> {
        if !self.options.verify_end_of_data {
            return Ok(());
        }
        self.cursor.trim_leading_whitespace();
        match self.cursor.peek() {
            None => Ok(()),
            Some(b) => Err(self.cursor.error(JsonErrorKind::UnexpectedToken {
                got: describe_byte(b),
                expected: "end of input",
            })),
        }
    }

    /// Run `f` with the cursor temporarily replaced by `cursor`, then require
    /// that `f` consumed all of it.
    fn with_cursor<T>(
        &mut self,
        cursor: Cursor<'input>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = core::mem::replace(&mut self.cursor, cursor);
        let result = f(self).and_then(|value| {
            self.cursor.trim_leading_whitespace();
            match self.cursor.peek() {
                None => Ok(value),
                Some(b) => Err(self.cursor.error(JsonErrorKind::UnexpectedToken {
                    got: describe_byte(b),
                    expected: "end of value",
                })),
            }
        });
        self.cursor = saved;
        result
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(self.cursor.error(JsonErrorKind::NestingTooDeep {
                max_depth: self.options.max_depth,
            }));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn at_null(&self) -> bool {
        if self.cursor.peek() != Some(b'n') {
            return false;
        }
        let mut probe = self.cursor;
        matches!(scan_literal(&mut probe), Ok(span) if probe.text(span) == b"null")
    }

    fn mismatch(&self, expected: &'static str, b: u8) -> JsonError {
        self.cursor.error(JsonErrorKind::TypeMismatch {
            expected,
            got: json_type_name(b),
        })
    }

    /// Parse one value described by `desc`.
    pub fn deserialize_value(&mut self, desc: &FieldDescriptor) -> Result<Value<'input>> {
        self.cursor.trim_leading_whitespace();

        if !matches!(
            desc.kind,
            Kind::Null { .. } | Kind::Custom { .. } | Kind::Variant(_) | Kind::VariantTagged { .. }
        ) && self.at_null()
        {
            let field = if desc.name.is_empty() {
                "<element>".to_string()
            } else {
                desc.name.clone()
            };
            return Err(self.cursor.error(JsonErrorKind::UnexpectedNull { field }));
        }

        match &desc.kind {
            Kind::Number(opts) => match self.cursor.peek() {
                Some(b @ (b'{' | b'[' | b't' | b'f')) => Err(self.mismatch("a number", b)),
                _ => parse_number(&mut self.cursor, opts, self.options.precise_reals),
            },
            Kind::Bool(mode) => self.deserialize_bool(*mode),
            Kind::String(opts) => self.deserialize_string(opts, false),
            Kind::StringRaw(opts) => self.deserialize_string(opts, true),
            Kind::Date => self.deserialize_date(),
            Kind::Class(schema) => self.deserialize_class(schema),
            Kind::Array(element) => self.deserialize_array(element),
            Kind::Null { inner, .. } => self.deserialize_nullable(inner),
            Kind::KeyValue { key, value } => self.deserialize_key_value(key, value),
            Kind::KeyValueArray { key, value } => self.deserialize_key_value_array(key, value),
            Kind::Custom { encoding, fns } => self.deserialize_custom(*encoding, fns),
            Kind::Variant(alternatives) => self.deserialize_untagged(alternatives),
            Kind::VariantTagged {
                alternatives,
                discriminator,
            } => self.deserialize_tagged(&desc.name, alternatives, discriminator),
        }
    }

    fn deserialize_nullable(&mut self, inner: &FieldDescriptor) -> Result<Value<'input>> {
        log::trace!("deserialize_nullable: {}", inner.name);
        if self.cursor.is_empty() {
            return Ok(Value::Null);
        }
        if self.at_null() {
            scan_literal(&mut self.cursor)?;
            return Ok(Value::Null);
        }
        if let Kind::String(opts) | Kind::StringRaw(opts) = &inner.base().kind {
            if opts.empty_is_null && self.cursor.starts_with(b"\"\"") {
                self.cursor.remove_prefix(2);
                return Ok(Value::Null);
            }
        }
        self.deserialize_value(inner)
    }

    fn deserialize_bool(&mut self, mode: LiteralAsString) -> Result<Value<'input>> {
        match self.cursor.peek() {
            Some(b'"') => {
                let start = self.cursor.pos();
                let s = scan_string(&mut self.cursor)?;
                let quoted = Span::from_range(start, self.cursor.pos());
                if mode == LiteralAsString::Never {
                    return Err(JsonError::new(
                        JsonErrorKind::TypeMismatch {
                            expected: "a boolean",
                            got: "a string",
                        },
                        quoted,
                    ));
                }
                match self.cursor.text(s.span) {
                    b"true" => Ok(Value::Bool(true)),
                    b"false" => Ok(Value::Bool(false)),
                    _ => Err(JsonError::new(
                        JsonErrorKind::TypeMismatch {
                            expected: "a quoted boolean",
                            got: "a string",
                        },
                        quoted,
                    )),
                }
            }
            Some(b @ (b't' | b'f')) if mode == LiteralAsString::Always => {
                Err(self.cursor.error(JsonErrorKind::UnexpectedToken {
                    got: describe_byte(b),
                    expected: "a quoted boolean",
                }))
            }
            Some(b't') => {
                self.cursor.expect_literal("true")?;
                Ok(Value::Bool(true))
            }
            Some(b'f') => {
                self.cursor.expect_literal("false")?;
                Ok(Value::Bool(false))
            }
            Some(b) => Err(self.mismatch("a boolean", b)),
            None => Err(self.cursor.eof("a boolean")),
        }
    }

    fn expect_string(&mut self, expected: &'static str) -> Result<StringSpan> {
        match self.cursor.peek() {
            Some(b'"') => scan_string(&mut self.cursor),
            Some(b) => Err(self.mismatch(expected, b)),
            None => Err(self.cursor.eof(expected)),
        }
    }

    fn deserialize_string(&mut self, opts: &StringOptions, raw: bool) -> Result<Value<'input>> {
        let s = self.expect_string("a string")?;
        let body = self.cursor.text(s.span);
        decode_string(body, s.escaped && !raw, s.span.start, opts.eight_bit).map(Value::String)
    }

    fn deserialize_date(&mut self) -> Result<Value<'input>> {
        let s = self.expect_string("an ISO-8601 timestamp string")?;
        let body = self.cursor.text(s.span);
        parse_timestamp(body).map(Value::Timestamp).ok_or_else(|| {
            JsonError::new(
                JsonErrorKind::InvalidTimestamp {
                    text: String::from_utf8_lossy(body).into_owned(),
                },
                s.span,
            )
        })
    }

    /// Deserialize an object into its declared members, in schema order.
    fn deserialize_class(&mut self, schema: &Schema) -> Result<Value<'input>> {
        log::trace!("deserialize_class: {} members", schema.len());
        match self.cursor.peek() {
            Some(b'{') => {}
            Some(b) => return Err(self.mismatch("an object", b)),
            None => return Err(self.cursor.eof("an object")),
        }
        self.nested(|de| de.deserialize_members(schema).map(Value::Class))
    }

    fn deserialize_members(&mut self, schema: &Schema) -> Result<Vec<Value<'input>>> {
        let mut resolver = MemberResolver::new(schema, self.cursor, &self.options)?;
        let mut values = vec![Value::Null; schema.len()];
        let mut done = vec![false; schema.len()];
        for index in 0..schema.len() {
            self.resolve_member(&mut resolver, schema, &mut values, &mut done, index)?;
        }
        self.cursor = resolver.finish()?;
        Ok(values)
    }

    /// Locate and parse member `index`. A variant whose tag lives in a
    /// sibling member parses that sibling first.
    fn resolve_member(
        &mut self,
        resolver: &mut MemberResolver<'_, 'input>,
        schema: &Schema,
        values: &mut [Value<'input>],
        done: &mut [bool],
        index: usize,
    ) -> Result<()> {
        if done[index] {
            return Ok(());
        }
        done[index] = true;
        let field = &schema.fields()[index];
        let Some(span) = resolver.locate(index)? else {
            if field.is_nullable() {
                return Ok(());
            }
            return Err(resolver.missing(index));
        };

        let sub = self.cursor.slice_span(span);
        let value = match &field.base().kind {
            Kind::VariantTagged {
                alternatives,
                discriminator: Discriminator::Member { name, switcher },
            } => {
                let tag_index = schema
                    .index_of(name)
                    .filter(|&t| t != index)
                    .ok_or_else(|| {
                        JsonError::new(
                            JsonErrorKind::InvalidValue {
                                message: format!(
                                    "variant `{}` is tagged by undeclared member `{name}`",
                                    field.name
                                ),
                            },
                            span,
                        )
                    })?;
                self.resolve_member(resolver, schema, values, done, tag_index)?;
                let selected = select(*switcher, &values[tag_index], span)?;
                self.with_cursor(sub, |de| {
                    de.deserialize_selected(field, alternatives, selected)
                })?
            }
            Kind::VariantTagged {
                alternatives,
                discriminator: Discriminator::Classifier(classify),
            } => {
                let selected = classify(&values[..index]).ok_or_else(|| {
                    JsonError::new(
                        JsonErrorKind::UnknownVariantTag {
                            tag: format!("(classified from {} preceding members)", index),
                        },
                        span,
                    )
                })?;
                self.with_cursor(sub, |de| {
                    de.deserialize_selected(field, alternatives, selected)
                })?
            }
            _ => self.with_cursor(sub, |de| de.deserialize_value(field))?,
        };
        values[index] = value;
        Ok(())
    }

    fn deserialize_selected(
        &mut self,
        field: &FieldDescriptor,
        alternatives: &[FieldDescriptor],
        selected: usize,
    ) -> Result<Value<'input>> {
        if field.is_nullable() && self.at_null() {
            scan_literal(&mut self.cursor)?;
            return Ok(Value::Null);
        }
        self.deserialize_alternative(alternatives, selected)
    }

    fn deserialize_alternative(
        &mut self,
        alternatives: &[FieldDescriptor],
        index: usize,
    ) -> Result<Value<'input>> {
        let Some(alternative) = alternatives.get(index) else {
            return Err(self.cursor.error(JsonErrorKind::UnknownVariantTag {
                tag: format!("alternative #{index}"),
            }));
        };
        log::trace!("variant: selected alternative {index}");
        let value = self.deserialize_value(alternative)?;
        Ok(Value::Variant {
            index,
            value: Box::new(value),
        })
    }

    /// Deserialize a list.
    fn deserialize_array(&mut self, element: &FieldDescriptor) -> Result<Value<'input>> {
        log::trace!("deserialize_array");
        match self.cursor.peek() {
            Some(b'[') => {}
            Some(b) => return Err(self.mismatch("an array", b)),
            None => return Err(self.cursor.eof("an array")),
        }
        self.nested(|de| {
            let mut items: Vec<Value<'input>> = Vec::new();
            de.deserialize_elements(&mut items, |de| de.deserialize_value(element))?;
            Ok(Value::Array(items))
        })
    }

    /// Parse `[a, b, ...]`, pushing every element into `sink`. A trailing
    /// comma before `]` is accepted.
    fn deserialize_elements<T, A: Appender<T>>(
        &mut self,
        sink: &mut A,
        mut element: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<()> {
        self.cursor.expect(b'[', "'['")?;
        loop {
            self.cursor.trim_leading_whitespace();
            if self.cursor.peek() == Some(b']') {
                self.cursor.remove_prefix(1);
                return Ok(());
            }
            sink.push_item(element(self)?);
            self.element_separator()?;
        }
    }

    /// Consume the `,` after an array element, or stop before the `]`.
    pub(crate) fn element_separator(&mut self) -> Result<()> {
        self.cursor.trim_leading_whitespace();
        match self.cursor.peek() {
            Some(b',') => {
                self.cursor.remove_prefix(1);
                Ok(())
            }
            Some(b']') => Ok(()),
            Some(b) => Err(self.cursor.error(JsonErrorKind::UnexpectedToken {
                got: describe_byte(b),
                expected: "',' or ']'",
            })),
            None => Err(self.cursor.eof("']'")),
        }
    }

    /// Deserialize an object used as a map.
    fn deserialize_key_value(
        &mut self,
        key: &FieldDescriptor,
        value: &FieldDescriptor,
    ) -> Result<Value<'input>> {
        log::trace!("deserialize_key_value");
        match self.cursor.peek() {
            Some(b'{') => {}
            Some(b) => return Err(self.mismatch("an object", b)),
            None => return Err(self.cursor.eof("an object")),
        }
        self.nested(|de| {
            de.cursor.expect(b'{', "'{'")?;
            let mut pairs: Vec<(Value<'input>, Value<'input>)> = Vec::new();
            loop {
                match next_member(&mut de.cursor, true)? {
                    Member::End(_) => break,
                    Member::Entry {
                        name,
                        name_span,
                        value: span,
                    } => {
                        let k = de.deserialize_key(key, name, name_span)?;
                        let sub = de.cursor.slice_span(span);
                        let v = de.with_cursor(sub, |de| de.deserialize_value(value))?;
                        pairs.push_item((k, v));
                    }
                }
            }
            Ok(Value::Map(pairs))
        })
    }

    /// Convert a member name into a map key.
    fn deserialize_key(
        &self,
        key: &FieldDescriptor,
        name: Cow<'input, str>,
        name_span: Span,
    ) -> Result<Value<'input>> {
        let body = Span::new(name_span.start + 1, name_span.len.saturating_sub(2));
        match &key.base().kind {
            Kind::String(_) | Kind::StringRaw(_) => Ok(Value::String(name)),
            Kind::Number(opts) => {
                number_from_text(name.as_bytes(), body, opts, self.options.precise_reals)
            }
            Kind::Bool(_) => match &*name {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(JsonError::new(
                    JsonErrorKind::TypeMismatch {
                        expected: "a boolean key",
                        got: "a string",
                    },
                    name_span,
                )),
            },
            Kind::Date => parse_timestamp(name.as_bytes())
                .map(Value::Timestamp)
                .ok_or_else(|| {
                    JsonError::new(
                        JsonErrorKind::InvalidTimestamp {
                            text: name.clone().into_owned(),
                        },
                        body,
                    )
                }),
            Kind::Custom { fns, .. } => (fns.parse)(&name)
                .map_err(|message| JsonError::new(JsonErrorKind::InvalidValue { message }, body)),
            other => Err(JsonError::new(
                JsonErrorKind::TypeMismatch {
                    expected: "a string or number key",
                    got: other.expected(),
                },
                name_span,
            )),
        }
    }

    /// Deserialize an array of `{key, value}` objects.
    fn deserialize_key_value_array(
        &mut self,
        key: &FieldDescriptor,
        value: &FieldDescriptor,
    ) -> Result<Value<'input>> {
        log::trace!("deserialize_key_value_array");
        match self.cursor.peek() {
            Some(b'[') => {}
            Some(b) => return Err(self.mismatch("an array", b)),
            None => return Err(self.cursor.eof("an array")),
        }
        let entry = Schema::new(vec![key.clone(), value.clone()]);
        self.nested(|de| {
            let mut pairs: Vec<(Value<'input>, Value<'input>)> = Vec::new();
            de.deserialize_elements(&mut pairs, |de| {
                de.cursor.trim_leading_whitespace();
                match de.cursor.peek() {
                    Some(b'{') => {}
                    Some(b) => return Err(de.mismatch("an object", b)),
                    None => return Err(de.cursor.eof("an object")),
                }
                let mut members = de.nested(|de| de.deserialize_members(&entry))?.into_iter();
                let k = members.next().unwrap_or(Value::Null);
                let v = members.next().unwrap_or(Value::Null);
                Ok((k, v))
            })?;
            Ok(Value::Map(pairs))
        })
    }

    fn deserialize_custom(
        &mut self,
        encoding: CustomEncoding,
        fns: &CustomFns,
    ) -> Result<Value<'input>> {
        log::trace!("deserialize_custom: {encoding:?}");
        let (text, span) = match encoding {
            CustomEncoding::String => {
                let s = self.expect_string("a string")?;
                let text = decode_string(
                    self.cursor.text(s.span),
                    s.escaped,
                    s.span.start,
                    Default::default(),
                )?;
                (text, s.span)
            }
            CustomEncoding::Literal => {
                let span = scan_literal(&mut self.cursor)?;
                (self.raw_text(span)?, span)
            }
            CustomEncoding::Any => {
                let span = scan_value(&mut self.cursor)?;
                (self.raw_text(span)?, span)
            }
        };
        (fns.parse)(&text)
            .map_err(|message| JsonError::new(JsonErrorKind::InvalidValue { message }, span))
    }

    fn raw_text(&self, span: Span) -> Result<Cow<'input, str>> {
        core::str::from_utf8(self.cursor.text(span))
            .map(Cow::Borrowed)
            .map_err(|e| JsonError::at(JsonErrorKind::InvalidUtf8, span.start + e.valid_up_to()))
    }

    /// Pick the first alternative whose JSON type matches the leading byte.
    fn deserialize_untagged(&mut self, alternatives: &[FieldDescriptor]) -> Result<Value<'input>> {
        log::trace!("deserialize_untagged: {} alternatives", alternatives.len());
        let Some(b) = self.cursor.peek() else {
            return Err(self.cursor.eof("a variant"));
        };
        let index = alternatives
            .iter()
            .position(|alt| accepts(alt, b))
            .ok_or_else(|| {
                self.cursor.error(JsonErrorKind::UnknownVariantTag {
                    tag: json_type_name(b).to_string(),
                })
            })?;
        self.deserialize_alternative(alternatives, index)
    }

    fn deserialize_tagged(
        &mut self,
        name: &str,
        alternatives: &[FieldDescriptor],
        discriminator: &Discriminator,
    ) -> Result<Value<'input>> {
        log::trace!("deserialize_tagged: {name}");
        match discriminator {
            Discriminator::Submember { tag, switcher } => {
                match self.cursor.peek() {
                    Some(b'{') => {}
                    Some(b) => return Err(self.mismatch("an object", b)),
                    None => return Err(self.cursor.eof("an object")),
                }
                let start = self.cursor.pos();
                let found = find_member(
                    self.cursor,
                    &tag.name,
                    self.options.allow_escaped_names,
                )?;
                let tag_value = match found {
                    Some(span) => {
                        let sub = self.cursor.slice_span(span);
                        self.with_cursor(sub, |de| de.deserialize_value(tag))?
                    }
                    None if tag.is_nullable() => Value::Null,
                    None => {
                        return Err(JsonError::at(
                            JsonErrorKind::MissingRequiredField {
                                field: tag.name.clone(),
                                object_start: Some(Span::new(start, 1)),
                                object_end: None,
                            },
                            start,
                        ));
                    }
                };
                let selected = select(*switcher, &tag_value, Span::new(start, 1))?;
                self.deserialize_alternative(alternatives, selected)
            }
            Discriminator::Member { .. } | Discriminator::Classifier(_) => {
                Err(self.cursor.error(JsonErrorKind::InvalidValue {
                    message: format!(
                        "variant `{name}` is selected by its enclosing object and cannot be parsed on its own"
                    ),
                }))
            }
        }
    }
}

fn select(switcher: Switcher, tag: &Value<'_>, span: Span) -> Result<usize> {
    switcher(tag).ok_or_else(|| {
        JsonError::new(
            JsonErrorKind::UnknownVariantTag {
                tag: describe_value(tag),
            },
            span,
        )
    })
}

/// Whether an untagged alternative can hold a value starting with `b`.
fn accepts(alternative: &FieldDescriptor, b: u8) -> bool {
    if b == b'n' {
        return alternative.is_nullable();
    }
    match &alternative.base().kind {
        Kind::Number(opts) => {
            b == b'-' || b.is_ascii_digit() || (b == b'"' && opts.literal_as_string != LiteralAsString::Never)
        }
        Kind::Bool(_) => b == b't' || b == b'f',
        Kind::String(_) | Kind::StringRaw(_) | Kind::Date => b == b'"',
        Kind::Class(_) | Kind::KeyValue { .. } => b == b'{',
        Kind::Array(_) | Kind::KeyValueArray { .. } => b == b'[',
        Kind::Custom { encoding, .. } => match encoding {
            CustomEncoding::String => b == b'"',
            CustomEncoding::Literal => !matches!(b, b'"' | b'{' | b'['),
            CustomEncoding::Any => true,
        },
        Kind::VariantTagged {
            discriminator: Discriminator::Submember { .. },
            ..
        } => b == b'{',
        Kind::Variant(alternatives) => alternatives.iter().any(|alt| accepts(alt, b)),
        Kind::Null { .. } | Kind::VariantTagged { .. } => false,
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Parse `input` as the value described by `desc`.
///
/// # Examples
///
/// ```rust
/// use jsonlink::{FieldDescriptor, Schema, Value, parse};
///
/// let desc = FieldDescriptor::class("", Schema::new(vec![
///     FieldDescriptor::signed("i"),
///     FieldDescriptor::boolean("b"),
/// ]));
/// let value = parse(&desc, br#"{"b": true, "i": 55}"#).unwrap();
/// assert_eq!(value, Value::Class(vec![Value::Signed(55), Value::Bool(true)]));
/// ```
pub fn parse<'input>(desc: &FieldDescriptor, input: &'input [u8]) -> Result<Value<'input>> {
    parse_with_options(desc, input, ParseOptions::default())
}

/// Parse with explicit [`ParseOptions`].
pub fn parse_with_options<'input>(
    desc: &FieldDescriptor,
    input: &'input [u8],
    options: ParseOptions,
) -> Result<Value<'input>> {
    let mut deserializer = JsonDeserializer::new(input, options);
    let value = deserializer.deserialize_value(desc)?;
    deserializer.finish()?;
    Ok(value)
}

/// Deserialize JSON from a byte slice.
///
/// Note: For rich error diagnostics with source code display, prefer [`from_str`]
/// which can attach the source string to errors.
pub fn from_slice<'input, T: FromJson<'input>>(input: &'input [u8]) -> Result<T> {
    from_slice_inner(input, None, ParseOptions::default())
}

/// Deserialize JSON from a byte slice with explicit options.
pub fn from_slice_with_options<'input, T: FromJson<'input>>(
    input: &'input [u8],
    options: ParseOptions,
) -> Result<T> {
    from_slice_inner(input, None, options)
}

/// Deserialize JSON from a UTF-8 string slice.
///
/// Errors from this function include source code context for rich diagnostic display
/// when using [`miette`]'s reporting features.
pub fn from_str<'input, T: FromJson<'input>>(input: &'input str) -> Result<T> {
    from_str_with_options(input, ParseOptions::default())
}

/// Deserialize JSON from a UTF-8 string slice with explicit options.
pub fn from_str_with_options<'input, T: FromJson<'input>>(
    input: &'input str,
    options: ParseOptions,
) -> Result<T> {
    let input_bytes = input.as_bytes();

    // Handle BOM
    if input_bytes.starts_with(&[0xef, 0xbb, 0xbf]) {
        return from_slice_inner(&input_bytes[3..], Some(&input[3..]), options);
    }
    from_slice_inner(input_bytes, Some(input), options)
}

fn from_slice_inner<'input, T: FromJson<'input>>(
    input: &'input [u8],
    source: Option<&str>,
    options: ParseOptions,
) -> Result<T> {
    let desc = T::descriptor();
    parse_with_options(&desc, input, options)
        .and_then(T::from_value)
        .map_err(|mut e| {
            if let Some(src) = source {
                e.source_code = Some(src.to_string());
            }
            e
        })
}
