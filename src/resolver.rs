//! Out-of-order member resolution.
//!
//! [`MemberResolver`] walks one object left to right exactly once, no matter
//! in which order the schema asks for its members. Every member it passes is
//! scanned with the value scanner and, if the schema declares it, its span is
//! cached in a [`LocatedSpan`] slot. Asking for a member that was already
//! passed is a slot lookup; asking for one further on resumes the sweep
//! where it stopped.

use std::borrow::Cow;

use log::trace;

use crate::cursor::{Cursor, describe_byte};
use crate::error::{JsonError, JsonErrorKind, Result, find_similar_field};
use crate::escape::unescape;
use crate::options::ParseOptions;
use crate::schema::Schema;
use crate::skip::{scan_string, scan_value};
use crate::span::{LocatedSpan, Span};

/// One step of a sweep over an object.
#[derive(Debug)]
pub(crate) enum Member<'a> {
    Entry {
        name: Cow<'a, str>,
        /// The name including its quotes
        name_span: Span,
        value: Span,
    },
    /// The closing `}` at this offset was consumed
    End(usize),
}

/// Read the next `"name": value` pair, or the closing brace.
///
/// The cursor must be inside the object, before a member or the `}`. A
/// trailing comma before `}` is accepted.
pub(crate) fn next_member<'a>(cursor: &mut Cursor<'a>, escaped_names: bool) -> Result<Member<'a>> {
    cursor.trim_leading_whitespace();
    match cursor.peek() {
        None => Err(cursor.eof("'}'")),
        Some(b'}') => {
            let at = cursor.pos();
            cursor.remove_prefix(1);
            Ok(Member::End(at))
        }
        Some(b'"') => {
            let name_start = cursor.pos();
            let s = scan_string(cursor)?;
            let name_span = Span::from_range(name_start, cursor.pos());
            let raw = core::str::from_utf8(cursor.text(s.span))
                .map_err(|e| JsonError::at(JsonErrorKind::InvalidUtf8, s.span.start + e.valid_up_to()))?;
            let name = if s.escaped && escaped_names {
                Cow::Owned(unescape(raw, s.span.start)?)
            } else {
                Cow::Borrowed(raw)
            };

            cursor.trim_leading_whitespace();
            cursor.expect(b':', "':'")?;
            cursor.trim_leading_whitespace();
            let value = scan_value(cursor)?;

            cursor.trim_leading_whitespace();
            match cursor.peek() {
                Some(b',') => cursor.remove_prefix(1),
                Some(b'}') => {}
                Some(b) => {
                    return Err(cursor.error(JsonErrorKind::UnexpectedToken {
                        got: describe_byte(b),
                        expected: "',' or '}'",
                    }));
                }
                None => return Err(cursor.eof("'}'")),
            }
            Ok(Member::Entry {
                name,
                name_span,
                value,
            })
        }
        Some(b) => Err(cursor.error(JsonErrorKind::UnexpectedToken {
            got: describe_byte(b),
            expected: "a member name or '}'",
        })),
    }
}

/// Locates the declared members of one object.
pub(crate) struct MemberResolver<'s, 'a> {
    schema: &'s Schema,
    cursor: Cursor<'a>,
    slots: Vec<LocatedSpan>,
    exact: bool,
    escaped_names: bool,
    start: usize,
    end: Option<usize>,
}

impl<'s, 'a> MemberResolver<'s, 'a> {
    /// Start resolving the object whose `{` is at the cursor.
    pub fn new(schema: &'s Schema, cursor: Cursor<'a>, options: &ParseOptions) -> Result<Self> {
        let mut cursor = cursor;
        let start = cursor.pos();
        cursor.expect(b'{', "'{'")?;
        Ok(MemberResolver {
            schema,
            cursor,
            slots: (0..schema.len()).map(LocatedSpan::missing).collect(),
            exact: options.exact_mappings,
            escaped_names: options.allow_escaped_names,
            start,
            end: None,
        })
    }

    /// Span of the value of field `index`, or `None` if the object ends
    /// without it.
    pub fn locate(&mut self, index: usize) -> Result<Option<Span>> {
        if let Some(span) = self.slots[index].get() {
            return Ok(Some(span));
        }
        while self.end.is_none() {
            if self.advance()? == Some(index) {
                return Ok(self.slots[index].get());
            }
        }
        Ok(None)
    }

    /// Sweep to the closing brace and return a cursor just past it.
    pub fn finish(mut self) -> Result<Cursor<'a>> {
        while self.end.is_none() {
            self.advance()?;
        }
        Ok(self.cursor)
    }

    /// The error for a required field that [`MemberResolver::locate`] did
    /// not find. Points at the closing brace.
    pub fn missing(&self, index: usize) -> JsonError {
        let field = self
            .schema
            .field(index)
            .map(|f| f.name.clone())
            .unwrap_or_default();
        let end = self.end.map(|at| Span::new(at, 1));
        JsonError {
            kind: JsonErrorKind::MissingRequiredField {
                field,
                object_start: Some(Span::new(self.start, 1)),
                object_end: end,
            },
            span: end,
            source_code: None,
        }
    }

    /// Consume one member. Returns the slot it filled, if any.
    fn advance(&mut self) -> Result<Option<usize>> {
        match next_member(&mut self.cursor, self.escaped_names)? {
            Member::End(at) => {
                self.end = Some(at);
                Ok(None)
            }
            Member::Entry {
                name,
                name_span,
                value,
            } => match self.schema.index_of(&name) {
                Some(idx) if !self.slots[idx].found => {
                    let slot = &mut self.slots[idx];
                    slot.span = value;
                    slot.found = true;
                    Ok(Some(idx))
                }
                Some(_) => {
                    trace!("ignoring duplicate member `{name}`");
                    Ok(None)
                }
                None if self.exact => {
                    let expected = self.schema.names();
                    let suggestion = find_similar_field(&name, &expected);
                    Err(JsonError::new(
                        JsonErrorKind::UnexpectedMember {
                            field: name.into_owned(),
                            expected,
                            suggestion,
                        },
                        name_span,
                    ))
                }
                None => {
                    trace!("skipping unknown member `{name}`");
                    Ok(None)
                }
            },
        }
    }
}

/// Find a single member by name without a schema. The cursor must be on the
/// object's `{`.
pub(crate) fn find_member(cursor: Cursor<'_>, name: &str, escaped_names: bool) -> Result<Option<Span>> {
    let mut cursor = cursor;
    cursor.expect(b'{', "'{'")?;
    loop {
        match next_member(&mut cursor, escaped_names)? {
            Member::End(_) => return Ok(None),
            Member::Entry {
                name: found, value, ..
            } if found == name => return Ok(Some(value)),
            Member::Entry { .. } => {}
        }
    }
}
