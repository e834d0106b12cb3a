//! Member paths: parse one nested value out of a larger document.
//!
//! A path such as `a.b[2].c` names members with `.` and array elements with
//! `[n]`. Everything on the way to the target is stepped over with the value
//! scanner, so only the selected value is actually parsed. A `\` escapes the
//! next character, which allows member names containing `.` or `[`.

use crate::cursor::{Cursor, describe_byte};
use crate::deserialize::JsonDeserializer;
use crate::error::{JsonError, JsonErrorKind, Result};
use crate::link::FromJson;
use crate::options::ParseOptions;
use crate::resolver::find_member;
use crate::schema::FieldDescriptor;
use crate::skip::scan_value;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Member(String),
    Index(usize),
}

fn parse_path(path: &str) -> Result<Vec<Segment>> {
    let invalid = || {
        JsonError::without_span(JsonErrorKind::InvalidPath {
            path: path.to_string(),
        })
    };
    let mut segments = Vec::new();
    let mut name = String::new();
    // `.` was just consumed and a member name must follow
    let mut need_name = false;
    let mut after_index = false;
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !name.is_empty() {
                    segments.push(Segment::Member(core::mem::take(&mut name)));
                } else if !after_index {
                    return Err(invalid());
                }
                after_index = false;
                need_name = true;
            }
            '[' => {
                if !name.is_empty() {
                    segments.push(Segment::Member(core::mem::take(&mut name)));
                } else if need_name {
                    return Err(invalid());
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) => digits.push(d),
                        None => return Err(invalid()),
                    }
                }
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let index = digits.parse().map_err(|_| invalid())?;
                segments.push(Segment::Index(index));
                after_index = true;
                need_name = false;
            }
            _ if after_index => return Err(invalid()),
            '\\' => {
                name.push(chars.next().ok_or_else(invalid)?);
                need_name = false;
            }
            c => {
                name.push(c);
                need_name = false;
            }
        }
    }
    if !name.is_empty() {
        segments.push(Segment::Member(name));
    } else if need_name {
        return Err(invalid());
    }
    Ok(segments)
}

/// Walk `segments` from the value at `cursor` and return a cursor bounded
/// to the target value.
fn locate<'a>(mut cursor: Cursor<'a>, segments: &[Segment], path: &str) -> Result<Cursor<'a>> {
    let not_found = |pos: usize| {
        JsonError::at(
            JsonErrorKind::PathNotFound {
                path: path.to_string(),
            },
            pos,
        )
    };

    for segment in segments {
        cursor.trim_leading_whitespace();
        let pos = cursor.pos();
        let span = match segment {
            Segment::Member(name) => {
                if cursor.peek() != Some(b'{') {
                    return Err(not_found(pos));
                }
                find_member(cursor, name, true)?.ok_or_else(|| not_found(pos))?
            }
            Segment::Index(n) => {
                if cursor.peek() != Some(b'[') {
                    return Err(not_found(pos));
                }
                cursor.remove_prefix(1);
                cursor.trim_leading_whitespace();
                for _ in 0..*n {
                    if matches!(cursor.peek(), None | Some(b']')) {
                        return Err(not_found(pos));
                    }
                    scan_value(&mut cursor)?;
                    element_separator(&mut cursor)?;
                }
                if matches!(cursor.peek(), None | Some(b']')) {
                    return Err(not_found(pos));
                }
                scan_value(&mut cursor)?
            }
        };
        log::trace!("path: {segment:?} at {}..{}", span.start, span.end());
        cursor = cursor.slice_span(span);
    }
    Ok(cursor)
}

/// Step over the `,` after a skipped element, or stop before `]`.
fn element_separator(cursor: &mut Cursor<'_>) -> Result<()> {
    cursor.trim_leading_whitespace();
    match cursor.peek() {
        Some(b',') => {
            cursor.remove_prefix(1);
            cursor.trim_leading_whitespace();
            Ok(())
        }
        Some(b']') => Ok(()),
        Some(b) => Err(cursor.error(JsonErrorKind::UnexpectedToken {
            got: describe_byte(b),
            expected: "',' or ']'",
        })),
        None => Err(cursor.eof("']'")),
    }
}

/// Parse the value found at `path` inside `input`.
///
/// An empty path selects the root value.
///
/// ```rust
/// use jsonlink::{FieldDescriptor, ParseOptions, Value, parse_at};
///
/// let input = br#"{"servers": [{"port": 80}, {"port": 8080}]}"#;
/// let port = parse_at(
///     &FieldDescriptor::unsigned(""),
///     input,
///     "servers[1].port",
///     ParseOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(port, Value::Unsigned(8080));
/// ```
pub fn parse_at<'input>(
    desc: &FieldDescriptor,
    input: &'input [u8],
    path: &str,
    options: ParseOptions,
) -> Result<Value<'input>> {
    let segments = parse_path(path)?;
    let target = locate(Cursor::new(input, options.comments), &segments, path)?;
    let mut deserializer = JsonDeserializer::over(input, target.pos(), target.end(), options);
    let value = deserializer.deserialize_value(desc)?;
    deserializer.finish()?;
    Ok(value)
}

/// Deserialize the value found at `path` inside `input`.
pub fn from_slice_at<'input, T: FromJson<'input>>(input: &'input [u8], path: &str) -> Result<T> {
    let desc = T::descriptor();
    parse_at(&desc, input, path, ParseOptions::default()).and_then(T::from_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> Segment {
        Segment::Member(name.to_string())
    }

    #[test]
    fn path_grammar() {
        assert_eq!(parse_path("").unwrap(), vec![]);
        assert_eq!(
            parse_path("a.b[2].c").unwrap(),
            vec![member("a"), member("b"), Segment::Index(2), member("c")]
        );
        assert_eq!(
            parse_path("[0][1]").unwrap(),
            vec![Segment::Index(0), Segment::Index(1)]
        );
        assert_eq!(parse_path(r"a\.b").unwrap(), vec![member("a.b")]);
    }

    #[test]
    fn malformed_paths() {
        for path in [".a", "a.", "a..b", "a[", "a[x]", "a[]", "a[0]b", "a.[0]", "a\\"] {
            let err = parse_path(path).unwrap_err();
            assert!(
                matches!(err.kind, JsonErrorKind::InvalidPath { .. }),
                "{path}: {err:?}"
            );
        }
    }

    #[test]
    fn finds_nested_values() {
        let input = br#"{"a": {"skip": [1, {"b": 2}], "b": [10, 20, {"c": "deep"}]}}"#;
        let s: String = from_slice_at(input, "a.b[2].c").unwrap();
        assert_eq!(s, "deep");
        let n: i64 = from_slice_at(input, "a.b[1]").unwrap();
        assert_eq!(n, 20);
    }

    #[test]
    fn missing_members_and_indices() {
        let input = br#"{"a": [1, 2]}"#;
        let err = from_slice_at::<i64>(input, "a[2]").unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::PathNotFound { .. }));
        assert_eq!(err.offset(), Some(6));

        let err = from_slice_at::<i64>(input, "b").unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::PathNotFound { .. }));
        assert_eq!(err.offset(), Some(0));

        let err = from_slice_at::<i64>(input, "a.x").unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::PathNotFound { .. }));
    }

    #[test]
    fn skipped_elements_need_separators() {
        let err = from_slice_at::<i64>(b"[1 2]", "[1]").unwrap_err();
        assert_eq!(
            err.kind,
            JsonErrorKind::UnexpectedToken {
                got: "'2'".into(),
                expected: "',' or ']'",
            }
        );
        assert_eq!(err.offset(), Some(3));

        assert_eq!(from_slice_at::<i64>(b"[1 , 2]", "[1]").unwrap(), 2);
        let err = from_slice_at::<i64>(b"[1,]", "[1]").unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::PathNotFound { .. }));
    }

    #[test]
    fn empty_path_is_the_root() {
        let v: Vec<u8> = from_slice_at(b" [1, 2] ", "").unwrap();
        assert_eq!(v, [1, 2]);
    }
}
