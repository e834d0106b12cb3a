//! Value scanning: find the extent of a JSON value without parsing it.
//!
//! Out-of-order member resolution depends entirely on these routines: a
//! member that the schema does not ask for yet is stepped over with
//! [`skip_value`], and only its span is remembered. Strings are scanned
//! escape-aware, and bracket counting ignores anything inside strings.

use crate::cursor::{Cursor, describe_byte};
use crate::error::{JsonError, JsonErrorKind, Result};
use crate::options::CommentPolicy;
use crate::span::Span;

/// Scan the value at the cursor, then step over trailing whitespace and at
/// most one `,`.
///
/// The cursor must sit on the first byte of the value. A closing `}` or `]`
/// after the value is left in place for the caller.
pub fn skip_value(cursor: &mut Cursor<'_>) -> Result<Span> {
    let span = scan_value(cursor)?;
    skip_comma(cursor);
    Ok(span)
}

/// Scan the value at the cursor and leave the cursor just past it.
pub(crate) fn scan_value(cursor: &mut Cursor<'_>) -> Result<Span> {
    let start = cursor.pos();
    match cursor.peek() {
        None => Err(cursor.eof("a value")),
        Some(b'"') => {
            scan_string(cursor)?;
            Ok(Span::from_range(start, cursor.pos()))
        }
        Some(b'{' | b'[') => scan_bracketed(cursor),
        Some(b @ (b',' | b':' | b'}' | b']')) => Err(cursor.error(JsonErrorKind::UnexpectedToken {
            got: describe_byte(b),
            expected: "a value",
        })),
        Some(_) => scan_literal(cursor),
    }
}

/// Trim whitespace, consume one `,` if present, and trim again.
pub(crate) fn skip_comma(cursor: &mut Cursor<'_>) {
    cursor.trim_leading_whitespace();
    if cursor.peek() == Some(b',') {
        cursor.remove_prefix(1);
        cursor.trim_leading_whitespace();
    }
}

/// Contents of a scanned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringSpan {
    /// Bytes between the quotes
    pub span: Span,
    /// Whether a backslash occurs inside
    pub escaped: bool,
}

/// Scan a string starting at its opening quote. The cursor ends just past
/// the closing quote.
pub(crate) fn scan_string(cursor: &mut Cursor<'_>) -> Result<StringSpan> {
    let open = cursor.pos();
    cursor.expect(b'"', "'\"'")?;
    let body = cursor.remaining();
    let mut escaped = false;
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'"' => {
                cursor.remove_prefix(i + 1);
                return Ok(StringSpan {
                    span: Span::new(open + 1, i),
                    escaped,
                });
            }
            b'\\' => {
                escaped = true;
                i += 2;
            }
            _ => i += 1,
        }
    }
    Err(JsonError::new(
        JsonErrorKind::InvalidStructure {
            reason: "unterminated string",
        },
        Span::new(open, cursor.end() - open),
    ))
}

/// Scan a bare literal (number, `true`, `false`, `null`) up to the next
/// delimiter, whitespace or comment.
pub(crate) fn scan_literal(cursor: &mut Cursor<'_>) -> Result<Span> {
    let start = cursor.pos();
    let comments = cursor.comments();
    let len = cursor
        .remaining()
        .iter()
        .position(|&b| is_literal_end(b, comments))
        .unwrap_or(cursor.end() - start);
    if len == 0 {
        return Err(match cursor.peek() {
            Some(b) => cursor.error(JsonErrorKind::UnexpectedToken {
                got: describe_byte(b),
                expected: "a value",
            }),
            None => cursor.eof("a value"),
        });
    }
    cursor.remove_prefix(len);
    Ok(Span::new(start, len))
}

#[inline]
fn is_literal_end(b: u8, comments: CommentPolicy) -> bool {
    match b {
        b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r' => true,
        b'/' => comments == CommentPolicy::Cpp,
        b'#' => comments == CommentPolicy::Hash,
        _ => false,
    }
}

/// Scan an object or array by counting brackets. Quotes, escapes and
/// comments are honoured so that brackets inside them do not count.
fn scan_bracketed(cursor: &mut Cursor<'_>) -> Result<Span> {
    let start = cursor.pos();
    let comments = cursor.comments();
    let bytes = cursor.remaining();
    let mut braces: usize = 0;
    let mut brackets: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        Some(b'"') => break,
                        Some(b'\\') => i += 2,
                        Some(_) => i += 1,
                        None => {
                            return Err(JsonError::new(
                                JsonErrorKind::InvalidStructure {
                                    reason: "unterminated string",
                                },
                                Span::from_range(start, cursor.end()),
                            ));
                        }
                    }
                }
            }
            b'{' => braces += 1,
            b'[' => brackets += 1,
            b'}' | b']' => {
                let counter = if bytes[i] == b'}' {
                    &mut braces
                } else {
                    &mut brackets
                };
                if *counter == 0 {
                    return Err(JsonError::at(
                        JsonErrorKind::InvalidStructure {
                            reason: "unbalanced brackets",
                        },
                        start + i,
                    ));
                }
                *counter -= 1;
                if braces == 0 && brackets == 0 {
                    cursor.remove_prefix(i + 1);
                    return Ok(Span::new(start, i + 1));
                }
            }
            b'/' if comments == CommentPolicy::Cpp => match bytes.get(i + 1) {
                Some(b'/') => i = skip_to_newline(bytes, i),
                Some(b'*') => {
                    i = match bytes[i + 2..].windows(2).position(|w| w == b"*/") {
                        Some(idx) => i + 2 + idx + 1,
                        None => bytes.len(),
                    };
                }
                _ => {}
            },
            b'#' if comments == CommentPolicy::Hash => i = skip_to_newline(bytes, i),
            _ => {}
        }
        i += 1;
    }
    Err(JsonError::new(
        JsonErrorKind::InvalidStructure {
            reason: "unbalanced brackets",
        },
        Span::from_range(start, cursor.end()),
    ))
}

fn skip_to_newline(bytes: &[u8], from: usize) -> usize {
    match crate::cursor::find_byte(b'\n', &bytes[from..]) {
        Some(idx) => from + idx,
        None => bytes.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(input: &str) -> Vec<String> {
        let mut c = Cursor::new(input.as_bytes(), CommentPolicy::None);
        c.trim_leading_whitespace();
        let mut out = Vec::new();
        while !c.is_empty() {
            let span = skip_value(&mut c).unwrap();
            out.push(String::from_utf8(c.text(span).to_vec()).unwrap());
        }
        out
    }

    #[test]
    fn skips_each_kind_of_value() {
        assert_eq!(
            spans(r#"1, -2.5e3 ,true,null, "s", [1,[2]], {"a":{"b":[]}}"#),
            vec!["1", "-2.5e3", "true", "null", "\"s\"", "[1,[2]]", r#"{"a":{"b":[]}}"#]
        );
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        assert_eq!(
            spans(r#"{"a":"}]{[", "b":"\"}"}, 2"#),
            vec![r#"{"a":"}]{[", "b":"\"}"}"#, "2"]
        );
    }

    #[test]
    fn escaped_quotes_and_backslashes() {
        assert_eq!(
            spans(r#""a\"b", "c\\", "d""#),
            vec![r#""a\"b""#, r#""c\\""#, r#""d""#]
        );
    }

    #[test]
    fn closing_bracket_is_left_for_the_caller() {
        let mut c = Cursor::new(b"12 }", CommentPolicy::None);
        let span = skip_value(&mut c).unwrap();
        assert_eq!(span, Span::new(0, 2));
        assert_eq!(c.peek(), Some(b'}'));
    }

    #[test]
    fn trailing_comma_is_consumed_once() {
        let mut c = Cursor::new(b"1 , , 2", CommentPolicy::None);
        skip_value(&mut c).unwrap();
        assert_eq!(c.peek(), Some(b','));
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let mut c = Cursor::new(br#""abc\""#, CommentPolicy::None);
        let err = skip_value(&mut c).unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::InvalidStructure { .. }));
    }

    #[test]
    fn unbalanced_brackets_are_fatal() {
        for input in [&b"[1, 2"[..], b"{\"a\": [}", b"[\"]\""] {
            let mut c = Cursor::new(input, CommentPolicy::None);
            let err = skip_value(&mut c).unwrap_err();
            assert!(
                matches!(err.kind, JsonErrorKind::InvalidStructure { .. }),
                "{:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn comments_inside_containers() {
        let input = b"[1, /* ] */ 2 // ]\n, 3]";
        let mut c = Cursor::new(input, CommentPolicy::Cpp);
        let span = skip_value(&mut c).unwrap();
        assert_eq!(span.len, input.len());
        assert!(c.is_empty());
    }

    #[test]
    fn value_cannot_start_with_delimiter() {
        let mut c = Cursor::new(b", 1", CommentPolicy::None);
        let err = skip_value(&mut c).unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::UnexpectedToken { .. }));
    }
}
