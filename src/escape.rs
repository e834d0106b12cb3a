//! String escaping and unescaping.

use std::borrow::Cow;

use crate::JsonWrite;
use crate::error::{JsonError, JsonErrorKind, Result, SerializeError};
use crate::options::RestrictedStringOutput;
use crate::schema::EightBitMode;
use crate::span::Span;

/// Decode the body of a JSON string (the bytes between the quotes).
///
/// `base` is the absolute offset of `body` in the input and is only used for
/// error positions. When the body holds no escapes the result borrows from
/// the input.
pub fn decode_string<'a>(
    body: &'a [u8],
    escaped: bool,
    base: usize,
    eight_bit: EightBitMode,
) -> Result<Cow<'a, str>> {
    if eight_bit == EightBitMode::DisallowHigh {
        if let Some(idx) = body.iter().position(|&b| b >= 0x80) {
            return Err(JsonError::at(JsonErrorKind::InvalidStringHighAscii, base + idx));
        }
    }
    let text = core::str::from_utf8(body)
        .map_err(|e| JsonError::at(JsonErrorKind::InvalidUtf8, base + e.valid_up_to()))?;
    if !escaped {
        return Ok(Cow::Borrowed(text));
    }
    unescape(text, base).map(Cow::Owned)
}

/// Replace every escape sequence in `text` with the character it denotes.
pub fn unescape(text: &str, base: usize) -> Result<String> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut run_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        out.push_str(&text[run_start..i]);
        let esc_at = i;
        let Some(&code) = bytes.get(i + 1) else {
            return Err(JsonError::at(JsonErrorKind::InvalidUtfEscape, base + esc_at));
        };
        i += 2;
        match code {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let high = read_hex4(bytes, i, base + esc_at)?;
                i += 4;
                let scalar = match high {
                    0xD800..=0xDBFF => {
                        if bytes.get(i) != Some(&b'\\') || bytes.get(i + 1) != Some(&b'u') {
                            return Err(JsonError::new(
                                JsonErrorKind::InvalidUtfCodepoint { code: high },
                                Span::new(base + esc_at, 6),
                            ));
                        }
                        let low = read_hex4(bytes, i + 2, base + i)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(JsonError::new(
                                JsonErrorKind::InvalidUtfCodepoint { code: low },
                                Span::new(base + i, 6),
                            ));
                        }
                        i += 6;
                        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => {
                        return Err(JsonError::new(
                            JsonErrorKind::InvalidUtfCodepoint { code: high },
                            Span::new(base + esc_at, 6),
                        ));
                    }
                    _ => high,
                };
                match char::from_u32(scalar) {
                    Some(c) => out.push(c),
                    None => {
                        return Err(JsonError::new(
                            JsonErrorKind::InvalidUtfCodepoint { code: scalar },
                            Span::new(base + esc_at, i - esc_at),
                        ));
                    }
                }
            }
            _ => {
                return Err(JsonError::new(
                    JsonErrorKind::InvalidUtfEscape,
                    Span::new(base + esc_at, 2),
                ));
            }
        }
        run_start = i;
    }
    out.push_str(&text[run_start..]);
    Ok(out)
}

fn read_hex4(bytes: &[u8], at: usize, err_pos: usize) -> Result<u32> {
    let digits = bytes
        .get(at..at + 4)
        .ok_or_else(|| JsonError::at(JsonErrorKind::InvalidUtfEscape, err_pos))?;
    let mut value = 0u32;
    for &d in digits {
        let nibble = match d {
            b'0'..=b'9' => d - b'0',
            b'a'..=b'f' => d - b'a' + 10,
            b'A'..=b'F' => d - b'A' + 10,
            _ => {
                return Err(JsonError::new(
                    JsonErrorKind::InvalidUtfEscape,
                    Span::new(err_pos, 6),
                ));
            }
        };
        value = (value << 4) | u32::from(nibble);
    }
    Ok(value)
}

const HEX: &[u8; 16] = b"0123456789abcdef";

fn write_u_escape<W: JsonWrite + ?Sized>(
    writer: &mut W,
    unit: u16,
) -> core::result::Result<(), SerializeError> {
    let buf = [
        b'\\',
        b'u',
        HEX[usize::from(unit >> 12)],
        HEX[usize::from((unit >> 8) & 0xF)],
        HEX[usize::from((unit >> 4) & 0xF)],
        HEX[usize::from(unit & 0xF)],
    ];
    writer.write(&buf)
}

/// Write the escaped form of `s` (without surrounding quotes).
///
/// Quotes, backslashes and control characters are always escaped. With
/// [`RestrictedStringOutput::SevenBit`] everything outside printable ASCII is
/// written as `\uXXXX`, using surrogate pairs above U+FFFF.
pub fn write_escaped<W: JsonWrite + ?Sized>(
    writer: &mut W,
    s: &str,
    restricted: RestrictedStringOutput,
) -> core::result::Result<(), SerializeError> {
    let seven_bit = restricted == RestrictedStringOutput::SevenBit;
    let bytes = s.as_bytes();
    let mut run_start = 0;
    for (idx, c) in s.char_indices() {
        let short = match c {
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\t' => Some("\\t"),
            '\u{8}' => Some("\\b"),
            '\u{c}' => Some("\\f"),
            _ => None,
        };
        let needs_u = (c as u32) < 0x20 || (seven_bit && (c as u32) > 0x7E);
        if short.is_none() && !needs_u {
            continue;
        }
        writer.write(&bytes[run_start..idx])?;
        run_start = idx + c.len_utf8();
        if let Some(seq) = short {
            writer.write(seq.as_bytes())?;
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write_u_escape(writer, *unit)?;
            }
        }
    }
    writer.write(&bytes[run_start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(s: &str, restricted: RestrictedStringOutput) -> String {
        let mut out = Vec::new();
        write_escaped(&mut out, s, restricted).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(
            unescape(r#"a\"b\\c\/d\b\f\n\r\t"#, 0).unwrap(),
            "a\"b\\c/d\u{8}\u{c}\n\r\t"
        );
    }

    #[test]
    fn unicode_escapes_and_surrogates() {
        assert_eq!(unescape(r"\u00e9\u4E2D", 0).unwrap(), "é中");
        assert_eq!(unescape(r"x\ud83d\ude00y", 0).unwrap(), "x😀y");
    }

    #[test]
    fn broken_surrogates_are_rejected() {
        let err = unescape(r"\ud83dx", 0).unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidUtfCodepoint { code: 0xD83D });
        let err = unescape(r"\ude00", 0).unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidUtfCodepoint { code: 0xDE00 });
        let err = unescape(r"\ud83d\u0041", 0).unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidUtfCodepoint { code: 0x41 });
    }

    #[test]
    fn bad_escapes_report_their_offset() {
        let err = unescape(r"ab\q", 10).unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidUtfEscape);
        assert_eq!(err.offset(), Some(12));
        let err = unescape(r"\u12", 0).unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidUtfEscape);
    }

    #[test]
    fn decode_borrows_when_unescaped() {
        let body = b"plain";
        assert!(matches!(
            decode_string(body, false, 0, EightBitMode::AllowFull).unwrap(),
            Cow::Borrowed("plain")
        ));
    }

    #[test]
    fn eight_bit_restriction() {
        let body = "caf\u{e9}".as_bytes();
        let err = decode_string(body, false, 5, EightBitMode::DisallowHigh).unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidStringHighAscii);
        assert_eq!(err.offset(), Some(8));
    }

    #[test]
    fn escape_output() {
        assert_eq!(
            escaped("a\"b\\\n\u{1}é", RestrictedStringOutput::None),
            "a\\\"b\\\\\\n\\u0001é"
        );
        assert_eq!(escaped("é😀", RestrictedStringOutput::SevenBit), "\\u00e9\\ud83d\\ude00");
    }

    #[test]
    fn escape_round_trip_over_scalars() {
        let samples = [
            '\0', '\u{1f}', ' ', '"', '\\', '~', '\u{7f}', '\u{80}', '\u{7ff}', '\u{800}',
            '\u{d7ff}', '\u{e000}', '\u{fffd}', '\u{ffff}', '\u{10000}', '\u{10ffff}',
        ];
        for restricted in [RestrictedStringOutput::None, RestrictedStringOutput::SevenBit] {
            for c in samples {
                let s = c.to_string();
                assert_eq!(unescape(&escaped(&s, restricted), 0).unwrap(), s, "{c:?}");
            }
        }
    }
}
