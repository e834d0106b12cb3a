//! Integer and real literal parsing.

use lexical_parse_integer::FromLexical;

use crate::cursor::{Cursor, describe_byte};
use crate::error::{JsonError, JsonErrorKind, Result};
use crate::lemire;
use crate::schema::{LiteralAsString, NumberOptions, NumberRepr};
use crate::skip::{scan_literal, scan_string};
use crate::span::Span;
use crate::value::Value;

/// Parse one number at the cursor according to `opts`, honouring the quoting
/// rules of [`LiteralAsString`] and the special real values.
pub(crate) fn parse_number<'a>(
    cursor: &mut Cursor<'a>,
    opts: &NumberOptions,
    precise: bool,
) -> Result<Value<'a>> {
    match cursor.peek() {
        Some(b'"') => {
            let s = scan_string(cursor)?;
            let body = cursor.text(s.span);
            if opts.allow_special_values && opts.repr == NumberRepr::Real {
                if let Some(v) = special_value(body) {
                    return Ok(Value::Real(v));
                }
            }
            if opts.literal_as_string == LiteralAsString::Never {
                return Err(JsonError::new(
                    JsonErrorKind::TypeMismatch {
                        expected: "a number",
                        got: "a string",
                    },
                    Span::new(s.span.start - 1, s.span.len + 2),
                ));
            }
            number_from_text(body, s.span, opts, precise)
        }
        Some(b) => {
            if opts.literal_as_string == LiteralAsString::Always {
                return Err(cursor.error(JsonErrorKind::UnexpectedToken {
                    got: describe_byte(b),
                    expected: "a quoted number",
                }));
            }
            let span = scan_literal(cursor)?;
            number_from_text(cursor.text(span), span, opts, precise)
        }
        None => Err(cursor.eof("a number")),
    }
}

fn special_value(body: &[u8]) -> Option<f64> {
    match body {
        b"NaN" => Some(f64::NAN),
        b"Infinity" | b"+Infinity" => Some(f64::INFINITY),
        b"-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Parse the text of a number literal.
pub(crate) fn number_from_text<'a>(
    text: &[u8],
    span: Span,
    opts: &NumberOptions,
    precise: bool,
) -> Result<Value<'a>> {
    let invalid = || {
        JsonError::new(
            JsonErrorKind::InvalidNumber {
                text: String::from_utf8_lossy(text).into_owned(),
            },
            span,
        )
    };
    match opts.repr {
        NumberRepr::Signed | NumberRepr::Unsigned => {
            let (negative, digits) = split_sign(text);
            if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
                return Err(invalid());
            }
            if opts.range_check {
                checked_integer(text, negative, digits, span, opts)
            } else {
                Ok(wrapping_integer(negative, digits, opts))
            }
        }
        NumberRepr::Real => {
            let v = if precise {
                lemire::parse_f64(text)
            } else {
                parse_real_fast(text)
            }
            .ok_or_else(invalid)?;
            let v = if opts.width == 32 { f64::from(v as f32) } else { v };
            if opts.range_check && v.is_infinite() {
                return Err(JsonError::new(
                    JsonErrorKind::NumberOutOfRange {
                        value: String::from_utf8_lossy(text).into_owned(),
                        target_type: opts.type_name(),
                    },
                    span,
                ));
            }
            Ok(Value::Real(v))
        }
    }
}

fn split_sign(text: &[u8]) -> (bool, &[u8]) {
    match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, text),
    }
}

/// Digit-by-digit accumulation with native wraparound, truncated to the
/// declared width.
fn wrapping_integer<'a>(negative: bool, digits: &[u8], opts: &NumberOptions) -> Value<'a> {
    let mut acc: u64 = 0;
    for &d in digits {
        acc = acc.wrapping_mul(10).wrapping_add(u64::from(d - b'0'));
    }
    if negative {
        acc = acc.wrapping_neg();
    }
    match opts.repr {
        NumberRepr::Signed => Value::Signed(match opts.width {
            8 => i64::from(acc as i8),
            16 => i64::from(acc as i16),
            32 => i64::from(acc as i32),
            _ => acc as i64,
        }),
        _ => Value::Unsigned(match opts.width {
            8 => u64::from(acc as u8),
            16 => u64::from(acc as u16),
            32 => u64::from(acc as u32),
            _ => acc,
        }),
    }
}

fn checked_integer<'a>(
    text: &[u8],
    negative: bool,
    digits: &[u8],
    span: Span,
    opts: &NumberOptions,
) -> Result<Value<'a>> {
    let out_of_range = || {
        JsonError::new(
            JsonErrorKind::NumberOutOfRange {
                value: String::from_utf8_lossy(text).into_owned(),
                target_type: opts.type_name(),
            },
            span,
        )
    };
    let bits = u32::from(opts.width.clamp(8, 64));
    match opts.repr {
        NumberRepr::Signed => {
            // the sign is kept so that i64::MIN parses
            let unsigned_text = if negative { text } else { digits };
            let v = i64::from_lexical(unsigned_text).map_err(|_| out_of_range())?;
            let min = -(1i128 << (bits - 1));
            let max = (1i128 << (bits - 1)) - 1;
            if !(min..=max).contains(&i128::from(v)) {
                return Err(out_of_range());
            }
            Ok(Value::Signed(v))
        }
        _ => {
            let v = u64::from_lexical(digits).map_err(|_| out_of_range())?;
            if negative && v != 0 {
                return Err(out_of_range());
            }
            if bits < 64 && v >> bits != 0 {
                return Err(out_of_range());
            }
            Ok(Value::Unsigned(v))
        }
    }
}

/// Fast real parsing: the first 19 significant digits as an integer, scaled
/// by a power of ten in floating point.
///
/// Powers of ten come correctly rounded from the same table the precise
/// parser uses, so the error comes only from converting the significand and
/// the final one or two operations.
///
/// Results are within two units in the last place of the correctly rounded
/// value. Use [`crate::parse_real_precise`] when exact round-tripping
/// matters.
pub fn parse_real_fast(text: &[u8]) -> Option<f64> {
    let dec = lemire::parse_decimal(text)?;
    let exp = dec.exponent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    let v = scale(dec.mantissa as f64, exp);
    Some(if dec.negative { -v } else { v })
}

fn scale(v: f64, exp: i32) -> f64 {
    if v == 0.0 {
        return v;
    }
    let magnitude = exp.unsigned_abs();
    if magnitude <= 308 {
        if exp >= 0 {
            v * lemire::pow10(magnitude)
        } else {
            v / lemire::pow10(magnitude)
        }
    } else {
        // split so the intermediate power stays finite
        let rest = lemire::pow10((magnitude - 308).min(309));
        if exp >= 0 {
            v * lemire::pow10(308) * rest
        } else {
            v / lemire::pow10(308) / rest
        }
    }
}
