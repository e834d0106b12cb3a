//! The materialized result of a parse.

use std::borrow::Cow;

pub use crate::datetime::Timestamp;

/// A parsed value, shaped by the descriptor it was parsed with.
///
/// Strings borrow from the input whenever they contain no escapes, so a
/// `Value<'a>` must not outlive the buffer it was parsed from. Use
/// [`Value::into_owned`] to detach it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// `null`, or an absent nullable member
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Real(f64),
    String(Cow<'a, str>),
    Timestamp(Timestamp),
    /// Members in schema declaration order, not document order
    Class(Vec<Value<'a>>),
    Array(Vec<Value<'a>>),
    /// Key/value pairs in document order
    Map(Vec<(Value<'a>, Value<'a>)>),
    /// The alternative that was selected and its value
    Variant {
        index: usize,
        value: Box<Value<'a>>,
    },
}

impl<'a> Value<'a> {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Signed(_) => "signed integer",
            Value::Unsigned(_) => "unsigned integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Class(_) => "class",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Variant { .. } => "variant",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as `i64`, converting unsigned values that fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Signed(v) => Some(*v),
            Value::Unsigned(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as `u64`, converting non-negative signed values.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            Value::Signed(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as `f64`; integers are converted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Signed(v) => Some(*v as f64),
            Value::Unsigned(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Copy every borrowed string so the value no longer refers to the input.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(b),
            Value::Signed(v) => Value::Signed(v),
            Value::Unsigned(v) => Value::Unsigned(v),
            Value::Real(v) => Value::Real(v),
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::Timestamp(t) => Value::Timestamp(t),
            Value::Class(fields) => Value::Class(fields.into_iter().map(Value::into_owned).collect()),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::into_owned).collect()),
            Value::Map(pairs) => Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            ),
            Value::Variant { index, value } => Value::Variant {
                index,
                value: Box::new(value.into_owned()),
            },
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::Signed(v)
    }
}

impl From<u64> for Value<'_> {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl From<Timestamp> for Value<'_> {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}
