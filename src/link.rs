//! Typed mapping between Rust values and [`Value`] trees.
//!
//! [`JsonDescriptor`] says what a type looks like in JSON; [`FromJson`] and
//! [`ToJson`] convert between the type and the [`Value`] the descriptor
//! produces. Structs are mapped with [`json_link!`](crate::json_link).

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use crate::appender::{Appender, collect_into};
use crate::datetime::Timestamp;
use crate::error::{JsonError, JsonErrorKind, Result};
use crate::schema::{FieldDescriptor, Kind, NumberOptions, NumberRepr};
use crate::value::Value;

/// Types with a fixed JSON shape.
pub trait JsonDescriptor {
    /// The descriptor values of this type are parsed and written with. The
    /// member name is empty; enclosing schemas rename it.
    fn descriptor() -> FieldDescriptor;
}

/// Types that can be built from a parsed [`Value`].
///
/// `'a` is the lifetime of the input buffer, so borrowed types such as
/// `&'a str` can point into it.
pub trait FromJson<'a>: JsonDescriptor + Sized {
    fn from_value(value: Value<'a>) -> Result<Self>;
}

/// Types that can be written out as JSON.
pub trait ToJson: JsonDescriptor {
    fn to_value(&self) -> Value<'_>;
}

#[doc(hidden)]
pub fn mismatch(expected: &'static str, value: &Value<'_>) -> JsonError {
    JsonError::without_span(JsonErrorKind::TypeMismatch {
        expected,
        got: value.type_name(),
    })
}

impl JsonDescriptor for bool {
    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::boolean("")
    }
}

impl<'a> FromJson<'a> for bool {
    fn from_value(value: Value<'a>) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("a boolean", &value))
    }
}

impl ToJson for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

macro_rules! impl_integer {
    ($($t:ty => $repr:ident, $width:literal, $variant:ident, $native:ty;)*) => {
        $(
            impl JsonDescriptor for $t {
                fn descriptor() -> FieldDescriptor {
                    let mut opts = NumberOptions::new(NumberRepr::$repr, $width);
                    opts.range_check = true;
                    FieldDescriptor::new("", Kind::Number(opts))
                }
            }

            impl<'a> FromJson<'a> for $t {
                fn from_value(value: Value<'a>) -> Result<Self> {
                    let out_of_range = |text: String| {
                        JsonError::without_span(JsonErrorKind::NumberOutOfRange {
                            value: text,
                            target_type: stringify!($t),
                        })
                    };
                    match value {
                        Value::Signed(v) => <$t>::try_from(v).map_err(|_| out_of_range(v.to_string())),
                        Value::Unsigned(v) => <$t>::try_from(v).map_err(|_| out_of_range(v.to_string())),
                        other => Err(mismatch("an integer", &other)),
                    }
                }
            }

            impl ToJson for $t {
                fn to_value(&self) -> Value<'_> {
                    Value::$variant(*self as $native)
                }
            }
        )*
    };
}

impl_integer! {
    i8 => Signed, 8, Signed, i64;
    i16 => Signed, 16, Signed, i64;
    i32 => Signed, 32, Signed, i64;
    i64 => Signed, 64, Signed, i64;
    isize => Signed, 64, Signed, i64;
    u8 => Unsigned, 8, Unsigned, u64;
    u16 => Unsigned, 16, Unsigned, u64;
    u32 => Unsigned, 32, Unsigned, u64;
    u64 => Unsigned, 64, Unsigned, u64;
    usize => Unsigned, 64, Unsigned, u64;
}

impl JsonDescriptor for f64 {
    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::real("")
    }
}

impl<'a> FromJson<'a> for f64 {
    fn from_value(value: Value<'a>) -> Result<Self> {
        value.as_f64().ok_or_else(|| mismatch("a number", &value))
    }
}

impl ToJson for f64 {
    fn to_value(&self) -> Value<'_> {
        Value::Real(*self)
    }
}

impl JsonDescriptor for f32 {
    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::real("").width(32)
    }
}

impl<'a> FromJson<'a> for f32 {
    fn from_value(value: Value<'a>) -> Result<Self> {
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| mismatch("a number", &value))
    }
}

impl ToJson for f32 {
    fn to_value(&self) -> Value<'_> {
        Value::Real(f64::from(*self))
    }
}

impl JsonDescriptor for String {
    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::string("")
    }
}

impl<'a> FromJson<'a> for String {
    fn from_value(value: Value<'a>) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.into_owned()),
            other => Err(mismatch("a string", &other)),
        }
    }
}

impl ToJson for String {
    fn to_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl JsonDescriptor for &str {
    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::string("")
    }
}

/// Fails with `InvalidValue` when the string held escapes, since the
/// unescaped text does not exist in the input.
impl<'a> FromJson<'a> for &'a str {
    fn from_value(value: Value<'a>) -> Result<Self> {
        match value {
            Value::String(Cow::Borrowed(s)) => Ok(s),
            Value::String(Cow::Owned(_)) => Err(JsonError::without_span(JsonErrorKind::InvalidValue {
                message: "string contains escapes and cannot be borrowed; use String or Cow<str>".into(),
            })),
            other => Err(mismatch("a string", &other)),
        }
    }
}

impl ToJson for &str {
    fn to_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl JsonDescriptor for Cow<'_, str> {
    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::string("")
    }
}

impl<'a> FromJson<'a> for Cow<'a, str> {
    fn from_value(value: Value<'a>) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("a string", &other)),
        }
    }
}

impl ToJson for Cow<'_, str> {
    fn to_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl JsonDescriptor for Timestamp {
    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::date("")
    }
}

impl<'a> FromJson<'a> for Timestamp {
    fn from_value(value: Value<'a>) -> Result<Self> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(mismatch("a timestamp", &other)),
        }
    }
}

impl ToJson for Timestamp {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

impl<T: JsonDescriptor> JsonDescriptor for Option<T> {
    fn descriptor() -> FieldDescriptor {
        T::descriptor().nullable()
    }
}

impl<'a, T: FromJson<'a>> FromJson<'a> for Option<T> {
    fn from_value(value: Value<'a>) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: JsonDescriptor> JsonDescriptor for Box<T> {
    fn descriptor() -> FieldDescriptor {
        T::descriptor()
    }
}

impl<'a, T: FromJson<'a>> FromJson<'a> for Box<T> {
    fn from_value(value: Value<'a>) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: ToJson> ToJson for Box<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

fn from_array<'a, T: FromJson<'a>, C: Appender<T> + Default>(value: Value<'a>) -> Result<C> {
    match value {
        Value::Array(items) => {
            let items = items
                .into_iter()
                .map(T::from_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(collect_into(items.into_iter()))
        }
        other => Err(mismatch("an array", &other)),
    }
}

fn from_map<'a, K: FromJson<'a>, V: FromJson<'a>, C: Appender<(K, V)> + Default>(
    value: Value<'a>,
) -> Result<C> {
    match value {
        Value::Map(pairs) => {
            let pairs = pairs
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(collect_into(pairs.into_iter()))
        }
        other => Err(mismatch("an object", &other)),
    }
}

macro_rules! impl_sequence {
    ($($coll:ident $(: $bound:ident)?;)*) => {
        $(
            impl<T: JsonDescriptor> JsonDescriptor for $coll<T> {
                fn descriptor() -> FieldDescriptor {
                    FieldDescriptor::array("", T::descriptor())
                }
            }

            impl<'a, T: FromJson<'a> $(+ $bound)?> FromJson<'a> for $coll<T> {
                fn from_value(value: Value<'a>) -> Result<Self> {
                    from_array(value)
                }
            }

            impl<T: ToJson> ToJson for $coll<T> {
                fn to_value(&self) -> Value<'_> {
                    Value::Array(self.iter().map(ToJson::to_value).collect())
                }
            }
        )*
    };
}

impl_sequence! {
    Vec;
    VecDeque;
    BTreeSet: Ord;
    HashSet: HashKey;
}

/// `Hash + Eq` under one name, for the macros above.
#[doc(hidden)]
pub trait HashKey: Hash + Eq {}

impl<T: Hash + Eq> HashKey for T {}

macro_rules! impl_map {
    ($($coll:ident: $bound:ident;)*) => {
        $(
            impl<K: JsonDescriptor, V: JsonDescriptor> JsonDescriptor for $coll<K, V> {
                fn descriptor() -> FieldDescriptor {
                    FieldDescriptor::key_value("", K::descriptor(), V::descriptor())
                }
            }

            impl<'a, K: FromJson<'a> + $bound, V: FromJson<'a>> FromJson<'a> for $coll<K, V> {
                fn from_value(value: Value<'a>) -> Result<Self> {
                    from_map(value)
                }
            }

            impl<K: ToJson, V: ToJson> ToJson for $coll<K, V> {
                fn to_value(&self) -> Value<'_> {
                    Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
                }
            }
        )*
    };
}

impl_map! {
    BTreeMap: Ord;
    HashMap: HashKey;
}

/// Map an existing struct to a JSON object.
///
/// Each member is written `"json_name" => field: Type`. The member's JSON
/// shape comes from `Type`'s [`JsonDescriptor`] unless an explicit
/// descriptor follows `as`; the descriptor is renamed to `json_name`. The
/// schema is built on first use and shared afterwards.
///
/// A struct with one lifetime parameter may borrow from the input.
///
/// ```rust
/// use jsonlink::{FieldDescriptor, LiteralAsString, Timestamp, json_link, from_str};
///
/// struct Event<'a> {
///     kind: &'a str,
///     at: Timestamp,
///     count: u32,
///     note: Option<String>,
/// }
///
/// json_link! {
///     Event<'a> {
///         "kind" => kind: &'a str,
///         "at" => at: Timestamp,
///         "count" => count: u32 as FieldDescriptor::unsigned("").width(32)
///             .range_checked()
///             .literal_as_string(LiteralAsString::Maybe),
///         "note" => note: Option<String>,
///     }
/// }
///
/// let input = r#"{"kind":"push","at":"2018-06-22T15:05:37Z","count":"3"}"#;
/// let event: Event = from_str(input).unwrap();
/// assert_eq!(event.kind, "push");
/// assert_eq!(event.count, 3);
/// assert!(event.note.is_none());
/// assert_eq!(event.at.as_millis(), 1_529_679_937_000);
/// ```
#[macro_export]
macro_rules! json_link {
    (@desc $json:literal, $ty:ty) => {
        <$ty as $crate::JsonDescriptor>::descriptor().named($json)
    };
    (@desc $json:literal, $ty:ty, $over:expr) => {
        ($over).named($json)
    };
    (
        @impl [$($gen:tt)*] [$($de_gen:tt)*] $de:lifetime, $self_ty:ty {
            $( $json:literal => $field:ident : $ty:ty $( as $over:expr )? ),* $(,)?
        }
    ) => {
        impl $($gen)* $crate::JsonDescriptor for $self_ty {
            fn descriptor() -> $crate::FieldDescriptor {
                static SCHEMA: ::std::sync::OnceLock<::std::sync::Arc<$crate::Schema>> =
                    ::std::sync::OnceLock::new();
                let schema = SCHEMA.get_or_init(|| {
                    ::std::sync::Arc::new($crate::Schema::new(::std::vec![
                        $( $crate::json_link!(@desc $json, $ty $(, $over)?) ),*
                    ]))
                });
                $crate::FieldDescriptor::class("", ::std::sync::Arc::clone(schema))
            }
        }

        impl $($de_gen)* $crate::FromJson<$de> for $self_ty {
            fn from_value(value: $crate::Value<$de>) -> $crate::Result<Self> {
                let members = match value {
                    $crate::Value::Class(members) => members,
                    other => return Err($crate::__private::mismatch("an object", &other)),
                };
                #[allow(unused_mut, unused_variables)]
                let mut members = members.into_iter();
                Ok(Self {
                    $(
                        $field: <$ty as $crate::FromJson<$de>>::from_value(
                            members.next().unwrap_or($crate::Value::Null),
                        )?,
                    )*
                })
            }
        }

        impl $($gen)* $crate::ToJson for $self_ty {
            fn to_value(&self) -> $crate::Value<'_> {
                $crate::Value::Class(::std::vec![
                    $( $crate::ToJson::to_value(&self.$field) ),*
                ])
            }
        }
    };
    ($name:ident < $lt:lifetime > { $($body:tt)* }) => {
        $crate::json_link!(@impl [<$lt>] [<$lt>] $lt, $name<$lt> { $($body)* });
    };
    ($name:ident { $($body:tt)* }) => {
        $crate::json_link!(@impl [] [<'de>] 'de, $name { $($body)* });
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserialize::{from_slice, from_str};
    use crate::serialize::to_string;

    #[derive(Debug, PartialEq)]
    struct Inner {
        x: i32,
        tags: BTreeSet<String>,
    }

    crate::json_link! {
        Inner {
            "x" => x: i32,
            "tags" => tags: BTreeSet<String>,
        }
    }

    #[derive(Debug, PartialEq)]
    struct Outer<'a> {
        name: &'a str,
        inner: Option<Inner>,
        scores: BTreeMap<String, f64>,
    }

    crate::json_link! {
        Outer<'a> {
            "name" => name: &'a str,
            "inner" => inner: Option<Inner>,
            "scores" => scores: BTreeMap<String, f64>,
        }
    }

    #[test]
    fn nested_structs_round_trip() {
        let input = r#"{"scores":{"a":1.5},"inner":{"tags":["b","a","b"],"x":-3},"name":"n"}"#;
        let outer: Outer = from_str(input).unwrap();
        assert_eq!(outer.name, "n");
        let inner = outer.inner.as_ref().unwrap();
        assert_eq!(inner.x, -3);
        assert_eq!(inner.tags.len(), 2);
        assert_eq!(
            to_string(&outer).unwrap(),
            r#"{"name":"n","inner":{"x":-3,"tags":["a","b"]},"scores":{"a":1.5}}"#
        );
    }

    #[test]
    fn typed_integers_are_range_checked() {
        let err = from_slice::<u8>(b"256").unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::NumberOutOfRange { target_type: "u8", .. }));
        assert_eq!(from_slice::<i8>(b"-128").unwrap(), -128);
    }

    #[test]
    fn borrowed_str_needs_an_unescaped_string() {
        assert_eq!(from_slice::<&str>(br#""plain""#).unwrap(), "plain");
        let err = from_slice::<&str>(br#""tab\t""#).unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::InvalidValue { .. }));
        assert_eq!(from_slice::<Cow<str>>(br#""tab\t""#).unwrap(), "tab\t");
    }

    #[test]
    fn descriptors_describe_the_shape() {
        assert!(Option::<u8>::descriptor().is_nullable());
        assert!(matches!(Vec::<bool>::descriptor().kind, Kind::Array(_)));
        assert!(matches!(
            HashMap::<String, i64>::descriptor().kind,
            Kind::KeyValue { .. }
        ));
    }
}
