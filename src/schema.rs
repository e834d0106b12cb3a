//! Field descriptors and schemas.
//!
//! A [`Schema`] is an ordered, immutable table of [`FieldDescriptor`]s. It is
//! built once per target shape and shared (through `Arc`) by every parse and
//! serialize call, on any thread.

use std::collections::HashMap;
use std::sync::Arc;

use crate::value::Value;

/// Native representation of a number member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRepr {
    Signed,
    Unsigned,
    Real,
}

/// Whether a number or bool may appear inside quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LiteralAsString {
    /// Only the bare literal is accepted.
    #[default]
    Never,
    /// Both `42` and `"42"` are accepted; output is bare.
    Maybe,
    /// Only `"42"` is accepted, and output is quoted.
    Always,
}

/// Options for number members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberOptions {
    pub repr: NumberRepr,
    /// Bit width of the native type: 8, 16, 32 or 64 (32 or 64 for reals)
    pub width: u8,
    /// Reject values that do not fit `width` instead of wrapping
    pub range_check: bool,
    pub literal_as_string: LiteralAsString,
    /// Accept and emit `"NaN"`, `"Infinity"` and `"-Infinity"`
    pub allow_special_values: bool,
}

impl NumberOptions {
    pub const fn new(repr: NumberRepr, width: u8) -> Self {
        NumberOptions {
            repr,
            width,
            range_check: false,
            literal_as_string: LiteralAsString::Never,
            allow_special_values: false,
        }
    }

    /// Short type name such as `i32` or `f64`, for error messages.
    pub fn type_name(&self) -> &'static str {
        match (self.repr, self.width) {
            (NumberRepr::Signed, 8) => "i8",
            (NumberRepr::Signed, 16) => "i16",
            (NumberRepr::Signed, 32) => "i32",
            (NumberRepr::Signed, _) => "i64",
            (NumberRepr::Unsigned, 8) => "u8",
            (NumberRepr::Unsigned, 16) => "u16",
            (NumberRepr::Unsigned, 32) => "u32",
            (NumberRepr::Unsigned, _) => "u64",
            (NumberRepr::Real, 32) => "f32",
            (NumberRepr::Real, _) => "f64",
        }
    }
}

/// Whether bytes above 0x7F may appear in a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EightBitMode {
    #[default]
    AllowFull,
    DisallowHigh,
}

/// Options for string members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringOptions {
    pub eight_bit: EightBitMode,
    /// A nullable string member holding `""` parses as null
    pub empty_is_null: bool,
}

/// How a null value of a nullable member is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Nullability {
    /// The member is left out of the enclosing object.
    #[default]
    Nullable,
    /// The member is written as `null`.
    NullVisible,
}

/// JSON form of a custom member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CustomEncoding {
    /// A JSON string; converters see the unescaped contents.
    #[default]
    String,
    /// A bare literal such as a number; converters see its text.
    Literal,
    /// Any JSON value; converters see its raw text.
    Any,
}

/// Converts the text of a custom member into a value.
pub type CustomParse = fn(&str) -> Result<Value<'static>, String>;
/// Converts a value into the text of a custom member.
pub type CustomWrite = fn(&Value<'_>) -> Result<String, String>;

/// User supplied converters for [`Kind::Custom`].
#[derive(Debug, Clone, Copy)]
pub struct CustomFns {
    pub parse: CustomParse,
    pub write: CustomWrite,
}

/// Maps a parsed tag value to the index of a variant alternative.
pub type Switcher = fn(&Value<'_>) -> Option<usize>;
/// Chooses a variant alternative from the members already parsed before it.
pub type Classifier = fn(&[Value<'_>]) -> Option<usize>;

/// How a tagged variant picks its alternative.
#[derive(Debug, Clone)]
pub enum Discriminator {
    /// A sibling member of the enclosing object, declared in the same schema,
    /// holds the tag.
    Member { name: String, switcher: Switcher },
    /// The variant is an object and one of its own members holds the tag.
    Submember {
        tag: Box<FieldDescriptor>,
        switcher: Switcher,
    },
    /// A function over the enclosing object's members that precede the
    /// variant in declaration order.
    Classifier(Classifier),
}

/// Structural category of a field, driving dispatch in both directions.
#[derive(Debug, Clone)]
pub enum Kind {
    Number(NumberOptions),
    Bool(LiteralAsString),
    /// An escaped string; escapes are decoded on parse and applied on write
    String(StringOptions),
    /// A string copied verbatim between the quotes
    StringRaw(StringOptions),
    Date,
    Class(Arc<Schema>),
    Array(Box<FieldDescriptor>),
    Null {
        inner: Box<FieldDescriptor>,
        visibility: Nullability,
    },
    /// A JSON object used as a map
    KeyValue {
        key: Box<FieldDescriptor>,
        value: Box<FieldDescriptor>,
    },
    /// An array of `{key, value}` objects
    KeyValueArray {
        key: Box<FieldDescriptor>,
        value: Box<FieldDescriptor>,
    },
    Custom {
        encoding: CustomEncoding,
        fns: CustomFns,
    },
    /// Untagged variant, selected by the JSON type of the value
    Variant(Vec<FieldDescriptor>),
    VariantTagged {
        alternatives: Vec<FieldDescriptor>,
        discriminator: Discriminator,
    },
}

impl Kind {
    /// Human readable name of the JSON shape this kind expects.
    pub fn expected(&self) -> &'static str {
        match self {
            Kind::Number(_) => "a number",
            Kind::Bool(_) => "a boolean",
            Kind::String(_) | Kind::StringRaw(_) => "a string",
            Kind::Date => "an ISO-8601 timestamp string",
            Kind::Class(_) | Kind::KeyValue { .. } => "an object",
            Kind::Array(_) | Kind::KeyValueArray { .. } => "an array",
            Kind::Null { inner, .. } => inner.kind.expected(),
            Kind::Custom { .. } => "a custom value",
            Kind::Variant(_) | Kind::VariantTagged { .. } => "a variant",
        }
    }
}

/// One declared member: its JSON name and how its value is shaped.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: Kind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        FieldDescriptor {
            name: name.into(),
            kind,
        }
    }

    /// A real number stored as `f64`.
    pub fn number(name: impl Into<String>) -> Self {
        Self::real(name)
    }

    /// A 64-bit signed integer.
    pub fn signed(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Number(NumberOptions::new(NumberRepr::Signed, 64)))
    }

    /// A 64-bit unsigned integer.
    pub fn unsigned(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Number(NumberOptions::new(NumberRepr::Unsigned, 64)))
    }

    /// An `f64`.
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Number(NumberOptions::new(NumberRepr::Real, 64)))
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Bool(LiteralAsString::Never))
    }

    /// An escaped string.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Kind::String(StringOptions::default()))
    }

    /// A string taken verbatim, without unescaping.
    pub fn string_raw(name: impl Into<String>) -> Self {
        Self::new(name, Kind::StringRaw(StringOptions::default()))
    }

    /// An ISO-8601 timestamp string.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Date)
    }

    pub fn class(name: impl Into<String>, schema: impl Into<Arc<Schema>>) -> Self {
        Self::new(name, Kind::Class(schema.into()))
    }

    pub fn array(name: impl Into<String>, element: FieldDescriptor) -> Self {
        Self::new(name, Kind::Array(Box::new(element)))
    }

    /// An object whose member names are the keys. `key` must describe a
    /// string-like or number kind.
    pub fn key_value(name: impl Into<String>, key: FieldDescriptor, value: FieldDescriptor) -> Self {
        Self::new(
            name,
            Kind::KeyValue {
                key: Box::new(key),
                value: Box::new(value),
            },
        )
    }

    /// An array of objects holding one key and one value each. Members are
    /// named after the descriptors, defaulting to `"key"` and `"value"`.
    pub fn key_value_array(
        name: impl Into<String>,
        mut key: FieldDescriptor,
        mut value: FieldDescriptor,
    ) -> Self {
        if key.name.is_empty() {
            key.name = "key".into();
        }
        if value.name.is_empty() {
            value.name = "value".into();
        }
        Self::new(
            name,
            Kind::KeyValueArray {
                key: Box::new(key),
                value: Box::new(value),
            },
        )
    }

    /// An untagged variant. At most one alternative per JSON type is
    /// reachable; the first one matching the value's leading byte wins.
    pub fn variant(name: impl Into<String>, alternatives: Vec<FieldDescriptor>) -> Self {
        Self::new(name, Kind::Variant(alternatives))
    }

    pub fn variant_tagged(
        name: impl Into<String>,
        alternatives: Vec<FieldDescriptor>,
        discriminator: Discriminator,
    ) -> Self {
        Self::new(
            name,
            Kind::VariantTagged {
                alternatives,
                discriminator,
            },
        )
    }

    pub fn custom(name: impl Into<String>, encoding: CustomEncoding, fns: CustomFns) -> Self {
        Self::new(name, Kind::Custom { encoding, fns })
    }

    /// Allow `null` or absence; a null value is omitted when serializing.
    pub fn nullable(self) -> Self {
        self.with_nullability(Nullability::Nullable)
    }

    /// Allow `null` or absence; a null value is written as `null`.
    pub fn null_visible(self) -> Self {
        self.with_nullability(Nullability::NullVisible)
    }

    fn with_nullability(self, visibility: Nullability) -> Self {
        match self.kind {
            Kind::Null { inner, .. } => FieldDescriptor {
                name: self.name,
                kind: Kind::Null { inner, visibility },
            },
            kind => {
                let name = self.name.clone();
                FieldDescriptor {
                    name,
                    kind: Kind::Null {
                        inner: Box::new(FieldDescriptor {
                            name: self.name,
                            kind,
                        }),
                        visibility,
                    },
                }
            }
        }
    }

    /// Rename the member.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if let Kind::Null { inner, .. } = &mut self.kind {
            inner.name = name.clone();
        }
        self.name = name;
        self
    }

    /// Set the native width of a number member.
    pub fn width(self, width: u8) -> Self {
        self.map_number(|n| n.width = width)
    }

    /// Reject numbers that do not fit their width.
    pub fn range_checked(self) -> Self {
        self.map_number(|n| n.range_check = true)
    }

    /// Accept numbers, and bools, inside quotes.
    pub fn literal_as_string(mut self, mode: LiteralAsString) -> Self {
        if let Kind::Bool(las) = &mut self.base_mut().kind {
            *las = mode;
            return self;
        }
        self.map_number(|n| n.literal_as_string = mode)
    }

    /// Accept and emit quoted `NaN` and `Infinity`.
    pub fn special_values(self) -> Self {
        self.map_number(|n| n.allow_special_values = true)
    }

    /// Restrict a string member to 7-bit bytes.
    pub fn eight_bit(self, mode: EightBitMode) -> Self {
        self.map_string(|s| s.eight_bit = mode)
    }

    /// Treat `""` as null; implies [`FieldDescriptor::nullable`].
    pub fn empty_is_null(self) -> Self {
        let this = if self.is_nullable() { self } else { self.nullable() };
        this.map_string(|s| s.empty_is_null = true)
    }

    fn map_number(mut self, f: impl FnOnce(&mut NumberOptions)) -> Self {
        if let Kind::Number(opts) = &mut self.base_mut().kind {
            f(opts);
        }
        self
    }

    fn map_string(mut self, f: impl FnOnce(&mut StringOptions)) -> Self {
        if let Kind::String(opts) | Kind::StringRaw(opts) = &mut self.base_mut().kind {
            f(opts);
        }
        self
    }

    /// Whether `null` and absence are allowed.
    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, Kind::Null { .. })
    }

    /// The descriptor with any null wrapper removed.
    pub fn base(&self) -> &FieldDescriptor {
        match &self.kind {
            Kind::Null { inner, .. } => inner.base(),
            _ => self,
        }
    }

    fn base_mut(&mut self) -> &mut FieldDescriptor {
        match self.kind {
            Kind::Null { ref mut inner, .. } => inner.base_mut(),
            _ => self,
        }
    }
}

/// Ordered table of member descriptors with O(1) name lookup.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema. If two descriptors share a name, lookups find the
    /// first.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            index.entry(field.name.clone()).or_insert(i);
        }
        Schema { fields, index }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the member called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Declared member names, in order.
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

impl FromIterator<FieldDescriptor> for Schema {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        Schema::new(iter.into_iter().collect())
    }
}
