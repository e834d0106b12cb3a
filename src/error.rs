//! Error types for parsing and serialization.

use core::fmt::{self, Display};

use crate::span::Span;

/// Find the best matching field name from a list of expected fields.
/// Returns Some(suggestion) if a match with similarity >= 0.6 is found.
pub(crate) fn find_similar_field(unknown: &str, expected: &[String]) -> Option<String> {
    let mut best_match: Option<(&str, f64)> = None;

    for candidate in expected {
        let similarity = strsim::jaro_winkler(unknown, candidate);
        if similarity >= 0.6 && best_match.is_none_or(|(_, best_sim)| similarity > best_sim) {
            best_match = Some((candidate, similarity));
        }
    }

    best_match.map(|(name, _)| name.to_string())
}

// ============================================================================
// Parse errors
// ============================================================================

/// Error type for JSON parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonError {
    /// The specific kind of error
    pub kind: JsonErrorKind,
    /// Source span where the error occurred
    pub span: Option<Span>,
    /// The source input (for diagnostics)
    pub source_code: Option<String>,
}

impl Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(span) = self.span {
            write!(f, " at offset {}", span.start)?;
        }
        Ok(())
    }
}

impl std::error::Error for JsonError {}

impl miette::Diagnostic for JsonError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_ref()
            .map(|s| s as &dyn miette::SourceCode)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        match &self.kind {
            JsonErrorKind::UnexpectedMember {
                suggestion: Some(suggested),
                ..
            } => Some(Box::new(format!("did you mean `{suggested}`?"))),
            JsonErrorKind::NestingTooDeep { max_depth } => Some(Box::new(format!(
                "raise `ParseOptions::max_depth` above {max_depth} to accept this document"
            ))),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        // MissingRequiredField points at both ends of the object
        if let JsonErrorKind::MissingRequiredField {
            field,
            object_start,
            object_end,
        } = &self.kind
        {
            let mut labels = Vec::new();
            if let Some(start) = object_start {
                labels.push(miette::LabeledSpan::new(
                    Some("object started here".into()),
                    start.start,
                    start.len,
                ));
            }
            if let Some(end) = object_end {
                labels.push(miette::LabeledSpan::new(
                    Some(format!("object ended without field `{field}`")),
                    end.start,
                    end.len,
                ));
            }
            if labels.is_empty() {
                return None;
            }
            return Some(Box::new(labels.into_iter()));
        }

        let span = self.span?;
        Some(Box::new(core::iter::once(miette::LabeledSpan::new(
            Some(self.kind.label()),
            span.start,
            span.len,
        ))))
    }
}

impl JsonError {
    /// Create a new error with span information
    pub fn new(kind: JsonErrorKind, span: Span) -> Self {
        JsonError {
            kind,
            span: Some(span),
            source_code: None,
        }
    }

    /// Create an error pointing at a single byte offset
    pub fn at(kind: JsonErrorKind, pos: usize) -> Self {
        JsonError::new(kind, Span::new(pos, 1))
    }

    /// Create an error without span information
    pub fn without_span(kind: JsonErrorKind) -> Self {
        JsonError {
            kind,
            span: None,
            source_code: None,
        }
    }

    /// Attach source code for rich diagnostics
    pub fn with_source(mut self, source: &str) -> Self {
        self.source_code = Some(source.to_string());
        self
    }

    /// Byte offset where the error was detected, if known
    pub fn offset(&self) -> Option<usize> {
        self.span.map(|s| s.start)
    }
}

/// Specific error kinds for JSON parsing
#[derive(Debug, Clone, PartialEq)]
pub enum JsonErrorKind {
    /// Ran out of input in the middle of a value
    UnexpectedEndOfInput {
        /// What was expected before the end
        expected: &'static str,
    },
    /// Malformed braces, brackets or quotes
    InvalidStructure {
        /// What went wrong
        reason: &'static str,
    },
    /// Unexpected token
    UnexpectedToken {
        /// The text that was found
        got: String,
        /// What was expected instead
        expected: &'static str,
    },
    /// A `true`, `false` or `null` literal was misspelled
    InvalidLiteral {
        /// The literal that was expected
        expected: &'static str,
    },
    /// Number literal could not be parsed
    InvalidNumber {
        /// The offending text
        text: String,
    },
    /// Number does not fit the target width
    NumberOutOfRange {
        /// The numeric value that was out of range
        value: String,
        /// The target type that couldn't hold the value
        target_type: &'static str,
    },
    /// Malformed ISO-8601 timestamp
    InvalidTimestamp {
        /// The offending text
        text: String,
    },
    /// Unknown escape or malformed `\u` sequence
    InvalidUtfEscape,
    /// `\u` escapes that do not form a Unicode scalar value
    InvalidUtfCodepoint {
        /// The code unit(s) that were rejected
        code: u32,
    },
    /// Raw bytes are not valid UTF-8
    InvalidUtf8,
    /// Byte above 0x7F in a string restricted to 7-bit
    InvalidStringHighAscii,
    /// A non-nullable member was absent from the object
    MissingRequiredField {
        /// The name of the missing field
        field: String,
        /// Span of the object start (opening brace)
        object_start: Option<Span>,
        /// Span of the object end (closing brace)
        object_end: Option<Span>,
    },
    /// Member not declared in the schema (exact-mapping mode only)
    UnexpectedMember {
        /// The unknown member name
        field: String,
        /// List of valid member names
        expected: Vec<String>,
        /// Suggested member name (if similar to a declared one)
        suggestion: Option<String>,
    },
    /// `null` where the schema does not allow it
    UnexpectedNull {
        /// The field that was null
        field: String,
    },
    /// JSON value of the wrong type for the schema
    TypeMismatch {
        /// The expected type
        expected: &'static str,
        /// The actual type found
        got: &'static str,
    },
    /// A variant discriminator did not select any alternative
    UnknownVariantTag {
        /// Text of the tag that was seen
        tag: String,
    },
    /// Input nests deeper than the configured maximum
    NestingTooDeep {
        /// The configured maximum
        max_depth: usize,
    },
    /// A custom converter rejected the value
    InvalidValue {
        /// Description of why the value is invalid
        message: String,
    },
    /// A member path did not match the document
    PathNotFound {
        /// The path that was requested
        path: String,
    },
    /// A member path could not be parsed
    InvalidPath {
        /// The path that was requested
        path: String,
    },
}

impl Display for JsonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonErrorKind::UnexpectedEndOfInput { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            JsonErrorKind::InvalidStructure { reason } => {
                write!(f, "invalid JSON structure: {reason}")
            }
            JsonErrorKind::UnexpectedToken { got, expected } => {
                write!(f, "unexpected token: got {got}, expected {expected}")
            }
            JsonErrorKind::InvalidLiteral { expected } => {
                write!(f, "invalid literal, expected `{expected}`")
            }
            JsonErrorKind::InvalidNumber { text } => write!(f, "invalid number `{text}`"),
            JsonErrorKind::NumberOutOfRange { value, target_type } => {
                write!(f, "number `{value}` out of range for {target_type}")
            }
            JsonErrorKind::InvalidTimestamp { text } => {
                write!(f, "invalid ISO-8601 timestamp `{text}`")
            }
            JsonErrorKind::InvalidUtfEscape => write!(f, "invalid escape sequence"),
            JsonErrorKind::InvalidUtfCodepoint { code } => {
                write!(f, "invalid unicode codepoint U+{code:04X}")
            }
            JsonErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            JsonErrorKind::InvalidStringHighAscii => {
                write!(f, "string contains a byte above 0x7F")
            }
            JsonErrorKind::MissingRequiredField { field, .. } => {
                write!(f, "missing required field `{field}`")
            }
            JsonErrorKind::UnexpectedMember {
                field,
                expected,
                suggestion,
            } => {
                write!(f, "unknown field `{field}`, expected one of: {expected:?}")?;
                if let Some(suggested) = suggestion {
                    write!(f, " (did you mean `{suggested}`?)")?;
                }
                Ok(())
            }
            JsonErrorKind::UnexpectedNull { field } => {
                write!(f, "unexpected null for non-nullable field `{field}`")
            }
            JsonErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            JsonErrorKind::UnknownVariantTag { tag } => {
                write!(f, "no variant alternative matches tag {tag}")
            }
            JsonErrorKind::NestingTooDeep { max_depth } => {
                write!(f, "nesting deeper than {max_depth} levels")
            }
            JsonErrorKind::InvalidValue { message } => write!(f, "invalid value: {message}"),
            JsonErrorKind::PathNotFound { path } => write!(f, "member path `{path}` not found"),
            JsonErrorKind::InvalidPath { path } => write!(f, "invalid member path `{path}`"),
        }
    }
}

impl JsonErrorKind {
    /// Get an error code for this kind of error.
    pub fn code(&self) -> &'static str {
        match self {
            JsonErrorKind::UnexpectedEndOfInput { .. } => "json::unexpected_eof",
            JsonErrorKind::InvalidStructure { .. } => "json::invalid_structure",
            JsonErrorKind::UnexpectedToken { .. } => "json::unexpected_token",
            JsonErrorKind::InvalidLiteral { .. } => "json::invalid_literal",
            JsonErrorKind::InvalidNumber { .. } => "json::invalid_number",
            JsonErrorKind::NumberOutOfRange { .. } => "json::number_out_of_range",
            JsonErrorKind::InvalidTimestamp { .. } => "json::invalid_timestamp",
            JsonErrorKind::InvalidUtfEscape => "json::invalid_utf_escape",
            JsonErrorKind::InvalidUtfCodepoint { .. } => "json::invalid_utf_codepoint",
            JsonErrorKind::InvalidUtf8 => "json::invalid_utf8",
            JsonErrorKind::InvalidStringHighAscii => "json::invalid_string_high_ascii",
            JsonErrorKind::MissingRequiredField { .. } => "json::missing_field",
            JsonErrorKind::UnexpectedMember { .. } => "json::unknown_field",
            JsonErrorKind::UnexpectedNull { .. } => "json::unexpected_null",
            JsonErrorKind::TypeMismatch { .. } => "json::type_mismatch",
            JsonErrorKind::UnknownVariantTag { .. } => "json::unknown_variant_tag",
            JsonErrorKind::NestingTooDeep { .. } => "json::nesting_too_deep",
            JsonErrorKind::InvalidValue { .. } => "json::invalid_value",
            JsonErrorKind::PathNotFound { .. } => "json::path_not_found",
            JsonErrorKind::InvalidPath { .. } => "json::invalid_path",
        }
    }

    /// Get a label describing where/what the error points to.
    pub fn label(&self) -> String {
        match self {
            JsonErrorKind::UnexpectedEndOfInput { expected } => format!("expected {expected}"),
            JsonErrorKind::InvalidStructure { reason } => (*reason).into(),
            JsonErrorKind::UnexpectedToken { got, expected } => {
                format!("expected {expected}, got {got}")
            }
            JsonErrorKind::InvalidLiteral { expected } => format!("expected `{expected}`"),
            JsonErrorKind::InvalidNumber { .. } => "not a valid number".into(),
            JsonErrorKind::NumberOutOfRange { target_type, .. } => {
                format!("out of range for {target_type}")
            }
            JsonErrorKind::InvalidTimestamp { .. } => "not an ISO-8601 timestamp".into(),
            JsonErrorKind::InvalidUtfEscape => "invalid escape".into(),
            JsonErrorKind::InvalidUtfCodepoint { .. } => "invalid codepoint".into(),
            JsonErrorKind::InvalidUtf8 => "invalid UTF-8".into(),
            JsonErrorKind::InvalidStringHighAscii => "byte above 0x7F".into(),
            JsonErrorKind::MissingRequiredField { field, .. } => {
                format!("missing field '{field}'")
            }
            JsonErrorKind::UnexpectedMember {
                field, suggestion, ..
            } => {
                if let Some(suggested) = suggestion {
                    format!("unknown field '{field}' - did you mean '{suggested}'?")
                } else {
                    format!("unknown field '{field}'")
                }
            }
            JsonErrorKind::UnexpectedNull { .. } => "null not allowed here".into(),
            JsonErrorKind::TypeMismatch { expected, got } => {
                format!("expected {expected}, got {got}")
            }
            JsonErrorKind::UnknownVariantTag { .. } => "unknown tag".into(),
            JsonErrorKind::NestingTooDeep { .. } => "nested too deeply".into(),
            JsonErrorKind::InvalidValue { .. } => "invalid value".into(),
            JsonErrorKind::PathNotFound { .. } => "path not found".into(),
            JsonErrorKind::InvalidPath { .. } => "invalid path".into(),
        }
    }
}

/// Result type for JSON parsing
pub type Result<T> = core::result::Result<T, JsonError>;

// ============================================================================
// Serialization errors
// ============================================================================

/// Error type for JSON serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializeError {
    /// The specific kind of error
    pub kind: SerializeErrorKind,
}

/// Specific error kinds for JSON serialization
#[derive(Debug, Clone, PartialEq)]
pub enum SerializeErrorKind {
    /// A fixed-size output buffer is full
    CapacityExceeded {
        /// Size of the buffer in bytes
        capacity: usize,
    },
    /// The underlying writer failed
    Io(String),
    /// A value does not have the shape its descriptor declares
    TypeMismatch {
        /// What the descriptor declares
        expected: &'static str,
        /// What the value holds
        got: &'static str,
    },
    /// A custom converter refused the value
    Custom(String),
}

impl SerializeError {
    pub(crate) fn new(kind: SerializeErrorKind) -> Self {
        SerializeError { kind }
    }

    pub(crate) fn mismatch(expected: &'static str, got: &'static str) -> Self {
        SerializeError::new(SerializeErrorKind::TypeMismatch { expected, got })
    }
}

impl Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SerializeErrorKind::CapacityExceeded { capacity } => {
                write!(f, "output buffer of {capacity} bytes is full")
            }
            SerializeErrorKind::Io(message) => write!(f, "write failed: {message}"),
            SerializeErrorKind::TypeMismatch { expected, got } => {
                write!(f, "cannot serialize {got} as {expected}")
            }
            SerializeErrorKind::Custom(message) => write!(f, "custom serializer failed: {message}"),
        }
    }
}

impl std::error::Error for SerializeError {}

impl miette::Diagnostic for SerializeError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(match self.kind {
            SerializeErrorKind::CapacityExceeded { .. } => "json::capacity_exceeded",
            SerializeErrorKind::Io(_) => "json::io",
            SerializeErrorKind::TypeMismatch { .. } => "json::type_mismatch",
            SerializeErrorKind::Custom(_) => "json::custom",
        }))
    }
}

impl From<std::io::Error> for SerializeError {
    fn from(err: std::io::Error) -> Self {
        SerializeError::new(SerializeErrorKind::Io(err.to_string()))
    }
}
