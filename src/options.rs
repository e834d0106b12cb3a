//! Parse options and serialization policy.

/// Which comment syntax, if any, is treated as whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentPolicy {
    /// Strict JSON: no comments.
    #[default]
    None,
    /// `// line` and `/* block */` comments.
    Cpp,
    /// `# line` comments.
    Hash,
}

/// Configuration options for parsing.
///
/// # Examples
///
/// ```rust
/// use jsonlink::{CommentPolicy, ParseOptions};
///
/// let options = ParseOptions::default()
///     .with_comments(CommentPolicy::Cpp)
///     .with_exact_mappings(true);
/// assert!(options.exact_mappings);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Comment syntax accepted between tokens.
    ///
    /// # Default
    ///
    /// [`CommentPolicy::None`]
    pub comments: CommentPolicy,

    /// Reject object members that the schema does not declare.
    ///
    /// When `false`, unknown members are skipped without being parsed, which
    /// lets older schemas read newer documents.
    ///
    /// # Default
    ///
    /// `false`
    pub exact_mappings: bool,

    /// Parse real numbers with correct rounding.
    ///
    /// The default fast path scales the first 19 significant digits by a
    /// power of ten in floating point and may be off by one or two units in
    /// the last place. The precise path is bit-exact with the
    /// standard library's parser.
    ///
    /// # Default
    ///
    /// `false`
    pub precise_reals: bool,

    /// Require that nothing but whitespace follows the root value.
    ///
    /// # Default
    ///
    /// `true`
    pub verify_end_of_data: bool,

    /// Unescape member names before matching them against the schema.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_escaped_names: bool,

    /// Maximum nesting of arrays and objects.
    ///
    /// # Default
    ///
    /// `128`
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            comments: CommentPolicy::None,
            exact_mappings: false,
            precise_reals: false,
            verify_end_of_data: true,
            allow_escaped_names: false,
            max_depth: 128,
        }
    }
}

impl ParseOptions {
    /// Set the accepted comment syntax.
    pub fn with_comments(mut self, comments: CommentPolicy) -> Self {
        self.comments = comments;
        self
    }

    /// Enable or disable exact member mapping.
    pub fn with_exact_mappings(mut self, exact: bool) -> Self {
        self.exact_mappings = exact;
        self
    }

    /// Enable or disable the correctly rounded real parser.
    pub fn with_precise_reals(mut self, precise: bool) -> Self {
        self.precise_reals = precise;
        self
    }

    /// Enable or disable the trailing-data check.
    pub fn with_verify_end_of_data(mut self, verify: bool) -> Self {
        self.verify_end_of_data = verify;
        self
    }

    /// Enable or disable escaped member names.
    pub fn with_escaped_names(mut self, allow: bool) -> Self {
        self.allow_escaped_names = allow;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Whether output is compact or indented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerializationFormat {
    /// No whitespace between tokens.
    #[default]
    Minified,
    /// One member or element per line.
    Pretty,
}

/// Unit of indentation used by [`SerializationFormat::Pretty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indentation {
    /// One tab per level.
    Tab,
    /// The given number of spaces per level, at most 10.
    Spaces(u8),
}

impl Default for Indentation {
    fn default() -> Self {
        Indentation::Spaces(2)
    }
}

impl Indentation {
    pub(crate) fn unit(&self) -> &'static str {
        const SPACES: &str = "          ";
        match self {
            Indentation::Tab => "\t",
            Indentation::Spaces(n) => &SPACES[..usize::from((*n).min(10))],
        }
    }
}

/// Line terminator used by [`SerializationFormat::Pretty`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewLineDelimiter {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl NewLineDelimiter {
    pub(crate) fn as_bytes(&self) -> &'static [u8] {
        match self {
            NewLineDelimiter::Lf => b"\n",
            NewLineDelimiter::CrLf => b"\r\n",
        }
    }
}

/// Character set allowed in serialized strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestrictedStringOutput {
    /// Any UTF-8; only quotes, backslashes and control characters are escaped.
    #[default]
    None,
    /// Everything above 0x7E is written as `\uXXXX`.
    SevenBit,
}

/// How a value is written out.
///
/// # Examples
///
/// ```rust
/// use jsonlink::{Indentation, SerializationPolicy};
///
/// let policy = SerializationPolicy::pretty().with_indent(Indentation::Tab);
/// assert_eq!(policy.indent, Indentation::Tab);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializationPolicy {
    /// Compact or indented output.
    ///
    /// # Default
    ///
    /// [`SerializationFormat::Minified`]
    pub format: SerializationFormat,

    /// Indentation unit for pretty output.
    ///
    /// # Default
    ///
    /// Two spaces
    pub indent: Indentation,

    /// Line terminator for pretty output.
    ///
    /// # Default
    ///
    /// [`NewLineDelimiter::Lf`]
    pub newline: NewLineDelimiter,

    /// Emit a comma after the last member of every array and object.
    ///
    /// # Default
    ///
    /// `false`
    pub trailing_comma: bool,

    /// Character set allowed in strings.
    ///
    /// # Default
    ///
    /// [`RestrictedStringOutput::None`]
    pub restricted_strings: RestrictedStringOutput,
}

impl SerializationPolicy {
    /// Compact output with default settings.
    pub fn minified() -> Self {
        Self::default()
    }

    /// Indented output with default settings.
    pub fn pretty() -> Self {
        SerializationPolicy {
            format: SerializationFormat::Pretty,
            ..Self::default()
        }
    }

    /// Set the indentation unit.
    pub fn with_indent(mut self, indent: Indentation) -> Self {
        self.indent = indent;
        self
    }

    /// Set the line terminator.
    pub fn with_newline(mut self, newline: NewLineDelimiter) -> Self {
        self.newline = newline;
        self
    }

    /// Enable or disable trailing commas.
    pub fn with_trailing_comma(mut self, trailing_comma: bool) -> Self {
        self.trailing_comma = trailing_comma;
        self
    }

    /// Set the allowed character set for strings.
    pub fn with_restricted_strings(mut self, restricted: RestrictedStringOutput) -> Self {
        self.restricted_strings = restricted;
        self
    }

    pub(crate) fn is_pretty(&self) -> bool {
        self.format == SerializationFormat::Pretty
    }
}
