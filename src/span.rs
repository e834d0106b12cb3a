//! Span types for tracking source locations.

/// Position in the input (byte index)
pub type Pos = usize;

/// A span in the input, with a start position and length
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    /// Starting position of the span in bytes
    pub start: Pos,
    /// Length of the span in bytes
    pub len: usize,
}

impl Span {
    /// Creates a new span with the given start position and length
    pub fn new(start: Pos, len: usize) -> Self {
        Span { start, len }
    }

    /// Creates a span covering `start..end`
    pub fn from_range(start: Pos, end: Pos) -> Self {
        Span {
            start,
            len: end.saturating_sub(start),
        }
    }

    /// Starting position of the span
    pub fn start(&self) -> Pos {
        self.start
    }

    /// Length of the span
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if this span has zero length
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// End position (start + length)
    pub fn end(&self) -> Pos {
        self.start + self.len
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.start.into(), span.len)
    }
}

/// Where a declared member's value was found inside one object.
///
/// One slot exists per schema field for the duration of a single object
/// parse. Slots are filled left to right as the resolver sweeps the object
/// and are never re-scanned once filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocatedSpan {
    /// Index of the field in its schema
    pub field_index: usize,
    /// The value's text, when found
    pub span: Span,
    /// Whether the member has been seen yet
    pub found: bool,
}

impl LocatedSpan {
    /// An empty slot for the given field.
    pub fn missing(field_index: usize) -> Self {
        LocatedSpan {
            field_index,
            span: Span::default(),
            found: false,
        }
    }

    /// The located span, or `None` if the member has not been seen.
    pub fn get(&self) -> Option<Span> {
        self.found.then_some(self.span)
    }
}
