//! Bounds-checked view over the remaining input bytes.

use crate::error::{JsonError, JsonErrorKind, Result};
use crate::options::CommentPolicy;
use crate::span::Span;

/// A position inside a borrowed input buffer, limited to `pos..end`.
///
/// Offsets are always absolute into the original buffer so that errors
/// raised from a sub-cursor point at the right place in the document.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
    comments: CommentPolicy,
}

impl<'a> Cursor<'a> {
    /// A cursor over the whole buffer.
    pub fn new(buf: &'a [u8], comments: CommentPolicy) -> Self {
        Cursor {
            buf,
            pos: 0,
            end: buf.len(),
            comments,
        }
    }

    /// Current absolute offset.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Absolute offset one past the last readable byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// The full underlying buffer.
    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Comment syntax skipped by [`Cursor::trim_leading_whitespace`].
    #[inline]
    pub fn comments(&self) -> CommentPolicy {
        self.comments
    }

    /// `true` once every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    /// The unread bytes.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..self.end]
    }

    /// Next byte without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        if self.pos < self.end {
            Some(self.buf[self.pos])
        } else {
            None
        }
    }

    /// Byte `n` positions ahead without consuming anything.
    #[inline]
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        let at = self.pos + n;
        if at < self.end { Some(self.buf[at]) } else { None }
    }

    /// Consume and return the next byte.
    #[inline]
    pub fn pop(&mut self) -> Result<u8> {
        match self.peek() {
            Some(b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(self.eof("more input")),
        }
    }

    /// Skip `n` bytes, clamped to the end.
    #[inline]
    pub fn remove_prefix(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.end);
    }

    /// Whether the unread bytes start with `prefix`.
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.remaining().starts_with(prefix)
    }

    /// A bounded sub-cursor over `start..end` of the same buffer.
    pub fn slice(&self, start: usize, end: usize) -> Cursor<'a> {
        let end = end.min(self.buf.len());
        Cursor {
            buf: self.buf,
            pos: start.min(end),
            end,
            comments: self.comments,
        }
    }

    /// A sub-cursor over a span.
    pub fn slice_span(&self, span: Span) -> Cursor<'a> {
        self.slice(span.start, span.end())
    }

    /// Bytes covered by a span.
    #[inline]
    pub fn text(&self, span: Span) -> &'a [u8] {
        &self.buf[span.start..span.end()]
    }

    /// Skip JSON whitespace, and comments when the policy allows them.
    pub fn trim_leading_whitespace(&mut self) {
        loop {
            while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
                self.pos += 1;
            }
            match (self.comments, self.peek(), self.peek_at(1)) {
                (CommentPolicy::Cpp, Some(b'/'), Some(b'/'))
                | (CommentPolicy::Hash, Some(b'#'), _) => self.skip_line(),
                (CommentPolicy::Cpp, Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_line(&mut self) {
        match find_byte(b'\n', self.remaining()) {
            Some(idx) => self.pos += idx + 1,
            None => self.pos = self.end,
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        let rest = self.remaining();
        match rest.windows(2).position(|w| w == b"*/") {
            Some(idx) => self.pos += idx + 2,
            None => self.pos = self.end,
        }
    }

    /// Consume `byte` or fail with `UnexpectedToken`.
    pub fn expect(&mut self, byte: u8, expected: &'static str) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(JsonError::at(
                JsonErrorKind::UnexpectedToken {
                    got: describe_byte(b),
                    expected,
                },
                self.pos,
            )),
            None => Err(self.eof(expected)),
        }
    }

    /// Consume a literal keyword such as `true`.
    pub fn expect_literal(&mut self, literal: &'static str) -> Result<()> {
        if self.starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Ok(())
        } else if self.remaining().len() < literal.len()
            && literal.as_bytes().starts_with(self.remaining())
        {
            Err(self.eof(literal))
        } else {
            Err(JsonError::new(
                JsonErrorKind::InvalidLiteral { expected: literal },
                Span::new(self.pos, literal.len().min(self.end - self.pos).max(1)),
            ))
        }
    }

    /// An `UnexpectedEndOfInput` error at the current position.
    pub fn eof(&self, expected: &'static str) -> JsonError {
        JsonError::new(
            JsonErrorKind::UnexpectedEndOfInput { expected },
            Span::new(self.pos, 0),
        )
    }

    /// An error at the current position.
    pub fn error(&self, kind: JsonErrorKind) -> JsonError {
        JsonError::at(kind, self.pos)
    }
}

/// Human readable rendering of one input byte for error messages.
pub(crate) fn describe_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("0x{b:02x}")
    }
}

#[inline]
pub(crate) fn find_byte(needle: u8, haystack: &[u8]) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_past_end_is_an_error() {
        let mut c = Cursor::new(b"a", CommentPolicy::None);
        assert_eq!(c.pop().unwrap(), b'a');
        assert!(c.is_empty());
        let err = c.pop().unwrap_err();
        assert!(matches!(
            err.kind,
            JsonErrorKind::UnexpectedEndOfInput { .. }
        ));
        assert_eq!(err.offset(), Some(1));
    }

    #[test]
    fn sub_cursor_keeps_absolute_offsets() {
        let c = Cursor::new(b"{\"a\": 12}", CommentPolicy::None);
        let mut sub = c.slice(6, 8);
        assert_eq!(sub.remaining(), b"12");
        assert_eq!(sub.pos(), 6);
        sub.remove_prefix(10);
        assert!(sub.is_empty());
        assert_eq!(sub.pos(), 8);
    }

    #[test]
    fn trims_whitespace_only_without_comment_policy() {
        let mut c = Cursor::new(b" \t\r\n // x\n1", CommentPolicy::None);
        c.trim_leading_whitespace();
        assert_eq!(c.peek(), Some(b'/'));
    }

    #[test]
    fn trims_cpp_comments() {
        let mut c = Cursor::new(b" // line\n /* block\n */ 1", CommentPolicy::Cpp);
        c.trim_leading_whitespace();
        assert_eq!(c.remaining(), b"1");
    }

    #[test]
    fn trims_hash_comments() {
        let mut c = Cursor::new(b"# one\n  # two\n[", CommentPolicy::Hash);
        c.trim_leading_whitespace();
        assert_eq!(c.remaining(), b"[");
    }

    #[test]
    fn unterminated_block_comment_consumes_everything() {
        let mut c = Cursor::new(b"/* never closed", CommentPolicy::Cpp);
        c.trim_leading_whitespace();
        assert!(c.is_empty());
    }

    #[test]
    fn literal_mismatch_and_truncation() {
        let mut c = Cursor::new(b"tru", CommentPolicy::None);
        let err = c.expect_literal("true").unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::UnexpectedEndOfInput { .. }));

        let mut c = Cursor::new(b"trux", CommentPolicy::None);
        let err = c.expect_literal("true").unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::InvalidLiteral { .. }));
    }
}
