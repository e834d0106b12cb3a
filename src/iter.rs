//! Lazy iteration over JSON arrays and JSON-lines documents.

use std::marker::PhantomData;

use crate::cursor::find_byte;
use crate::deserialize::JsonDeserializer;
use crate::error::Result;
use crate::link::FromJson;
use crate::options::ParseOptions;
use crate::schema::FieldDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Elements,
    Done,
}

/// Parses the elements of a top-level JSON array one at a time.
///
/// Nothing past the current element is looked at, so a syntax error late in
/// the array only surfaces when iteration reaches it. After the first error
/// the iterator is exhausted.
///
/// ```rust
/// use jsonlink::ArrayIter;
///
/// let sum: i64 = ArrayIter::<i64>::new(b"[1, 2, 3]")
///     .map(|n| n.unwrap())
///     .sum();
/// assert_eq!(sum, 6);
/// ```
pub struct ArrayIter<'input, T> {
    deserializer: JsonDeserializer<'input>,
    element: FieldDescriptor,
    state: State,
    _marker: PhantomData<fn() -> T>,
}

impl<'input, T: FromJson<'input>> ArrayIter<'input, T> {
    pub fn new(input: &'input [u8]) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &'input [u8], options: ParseOptions) -> Self {
        ArrayIter {
            deserializer: JsonDeserializer::new(input, options),
            element: T::descriptor(),
            state: State::Start,
            _marker: PhantomData,
        }
    }

    fn step(&mut self) -> Result<Option<T>> {
        if self.state == State::Start {
            let cursor = self.deserializer.cursor_mut();
            cursor.trim_leading_whitespace();
            cursor.expect(b'[', "'['")?;
            self.state = State::Elements;
        }
        let cursor = self.deserializer.cursor_mut();
        cursor.trim_leading_whitespace();
        if cursor.peek() == Some(b']') {
            cursor.remove_prefix(1);
            self.state = State::Done;
            self.deserializer.finish()?;
            return Ok(None);
        }
        let value = self.deserializer.deserialize_value(&self.element)?;
        self.deserializer.element_separator()?;
        T::from_value(value).map(Some)
    }
}

impl<'input, T: FromJson<'input>> Iterator for ArrayIter<'input, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        match self.step() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}

/// Parses a JSON-lines document: one value per line, blank lines skipped.
///
/// Error offsets are absolute within the whole document.
///
/// ```rust
/// use jsonlink::JsonLines;
///
/// let lines: Vec<bool> = JsonLines::new(b"true\n\nfalse\n")
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(lines, [true, false]);
/// ```
pub struct JsonLines<'input, T> {
    input: &'input [u8],
    pos: usize,
    options: ParseOptions,
    element: FieldDescriptor,
    failed: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'input, T: FromJson<'input>> JsonLines<'input, T> {
    pub fn new(input: &'input [u8]) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &'input [u8], options: ParseOptions) -> Self {
        JsonLines {
            input,
            pos: 0,
            options,
            element: T::descriptor(),
            failed: false,
            _marker: PhantomData,
        }
    }
}

impl<'input, T: FromJson<'input>> Iterator for JsonLines<'input, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while self.pos < self.input.len() {
            let start = self.pos;
            let end = find_byte(b'\n', &self.input[start..]).map_or(self.input.len(), |i| start + i);
            self.pos = end + 1;

            let line = &self.input[start..end];
            if line.iter().all(|b| matches!(b, b' ' | b'\t' | b'\r')) {
                continue;
            }
            let mut deserializer = JsonDeserializer::over(self.input, start, end, self.options);
            let result = deserializer
                .deserialize_value(&self.element)
                .and_then(|value| {
                    deserializer.finish()?;
                    T::from_value(value)
                });
            if result.is_err() {
                self.failed = true;
            }
            return Some(result);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonErrorKind;

    #[test]
    fn array_iter_reports_late_errors_lazily() {
        let mut it = ArrayIter::<u8>::new(b"[1, 2, x]");
        assert_eq!(it.next().unwrap().unwrap(), 1);
        assert_eq!(it.next().unwrap().unwrap(), 2);
        let err = it.next().unwrap().unwrap_err();
        assert_eq!(err.offset(), Some(7));
        assert!(it.next().is_none());
    }

    #[test]
    fn array_iter_accepts_trailing_comma_and_empty_arrays() {
        let v: Vec<String> = ArrayIter::new(br#"["a", "b",]"#)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(v, ["a", "b"]);
        assert!(ArrayIter::<u8>::new(b" [ ] ").next().is_none());
    }

    #[test]
    fn array_iter_needs_an_array() {
        let err = ArrayIter::<u8>::new(b"{}").next().unwrap().unwrap_err();
        assert!(matches!(err.kind, JsonErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn json_lines_offsets_are_absolute() {
        let input = b"1\n2\n3 4\n";
        let mut it = JsonLines::<i32>::new(input);
        assert_eq!(it.next().unwrap().unwrap(), 1);
        assert_eq!(it.next().unwrap().unwrap(), 2);
        let err = it.next().unwrap().unwrap_err();
        assert_eq!(err.offset(), Some(6));
        assert!(it.next().is_none());
    }
}
