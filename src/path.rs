//! Path queries over [`Value`] trees.
//!
//! A query starts at the root `$` and walks a chain of segments:
//!
//! | syntax            | selects                                              |
//! |-------------------|------------------------------------------------------|
//! | `.name`           | member `name` of an object                           |
//! | `.*`, `[*]`       | every member value of an object or element of array  |
//! | `[2]`, `[-1]`     | an array element, negative indices count from the end|
//! | `[1:3]`, `[::2]`  | a slice of an array (`start:end:step`, clamped)      |
//! | `['a b']`         | a member whose name is not an identifier             |
//! | `[0, 'x']`        | the union of several selectors                       |
//! | `..name`, `..*`   | the same selectors applied to every descendant       |
//!
//! A compiled [`Path`] holds no per-call state. Whether missing members and
//! out-of-range indices are errors is decided by the caller on every
//! [`Path::resolve`], so a single compiled path can be shared between threads.

use std::fmt;

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("invalid query '{query}': {message} at offset {offset}")]
    Syntax {
        query: String,
        message: String,
        offset: usize,
    },

    #[error("key '{0}' not found")]
    NotFound(String),

    #[error("array index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("cannot index into {0}, not an array")]
    NotAnArray(&'static str),
}

impl PathError {
    /// True for failures that are tolerated when missing keys are allowed.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            PathError::NotFound(_) | PathError::IndexOutOfBounds { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Name(String),
    Wildcard,
    Index(i64),
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Child(Vec<Selector>),
    Descendant(Vec<Selector>),
}

/// A compiled path query.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    source: String,
    segments: Vec<Segment>,
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Path {
    /// Compiles query text such as `$.store.book[0].title`.
    pub fn compile(query: &str) -> Result<Path, PathError> {
        let segments = PathParser::new(query).parse()?;
        Ok(Path {
            source: query.to_string(),
            segments,
        })
    }

    /// The query text this path was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Resolves the path against `root`, returning matches in document order.
    ///
    /// With `tolerate_missing` set, members that do not exist and indices
    /// past the end of an array simply produce no match. Otherwise they fail
    /// with [`PathError::NotFound`] or [`PathError::IndexOutOfBounds`].
    /// Indexing a value that is not an array always fails.
    pub fn resolve<'a>(
        &self,
        root: &'a Value,
        tolerate_missing: bool,
    ) -> Result<Vec<&'a Value>, PathError> {
        let mut current = vec![root];

        for segment in &self.segments {
            current = match segment {
                Segment::Child(selectors) => select(&current, selectors, tolerate_missing, false)?,
                Segment::Descendant(selectors) => {
                    let mut nodes = Vec::new();
                    for value in &current {
                        collect_descendants(value, &mut nodes);
                    }
                    select(&nodes, selectors, true, true)?
                }
            };
        }

        Ok(current)
    }
}

/// Pushes `value` and everything below it, parents before children.
fn collect_descendants<'a>(value: &'a Value, into: &mut Vec<&'a Value>) {
    into.push(value);
    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_descendants(v, into)),
        Value::Object(map) => map.values().for_each(|v| collect_descendants(v, into)),
        _ => {}
    }
}

fn select<'a>(
    inputs: &[&'a Value],
    selectors: &[Selector],
    tolerate_missing: bool,
    descendant: bool,
) -> Result<Vec<&'a Value>, PathError> {
    let mut results = Vec::new();

    for &value in inputs {
        if value.is_null() {
            continue;
        }
        for selector in selectors {
            match (selector, value) {
                (Selector::Name(name), Value::Object(map)) => {
                    if let Some(found) = map.get(name) {
                        results.push(found);
                    }
                }
                (Selector::Name(_), _) => {}
                (Selector::Wildcard, Value::Object(map)) => results.extend(map.values()),
                (Selector::Wildcard, Value::Array(items)) => results.extend(items.iter()),
                (Selector::Wildcard, _) => {}
                (Selector::Index(index), Value::Array(items)) => {
                    match normalize_index(*index, items.len()).and_then(|i| items.get(i)) {
                        Some(found) => results.push(found),
                        None if tolerate_missing => {}
                        None => {
                            return Err(PathError::IndexOutOfBounds {
                                index: *index,
                                len: items.len(),
                            });
                        }
                    }
                }
                (Selector::Slice { start, end, step }, Value::Array(items)) => {
                    let (from, to) = slice_bounds(*start, *end, items.len());
                    results.extend(items[from..to].iter().step_by(*step as usize));
                }
                (Selector::Index(_) | Selector::Slice { .. }, _) if descendant => {}
                (Selector::Index(_) | Selector::Slice { .. }, other) => {
                    return Err(PathError::NotAnArray(other.type_name()));
                }
            }
        }
    }

    if results.is_empty() && !inputs.is_empty() && !tolerate_missing {
        let missing = selectors.iter().find_map(|s| match s {
            Selector::Name(name) => Some(name),
            _ => None,
        });
        if let Some(name) = missing {
            return Err(PathError::NotFound(name.clone()));
        }
    }

    Ok(results)
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        usize::try_from(index).ok()
    } else {
        len.checked_sub(usize::try_from(index.unsigned_abs()).ok()?)
    }
}

/// Clamped `[from, to)` range of a slice over an array of length `len`.
fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let clamp = |bound: i64| -> usize {
        if bound < 0 {
            len.saturating_sub(usize::try_from(bound.unsigned_abs()).unwrap_or(usize::MAX))
        } else {
            usize::try_from(bound).unwrap_or(usize::MAX).min(len)
        }
    };
    let from = start.map_or(0, clamp);
    let to = end.map_or(len, clamp);
    (from, to.max(from))
}

struct PathParser<'q> {
    query: &'q str,
    chars: Vec<char>,
    position: usize,
}

impl<'q> PathParser<'q> {
    fn new(query: &'q str) -> Self {
        PathParser {
            query,
            chars: query.chars().collect(),
            position: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> PathError {
        PathError::Syntax {
            query: self.query.to_string(),
            message: message.into(),
            offset: self.position,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_spaces(&mut self) {
        while self.current_char().is_some_and(|c| c == ' ') {
            self.advance();
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>, PathError> {
        if self.current_char() != Some('$') {
            return Err(self.error("query must start with '$'"));
        }
        self.advance();

        let mut segments = Vec::new();
        while let Some(ch) = self.current_char() {
            let segment = match ch {
                '.' if self.peek_char(1) == Some('.') => {
                    self.advance();
                    self.advance();
                    if self.current_char() == Some('[') {
                        Segment::Descendant(self.parse_bracket()?)
                    } else {
                        Segment::Descendant(vec![self.parse_dotted()?])
                    }
                }
                '.' => {
                    self.advance();
                    Segment::Child(vec![self.parse_dotted()?])
                }
                '[' => Segment::Child(self.parse_bracket()?),
                other => return Err(self.error(format!("unexpected '{}'", other))),
            };
            segments.push(segment);
        }

        Ok(segments)
    }

    /// `*` or a member name following one or two dots.
    fn parse_dotted(&mut self) -> Result<Selector, PathError> {
        if self.current_char() == Some('*') {
            self.advance();
            return Ok(Selector::Wildcard);
        }
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("expected a member name or '*'"));
        }
        Ok(Selector::Name(name))
    }

    fn parse_bracket(&mut self) -> Result<Vec<Selector>, PathError> {
        self.advance(); // Consume '['
        let mut selectors = Vec::new();

        loop {
            self.skip_spaces();
            let selector = match self.current_char() {
                Some('*') => {
                    self.advance();
                    Selector::Wildcard
                }
                Some(quote @ ('\'' | '"')) => Selector::Name(self.parse_quoted(quote)?),
                Some('?' | '(') => {
                    return Err(self.error("filter and script expressions are not supported"));
                }
                Some(c) if c == '-' || c == ':' || c.is_ascii_digit() => self.parse_index_or_slice()?,
                _ => return Err(self.error("expected a selector")),
            };
            selectors.push(selector);

            self.skip_spaces();
            match self.current_char() {
                Some(',') => self.advance(),
                Some(']') => {
                    self.advance();
                    return Ok(selectors);
                }
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, PathError> {
        self.advance(); // Consume opening quote
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            match ch {
                c if c == quote => return Ok(name),
                '\\' => match self.current_char() {
                    Some(escaped) => {
                        name.push(escaped);
                        self.advance();
                    }
                    None => break,
                },
                c => name.push(c),
            }
        }
        Err(self.error("unterminated quoted name"))
    }

    fn parse_integer(&mut self) -> Result<Option<i64>, PathError> {
        self.skip_spaces();
        let mut digits = String::new();
        if self.current_char() == Some('-') {
            digits.push('-');
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        self.skip_spaces();
        if digits.is_empty() {
            return Ok(None);
        }
        digits
            .parse::<i64>()
            .map(Some)
            .map_err(|_| self.error(format!("invalid integer '{}'", digits)))
    }

    fn parse_index_or_slice(&mut self) -> Result<Selector, PathError> {
        let start = self.parse_integer()?;
        if self.current_char() != Some(':') {
            return start
                .map(Selector::Index)
                .ok_or_else(|| self.error("expected an index"));
        }
        self.advance();
        let end = self.parse_integer()?;

        let step = if self.current_char() == Some(':') {
            self.advance();
            self.parse_integer()?.unwrap_or(1)
        } else {
            1
        };
        if step <= 0 {
            return Err(self.error("slice step must be positive"));
        }

        Ok(Selector::Slice { start, end, step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_segments() {
        let path = Path::compile("$.foo.bar[234]..baz[*]").unwrap();
        assert_eq!(
            path.segments,
            vec![
                Segment::Child(vec![Selector::Name("foo".into())]),
                Segment::Child(vec![Selector::Name("bar".into())]),
                Segment::Child(vec![Selector::Index(234)]),
                Segment::Descendant(vec![Selector::Name("baz".into())]),
                Segment::Child(vec![Selector::Wildcard]),
            ]
        );
    }

    #[test]
    fn test_compile_slices() {
        let path = Path::compile("$[1:][:-1][::2]").unwrap();
        assert_eq!(
            path.segments,
            vec![
                Segment::Child(vec![Selector::Slice { start: Some(1), end: None, step: 1 }]),
                Segment::Child(vec![Selector::Slice { start: None, end: Some(-1), step: 1 }]),
                Segment::Child(vec![Selector::Slice { start: None, end: None, step: 2 }]),
            ]
        );
    }

    #[test]
    fn test_slice_bounds_clamp() {
        assert_eq!(slice_bounds(Some(2), None, 4), (2, 4));
        assert_eq!(slice_bounds(Some(-10), Some(100), 4), (0, 4));
        assert_eq!(slice_bounds(Some(3), Some(1), 4), (3, 3));
    }
}
