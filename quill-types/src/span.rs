use std::{fmt, path::PathBuf, sync::Arc};

/// A position in a source file, given as 1-based line and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Represents a span of the source code in a specific file.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    // The original source code.
    src: Arc<str>,
    // The byte position in the string of the start of the span.
    start: usize,
    // The byte position in the string of the end of the span.
    end: usize,
    // A reference counted pointer to the file from which this span originated.
    path: Option<Arc<PathBuf>>,
}

impl Span {
    pub fn new(
        src: Arc<str>,
        start: usize,
        end: usize,
        path: Option<Arc<PathBuf>>,
    ) -> Option<Span> {
        src.get(start..end)?;
        Some(Span {
            src,
            start,
            end,
            path,
        })
    }

    pub fn dummy() -> Span {
        Span {
            src: Arc::from(""),
            start: 0,
            end: 0,
            path: None,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.src.is_empty() && self.start == 0 && self.end == 0
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn path(&self) -> Option<&Arc<PathBuf>> {
        self.path.as_ref()
    }

    pub fn as_str(&self) -> &str {
        &self.src[self.start..self.end]
    }

    pub fn line_col(&self) -> (LineCol, LineCol) {
        (self.position(self.start), self.position(self.end))
    }

    fn position(&self, pos: usize) -> LineCol {
        let before = &self.src[..pos];
        let line = before.matches('\n').count() + 1;
        let col = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        LineCol { line, col }
    }

    /// Shrinks the span so that it has no leading or trailing whitespace.
    pub fn trim(self) -> Span {
        let text = self.as_str();
        let start = self.start + (text.len() - text.trim_start().len());
        let end = self.end - (text.len() - text.trim_end().len());
        let (start, end) = if start > end { (self.start, self.start) } else { (start, end) };
        Span { start, end, ..self }
    }

    /// Creates a span that starts at `lhs` and ends at `rhs`.
    ///
    /// If the two spans come from different sources, `lhs` is returned unchanged.
    pub fn join(lhs: Span, rhs: &Span) -> Span {
        if !Arc::ptr_eq(&lhs.src, &rhs.src) && lhs.src != rhs.src {
            return lhs;
        }
        Span {
            start: std::cmp::min(lhs.start, rhs.start),
            end: std::cmp::max(lhs.end, rhs.end),
            ..lhs
        }
    }

    /// Renders the file and starting position of the span, e.g. `shapes.ql:3:5`.
    pub fn location(&self) -> String {
        let (start, _) = self.line_col();
        match &self.path {
            Some(path) => format!("{}:{start}", path.display()),
            None => start.to_string(),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Span")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("as_str", &self.as_str())
            .finish()
    }
}
