//! Source location tracking

/// A span represents a range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start character offset
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// File ID
    pub file_id: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    /// Create a dummy span (for testing)
    pub fn dummy() -> Self {
        Self { start: 0, end: 0, file_id: 0 }
    }

    /// Merge two spans
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}

/// Maps character offsets to 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first character of every line
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for a source text. Offsets are counted in chars,
    /// matching the lexer.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, c) in source.chars().enumerate() {
            if c == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing `offset`
    pub fn line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// 1-based (line, column) of `offset`
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let column = offset - self.line_starts[line - 1] + 1;
        (line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_lookup() {
        let index = LineIndex::new("package p\n\nfunc F() {}\n");
        assert_eq!(index.line(0), 1);
        assert_eq!(index.line(9), 1);
        assert_eq!(index.line(10), 2);
        assert_eq!(index.line(11), 3);
        assert_eq!(index.line_col(16), (3, 6));
    }

    #[test]
    fn test_merge() {
        let a = Span::new(4, 8, 1);
        let b = Span::new(2, 6, 1);
        assert_eq!(a.merge(&b), Span::new(2, 8, 1));
    }
}
