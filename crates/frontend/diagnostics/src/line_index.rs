//! Byte offset to line/column conversion for problem markers.

use std::fmt;
use std::ops::Range;

use crate::{Diagnostic, DiagnosticCode, DiagnosticSeverity};

/// Start offsets of every line of a source text.
///
/// Offsets are opaque bytes; lines are split on `\n` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// 1-based line and column of a byte offset, clamped to the text length
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
        (line + 1, offset - self.line_starts[line] + 1)
    }

    /// End offset of the line containing `offset`, excluding the newline
    fn line_end(&self, offset: usize) -> usize {
        let (line, _) = self.line_col(offset);
        self.line_starts
            .get(line)
            .map_or(self.len, |next_start| next_start - 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A problem marker anchored to a line and a column range on that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub file: String,
    pub line: usize,
    /// 1-based, end exclusive; multi-line ranges are clipped to the first line
    pub columns: Range<usize>,
    pub code: DiagnosticCode,
    pub message: String,
    pub severity: DiagnosticSeverity,
}

impl Diagnostic {
    pub fn to_marker(&self, lines: &LineIndex) -> Marker {
        let (line, start_col) = lines.line_col(self.span.start);
        let end = self.span.end.min(lines.line_end(self.span.start));
        let (_, end_col) = lines.line_col(end.max(self.span.start));
        Marker {
            file: self.file_path.clone(),
            line,
            columns: start_col..end_col,
            code: self.code,
            message: self.message.clone(),
            severity: self.severity,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.file, self.line, self.columns.start, self.severity, self.code, self.message
        )
    }
}
