//! Loaded source files and span resolution.

use crate::span::{FileId, Span};
use logictree_common::ContentHash;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// One HDL file held in memory with a line index.
pub struct SourceFile {
    /// Handle of this file.
    pub id: FileId,
    /// Path on disk, or a synthetic name for in-memory text.
    pub path: PathBuf,
    /// Full text.
    pub content: String,
    /// Fingerprint of `content`.
    pub content_hash: ContentHash,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Wraps `content` and indexes its line starts.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        let content_hash = ContentHash::from_bytes(content.as_bytes());
        Self {
            id,
            path,
            content,
            content_hash,
            line_starts,
        }
    }

    /// 1-based (line, column) of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        (idx as u32 + 1, offset - self.line_starts[idx] + 1)
    }

    /// Text between two byte offsets, clamped to the file.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        let len = self.content.len();
        let start = (start as usize).min(len);
        let end = (end as usize).clamp(start, len);
        self.content.get(start..end).unwrap_or("")
    }

    /// The full line containing `offset`, without its newline.
    pub fn line_text(&self, offset: u32) -> &str {
        let offset = (offset as usize).min(self.content.len());
        let start = self.content[..offset].rfind('\n').map_or(0, |p| p + 1);
        let end = self.content[offset..]
            .find('\n')
            .map_or(self.content.len(), |p| offset + p);
        &self.content[start..end]
    }
}

/// A span translated to 1-based line and column numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// File path for display.
    pub file_path: PathBuf,
    /// Line of the first byte.
    pub start_line: u32,
    /// Column of the first byte.
    pub start_col: u32,
    /// Line of the last byte.
    pub end_line: u32,
    /// Column of the last byte.
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_path.display(),
            self.start_line,
            self.start_col
        )
    }
}

/// Every source file of one tool invocation.
#[derive(Default)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path` from disk.
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path, content))
    }

    /// Registers in-memory text under a display name.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Looks up a file by handle.
    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Resolves a span to line/column form, or `None` for dummy spans.
    pub fn resolve_span(&self, span: Span) -> Option<ResolvedSpan> {
        let file = self.file(span.file)?;
        let (start_line, start_col) = file.line_col(span.start);
        let last = span.end.saturating_sub(1).max(span.start);
        let (end_line, end_col) = file.line_col(last);
        Some(ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// Source text covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        self.file(span.file)
            .map_or("", |f| f.snippet(span.start, span.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_walks_newlines() {
        let f = SourceFile::new(FileId::from_raw(0), "m.sv".into(), "ab\ncd\n\nx".into());
        assert_eq!(f.line_col(0), (1, 1));
        assert_eq!(f.line_col(4), (2, 2));
        assert_eq!(f.line_col(7), (4, 1));
    }

    #[test]
    fn line_text_strips_newline() {
        let f = SourceFile::new(
            FileId::from_raw(0),
            "m.sv".into(),
            "module m;\n  assign y = a;\nendmodule".into(),
        );
        assert_eq!(f.line_text(14), "  assign y = a;");
    }

    #[test]
    fn resolve_and_snippet() {
        let mut db = SourceDb::new();
        let id = db.add_source("top.sv", "module top;\nendmodule\n".to_string());
        let span = Span::new(id, 12, 21);
        assert_eq!(db.snippet(span), "endmodule");
        let r = db.resolve_span(span).unwrap();
        assert_eq!((r.start_line, r.start_col, r.end_col), (2, 1, 9));
        assert_eq!(r.to_string(), "top.sv:2:1");
    }

    #[test]
    fn dummy_span_does_not_resolve() {
        let db = SourceDb::new();
        assert!(db.resolve_span(Span::DUMMY).is_none());
        assert_eq!(db.snippet(Span::DUMMY), "");
    }

    #[test]
    fn snippet_is_clamped() {
        let f = SourceFile::new(FileId::from_raw(0), "a.sv".into(), "abc".into());
        assert_eq!(f.snippet(1, 99), "bc");
        assert_eq!(f.snippet(5, 2), "");
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("and2.sv");
        std::fs::write(&path, "module and2; endmodule").unwrap();
        let mut db = SourceDb::new();
        let id = db.load_file(&path).unwrap();
        let file = db.file(id).unwrap();
        assert_eq!(file.content, "module and2; endmodule");
        assert_eq!(
            file.content_hash,
            ContentHash::from_bytes(b"module and2; endmodule")
        );
    }
}
