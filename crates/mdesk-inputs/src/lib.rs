use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
pub use line_index::LineIndex;
use text_size::{TextRange, TextSize};

/// One source document as handed to the parser.
///
/// The parser works on raw bytes so that invalid UTF-8 can be reported rather than rejected up
/// front. `text` is a rendition of the same bytes where every byte of an invalid sequence is
/// replaced by `?`, which keeps byte offsets identical between the two views.
#[derive(Debug)]
pub struct SourceFile {
    path: Utf8PathBuf,
    bytes: Box<[u8]>,
    text: Box<str>,
    line_index: LineIndex,
}

impl SourceFile {
    pub fn new(path: impl Into<Utf8PathBuf>, bytes: impl Into<Box<[u8]>>) -> Self {
        let bytes = bytes.into();
        let text = display_text(&bytes).into_boxed_str();
        let line_index = LineIndex::new(&text);
        Self { path: path.into(), bytes, text, line_index }
    }

    pub fn read(path: impl Into<Utf8PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let bytes = std::fs::read(&path)?;
        Ok(Self::new(path, bytes))
    }

    /// Display name of the document. For in-memory parses this is whatever the caller chose.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> TextSize {
        TextSize::new(self.bytes.len() as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn slice(&self, range: TextRange) -> &[u8] {
        let range: std::ops::Range<usize> = range.into();
        &self.bytes[range]
    }

    pub fn code_loc(&self, offset: TextSize) -> CodeLoc<'_> {
        let offset = offset.min(self.len());
        let line_col = self.line_index.line_col(offset);
        CodeLoc { path: &self.path, line: line_col.line + 1, column: line_col.col + 1 }
    }
}

/// A human-facing source position. Lines and columns are 1-based; columns count bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeLoc<'a> {
    pub path: &'a Utf8Path,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for CodeLoc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

fn display_text(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        text.extend(std::iter::repeat_n('?', chunk.invalid().len()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_loc_is_one_based() {
        let file = SourceFile::new("test.mdesk", b"abc\n  def".to_vec());

        let loc = file.code_loc(TextSize::new(0));
        assert_eq!((loc.line, loc.column), (1, 1));

        let loc = file.code_loc(TextSize::new(6));
        assert_eq!((loc.line, loc.column), (2, 3));
        assert_eq!(loc.to_string(), "test.mdesk:2:3");
    }

    #[test]
    fn invalid_bytes_keep_offsets() {
        let file = SourceFile::new("bytes", b"foo\x80bar\n\xffx".to_vec());
        assert_eq!(file.text(), "foo?bar\n?x");
        assert_eq!(file.text().len(), file.bytes().len());

        let loc = file.code_loc(TextSize::new(3));
        assert_eq!((loc.line, loc.column), (1, 4));

        let loc = file.code_loc(TextSize::new(9));
        assert_eq!((loc.line, loc.column), (2, 2));
    }

    #[test]
    fn offsets_past_the_end_are_clamped() {
        let file = SourceFile::new("short", b"ab".to_vec());
        let loc = file.code_loc(TextSize::new(100));
        assert_eq!((loc.line, loc.column), (1, 3));
    }
}
