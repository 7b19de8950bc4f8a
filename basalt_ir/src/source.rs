//! Source file identity and byte-offset to line/column resolution.
//!
//! Every file carries a line-offset table built once from its text. Backend
//! passes that report source positions (diagnostics, debug info, coverage)
//! resolve node spans through this table rather than rescanning text.

use std::fmt;
use std::sync::Arc;

/// A source file with its line-offset table.
///
/// Line and column numbers are 1-based byte positions, matching what
/// downstream tooling expects. Offsets are validated against the file
/// length: the front end produced them, so an out-of-range offset is a
/// compiler bug and panics rather than yielding a corrupt position.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file as given to the front end.
    path: Arc<str>,
    /// Byte offset of the first byte of each line, in ascending order.
    /// Always starts with 0, even for an empty file.
    line_starts: Vec<u32>,
    /// Total length of the file in bytes.
    len: u32,
}

impl SourceFile {
    /// Build a source file entry from its path and full text.
    #[must_use]
    pub fn new(path: impl Into<Arc<str>>, text: &str) -> Self {
        let mut line_starts = vec![0];
        for (pos, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(pos as u32 + 1);
            }
        }
        Self {
            path: path.into(),
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Path of the file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Arc<str> {
        &self.path
    }

    /// Length of the file in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the file is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolve a byte offset to a 1-based `(line, column)` pair.
    ///
    /// An offset equal to the file length is valid (exclusive span ends
    /// point one past the last byte).
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the file. Offsets come from the
    /// front end's own spans; an unresolvable one is an internal fault, not
    /// a user error.
    #[must_use]
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        assert!(
            offset <= self.len,
            "byte offset {} is past the end of {} ({} bytes)",
            offset,
            self.path,
            self.len
        );
        let line_index = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line_index];
        (line_index as u32 + 1, offset - line_start + 1)
    }

    /// 1-based line number of a byte offset.
    #[inline]
    #[must_use]
    pub fn line(&self, offset: u32) -> u32 {
        self.line_col(offset).0
    }

    /// 1-based column number of a byte offset.
    #[inline]
    #[must_use]
    pub fn column(&self, offset: u32) -> u32 {
        self.line_col(offset).1
    }

    /// Number of lines in the file.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceFile({:?}, {} bytes)", self.path, self.len)
    }
}
