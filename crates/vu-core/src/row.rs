//! File content storage — byte-faithful rows.
//!
//! A [`RowStore`] holds the viewed file as a flat list of rows, split on
//! newlines at load time and never touched again.
//!
//! # Design choices
//!
//! - **Rows are raw bytes**, not strings. A viewer shows what is in the
//!   file; re-encoding or validating UTF-8 would alter content the user
//!   asked to see. Byte slices go straight from the store to the frame.
//!
//! - **Line terminators are stripped on load.** Each row drops its entire
//!   trailing run of `\n` and `\r` bytes, so `\n`, `\r\n`, and stray `\r`
//!   pileups all yield the same clean row. Interior `\r` bytes stay.
//!
//! - **The store is immutable after loading.** There is no editing, no
//!   appending, no re-reading. Whatever the file held at startup is what
//!   the viewer shows until it exits.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the loaded file, without its trailing newline bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    bytes: Vec<u8>,
}

impl Row {
    /// Wrap already-stripped line bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the row holds no bytes (a blank line).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The row's content.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// The loaded file, row by row.
///
/// An empty store (no rows at all) is valid and distinct from a store
/// holding one empty row: the former comes from an empty file, the latter
/// from a file containing a single newline.
#[derive(Debug, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    /// An empty store, as if loaded from an empty file.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    // -- Loading --------------------------------------------------------

    /// Load a file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Load rows from any buffered byte source.
    ///
    /// Splits on `\n` and strips each row's trailing `\n`/`\r` run. A
    /// final line without a terminator still becomes a row; an empty
    /// source yields no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn from_reader(mut reader: impl BufRead) -> io::Result<Self> {
        let mut rows = Vec::new();
        let mut line = Vec::new();
        loop {
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 {
                break;
            }
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            rows.push(Row::new(std::mem::take(&mut line)));
        }
        Ok(Self { rows })
    }

    /// Build a store from in-memory text. Same splitting rules as
    /// [`from_reader`](Self::from_reader).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::new();
        }

        let mut rows: Vec<Row> = text
            .split('\n')
            .map(|line| {
                let mut bytes = line.as_bytes().to_vec();
                while bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                Row::new(bytes)
            })
            .collect();

        // split() leaves an empty artifact after a final newline; that
        // artifact is the terminator of the last row, not a row itself.
        if text.ends_with('\n') {
            rows.pop();
        }

        Self { rows }
    }

    // -- Access ------------------------------------------------------------

    /// The row at `index`, if any.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Byte length of the row at `index`; 0 when `index` is past the end.
    ///
    /// The cursor is allowed to rest one line past the last row, where
    /// every column question answers zero.
    #[inline]
    #[must_use]
    pub fn row_len(&self, index: usize) -> usize {
        self.rows.get(index).map_or(0, Row::len)
    }

    /// Number of rows loaded.
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
