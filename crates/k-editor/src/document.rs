//! Document: the row store.
//!
//! An ordered list of [`Row`]s plus the bookkeeping that goes with a file:
//! its name, and a dirty counter that goes up on every change and back to
//! zero when the rows match what is on disk.
//!
//! All row mutations go through the methods here. They take positions as
//! given and quietly ignore ones that are out of range, so a bad index can
//! never corrupt the store.
//!
//! # File format
//!
//! Plain bytes, one row per line. On load, lines are split on `\n` and any
//! trailing `\r` is dropped. On save, every row is written followed by `\n`,
//! including the last. Saving overwrites the file in place: there is no
//! temporary file, so a failed write can leave it truncated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::row::Row;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The rows of one file and their metadata.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    dirty: usize,
    filename: Option<PathBuf>,
    tab_stop: usize,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// An empty, unnamed document.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            filename: None,
            tab_stop: tab_stop.max(1),
        }
    }

    /// A clean, unnamed document with the given lines.
    #[must_use]
    pub fn from_lines<I, L>(lines: I, tab_stop: usize) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        let mut doc = Self::new(tab_stop);
        let tab_stop = doc.tab_stop;
        doc.rows = lines.into_iter().map(|l| Row::new(l, tab_stop)).collect();
        doc
    }

    /// Parse file content into a clean, unnamed document.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], tab_stop: usize) -> Self {
        Self::from_lines(split_lines(bytes), tab_stop)
    }

    /// Load `path`.
    ///
    /// A file that does not exist yet opens as an empty document that will
    /// be saved under that name.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the file exists but cannot be read.
    pub fn open(path: &Path, tab_stop: usize) -> Result<Self> {
        let mut doc = match fs::read(path) {
            Ok(bytes) => {
                let doc = Self::from_bytes(&bytes, tab_stop);
                tracing::info!(
                    target: "io",
                    file = %path.display(),
                    size_bytes = bytes.len(),
                    rows = doc.num_rows(),
                    "file_read_ok"
                );
                doc
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(target: "io", file = %path.display(), "new_file");
                Self::new(tab_stop)
            }
            Err(source) => {
                return Err(Error::Open {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        doc.filename = Some(path.to_path_buf());
        Ok(doc)
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `at`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Changes since the last load or save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> usize {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Replace the filename (save-as).
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    // -- Row operations -----------------------------------------------------

    /// Insert a row holding `text` at `at`. No-op if `at > num_rows()`.
    pub fn insert_row(&mut self, at: usize, text: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(text, self.tab_stop));
        self.dirty += 1;
    }

    /// Remove row `at`. No-op if `at >= num_rows()`.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Insert `ch` into row `row` at `at` (clamped to the row length).
    pub fn row_insert_char(&mut self, row: usize, at: usize, ch: u8) {
        if let Some(r) = self.rows.get_mut(row) {
            r.insert(at, ch, self.tab_stop);
            self.dirty += 1;
        }
    }

    /// Remove the byte at `at` from row `row`. No-op unless `at` is inside
    /// the row.
    pub fn row_delete_char(&mut self, row: usize, at: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.delete(at, self.tab_stop) {
                self.dirty += 1;
            }
        }
    }

    /// Append `bytes` to row `row`.
    pub fn row_append(&mut self, row: usize, bytes: &[u8]) {
        if let Some(r) = self.rows.get_mut(row) {
            r.append(bytes, self.tab_stop);
            self.dirty += 1;
        }
    }

    /// Cut row `row` at `at` and return what was after it.
    ///
    /// Returns `None` if there is no such row.
    pub fn row_truncate(&mut self, row: usize, at: usize) -> Option<Vec<u8>> {
        let r = self.rows.get_mut(row)?;
        let tail = r.split_off(at, self.tab_stop);
        self.dirty += 1;
        Some(tail)
    }

    // -- File I/O -----------------------------------------------------------

    /// The file content: every row followed by `\n`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(len);
        for r in &self.rows {
            out.extend_from_slice(r.chars());
            out.push(b'\n');
        }
        out
    }

    /// Write the document to its filename and mark it clean.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the document has no filename; otherwise whatever
    /// opening or writing the file reports. The dirty counter is unchanged
    /// on failure.
    pub fn save(&mut self) -> io::Result<usize> {
        let Some(path) = self.filename.as_deref() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "document has no file name",
            ));
        };
        let bytes = self.to_bytes();
        fs::write(path, &bytes)?;
        tracing::info!(
            target: "io",
            file = %path.display(),
            size_bytes = bytes.len(),
            rows = self.rows.len(),
            "file_write_ok"
        );
        self.dirty = 0;
        Ok(bytes.len())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TAB_STOP)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split file content into lines without their terminators.
///
/// A final `\n` ends the last line rather than starting an empty one.
fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let end = line.iter().rposition(|&b| b != b'\r').map_or(0, |i| i + 1);
            &line[..end]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
