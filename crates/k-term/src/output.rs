// SPDX-License-Identifier: MIT
//
// The append buffer.
//
// A frame is built from dozens of small fragments: escape sequences, row
// text, padding, the status bar. Writing each one straight to the tty
// costs a syscall apiece and lets the terminal paint half-finished frames,
// which shows up as flicker. Instead every fragment is appended here and
// the whole frame goes out in a single write() at the end.

use std::io::{self, Write};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates a frame for a single `write()` syscall.
///
/// Default capacity: 16 KB, enough for a full frame on most terminals
/// without reallocation. Growth beyond that is the `Vec`'s amortised
/// doubling.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a fragment.
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append at most `max` bytes of `bytes`.
    ///
    /// Text is clipped by byte count: one byte is one column in this editor.
    #[inline]
    pub fn append_clipped(&mut self, bytes: &[u8], max: usize) {
        let end = bytes.len().min(max);
        self.buf.extend_from_slice(&bytes[..end]);
    }

    /// Append `n` copies of `byte` (padding).
    pub fn append_repeated(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op. Real flushing goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
