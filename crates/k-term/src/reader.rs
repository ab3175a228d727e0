// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Byte sources: where the key decoder gets its input.
//
// The decoder pulls one byte at a time and needs to know the difference
// between "nothing arrived yet" and "the read failed". A lone ESC is only
// distinguishable from the start of an escape sequence by waiting a short
// while for the next byte, so every read is bounded: `Ok(None)` means the
// wait expired with no data, `Err` means the source is broken.
//
// `StdinReader` implements this over the terminal with `poll()` on stdin's
// file descriptor. There is no background thread: the editor is strictly
// render → read → mutate, so the main thread can simply block for up to
// one poll interval and try again.
//
// `ScriptedSource` replays a fixed byte sequence and reports a timeout once
// it runs dry. Tests drive the decoder and the whole editor through it.

use std::collections::VecDeque;
use std::io;

/// How long a single read waits for a byte (milliseconds).
///
/// Doubles as the escape-sequence timeout: if the byte after an ESC has not
/// arrived within this window, the ESC was a keypress on its own.
pub const POLL_TIMEOUT_MS: i32 = 100;

// ─── ByteSource ──────────────────────────────────────────────────────────────

/// A source that yields at most one byte per call within a bounded wait.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// Returns `Ok(None)` if no byte became available before the timeout.
    ///
    /// # Errors
    ///
    /// Any failure other than a plain timeout. Callers treat it as fatal.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── StdinReader ─────────────────────────────────────────────────────────────

/// Reads raw bytes from stdin, waiting at most [`POLL_TIMEOUT_MS`] per call.
///
/// Expects the terminal to be in raw mode (see [`Terminal`]); otherwise the
/// line discipline holds bytes back until Enter.
///
/// [`Terminal`]: crate::terminal::Terminal
#[derive(Debug, Clone, Copy)]
pub struct StdinReader;

impl StdinReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for StdinReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl ByteSource for StdinReader {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let fd = libc::STDIN_FILENO;

        // Wait for readability, bounded by the poll interval.
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            // A signal (SIGWINCH, most likely) cut the wait short.
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(None);
            }
            return Err(err);
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(fd, (&raw mut byte).cast::<libc::c_void>(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed",
            )),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

/// Non-unix fallback: a plain blocking read. Never reports a timeout, so a
/// lone ESC waits for the next keypress to be resolved.
#[cfg(not(unix))]
impl ByteSource for StdinReader {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte)? {
            0 => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed")),
            _ => Ok(Some(byte[0])),
        }
    }
}

// ─── ScriptedSource ──────────────────────────────────────────────────────────

/// Replays a fixed sequence of bytes, then reports timeouts forever.
///
/// Optionally fails once the script is exhausted, to exercise the fatal
/// read path.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    bytes: VecDeque<u8>,
    fail_when_empty: bool,
}

impl ScriptedSource {
    /// A source that yields `bytes` in order.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
            fail_when_empty: false,
        }
    }

    /// A source that yields `bytes`, then returns an I/O error.
    #[must_use]
    pub fn failing_after(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
            fail_when_empty: true,
        }
    }

    /// Append more bytes to the script.
    pub fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().copied());
    }

    /// Bytes not yet consumed.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for ScriptedSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.bytes.pop_front() {
            Some(b) => Ok(Some(b)),
            None if self.fail_when_empty => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted source exhausted",
            )),
            None => Ok(None),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
