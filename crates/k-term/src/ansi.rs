// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the renderer's job. This module
// just knows the byte-level encoding of the VT100 commands the editor uses:
// clear, home, absolute cursor moves, cursor visibility, erase-to-end-of-line,
// inverse video, and the cursor position report round trip.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

// ─── Sequences ───────────────────────────────────────────────────────────────

/// ED 2: erase the whole display.
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
/// CUP with no parameters: cursor to the top-left cell.
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
/// DECTCEM reset.
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
/// DECTCEM set.
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
/// EL 0: erase from the cursor to the end of the line.
pub const ERASE_LINE_RIGHT: &[u8] = b"\x1b[K";
/// SGR 7.
pub const INVERSE_ON: &[u8] = b"\x1b[7m";
/// SGR with no parameters: back to default rendition.
pub const RESET_ATTRS: &[u8] = b"\x1b[m";
/// Push the cursor as far right and down as the terminal allows.
///
/// CUF/CUD stop at the screen edge, unlike CUP with a large argument, whose
/// behavior is not specified.
pub const CURSOR_FAR_CORNER: &[u8] = b"\x1b[999C\x1b[999B";
/// DSR 6: ask the terminal to report the cursor position as `ESC [ r ; c R`.
pub const REQUEST_CURSOR_POSITION: &[u8] = b"\x1b[6n";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the top-left cell.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HOME)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN)
}

/// Erase from the cursor to the end of the current line (EL 0).
#[inline]
pub fn erase_line_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(ERASE_LINE_RIGHT)
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

/// Switch to inverted colors (SGR 7). Used for the status bar.
#[inline]
pub fn inverse_on(w: &mut impl Write) -> io::Result<()> {
    w.write_all(INVERSE_ON)
}

/// Reset all SGR attributes to terminal defaults.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET_ATTRS)
}

// ─── Cursor Position Report ─────────────────────────────────────────────────

/// Emit the probe used when `TIOCGWINSZ` is unavailable: park the cursor in
/// the bottom-right corner, then request its position.
#[inline]
pub fn probe_screen_size(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_FAR_CORNER)?;
    w.write_all(REQUEST_CURSOR_POSITION)
}

/// Parse a cursor position report `ESC [ rows ; cols R`.
///
/// The trailing `R` is optional so callers can pass the bytes read up to
/// (but not including) the terminator. Returns `(rows, cols)` as reported,
/// i.e. 1-indexed, which for a cursor parked in the far corner equals the
/// screen dimensions.
#[must_use]
pub fn parse_cursor_report(report: &[u8]) -> Option<(u16, u16)> {
    let body = report.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_is_row_then_column() {
        assert_eq!(emit(|w| cursor_to(w, 9, 4)), "\x1b[5;10H");
    }

    #[test]
    fn cursor_to_max_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, u16::MAX)), "\x1b[65536;65536H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    #[test]
    fn home() {
        assert_eq!(emit(|w| cursor_home(w)), "\x1b[H");
    }

    // ── Screen / attributes ─────────────────────────────────────────────

    #[test]
    fn clear_and_erase() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| erase_line_right(w)), "\x1b[K");
    }

    #[test]
    fn inverse_video_pair() {
        assert_eq!(emit(|w| inverse_on(w)), "\x1b[7m");
        assert_eq!(emit(|w| reset(w)), "\x1b[m");
    }

    // ── Cursor position report ──────────────────────────────────────────

    #[test]
    fn probe_moves_then_asks() {
        assert_eq!(emit(|w| probe_screen_size(w)), "\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn parse_report_with_terminator() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80R"), Some((24, 80)));
    }

    #[test]
    fn parse_report_without_terminator() {
        assert_eq!(parse_cursor_report(b"\x1b[50;132"), Some((50, 132)));
    }

    #[test]
    fn parse_report_rejects_missing_introducer() {
        assert_eq!(parse_cursor_report(b"24;80R"), None);
        assert_eq!(parse_cursor_report(b"\x1b24;80R"), None);
    }

    #[test]
    fn parse_report_rejects_garbage() {
        assert_eq!(parse_cursor_report(b"\x1b[;R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[a;bR"), None);
        assert_eq!(parse_cursor_report(b""), None);
    }
}
