//! Renderer: one frame, one buffer.
//!
//! A frame is drawn top to bottom into an [`OutputBuffer`] that the event
//! loop then writes with a single syscall:
//!
//! ```text
//! ESC[?25l  ESC[H                     hide cursor, go home
//! text rows                           each followed by ESC[K and \r\n
//! ESC[7m status bar ESC[m \r\n        inverse video
//! ESC[K message bar
//! ESC[r;cH  ESC[?25h                  place and show the cursor
//! ```
//!
//! Rows are drawn from their render form, shifted left by the column offset
//! and cut at the screen width. Rows past the end of the document show `~`,
//! and an empty document gets a greeting on the middle row.

use std::io;

use k_term::ansi;
use k_term::output::OutputBuffer;

use crate::document::Document;
use crate::view::{Cursor, Viewport};

/// Everything the renderer reads to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub doc: &'a Document,
    pub cursor: Cursor,
    /// Render column of the cursor.
    pub rx: usize,
    pub view: &'a Viewport,
    /// Message bar text, already filtered for expiry.
    pub message: Option<&'a str>,
}

/// Draw a whole frame into `out`.
///
/// # Errors
///
/// Only if writing into `out` fails, which an `OutputBuffer` never does.
pub fn render(out: &mut OutputBuffer, frame: &Frame<'_>) -> io::Result<()> {
    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;

    draw_rows(out, frame.doc, frame.view)?;
    draw_status_bar(out, frame.doc, frame.cursor.cy, frame.view.screen_cols())?;
    draw_message_bar(out, frame.message, frame.view.screen_cols())?;

    let x = frame.rx.saturating_sub(frame.view.col_offset());
    let y = frame.cursor.cy.saturating_sub(frame.view.row_offset());
    ansi::cursor_to(out, to_u16(x), to_u16(y))?;
    ansi::cursor_show(out)
}

/// The greeting shown on an empty document.
#[must_use]
pub fn greeting() -> String {
    format!("k-edit -- version {}", crate::VERSION)
}

/// Text rows, including `~` filler past the end of the document.
///
/// # Errors
///
/// Only if writing into `out` fails.
pub fn draw_rows(out: &mut OutputBuffer, doc: &Document, view: &Viewport) -> io::Result<()> {
    let cols = view.screen_cols();
    let rows = view.screen_rows();

    for y in 0..rows {
        let file_row = y + view.row_offset();
        match doc.row(file_row) {
            Some(row) => {
                let render = row.render();
                let start = view.col_offset().min(render.len());
                out.append_clipped(&render[start..], cols);
            }
            None if doc.is_empty() && y == rows / 2 => draw_greeting(out, cols),
            None => out.append(b"~"),
        }
        ansi::erase_line_right(out)?;
        out.append(b"\r\n");
    }
    Ok(())
}

fn draw_greeting(out: &mut OutputBuffer, cols: usize) {
    let text = greeting();
    let len = text.len().min(cols);
    let mut padding = (cols - len) / 2;
    if padding > 0 {
        out.append(b"~");
        padding -= 1;
    }
    out.append_repeated(b' ', padding);
    out.append_clipped(text.as_bytes(), len);
}

/// The inverse-video status bar.
///
/// Left: up to 20 characters of the file name (directory dropped), the
/// row count, and a modified marker. Right: the cursor row over the row
/// count, drawn only if it fits flush against the right edge.
///
/// # Errors
///
/// Only if writing into `out` fails.
pub fn draw_status_bar(
    out: &mut OutputBuffer,
    doc: &Document,
    cy: usize,
    cols: usize,
) -> io::Result<()> {
    ansi::inverse_on(out)?;

    let name = doc.filename().map_or_else(
        || "[No Name]".to_owned(),
        |p| p.file_name().unwrap_or(p.as_os_str()).to_string_lossy().into_owned(),
    );
    let left = format!(
        "{name:.20} - {} lines{}",
        doc.num_rows(),
        if doc.is_dirty() { " (modified)" } else { "" }
    );
    let right = format!("{}/{}", cy + 1, doc.num_rows());

    let mut len = left.len().min(cols);
    out.append_clipped(left.as_bytes(), len);
    while len < cols {
        if cols - len == right.len() {
            out.append(right.as_bytes());
            break;
        }
        out.append(b" ");
        len += 1;
    }

    ansi::reset(out)?;
    out.append(b"\r\n");
    Ok(())
}

/// The message bar: cleared, then the message cut to the screen width.
///
/// # Errors
///
/// Only if writing into `out` fails.
pub fn draw_message_bar(
    out: &mut OutputBuffer,
    message: Option<&str>,
    cols: usize,
) -> io::Result<()> {
    ansi::erase_line_right(out)?;
    if let Some(text) = message {
        out.append_clipped(text.as_bytes(), cols);
    }
    Ok(())
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
