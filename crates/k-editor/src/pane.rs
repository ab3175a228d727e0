//! Pane: a document seen through a cursor and a viewport.
//!
//! This is where cursor-level editing happens. The document only knows
//! rows and indices; the pane turns "type a byte", "press Enter" and
//! "press Backspace" into row operations at the cursor and moves the
//! cursor to where the user expects it afterwards.
//!
//! Cursor invariant, restored by every method here: `cy <= num_rows`, and
//! `cx <= len(row cy)` on a real row or `cx == 0` on the virtual row past
//! the end.

use k_term::input::Key;

use crate::document::Document;
use crate::view::{Cursor, Viewport};

/// A document with its cursor and viewport.
#[derive(Debug, Clone)]
pub struct Pane {
    doc: Document,
    cursor: Cursor,
    view: Viewport,
}

impl Pane {
    /// A pane at the top of `doc`.
    #[must_use]
    pub fn new(doc: Document, view: Viewport) -> Self {
        Self {
            doc,
            cursor: Cursor::default(),
            view,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Move the cursor, clamped to a valid position.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        self.clamp_cursor();
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.view
    }

    #[inline]
    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.view
    }

    /// Render column of the cursor; 0 on the virtual row.
    #[must_use]
    pub fn rx(&self) -> usize {
        self.doc
            .row(self.cursor.cy)
            .map_or(0, |row| row.cx_to_rx(self.cursor.cx, self.doc.tab_stop()))
    }

    /// Length of the cursor row; 0 on the virtual row.
    fn row_len(&self) -> usize {
        self.doc.row(self.cursor.cy).map_or(0, crate::row::Row::len)
    }

    fn clamp_cursor(&mut self) {
        self.cursor.cy = self.cursor.cy.min(self.doc.num_rows());
        self.cursor.cx = self.cursor.cx.min(self.row_len());
    }

    /// Bring the cursor into view. Called before every frame.
    pub fn scroll(&mut self) {
        let rx = self.rx();
        self.view.scroll(self.cursor.cy, rx);
    }

    // -- Movement -----------------------------------------------------------

    /// Move one step with an arrow key.
    ///
    /// Left at column 0 goes to the end of the previous row and Right at
    /// the end of a row goes to the start of the next, so the arrows walk
    /// the text as one stream. Afterwards `cx` snaps to the new row's
    /// length. Non-arrow keys are ignored.
    pub fn move_cursor(&mut self, key: Key) {
        let num_rows = self.doc.num_rows();
        let on_row = self.cursor.cy < num_rows;

        match key {
            Key::ArrowLeft => {
                if self.cursor.cx > 0 {
                    self.cursor.cx -= 1;
                } else if self.cursor.cy > 0 {
                    self.cursor.cy -= 1;
                    self.cursor.cx = self.row_len();
                }
            }
            Key::ArrowRight if on_row => {
                if self.cursor.cx < self.row_len() {
                    self.cursor.cx += 1;
                } else {
                    self.cursor.cy += 1;
                    self.cursor.cx = 0;
                }
            }
            Key::ArrowUp => {
                self.cursor.cy = self.cursor.cy.saturating_sub(1);
            }
            Key::ArrowDown => {
                if self.cursor.cy < num_rows {
                    self.cursor.cy += 1;
                }
            }
            _ => {}
        }

        self.cursor.cx = self.cursor.cx.min(self.row_len());
    }

    /// Home: start of the row.
    pub const fn move_home(&mut self) {
        self.cursor.cx = 0;
    }

    /// End: end of the row. Nothing on the virtual row.
    pub fn move_end(&mut self) {
        if self.cursor.cy < self.doc.num_rows() {
            self.cursor.cx = self.row_len();
        }
    }

    /// Page Up: jump to the top visible row, then up one screenful.
    pub fn page_up(&mut self) {
        self.cursor.cy = self.view.row_offset();
        for _ in 0..self.view.screen_rows() {
            self.move_cursor(Key::ArrowUp);
        }
        self.clamp_cursor();
    }

    /// Page Down: jump to the bottom visible row, then down one screenful.
    pub fn page_down(&mut self) {
        let bottom = (self.view.row_offset() + self.view.screen_rows()).saturating_sub(1);
        self.cursor.cy = bottom.min(self.doc.num_rows());
        for _ in 0..self.view.screen_rows() {
            self.move_cursor(Key::ArrowDown);
        }
        self.clamp_cursor();
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` at the cursor and step past it.
    ///
    /// On the virtual row this first creates the row.
    pub fn insert_char(&mut self, ch: u8) {
        if self.cursor.cy == self.doc.num_rows() {
            self.doc.insert_row(self.doc.num_rows(), b"");
        }
        self.doc.row_insert_char(self.cursor.cy, self.cursor.cx, ch);
        self.cursor.cx += 1;
    }

    /// Split the row at the cursor (Enter).
    ///
    /// At column 0 an empty row goes in above and the content is untouched.
    /// Otherwise everything right of the cursor moves to a new row below.
    /// The cursor ends at the start of the row below.
    pub fn insert_newline(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        if cx == 0 {
            self.doc.insert_row(cy, b"");
        } else if let Some(tail) = self.doc.row_truncate(cy, cx) {
            self.doc.insert_row(cy + 1, &tail);
        }
        self.cursor.cy += 1;
        self.cursor.cx = 0;
    }

    /// Delete the byte left of the cursor (Backspace).
    ///
    /// At column 0 the row is joined onto the previous one, with no
    /// separator, and the cursor lands at the join. Nothing happens at the
    /// very start of the document or on the virtual row.
    pub fn delete_char(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        if cy >= self.doc.num_rows() || (cx == 0 && cy == 0) {
            return;
        }

        if cx > 0 {
            self.doc.row_delete_char(cy, cx - 1);
            self.cursor.cx -= 1;
        } else {
            let prev_len = self.doc.row(cy - 1).map_or(0, crate::row::Row::len);
            let moved = self
                .doc
                .row(cy)
                .map(|row| row.chars().to_vec())
                .unwrap_or_default();
            self.doc.row_append(cy - 1, &moved);
            self.doc.delete_row(cy);
            self.cursor.cy -= 1;
            self.cursor.cx = prev_len;
        }
    }

    /// Delete the byte under the cursor (Delete): step right, then
    /// backspace.
    pub fn delete_forward(&mut self) {
        self.move_cursor(Key::ArrowRight);
        self.delete_char();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pane(lines: &[&str]) -> Pane {
        Pane::new(
            Document::from_lines(lines.iter().copied(), 8),
            Viewport::new(10, 40),
        )
    }

    fn texts(p: &Pane) -> Vec<String> {
        p.document()
            .rows()
            .iter()
            .map(|r| String::from_utf8_lossy(r.chars()).into_owned())
            .collect()
    }

    fn at(p: &Pane) -> (usize, usize) {
        let c = p.cursor();
        (c.cx, c.cy)
    }

    // ── Movement ────────────────────────────────────────────────────────

    #[test]
    fn right_wraps_to_next_row() {
        let mut p = pane(&["ab", "c"]);
        p.set_cursor(Cursor::new(2, 0));
        p.move_cursor(Key::ArrowRight);
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn right_on_last_row_reaches_virtual_row() {
        let mut p = pane(&["a"]);
        p.set_cursor(Cursor::new(1, 0));
        p.move_cursor(Key::ArrowRight);
        assert_eq!(at(&p), (0, 1));
        // No further on the virtual row.
        p.move_cursor(Key::ArrowRight);
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn left_wraps_to_previous_row_end() {
        let mut p = pane(&["abc", "d"]);
        p.set_cursor(Cursor::new(0, 1));
        p.move_cursor(Key::ArrowLeft);
        assert_eq!(at(&p), (3, 0));
    }

    #[test]
    fn left_at_origin_stays() {
        let mut p = pane(&["abc"]);
        p.move_cursor(Key::ArrowLeft);
        assert_eq!(at(&p), (0, 0));
    }

    #[test]
    fn vertical_moves_snap_column() {
        let mut p = pane(&["long line", "ab", "longer line"]);
        p.set_cursor(Cursor::new(8, 0));
        p.move_cursor(Key::ArrowDown);
        assert_eq!(at(&p), (2, 1));
        p.move_cursor(Key::ArrowDown);
        assert_eq!(at(&p), (2, 2));
    }

    #[test]
    fn down_stops_at_virtual_row() {
        let mut p = pane(&["a", "b"]);
        for _ in 0..5 {
            p.move_cursor(Key::ArrowDown);
        }
        assert_eq!(at(&p), (0, 2));
    }

    #[test]
    fn up_stops_at_top() {
        let mut p = pane(&["a", "b"]);
        p.move_cursor(Key::ArrowUp);
        assert_eq!(at(&p), (0, 0));
    }

    #[test]
    fn home_and_end() {
        let mut p = pane(&["hello"]);
        p.move_end();
        assert_eq!(at(&p), (5, 0));
        p.move_home();
        assert_eq!(at(&p), (0, 0));
    }

    #[test]
    fn end_on_virtual_row_is_noop() {
        let mut p = pane(&["hello"]);
        p.set_cursor(Cursor::new(0, 1));
        p.move_end();
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn page_down_then_up() {
        let lines: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let mut p = Pane::new(
            Document::from_lines(lines.iter().map(String::as_str), 8),
            Viewport::new(10, 40),
        );

        p.page_down();
        // Bottom of the first screen (row 9), then ten more.
        assert_eq!(at(&p), (0, 19));
        p.scroll();
        assert_eq!(p.viewport().row_offset(), 10);

        p.page_up();
        // Top of the screen (row 10), then ten up.
        assert_eq!(at(&p), (0, 0));
    }

    #[test]
    fn page_down_clamps_to_virtual_row() {
        let mut p = pane(&["a", "b", "c"]);
        p.page_down();
        assert_eq!(at(&p), (0, 3));
    }

    #[test]
    fn paging_without_text_rows_keeps_cursor_valid() {
        let mut p = Pane::new(
            Document::from_lines(["hello", "a", "b", "c"], 8),
            Viewport::new(0, 40),
        );
        p.set_cursor(Cursor::new(0, 3));
        p.move_end();
        p.scroll();
        p.page_up();
        // The viewport's row offset is 4, the virtual row.
        assert_eq!(at(&p), (0, 4));

        p.insert_char(b'x');
        assert_eq!(texts(&p), vec!["hello", "a", "b", "c", "x"]);
        assert_eq!(at(&p), (1, 4));

        p.set_cursor(Cursor::new(5, 0));
        p.page_down();
        // Bottom visible row is 3, and "c" is one byte long.
        assert_eq!(at(&p), (1, 3));
    }

    #[test]
    fn set_cursor_clamps() {
        let mut p = pane(&["ab"]);
        p.set_cursor(Cursor::new(9, 9));
        assert_eq!(at(&p), (0, 1));
        p.set_cursor(Cursor::new(9, 0));
        assert_eq!(at(&p), (2, 0));
    }

    #[test]
    fn rx_follows_tabs() {
        let mut p = pane(&["\tx"]);
        p.set_cursor(Cursor::new(1, 0));
        assert_eq!(p.rx(), 8);
        p.set_cursor(Cursor::new(0, 1));
        assert_eq!(p.rx(), 0);
    }

    // ── insert_char ─────────────────────────────────────────────────────

    #[test]
    fn insert_char_mid_row() {
        let mut p = pane(&["ac"]);
        p.set_cursor(Cursor::new(1, 0));
        p.insert_char(b'b');
        assert_eq!(texts(&p), vec!["abc"]);
        assert_eq!(at(&p), (2, 0));
    }

    #[test]
    fn insert_char_on_empty_document_creates_row_zero() {
        let mut p = pane(&[]);
        p.insert_char(b'x');
        assert_eq!(texts(&p), vec!["x"]);
        assert_eq!(at(&p), (1, 0));
        // One row insert plus one char insert.
        assert_eq!(p.document().dirty(), 2);
    }

    #[test]
    fn insert_char_on_virtual_row_appends_row() {
        let mut p = pane(&["a"]);
        p.set_cursor(Cursor::new(0, 1));
        p.insert_char(b'b');
        assert_eq!(texts(&p), vec!["a", "b"]);
    }

    // ── insert_newline ──────────────────────────────────────────────────

    #[test]
    fn newline_mid_row_splits() {
        let mut p = pane(&["hello world"]);
        p.set_cursor(Cursor::new(5, 0));
        p.insert_newline();
        assert_eq!(texts(&p), vec!["hello", " world"]);
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn newline_at_column_zero_inserts_above() {
        let mut p = pane(&["a", "b"]);
        p.set_cursor(Cursor::new(0, 1));
        p.insert_newline();
        assert_eq!(texts(&p), vec!["a", "", "b"]);
        assert_eq!(at(&p), (0, 2));
    }

    #[test]
    fn newline_at_row_end_adds_empty_row_below() {
        let mut p = pane(&["abc"]);
        p.set_cursor(Cursor::new(3, 0));
        p.insert_newline();
        assert_eq!(texts(&p), vec!["abc", ""]);
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn newline_on_virtual_row_adds_row() {
        let mut p = pane(&[]);
        p.insert_newline();
        assert_eq!(texts(&p), vec![""]);
        assert_eq!(at(&p), (0, 1));
    }

    // ── delete_char ─────────────────────────────────────────────────────

    #[test]
    fn backspace_mid_row() {
        let mut p = pane(&["abc"]);
        p.set_cursor(Cursor::new(2, 0));
        p.delete_char();
        assert_eq!(texts(&p), vec!["ac"]);
        assert_eq!(at(&p), (1, 0));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut p = pane(&["abc"]);
        p.delete_char();
        assert_eq!(texts(&p), vec!["abc"]);
        assert_eq!(p.document().dirty(), 0);
    }

    #[test]
    fn backspace_on_virtual_row_is_noop() {
        let mut p = pane(&["abc"]);
        p.set_cursor(Cursor::new(0, 1));
        p.delete_char();
        assert_eq!(texts(&p), vec!["abc"]);
        assert_eq!(at(&p), (0, 1));
    }

    #[test]
    fn backspace_at_column_zero_merges_rows() {
        let mut p = pane(&["foo", "bar\t", "baz"]);
        let before_prev = 3;
        let before_cur = 4;
        p.set_cursor(Cursor::new(0, 1));

        p.delete_char();

        assert_eq!(texts(&p), vec!["foobar\t", "baz"]);
        assert_eq!(p.document().num_rows(), 2);
        assert_eq!(p.document().row(0).unwrap().len(), before_prev + before_cur);
        assert_eq!(at(&p), (3, 0));
    }

    #[test]
    fn backspace_merge_with_empty_rows() {
        let mut p = pane(&["", ""]);
        p.set_cursor(Cursor::new(0, 1));
        p.delete_char();
        assert_eq!(texts(&p), vec![""]);
        assert_eq!(at(&p), (0, 0));
    }

    #[test]
    fn delete_forward_removes_under_cursor() {
        let mut p = pane(&["abc"]);
        p.set_cursor(Cursor::new(1, 0));
        p.delete_forward();
        assert_eq!(texts(&p), vec!["ac"]);
        assert_eq!(at(&p), (1, 0));
    }

    #[test]
    fn delete_forward_at_row_end_joins_next() {
        let mut p = pane(&["ab", "cd"]);
        p.set_cursor(Cursor::new(2, 0));
        p.delete_forward();
        assert_eq!(texts(&p), vec!["abcd"]);
        assert_eq!(at(&p), (2, 0));
    }

    // ── Scenario: ["abc", "", "d\te"] ──────────────────────────────────

    #[test]
    fn end_right_then_type() {
        let mut p = pane(&["abc", "", "d\te"]);
        assert_eq!(at(&p), (0, 0));
        p.move_end();
        p.move_cursor(Key::ArrowRight);
        assert_eq!(at(&p), (0, 1));
        p.insert_char(b'x');
        assert_eq!(texts(&p), vec!["abc", "x", "d\te"]);
        assert!(p.document().dirty() > 0);
    }
}
