//! Row: one line of the document.
//!
//! A row keeps two byte strings. `chars` is what the user typed, tabs and
//! all. `render` is what the screen shows: the same bytes with every tab
//! expanded to spaces up to the next tab stop. Search runs over `render`
//! too, so a match column is a screen column.
//!
//! `render` is derived, never edited. Every mutation of `chars` goes
//! through a method here that ends with [`Row::update`], which rebuilds
//! `render` from scratch.
//!
//! Columns come in two flavours:
//!
//! - **cx**: an index into `chars` (where the next insert lands)
//! - **rx**: an index into `render` (where the cursor is drawn)
//!
//! [`Row::cx_to_rx`] and [`Row::rx_to_cx`] convert between them. Both walk
//! the row linearly; rows are short.

use std::fmt;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of text and its rendered form.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    /// Build a row from its literal content.
    #[must_use]
    pub fn new(chars: impl Into<Vec<u8>>, tab_stop: usize) -> Self {
        let mut row = Self {
            chars: chars.into(),
            render: Vec::new(),
        };
        row.update(tab_stop);
        row
    }

    // -- Accessors ----------------------------------------------------------

    /// The literal content.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// The tab-expanded content.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Length of `chars` in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    // -- Render derivation --------------------------------------------------

    /// Rebuild `render` from `chars`.
    pub fn update(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        let tabs = self.chars.iter().filter(|&&b| b == b'\t').count();

        self.render.clear();
        self.render.reserve(self.chars.len() + tabs * (tab_stop - 1));

        for &b in &self.chars {
            if b == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(b);
            }
        }
    }

    // -- Coordinate mapping -------------------------------------------------

    /// The render column of buffer column `cx`.
    ///
    /// `cx` past the end is treated as the end.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let end = cx.min(self.chars.len());
        let mut rx = 0;
        for &b in &self.chars[..end] {
            if b == b'\t' {
                rx += (tab_stop - 1) - (rx % tab_stop);
            }
            rx += 1;
        }
        rx
    }

    /// The buffer column whose rendering covers render column `rx`.
    ///
    /// Returns `len()` when `rx` lies at or past the end of the render.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut cur_rx = 0;
        for (cx, &b) in self.chars.iter().enumerate() {
            if b == b'\t' {
                cur_rx += (tab_stop - 1) - (cur_rx % tab_stop);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }

    // -- Editing ------------------------------------------------------------
    //
    // Crate-private: the document wraps each of these so that every change
    // bumps its dirty counter.

    /// Insert `byte` at `at`, clamped to the row length.
    pub(crate) fn insert(&mut self, at: usize, byte: u8, tab_stop: usize) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
        self.update(tab_stop);
    }

    /// Remove the byte at `at`. Returns `false` (and does nothing) when `at`
    /// is out of range.
    pub(crate) fn delete(&mut self, at: usize, tab_stop: usize) -> bool {
        if at >= self.chars.len() {
            return false;
        }
        self.chars.remove(at);
        self.update(tab_stop);
        true
    }

    /// Append `bytes` to the end.
    pub(crate) fn append(&mut self, bytes: &[u8], tab_stop: usize) {
        self.chars.extend_from_slice(bytes);
        self.update(tab_stop);
    }

    /// Cut the row at `at` and return the tail. `at` is clamped.
    pub(crate) fn split_off(&mut self, at: usize, tab_stop: usize) -> Vec<u8> {
        let at = at.min(self.chars.len());
        let tail = self.chars.split_off(at);
        self.update(tab_stop);
        tail
    }

    // -- Search -------------------------------------------------------------

    /// First occurrence of `needle` in the render starting at or after `from`.
    #[must_use]
    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        find_bytes(&self.render, needle, from)
    }

    /// Last occurrence of `needle` in the render starting strictly before
    /// `before`.
    #[must_use]
    pub fn rfind(&self, needle: &[u8], before: usize) -> Option<usize> {
        rfind_bytes(&self.render, needle, before)
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Row")
            .field(&String::from_utf8_lossy(&self.chars))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Byte search helpers
// ---------------------------------------------------------------------------

fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn rfind_bytes(haystack: &[u8], needle: &[u8], before: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    // A match starting before `before` may extend past it.
    let limit = before.min(haystack.len());
    haystack
        .windows(needle.len())
        .take(limit)
        .rposition(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TAB: usize = 8;

    fn row(s: &str) -> Row {
        Row::new(s, TAB)
    }

    // ── update ──────────────────────────────────────────────────────────

    #[test]
    fn plain_text_renders_unchanged() {
        let r = row("hello");
        assert_eq!(r.render(), b"hello");
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn leading_tab_expands_to_full_stop() {
        assert_eq!(row("\tx").render(), b"        x");
    }

    #[test]
    fn tab_mid_row_expands_to_next_stop() {
        assert_eq!(row("d\te").render(), b"d       e");
        assert_eq!(row("abcdefg\th").render(), b"abcdefg h");
        assert_eq!(row("abcdefgh\ti").render(), b"abcdefgh        i");
    }

    #[test]
    fn tab_stop_four() {
        let r = Row::new("a\tb\t", 4);
        assert_eq!(r.render(), b"a   b   ");
    }

    #[test]
    fn tab_stop_zero_acts_as_one() {
        let r = Row::new("a\tb", 0);
        assert_eq!(r.render(), b"a b");
    }

    #[test]
    fn render_never_shorter_and_idempotent() {
        for s in ["", "\t", "a\tb", "\t\t\t", "x\ty\tz\t", "tab\tat\tthe\tend\t"] {
            let mut r = row(s);
            assert!(r.render().len() >= r.chars().len(), "{s:?}");
            let first = r.render().to_vec();
            r.update(TAB);
            assert_eq!(r.render(), first.as_slice(), "{s:?}");
        }
    }

    #[test]
    fn empty_row() {
        let r = row("");
        assert!(r.is_empty());
        assert!(r.render().is_empty());
    }

    // ── cx_to_rx / rx_to_cx ─────────────────────────────────────────────

    #[test]
    fn cx_to_rx_plain() {
        let r = row("abc");
        assert_eq!(r.cx_to_rx(0, TAB), 0);
        assert_eq!(r.cx_to_rx(2, TAB), 2);
        assert_eq!(r.cx_to_rx(3, TAB), 3);
    }

    #[test]
    fn cx_to_rx_after_tab() {
        let r = row("d\te");
        assert_eq!(r.cx_to_rx(1, TAB), 1);
        assert_eq!(r.cx_to_rx(2, TAB), 8);
        assert_eq!(r.cx_to_rx(3, TAB), 9);
    }

    #[test]
    fn cx_to_rx_clamps_past_end() {
        assert_eq!(row("\t").cx_to_rx(10, TAB), 8);
    }

    #[test]
    fn rx_to_cx_inside_tab_maps_to_the_tab() {
        let r = row("d\te");
        for rx in 1..8 {
            assert_eq!(r.rx_to_cx(rx, TAB), 1, "rx {rx}");
        }
        assert_eq!(r.rx_to_cx(8, TAB), 2);
    }

    #[test]
    fn rx_to_cx_past_end_is_len() {
        assert_eq!(row("abc").rx_to_cx(99, TAB), 3);
        assert_eq!(row("").rx_to_cx(0, TAB), 0);
    }

    #[test]
    fn rx_to_cx_inverts_cx_to_rx() {
        for s in ["", "abc", "\t", "a\tb", "\t\tx", "ab\tcd\t\tef", "1234567\t8"] {
            for tab in [1, 2, 4, 8] {
                let r = Row::new(s, tab);
                for cx in 0..=r.len() {
                    let rx = r.cx_to_rx(cx, tab);
                    assert_eq!(r.rx_to_cx(rx, tab), cx, "{s:?} tab {tab} cx {cx}");
                }
            }
        }
    }

    // ── Editing ─────────────────────────────────────────────────────────

    #[test]
    fn insert_clamps_position() {
        let mut r = row("ab");
        r.insert(99, b'c', TAB);
        assert_eq!(r.chars(), b"abc");
        r.insert(0, b'\t', TAB);
        assert_eq!(r.render(), b"        abc");
    }

    #[test]
    fn delete_in_and_out_of_range() {
        let mut r = row("a\tb");
        assert!(r.delete(1, TAB));
        assert_eq!(r.chars(), b"ab");
        assert_eq!(r.render(), b"ab");
        assert!(!r.delete(2, TAB));
        assert_eq!(r.chars(), b"ab");
    }

    #[test]
    fn append_rerenders() {
        let mut r = row("x");
        r.append(b"\ty", TAB);
        assert_eq!(r.chars(), b"x\ty");
        assert_eq!(r.render(), b"x       y");
    }

    #[test]
    fn split_off_returns_tail() {
        let mut r = row("hello\tworld");
        let tail = r.split_off(5, TAB);
        assert_eq!(r.chars(), b"hello");
        assert_eq!(r.render(), b"hello");
        assert_eq!(tail, b"\tworld");
    }

    #[test]
    fn split_off_clamps() {
        let mut r = row("ab");
        assert!(r.split_off(10, TAB).is_empty());
        assert_eq!(r.chars(), b"ab");
    }

    // ── Search ──────────────────────────────────────────────────────────

    #[test]
    fn find_from_offsets() {
        let r = row("hello world");
        assert_eq!(r.find(b"o", 0), Some(4));
        assert_eq!(r.find(b"o", 5), Some(7));
        assert_eq!(r.find(b"o", 8), None);
        assert_eq!(r.find(b"world", 0), Some(6));
        assert_eq!(r.find(b"", 0), None);
        assert_eq!(r.find(b"o", 99), None);
    }

    #[test]
    fn find_searches_render() {
        let r = row("a\tb");
        assert_eq!(r.find(b"b", 0), Some(8));
        assert_eq!(r.find(b"  ", 0), Some(1));
    }

    #[test]
    fn rfind_before_offsets() {
        let r = row("hello world");
        assert_eq!(r.rfind(b"o", 11), Some(7));
        assert_eq!(r.rfind(b"o", 7), Some(4));
        assert_eq!(r.rfind(b"o", 4), None);
        assert_eq!(r.rfind(b"world", 7), Some(6));
        assert_eq!(r.rfind(b"x", 11), None);
    }

    #[test]
    fn needle_longer_than_row() {
        let r = row("ab");
        assert_eq!(r.find(b"abc", 0), None);
        assert_eq!(r.rfind(b"abc", 2), None);
    }

    #[test]
    fn debug_shows_text() {
        assert_eq!(format!("{:?}", row("hi")), "Row(\"hi\")");
    }
}
