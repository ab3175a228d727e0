//! Search: incremental, direction-aware substring search.
//!
//! A [`Search`] rides on a prompt as its [`PromptCallback`]. Every key typed
//! into the prompt re-runs the search:
//!
//! 1. Typing (or deleting) restarts from the top of the document, forward
//! 2. Right/Down look for the next match, Left/Up for the previous one
//! 3. Enter keeps the cursor on the current match
//! 4. Escape puts cursor and scroll back where they were before the search
//!
//! Matching is a plain byte substring test over each row's render form, so
//! a match column is a screen column and tabs count as the spaces they
//! draw. From the last match, the rest of that row is tried first, then
//! the following rows in order, wrapping around the ends of the document
//! and visiting each row at most once.

use k_term::input::{ENTER, Key};

use crate::pane::Pane;
use crate::prompt::PromptCallback;
use crate::view::Cursor;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// State of one search session.
#[derive(Debug, Clone)]
pub struct Search {
    /// Row and render column of the last match.
    last_match: Option<(usize, usize)>,
    direction: SearchDirection,
    /// Cursor before the search started.
    saved_cursor: Cursor,
    /// Viewport offsets before the search started.
    saved_offsets: (usize, usize),
}

impl Search {
    /// Start a search session, remembering where `pane` is now.
    #[must_use]
    pub fn new(pane: &Pane) -> Self {
        Self {
            last_match: None,
            direction: SearchDirection::Forward,
            saved_cursor: pane.cursor(),
            saved_offsets: pane.viewport().offsets(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn last_match(&self) -> Option<(usize, usize)> {
        self.last_match
    }

    #[inline]
    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    fn reset(&mut self) {
        self.last_match = None;
        self.direction = SearchDirection::Forward;
    }

    fn restore(&self, pane: &mut Pane) {
        pane.set_cursor(self.saved_cursor);
        pane.viewport_mut().set_offsets(self.saved_offsets);
    }

    /// Look for `query` from the last match in the current direction and
    /// move the cursor to the hit. A miss changes nothing.
    pub fn find_next(&mut self, pane: &mut Pane, query: &[u8]) {
        let num_rows = pane.document().num_rows();
        if query.is_empty() || num_rows == 0 {
            return;
        }

        let hit = self
            .continue_in_row(pane, query)
            .or_else(|| self.scan_rows(pane, query, num_rows));

        if let Some((row, col)) = hit {
            self.jump(pane, row, col);
        }
    }

    /// A further match in the row of the last match.
    fn continue_in_row(&self, pane: &Pane, query: &[u8]) -> Option<(usize, usize)> {
        let (row, col) = self.last_match?;
        let r = pane.document().row(row)?;
        let hit = match self.direction {
            SearchDirection::Forward => r.find(query, col + 1),
            SearchDirection::Backward => r.rfind(query, col),
        };
        hit.map(|c| (row, c))
    }

    /// The first row after the last match, in the current direction and
    /// with wraparound, that contains the query.
    fn scan_rows(&self, pane: &Pane, query: &[u8], num_rows: usize) -> Option<(usize, usize)> {
        let mut current = self.last_match.map(|(row, _)| row);

        for _ in 0..num_rows {
            let next = match (self.direction, current) {
                (SearchDirection::Forward, None) => 0,
                (SearchDirection::Forward, Some(r)) => (r + 1) % num_rows,
                (SearchDirection::Backward, None | Some(0)) => num_rows - 1,
                (SearchDirection::Backward, Some(r)) => r - 1,
            };
            current = Some(next);

            let row = pane.document().row(next)?;
            let hit = match self.direction {
                SearchDirection::Forward => row.find(query, 0),
                SearchDirection::Backward => row.rfind(query, row.render().len()),
            };
            if let Some(col) = hit {
                return Some((next, col));
            }
        }
        None
    }

    fn jump(&mut self, pane: &mut Pane, row: usize, col: usize) {
        let tab_stop = pane.document().tab_stop();
        let cx = pane
            .document()
            .row(row)
            .map_or(0, |r| r.rx_to_cx(col, tab_stop));

        self.last_match = Some((row, col));
        pane.set_cursor(Cursor::new(cx, row));
        let num_rows = pane.document().num_rows();
        pane.viewport_mut().invalidate_rows(num_rows);

        tracing::trace!(row, col, cx, "search_hit");
    }
}

impl PromptCallback for Search {
    fn on_key(&mut self, pane: &mut Pane, query: &str, key: Key) {
        match key {
            Key::Byte(ENTER) => {
                self.reset();
                return;
            }
            Key::Escape => {
                self.restore(pane);
                self.reset();
                return;
            }
            Key::ArrowRight | Key::ArrowDown => self.direction = SearchDirection::Forward,
            Key::ArrowLeft | Key::ArrowUp => self.direction = SearchDirection::Backward,
            _ => self.reset(),
        }

        // Without a match to step from, "previous" has nothing to be
        // previous to: start from the top.
        if self.last_match.is_none() {
            self.direction = SearchDirection::Forward;
        }

        self.find_next(pane, query.as_bytes());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
