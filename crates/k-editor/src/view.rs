//! View: the cursor and the window onto the document.
//!
//! The cursor lives in buffer coordinates: `cy` is a row index and `cx` an
//! index into that row's `chars`. `cy == num_rows` is allowed and means the
//! virtual line just past the end of the file, where typing starts a new
//! row.
//!
//! The [`Viewport`] decides which part of the document is on screen. It
//! works in render coordinates, so a cursor after a tab scrolls the view by
//! the tab's full width. [`Viewport::scroll`] runs before every frame and
//! moves the offsets by the least amount that brings the cursor back into
//! view; there is no smoothing.

use k_term::terminal::Size;

/// Rows at the bottom of the screen taken by the status and message bars.
pub const RESERVED_ROWS: usize = 2;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Cursor position in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Byte index into the row's `chars`.
    pub cx: usize,
    /// Row index. May equal the row count.
    pub cy: usize,
}

impl Cursor {
    #[must_use]
    pub const fn new(cx: usize, cy: usize) -> Self {
        Self { cx, cy }
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window: first row and column shown, and how many of each
/// fit on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    row_offset: usize,
    col_offset: usize,
    screen_rows: usize,
    screen_cols: usize,
}

impl Viewport {
    /// A viewport with room for `screen_rows` text rows of `screen_cols`
    /// columns, scrolled to the top-left.
    #[must_use]
    pub const fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            screen_rows,
            screen_cols,
        }
    }

    /// A viewport for a terminal of `size`, leaving room for the two bars.
    #[must_use]
    pub const fn for_terminal(size: Size) -> Self {
        let mut v = Self::new(0, 0);
        v.resize(size);
        v
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Text rows on screen (excluding the two bars).
    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> usize {
        self.screen_rows
    }

    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> usize {
        self.screen_cols
    }

    /// Both offsets, for saving and restoring around a search.
    #[inline]
    #[must_use]
    pub const fn offsets(&self) -> (usize, usize) {
        (self.row_offset, self.col_offset)
    }

    pub const fn set_offsets(&mut self, (row_offset, col_offset): (usize, usize)) {
        self.row_offset = row_offset;
        self.col_offset = col_offset;
    }

    // -- Geometry -----------------------------------------------------------

    /// Adopt a new terminal size.
    pub const fn resize(&mut self, size: Size) {
        self.screen_rows = (size.rows as usize).saturating_sub(RESERVED_ROWS);
        self.screen_cols = size.cols as usize;
    }

    /// Push the row offset past the last row, so the next [`scroll`] puts
    /// the cursor row at the top of the screen.
    ///
    /// [`scroll`]: Self::scroll
    pub const fn invalidate_rows(&mut self, num_rows: usize) {
        self.row_offset = num_rows;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Move the offsets so that row `cy`, render column `rx` is visible.
    pub const fn scroll(&mut self, cy: usize, rx: usize) {
        if cy < self.row_offset {
            self.row_offset = cy;
        }
        if cy >= self.row_offset + self.screen_rows {
            self.row_offset = cy + 1 - self.screen_rows;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if rx >= self.col_offset + self.screen_cols {
            self.col_offset = rx + 1 - self.screen_cols;
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::for_terminal(Size::FALLBACK)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
