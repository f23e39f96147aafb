//! Cursor and scroll state — where the user is looking.
//!
//! The cursor lives in file coordinates: `cursor_y` counts rows from the
//! top of the file, `cursor_x` bytes from the start of the row. The two
//! offsets name the file position of the viewport's top-left cell; the
//! renderer subtracts them to place the cursor on screen.
//!
//! # Design choices
//!
//! - **The cursor may rest one step past the content**: on the virtual
//!   row after the last (`cursor_y == row_count`) and on the column just
//!   past a row's last byte. Both are positions, not characters — the
//!   natural resting places for "end of file" and "end of line".
//!
//! - **No sticky column.** Moving through a short row clamps the column
//!   and the clamp persists; returning to a long row does not restore the
//!   old column. Every vertical move re-clamps against the new row.
//!
//! - **Scrolling is derived, not commanded.** [`Viewport::scroll`] pulls
//!   the offsets just far enough to contain the cursor, as a pure
//!   function of cursor and screen size. Movement code never touches the
//!   offsets directly.

use vu_term::terminal::Size;

use crate::row::RowStore;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Cursor position and scroll offsets, in file coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    cursor_x: usize,
    cursor_y: usize,
    row_offset: usize,
    col_offset: usize,
}

impl Viewport {
    /// A viewport at the top-left of the file.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            row_offset: 0,
            col_offset: 0,
        }
    }

    // -- Position queries -----------------------------------------------

    /// Cursor column (byte offset into the current row).
    #[inline]
    #[must_use]
    pub const fn cursor_x(&self) -> usize {
        self.cursor_x
    }

    /// Cursor row (index into the file).
    #[inline]
    #[must_use]
    pub const fn cursor_y(&self) -> usize {
        self.cursor_y
    }

    /// File row shown at the top of the screen.
    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// File column shown at the left edge of the screen.
    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    // -- Movement ---------------------------------------------------------

    /// Move one column left; at the start of a row, wrap to the end of
    /// the previous row.
    pub fn move_left(&mut self, rows: &RowStore) {
        if self.cursor_x > 0 {
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = rows.row_len(self.cursor_y);
        }
        self.clamp_column(rows);
    }

    /// Move one column right; at the end of a row, wrap to column 0 of
    /// the next row. Does nothing on the virtual row past the file.
    pub fn move_right(&mut self, rows: &RowStore) {
        match rows.row(self.cursor_y) {
            Some(row) if self.cursor_x < row.len() => self.cursor_x += 1,
            Some(_) => {
                self.cursor_y += 1;
                self.cursor_x = 0;
            }
            None => {}
        }
        self.clamp_column(rows);
    }

    /// Move one row up, clamping the column to the new row's length.
    pub fn move_up(&mut self, rows: &RowStore) {
        if self.cursor_y > 0 {
            self.cursor_y -= 1;
        }
        self.clamp_column(rows);
    }

    /// Move one row down, stopping on the virtual row past the last.
    pub fn move_down(&mut self, rows: &RowStore) {
        if self.cursor_y < rows.row_count() {
            self.cursor_y += 1;
        }
        self.clamp_column(rows);
    }

    /// Jump to column 0 of the current row.
    pub fn move_to_line_start(&mut self) {
        self.cursor_x = 0;
    }

    /// Jump past the last byte of the current row.
    pub fn move_to_line_end(&mut self, rows: &RowStore) {
        self.cursor_x = rows.row_len(self.cursor_y);
    }

    /// Move up by one screenful.
    pub fn page_up(&mut self, rows: &RowStore, visible_rows: u16) {
        for _ in 0..visible_rows {
            self.move_up(rows);
        }
    }

    /// Move down by one screenful, stopping at the end of the file.
    pub fn page_down(&mut self, rows: &RowStore, visible_rows: u16) {
        for _ in 0..visible_rows {
            self.move_down(rows);
        }
    }

    // -- Scrolling ----------------------------------------------------------

    /// Pull the offsets the minimum distance needed to contain the cursor.
    ///
    /// Idempotent, and a pure function of the cursor and `size`: calling
    /// it again without moving the cursor changes nothing. Runs before
    /// every frame.
    pub fn scroll(&mut self, size: Size) {
        let rows = usize::from(size.rows);
        let cols = usize::from(size.cols);

        if self.cursor_y < self.row_offset {
            self.row_offset = self.cursor_y;
        }
        if self.cursor_y >= self.row_offset + rows {
            // The guard keeps the subtraction in range.
            self.row_offset = self.cursor_y + 1 - rows;
        }
        if self.cursor_x < self.col_offset {
            self.col_offset = self.cursor_x;
        }
        if self.cursor_x >= self.col_offset + cols {
            self.col_offset = self.cursor_x + 1 - cols;
        }
    }

    // -- Helpers --------------------------------------------------------

    /// Snap the column back inside the current row. The virtual row past
    /// the file has length 0, so the cursor lands on column 0 there.
    fn clamp_column(&mut self, rows: &RowStore) {
        let max = rows.row_len(self.cursor_y);
        if self.cursor_x > max {
            self.cursor_x = max;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RowStore {
        RowStore::from_text("first line\nmid\nthe third line\n")
    }

    fn sized(cols: u16, rows: u16) -> Size {
        Size { cols, rows }
    }

    // -- Horizontal movement -----------------------------------------------

    #[test]
    fn right_then_left_round_trips() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_right(&rows);
        vp.move_right(&rows);
        let before = (vp.cursor_x(), vp.cursor_y());
        vp.move_right(&rows);
        vp.move_left(&rows);
        assert_eq!((vp.cursor_x(), vp.cursor_y()), before);
    }

    #[test]
    fn left_at_origin_is_noop() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_left(&rows);
        assert_eq!((vp.cursor_x(), vp.cursor_y()), (0, 0));
    }

    #[test]
    fn left_wraps_to_previous_row_end() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_down(&rows);
        vp.move_left(&rows);
        assert_eq!(vp.cursor_y(), 0);
        assert_eq!(vp.cursor_x(), rows.row_len(0));
    }

    #[test]
    fn right_wraps_to_next_row_start() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_to_line_end(&rows);
        vp.move_right(&rows);
        assert_eq!((vp.cursor_x(), vp.cursor_y()), (0, 1));
    }

    #[test]
    fn right_stops_on_virtual_row() {
        let rows = store();
        let mut vp = Viewport::new();
        for _ in 0..3 {
            vp.move_down(&rows);
        }
        assert_eq!(vp.cursor_y(), 3);
        vp.move_right(&rows);
        assert_eq!((vp.cursor_x(), vp.cursor_y()), (0, 3));
    }

    #[test]
    fn right_through_empty_file_is_noop() {
        let rows = RowStore::new();
        let mut vp = Viewport::new();
        vp.move_right(&rows);
        assert_eq!((vp.cursor_x(), vp.cursor_y()), (0, 0));
    }

    // -- Vertical movement ---------------------------------------------------

    #[test]
    fn up_at_top_is_noop() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_up(&rows);
        assert_eq!(vp.cursor_y(), 0);
    }

    #[test]
    fn down_stops_one_past_last_row() {
        let rows = store();
        let mut vp = Viewport::new();
        for _ in 0..10 {
            vp.move_down(&rows);
        }
        assert_eq!(vp.cursor_y(), rows.row_count());
    }

    #[test]
    fn vertical_move_clamps_column() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_to_line_end(&rows); // col 10 on "first line"
        vp.move_down(&rows); // "mid" is 3 long
        assert_eq!(vp.cursor_x(), 3);
    }

    #[test]
    fn column_clamp_persists_past_short_row() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_to_line_end(&rows);
        vp.move_down(&rows); // clamped to 3 on "mid"
        vp.move_down(&rows); // "the third line" is long enough
        assert_eq!(vp.cursor_x(), 3);
    }

    // -- Line jumps ----------------------------------------------------------

    #[test]
    fn line_end_is_row_length() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.move_to_line_end(&rows);
        assert_eq!(vp.cursor_x(), 10);
        vp.move_to_line_start();
        assert_eq!(vp.cursor_x(), 0);
    }

    #[test]
    fn line_end_on_virtual_row_is_zero() {
        let rows = store();
        let mut vp = Viewport::new();
        for _ in 0..3 {
            vp.move_down(&rows);
        }
        vp.move_to_line_end(&rows);
        assert_eq!(vp.cursor_x(), 0);
    }

    // -- Paging ---------------------------------------------------------------

    #[test]
    fn page_down_is_bounded_by_screen_and_file() {
        let rows = RowStore::from_text(&"x\n".repeat(100));
        let mut vp = Viewport::new();

        vp.page_down(&rows, 24);
        assert_eq!(vp.cursor_y(), 24);

        // Near the end the move is capped by the file instead.
        for _ in 0..3 {
            vp.page_down(&rows, 24);
        }
        assert_eq!(vp.cursor_y(), 96);
        vp.page_down(&rows, 24);
        assert_eq!(vp.cursor_y(), 100);
    }

    #[test]
    fn page_up_returns_to_top() {
        let rows = RowStore::from_text(&"x\n".repeat(50));
        let mut vp = Viewport::new();
        vp.page_down(&rows, 24);
        vp.page_up(&rows, 24);
        assert_eq!(vp.cursor_y(), 0);
        vp.page_up(&rows, 24);
        assert_eq!(vp.cursor_y(), 0);
    }

    // -- Scrolling --------------------------------------------------------------

    #[test]
    fn scroll_keeps_cursor_inside_viewport() {
        let rows = RowStore::from_text(&format!("{}\n", "c".repeat(300)).repeat(200));
        let size = sized(80, 24);
        let mut vp = Viewport::new();

        // Walk the cursor around and check containment after every move.
        for _ in 0..60 {
            vp.move_down(&rows);
            vp.scroll(size);
            assert!(vp.row_offset() <= vp.cursor_y());
            assert!(vp.cursor_y() < vp.row_offset() + 24);
        }
        for _ in 0..150 {
            vp.move_right(&rows);
            vp.scroll(size);
            assert!(vp.col_offset() <= vp.cursor_x());
            assert!(vp.cursor_x() < vp.col_offset() + 80);
        }
        for _ in 0..40 {
            vp.move_up(&rows);
            vp.scroll(size);
            assert!(vp.row_offset() <= vp.cursor_y());
            assert!(vp.cursor_y() < vp.row_offset() + 24);
        }
    }

    #[test]
    fn scroll_down_moves_offset_minimally() {
        let rows = RowStore::from_text(&"x\n".repeat(100));
        let size = sized(80, 24);
        let mut vp = Viewport::new();

        for _ in 0..24 {
            vp.move_down(&rows);
        }
        vp.scroll(size);
        // Cursor on row 24 with a 24-row screen: exactly one row scrolled.
        assert_eq!(vp.row_offset(), 1);
    }

    #[test]
    fn scroll_up_snaps_offset_to_cursor() {
        let rows = RowStore::from_text(&"x\n".repeat(100));
        let size = sized(80, 24);
        let mut vp = Viewport::new();

        vp.page_down(&rows, 48);
        vp.scroll(size);
        vp.page_up(&rows, 48);
        vp.scroll(size);
        assert_eq!(vp.row_offset(), 0);
    }

    #[test]
    fn scroll_is_idempotent() {
        let rows = RowStore::from_text(&format!("{}\n", "y".repeat(200)).repeat(60));
        let size = sized(80, 24);
        let mut vp = Viewport::new();

        vp.page_down(&rows, 30);
        for _ in 0..90 {
            vp.move_right(&rows);
        }
        vp.scroll(size);
        let once = vp;
        vp.scroll(size);
        assert_eq!(vp, once);
    }

    #[test]
    fn scroll_with_unmoved_cursor_leaves_origin() {
        let rows = store();
        let mut vp = Viewport::new();
        vp.scroll(sized(80, 24));
        assert_eq!(vp.row_offset(), 0);
        assert_eq!(vp.col_offset(), 0);
    }
}
