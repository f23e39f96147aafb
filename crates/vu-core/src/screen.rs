//! Frame composition — turning rows and a viewport into terminal bytes.
//!
//! Every frame is rebuilt from scratch into an [`OutputBuffer`] and shipped
//! to the terminal in a single write. There is no damage tracking; the
//! file never changes, the screen is small, and one buffered write per
//! keypress is already far below what any terminal can absorb.
//!
//! # Design choices
//!
//! - **Erase per row, not per frame.** Each drawn row ends with an
//!   erase-to-end-of-line instead of clearing the whole screen up front.
//!   A full-screen clear lets the terminal repaint an empty frame before
//!   the new one arrives; per-row erasure never shows blank state.
//!
//! - **The cursor hides during composition.** It is repositioned and
//!   re-shown at the end of the same buffer, so the user never sees it
//!   sweep across the repaint.
//!
//! - **Scrolling happens here.** [`compose_frame`] reconciles the
//!   viewport offsets against the cursor before drawing, so every frame
//!   is guaranteed to contain the cursor no matter what movement ran
//!   before it.

use std::io::{self, Write};

use vu_term::ansi;
use vu_term::output::OutputBuffer;
use vu_term::terminal::Size;

use crate::row::RowStore;
use crate::viewport::Viewport;

// ---------------------------------------------------------------------------
// Frame composition
// ---------------------------------------------------------------------------

/// Greeting shown centered on screen when the viewed file has no rows.
const BANNER: &str = concat!("vu -- version ", env!("CARGO_PKG_VERSION"));

/// Compose one complete frame into `out`.
///
/// Scrolls the viewport to contain the cursor, then writes: hide cursor,
/// home, every screen row (content, tilde, or banner) each followed by an
/// erase-to-eol, the cursor reposition, and show cursor. The caller
/// flushes the buffer in a single write.
///
/// # Errors
///
/// Propagates writer errors; writes into the in-memory buffer itself
/// cannot fail.
pub fn compose_frame(
    out: &mut OutputBuffer,
    rows: &RowStore,
    viewport: &mut Viewport,
    size: Size,
) -> io::Result<()> {
    viewport.scroll(size);

    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;

    draw_rows(out, rows, viewport, size)?;

    // Safe: scroll() above bounds both differences below the screen size.
    #[allow(clippy::cast_possible_truncation)]
    {
        let screen_x = (viewport.cursor_x() - viewport.col_offset()) as u16;
        let screen_y = (viewport.cursor_y() - viewport.row_offset()) as u16;
        ansi::cursor_to(out, screen_x, screen_y)?;
    }

    ansi::cursor_show(out)
}

/// Draw every screen row: file content where the viewport overlaps the
/// file, a tilde beyond it, and the banner on an empty file.
fn draw_rows(
    out: &mut OutputBuffer,
    rows: &RowStore,
    viewport: &Viewport,
    size: Size,
) -> io::Result<()> {
    for y in 0..size.rows {
        let file_row = viewport.row_offset() + usize::from(y);

        if let Some(row) = rows.row(file_row) {
            let visible = row.as_bytes().get(viewport.col_offset()..).unwrap_or(&[]);
            let len = visible.len().min(usize::from(size.cols));
            out.write_all(&visible[..len])?;
        } else if rows.is_empty() && y == size.rows / 3 {
            draw_banner(out, size.cols)?;
        } else {
            out.write_all(b"~")?;
        }

        ansi::clear_to_eol(out)?;
        if y < size.rows - 1 {
            out.write_all(b"\r\n")?;
        }
    }
    Ok(())
}

/// Center the banner in a row, tilde first like the rows around it.
fn draw_banner(out: &mut OutputBuffer, cols: u16) -> io::Result<()> {
    let cols = usize::from(cols);
    let text = &BANNER.as_bytes()[..BANNER.len().min(cols)];

    let padding = (cols - text.len()) / 2;
    if padding > 0 {
        out.write_all(b"~")?;
        for _ in 1..padding {
            out.write_all(b" ")?;
        }
    }
    out.write_all(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
