// SPDX-License-Identifier: MIT
//
// vu — a minimal raw-mode terminal file viewer.
//
// This is the main binary that wires together the crates:
//
//   vu-term → raw mode, key decoding, window geometry, buffered output
//   vu-core → rows, viewport, frame composition
//
// Each keypress flows through:
//
//   stdin → Decoder::read_key → Viewer::process_key → viewport mutation
//   render → compose_frame → OutputBuffer → one write to the terminal
//
// The file loads before the terminal changes state, so load errors print
// to a normal cooked-mode terminal. After that the Terminal guard owns
// cleanup: quit, error, and panic all restore the saved attributes and
// reset the screen.

use std::env;
use std::io;
use std::process;

use vu_core::row::RowStore;
use vu_core::screen;
use vu_core::viewport::Viewport;
use vu_term::key::{Decoder, Key};
use vu_term::output::OutputBuffer;
use vu_term::terminal::{self, RawStdin, Size, Terminal};

// ─── Viewer ─────────────────────────────────────────────────────────────────

/// What the main loop should do after a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    Quit,
}

/// The viewer state: the loaded file, the viewport into it, and the frame
/// buffer reused across redraws.
///
/// Deliberately unaware of the real terminal — it maps keys to viewport
/// movement and composes frames for a fixed size, which is everything the
/// tests need to drive.
struct Viewer {
    rows: RowStore,
    viewport: Viewport,
    size: Size,
    frame: OutputBuffer,
}

impl Viewer {
    fn new(rows: RowStore, size: Size) -> Self {
        Self {
            rows,
            viewport: Viewport::new(),
            size,
            frame: OutputBuffer::new(),
        }
    }

    /// Compose the current frame and ship it in a single write.
    fn render(&mut self) -> io::Result<()> {
        screen::compose_frame(&mut self.frame, &self.rows, &mut self.viewport, self.size)?;
        self.frame.flush_stdout()
    }

    /// Apply one keypress to the viewport.
    ///
    /// Only Ctrl-Q and the navigation keys do anything; a viewer has no
    /// insertions, so every other key is deliberately inert.
    fn process_key(&mut self, key: Key) -> Action {
        match key {
            Key::Ctrl(b'q') => return Action::Quit,
            Key::ArrowUp => self.viewport.move_up(&self.rows),
            Key::ArrowDown => self.viewport.move_down(&self.rows),
            Key::ArrowLeft => self.viewport.move_left(&self.rows),
            Key::ArrowRight => self.viewport.move_right(&self.rows),
            Key::Home => self.viewport.move_to_line_start(),
            Key::End => self.viewport.move_to_line_end(&self.rows),
            Key::PageUp => self.viewport.page_up(&self.rows, self.size.rows),
            Key::PageDown => self.viewport.page_down(&self.rows, self.size.rows),
            Key::Delete | Key::Escape | Key::Byte(_) | Key::Ctrl(_) => {}
        }
        Action::Continue
    }
}

// ─── Main loop ──────────────────────────────────────────────────────────────

/// Enter raw mode and run the render / read / dispatch loop until quit.
///
/// The `Terminal` guard created here restores the screen and attributes
/// on every way out of this function, early `?` returns included.
fn run(rows: RowStore) -> io::Result<()> {
    let mut term = Terminal::enter_raw()?;

    // Geometry is probed once, after raw mode: the ioctl fallback reads
    // a cursor report from stdin, which only works unbuffered.
    let size = terminal::window_size()?;

    let mut viewer = Viewer::new(rows, size);
    let mut input = RawStdin;
    let mut decoder = Decoder::new();

    loop {
        viewer.render()?;
        let key = decoder.read_key(&mut input)?;
        if viewer.process_key(key) == Action::Quit {
            break;
        }
    }

    term.restore()
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let rows = match args.get(1) {
        Some(path) => RowStore::from_file(path).unwrap_or_else(|e| {
            eprintln!("vu: {path}: {e}");
            process::exit(1);
        }),
        None => RowStore::new(),
    };

    if let Err(e) = run(rows) {
        eprintln!("vu: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
