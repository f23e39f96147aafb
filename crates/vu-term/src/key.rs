// SPDX-License-Identifier: MIT
//
// Keyboard input decoder.
//
// Turns raw stdin bytes into keypresses. Handles the small sequence
// vocabulary a viewer needs:
//
// - Legacy CSI sequences (arrows, Home/End, Delete, PageUp/PageDown)
// - Single-digit tilde forms (`ESC [ 3 ~` and friends)
// - SS3 Home/End (`ESC O H`, `ESC O F` from some terminals)
// - Control chords (0x01..=0x1A, reported with their letter)
// - Everything else as a raw byte the caller is free to ignore
//
// # Design
//
// The decoder is an explicit state machine fed one byte at a time with
// [`Decoder::advance`]. Escape sequences span multiple `read()` calls
// under the VMIN=0/VTIME=1 read policy, so the machine keeps its place
// between bytes; when a read times out mid-sequence, [`Decoder::flush`]
// resolves the pending prefix to a bare [`Key::Escape`] — exactly what
// a human tapping the Escape key produces. Sequences the viewer has no
// binding for collapse to Escape as well, one state's worth of bytes at
// a time, leaving any tail bytes to surface as raw [`Key::Byte`]s.
//
// Multi-byte UTF-8 input arrives as individual high bytes. The viewer
// never interprets them, so the decoder passes them through untouched.

use std::io::{self, Read};

// ─── Keys ───────────────────────────────────────────────────────────────────

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Any byte without a dedicated variant: printables, DEL, UTF-8
    /// fragments, control bytes outside the chord range.
    Byte(u8),
    /// A control chord, carrying the lowercase letter (`Ctrl(b'q')`).
    Ctrl(u8),
    /// A bare Escape keypress, or any sequence with no binding.
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Longest continuation an escape sequence may consume after the ESC
/// byte: introducer, one parameter digit, terminator (`[ 5 ~`).
pub const SEQ_MAX: usize = 3;

/// Where the state machine stands inside an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Not inside a sequence.
    Ground,
    /// Saw ESC, waiting for an introducer.
    Esc,
    /// Saw `ESC [`, waiting for a letter or parameter digit.
    Csi,
    /// Saw `ESC [ <digit>`, waiting for the `~` terminator.
    CsiParam,
    /// Saw `ESC O`, waiting for the final letter.
    Ss3,
}

/// Escape-sequence state machine.
///
/// Feed bytes with [`advance`](Decoder::advance); a returned `Some` is a
/// complete keypress, `None` means the byte extended a pending sequence.
/// Call [`flush`](Decoder::flush) when input pauses to resolve a pending
/// prefix to [`Key::Escape`]. [`read_key`](Decoder::read_key) wraps both
/// around a byte source and blocks until a full keypress arrives.
#[derive(Debug)]
pub struct Decoder {
    state: State,
    /// Continuation bytes consumed since the last ESC.
    seq: [u8; SEQ_MAX],
    len: usize,
}

impl Decoder {
    /// Create a decoder in the ground state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Ground,
            seq: [0; SEQ_MAX],
            len: 0,
        }
    }

    /// Is the decoder holding an unresolved sequence prefix?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state != State::Ground
    }

    /// Feed one byte; returns a key when one completes.
    pub fn advance(&mut self, byte: u8) -> Option<Key> {
        match self.state {
            State::Ground => match byte {
                0x1b => {
                    self.state = State::Esc;
                    None
                }
                b @ 0x01..=0x1a => Some(Key::Ctrl(b | 0x60)),
                b => Some(Key::Byte(b)),
            },

            State::Esc => match byte {
                b'[' => {
                    self.push(byte);
                    self.state = State::Csi;
                    None
                }
                b'O' => {
                    self.push(byte);
                    self.state = State::Ss3;
                    None
                }
                // Unknown introducer. The byte is part of the failed
                // sequence and is dropped with it.
                _ => self.emit(Key::Escape),
            },

            State::Csi => match byte {
                b'0'..=b'9' => {
                    self.push(byte);
                    self.state = State::CsiParam;
                    None
                }
                b'A' => self.emit(Key::ArrowUp),
                b'B' => self.emit(Key::ArrowDown),
                b'C' => self.emit(Key::ArrowRight),
                b'D' => self.emit(Key::ArrowLeft),
                b'H' => self.emit(Key::Home),
                b'F' => self.emit(Key::End),
                _ => self.emit(Key::Escape),
            },

            State::CsiParam => {
                if byte == b'~' {
                    self.push(byte);
                    let key = tilde_key(self.seq[1]);
                    self.emit(key)
                } else {
                    // Multi-digit parameters (function keys, paste
                    // delimiters) have no binding here. Their trailing
                    // bytes surface as raw Byte keys.
                    self.emit(Key::Escape)
                }
            }

            State::Ss3 => match byte {
                b'H' => self.emit(Key::Home),
                b'F' => self.emit(Key::End),
                _ => self.emit(Key::Escape),
            },
        }
    }

    /// Resolve a pending sequence prefix to a bare Escape.
    ///
    /// Call after a read timeout. Returns `None` in the ground state.
    pub fn flush(&mut self) -> Option<Key> {
        if self.state == State::Ground {
            None
        } else {
            self.emit(Key::Escape)
        }
    }

    /// Block until one complete keypress arrives from `input`.
    ///
    /// The source is expected to behave like a raw-mode terminal read:
    /// `Ok(0)` means a VTIME expiry with no byte, not end of input. A
    /// timeout (or `WouldBlock`) mid-sequence resolves the pending
    /// prefix via [`flush`](Decoder::flush); in the ground state it
    /// just polls again. Interrupted reads are retried.
    ///
    /// # Errors
    ///
    /// Propagates any `read` error other than `Interrupted` and
    /// `WouldBlock`.
    pub fn read_key(&mut self, input: &mut impl Read) -> io::Result<Key> {
        let mut byte = [0u8; 1];
        loop {
            match input.read(&mut byte) {
                Ok(0) => {
                    if let Some(key) = self.flush() {
                        return Ok(key);
                    }
                }
                Ok(_) => {
                    if let Some(key) = self.advance(byte[0]) {
                        return Ok(key);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if let Some(key) = self.flush() {
                        return Ok(key);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn push(&mut self, byte: u8) {
        if self.len < SEQ_MAX {
            self.seq[self.len] = byte;
            self.len += 1;
        }
    }

    fn emit(&mut self, key: Key) -> Option<Key> {
        self.state = State::Ground;
        self.len = 0;
        Some(key)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Map the digit of a `ESC [ <digit> ~` sequence to its key.
///
/// Terminals disagree on Home and End encodings, hence the doubled
/// entries. Digits without a binding collapse to Escape like any other
/// unrecognized sequence.
const fn tilde_key(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'2' | b'8' => Key::End,
        b'3' => Key::Delete,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
