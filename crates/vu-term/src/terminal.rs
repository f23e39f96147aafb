// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window geometry, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control — there is no
// safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. Entering raw mode captures the
// original attributes and guarantees they come back on drop — even if the
// viewer panics mid-frame. The read policy is VMIN=0/VTIME=1: a read returns
// after at most 100ms with zero bytes instead of blocking indefinitely, so
// a partial escape sequence can be resolved without waiting forever.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a pre-built
// restore sequence directly to fd 1. This prevents deadlock if the panic
// happened while the lock was held (common during frame rendering). One raw
// write, attributes restored, then the original panic handler prints its
// message to a working terminal.
//
// Window geometry prefers ioctl(TIOCGWINSZ) and falls back to parking the
// cursor at the bottom-right extreme and asking the terminal where it ended
// up — the portable trick for hosts whose ioctl lies or is missing.

use std::io::{self, Read};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

#[cfg(unix)]
use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Query the terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` when the query fails or reports a degenerate size, in
/// which case the caller falls back to the cursor-position probe.
#[cfg(unix)]
fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

/// Determine the terminal size, by syscall if possible.
///
/// When `ioctl` is unavailable or reports zero columns, the fallback moves
/// the cursor to the bottom-right extreme (`\x1b[999C\x1b[999B` — clamped by
/// the terminal to the real edge) and parses the cursor-position report.
/// Raw mode must already be active: the report arrives on stdin and must not
/// be echoed or line-buffered.
///
/// # Errors
///
/// Fails when both probes fail; the viewer cannot render without known
/// dimensions, so callers treat this as fatal at startup.
#[cfg(unix)]
pub fn window_size() -> io::Result<Size> {
    if let Some(size) = ioctl_size() {
        return Ok(size);
    }
    cursor_position_fallback()
}

#[cfg(not(unix))]
pub fn window_size() -> io::Result<Size> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "terminal size probing requires a unix terminal",
    ))
}

/// Upper bound on the cursor-position report. Real replies look like
/// `\x1b[24;80R` — a dozen bytes; 32 leaves headroom without trusting the
/// terminal to terminate.
const POSITION_REPORT_MAX: usize = 32;

/// Ask the terminal where the cursor is after pushing it to the bottom-right.
#[cfg(unix)]
fn cursor_position_fallback() -> io::Result<Size> {
    let mut query = Vec::with_capacity(16);
    ansi::cursor_right(&mut query, 999)?;
    ansi::cursor_down(&mut query, 999)?;
    ansi::query_cursor_position(&mut query)?;
    raw_stdout_write(&query)?;

    // Collect the reply up to the terminating 'R' (excluded), bounded by
    // POSITION_REPORT_MAX. A timed-out read ends the reply early; the
    // parse below rejects whatever is incomplete.
    let mut report = [0u8; POSITION_REPORT_MAX];
    let mut len = 0;
    let mut stdin = RawStdin;
    while len < report.len() {
        let mut byte = [0u8; 1];
        match stdin.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                if byte[0] == b'R' {
                    break;
                }
                report[len] = byte[0];
                len += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    parse_position_report(&report[..len]).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "cannot determine terminal size",
        )
    })
}

/// Parse a cursor-position report (`R` already stripped): `\x1b[{rows};{cols}`.
fn parse_position_report(report: &[u8]) -> Option<Size> {
    let body = report.strip_prefix(b"\x1b[")?;
    let body = std::str::from_utf8(body).ok()?;
    let (rows, cols) = body.split_once(';')?;
    let rows: u16 = rows.parse().ok()?;
    let cols: u16 = cols.parse().ok()?;
    if rows == 0 || cols == 0 {
        return None;
    }
    Some(Size { cols, rows })
}

// ─── Raw stdin ──────────────────────────────────────────────────────────────

/// Byte source reading the stdin file descriptor directly.
///
/// `io::stdin()` sits behind an internal buffer that can swallow bytes
/// beyond the one requested — fatal for escape-sequence timing and for the
/// geometry fallback, which both rely on the VMIN/VTIME read policy applying
/// to every single byte. Reading fd 0 directly keeps one unbuffered path.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawStdin;

impl Read for RawStdin {
    #[cfg(unix)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            Err(io::Error::last_os_error())
        } else {
            // Safe: n is non-negative and bounded by buf.len().
            #[allow(clippy::cast_sign_loss)]
            Ok(n as usize)
        }
    }

    #[cfg(not(unix))]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::stdin().read(buf)
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] guard owns its own copy, but the panic hook can't reach
/// it. This backup — behind a [`Mutex`], not `static mut` — lets the hook
/// restore cooked mode without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Screen reset written on every exit path: clear, cursor home, cursor show.
///
/// Clearing first means whatever the viewer left mid-frame disappears and
/// the shell prompt (or a panic message) lands at the top of a blank screen
/// with a visible cursor.
const RESTORE_SEQUENCE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken: no
/// echo, no line editing, no way to read the error message. The hook writes
/// [`RESTORE_SEQUENCE`] directly to fd 1 (bypassing Rust's stdout lock to
/// avoid deadlock), restores termios, then delegates to the original panic
/// handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = raw_stdout_write(RESTORE_SEQUENCE);

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write bytes directly to stdout's file descriptor, retrying on EINTR and
/// short writes. Bypasses `io::stdout()` and its lock entirely.
#[cfg(unix)]
pub(crate) fn raw_stdout_write(bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                bytes[written..].as_ptr().cast::<libc::c_void>(),
                bytes.len() - written,
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        // Safe: n is non-negative and bounded by the remaining length.
        #[allow(clippy::cast_sign_loss)]
        {
            written += n as usize;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn raw_stdout_write(bytes: &[u8]) -> io::Result<()> {
    use std::io::Write;
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII cleanup.
///
/// [`enter_raw`](Self::enter_raw) captures the current attributes and
/// switches the terminal to raw mode; the original attributes come back
/// when the guard drops — on normal quit, on error return, and (via the
/// panic hook) on panic.
pub struct Terminal {
    /// Attributes captured before raw mode, reapplied on restore.
    #[cfg(unix)]
    original: libc::termios,
    /// False once restored; makes [`restore`](Self::restore) idempotent.
    active: bool,
}

impl Terminal {
    /// Capture the current terminal attributes and enter raw mode.
    ///
    /// Raw mode disables echo, canonical line buffering, signal generation,
    /// and software flow control, and sets the VMIN=0/VTIME=1 read policy
    /// (reads return after at most 100ms with zero bytes).
    ///
    /// # Errors
    ///
    /// Fails when stdin is not a terminal or when the attribute get/set
    /// syscalls fail. There is no recovery path: a terminal that cannot be
    /// configured cannot be trusted to render, so callers exit.
    #[cfg(unix)]
    pub fn enter_raw() -> io::Result<Self> {
        if !is_tty() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "standard input is not a terminal",
            ));
        }

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            let original = termios;

            // Save to the global backup for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(original);
            }
            install_panic_hook();

            termios.c_iflag &= !(libc::BRKINT
                | libc::ICRNL
                | libc::INPCK
                | libc::ISTRIP
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most 100ms with
            // whatever arrived, possibly nothing. The key decoder leans on
            // this to resolve partial escape sequences.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            Ok(Self {
                original,
                active: true,
            })
        }
    }

    #[cfg(not(unix))]
    pub fn enter_raw() -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw terminal mode requires a unix terminal",
        ))
    }

    /// Reset the screen and reapply the original terminal attributes.
    ///
    /// Runs automatically on drop; calling it twice is a no-op. The screen
    /// reset goes out first (while still in raw mode — the sequence carries
    /// no newlines, so OPOST doesn't matter), then the attributes.
    ///
    /// # Errors
    ///
    /// Fails when the attribute set syscall fails; the screen reset itself
    /// is best-effort.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let _ = raw_stdout_write(RESTORE_SEQUENCE);

        #[cfg(unix)]
        unsafe {
            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const self.original)
                != 0
            {
                return Err(io::Error::last_os_error());
            }
        }

        // Restored successfully — the panic hook no longer needs the backup.
        #[cfg(unix)]
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }

        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.restore();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Size ──────────────────────────────────────────────────────────

    #[test]
    fn size_equality() {
        assert_eq!(Size { cols: 80, rows: 24 }, Size { cols: 80, rows: 24 });
    }

    #[test]
    fn size_inequality() {
        assert_ne!(Size { cols: 80, rows: 24 }, Size { cols: 120, rows: 40 });
    }

    #[test]
    fn size_debug_format() {
        let s = Size { cols: 80, rows: 24 };
        let debug = format!("{s:?}");
        assert!(debug.contains("80"));
        assert!(debug.contains("24"));
    }

    #[test]
    fn size_is_copy() {
        let a = Size { cols: 80, rows: 24 };
        let b = a;
        assert_eq!(a, b);
    }

    // ── Terminal queries ─────────────────────────────────────────────

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    #[test]
    fn enter_raw_restores_cleanly_when_possible() {
        // On a TTY this toggles raw mode and back; off a TTY (CI) it must
        // fail up front instead of misconfiguring a pipe.
        match Terminal::enter_raw() {
            Ok(mut term) => {
                term.restore().unwrap();
                // Second restore is a no-op.
                term.restore().unwrap();
            }
            Err(err) => {
                assert_eq!(err.kind(), io::ErrorKind::Unsupported);
            }
        }
    }

    // ── Position report parsing ──────────────────────────────────────

    #[test]
    fn parse_report_basic() {
        assert_eq!(
            parse_position_report(b"\x1b[24;80"),
            Some(Size { cols: 80, rows: 24 })
        );
    }

    #[test]
    fn parse_report_large_terminal() {
        assert_eq!(
            parse_position_report(b"\x1b[63;237"),
            Some(Size {
                cols: 237,
                rows: 63
            })
        );
    }

    #[test]
    fn parse_report_rejects_missing_prefix() {
        assert_eq!(parse_position_report(b"24;80"), None);
        assert_eq!(parse_position_report(b"[24;80"), None);
    }

    #[test]
    fn parse_report_rejects_missing_semicolon() {
        assert_eq!(parse_position_report(b"\x1b[2480"), None);
    }

    #[test]
    fn parse_report_rejects_garbage_numbers() {
        assert_eq!(parse_position_report(b"\x1b[ab;cd"), None);
        assert_eq!(parse_position_report(b"\x1b[24;"), None);
        assert_eq!(parse_position_report(b"\x1b[;80"), None);
    }

    #[test]
    fn parse_report_rejects_zero_dimensions() {
        assert_eq!(parse_position_report(b"\x1b[0;80"), None);
        assert_eq!(parse_position_report(b"\x1b[24;0"), None);
    }

    #[test]
    fn parse_report_rejects_empty() {
        assert_eq!(parse_position_report(b""), None);
    }

    #[test]
    fn report_bound_covers_real_replies() {
        // Largest plausible reply: \x1b[65535;65535 is 13 bytes.
        assert!(POSITION_REPORT_MAX >= 13);
    }

    // ── Restore sequence ─────────────────────────────────────────────

    #[test]
    fn restore_sequence_clears_then_homes_then_shows() {
        let s = std::str::from_utf8(RESTORE_SEQUENCE).unwrap();
        let clear = s.find("\x1b[2J").unwrap();
        let home = s.find("\x1b[H").unwrap();
        let show = s.find("\x1b[?25h").unwrap();
        assert!(clear < home && home < show);
    }

    #[test]
    fn restore_sequence_has_no_newlines() {
        // Written while OPOST is still off; a bare \n would render as a
        // diagonal staircase.
        assert!(!RESTORE_SEQUENCE.contains(&b'\n'));
    }
}
