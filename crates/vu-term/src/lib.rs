// SPDX-License-Identifier: MIT
//
// vu-term — Terminal backend for vu.
//
// Raw-mode terminal control for a minimal file viewer: termios
// configuration with guaranteed restore, escape-sequence key decoding,
// window geometry probing, and whole-frame output buffering.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. Every byte from the terminal passes
// through one decoder. Every frame reaches the terminal in one write.

pub mod ansi;
pub mod key;
pub mod output;
pub mod terminal;
