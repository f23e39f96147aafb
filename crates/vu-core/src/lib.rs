//! # vu-core — Viewer core for vu
//!
//! This crate contains everything between a file on disk and a frame of
//! terminal bytes:
//!
//! - **[`row`]** — `Row` and `RowStore`, the loaded file as byte-faithful rows
//! - **[`viewport`]** — cursor movement, column clamping, and scroll state
//! - **[`screen`]** — frame composition into a single buffered write
//!
//! The crate never touches the terminal itself: it takes screen
//! dimensions from `vu-term` and produces bytes, which keeps every piece
//! testable without a TTY.

pub mod row;
pub mod screen;
pub mod viewport;
