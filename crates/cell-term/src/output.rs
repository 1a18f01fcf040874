// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer — accumulates all bytes of a flush in memory so the frame
//   goes out in a single write() and a single flush.
//
//   CellWriter — tracks where the terminal cursor is and which style is
//   active while one flush is being encoded. The cursor auto-advances after a
//   character, so a changed cell directly right of the previous one needs no
//   positioning; a cell with the same styles as the previous one needs no
//   SGR sequence.
//
// The writer's knowledge is only valid within one flush. The session resets
// it at the start of every pass, so the first changed cell of a frame always
// carries an explicit cursor move and style.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Bg, Cell, Fg};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates a frame for a single `write()` syscall.
///
/// Default capacity: 16 KB, enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a character as UTF-8.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf
            .extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w`, flush `w`, and clear the buffer.
    ///
    /// An empty buffer does not touch `w` at all.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens in flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Tracks terminal cursor and style during one flush to skip redundant
/// escape sequences.
#[derive(Debug, Default)]
pub struct CellWriter {
    /// Where the next printed character will land, if known.
    cursor: Option<(u16, u16)>,
    /// The style last selected, if known.
    style: Option<(Fg, Bg)>,
}

impl CellWriter {
    /// Create a writer that assumes nothing about the terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: None,
            style: None,
        }
    }

    /// Forget all tracked state. Call at the start of every flush.
    pub const fn reset_state(&mut self) {
        self.cursor = None;
        self.style = None;
    }

    /// Encode `cell` at `(x, y)`, emitting only the sequences needed.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        self.move_to(out, x, y);

        if self.style != Some((cell.fg, cell.bg)) {
            ansi::style(out, cell.fg, cell.bg).ok();
            self.style = Some((cell.fg, cell.bg));
        }

        out.push_char(cell.display_char());

        // Past the last column the cursor sits in the terminal's pending-wrap
        // state; `x + 1` is never a cell we will address without a move.
        self.cursor = x.checked_add(1).map(|nx| (nx, y));
    }

    /// Position the cursor at `(x, y)` unless it is already there.
    pub fn move_to(&mut self, out: &mut OutputBuffer, x: u16, y: u16) {
        if self.cursor != Some((x, y)) {
            ansi::cursor_to(out, x, y).ok();
            self.cursor = Some((x, y));
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
