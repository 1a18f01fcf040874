// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the `CellWriter`'s job. This module
// just knows the byte-level encoding of the handful of commands we need.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal. Cursor positioning uses the HVP form (`CSI row;col f`),
// which every terminal treats identically to CUP.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

use crate::cell::{Attr, Bg, Fg};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using HVP (Horizontal and Vertical Position).
///
/// Our coordinates are 0-indexed; the wire format is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}f", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Select a foreground and background style as one SGR sequence.
///
/// The sequence always starts with `0` so attributes of the previous cell
/// (bold, underline) never leak into this one:
///
/// | style                      | bytes            |
/// |----------------------------|------------------|
/// | red on black               | `ESC[0;31;40m`   |
/// | bold bright yellow on blue | `ESC[0;1;93;44m` |
/// | underlined white on bright black | `ESC[0;4;37;100m` |
pub fn style(w: &mut impl Write, fg: Fg, bg: Bg) -> io::Result<()> {
    w.write_all(b"\x1b[0")?;
    if fg.attrs.contains(Attr::BOLD) {
        w.write_all(b";1")?;
    }
    if fg.attrs.contains(Attr::UNDERLINE) {
        w.write_all(b";4")?;
    }
    write!(w, ";{};{}m", fg_code(fg), bg_code(bg))
}

/// SGR parameter for a foreground color: 30–37, or 90–97 when bright.
#[inline]
#[must_use]
pub const fn fg_code(fg: Fg) -> u8 {
    let base = if fg.bright { 90 } else { 30 };
    base + fg.color.index()
}

/// SGR parameter for a background color: 40–47, or 100–107 when bright.
#[inline]
#[must_use]
pub const fn bg_code(bg: Bg) -> u8 {
    let base = if bg.bright { 100 } else { 40 };
    base + bg.color.index()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
