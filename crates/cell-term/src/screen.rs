// SPDX-License-Identifier: MIT
//
// Screen — a terminal in raw mode paired with a render session.
//
// This is the whole-program API: init, draw, flush, poll input, shut down.
// `init` leaves the terminal in raw mode with a session sized to it; dropping
// the screen (or calling `shutdown`) restores the terminal. Nothing here is
// global, so the lifecycle is the value's lifetime.

use std::io;

use crate::cell::{Bg, Cell, Fg};
use crate::error::Result;
use crate::session::{FlushStats, RenderSession};
use crate::terminal::{Size, Terminal};

/// Raw-mode terminal plus a double-buffered cell grid sized to it.
///
/// ```no_run
/// use cell_term::{Bg, Color, Fg, Screen};
///
/// let mut screen = Screen::init()?;
/// let size = screen.size()?;
/// screen.set_string(0, size.rows - 1, "press any key", Fg::new(Color::Green), Bg::DEFAULT);
/// screen.flush()?;
/// while !screen.input_available() {}
/// screen.read_byte()?;
/// screen.shutdown()?;
/// # Ok::<(), cell_term::Error>(())
/// ```
#[derive(Debug)]
pub struct Screen {
    session: RenderSession,
    terminal: Terminal,
}

impl Screen {
    /// Enter raw mode and allocate a session matching the terminal size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if raw mode cannot be entered
    /// and [`Error::Alloc`](crate::Error::Alloc) if the grids cannot be
    /// allocated. The terminal is restored before either is returned.
    pub fn init() -> Result<Self> {
        let mut terminal = Terminal::new();
        terminal.enter()?;

        let size = terminal.refresh_size();
        // On error `terminal` drops here and leaves raw mode.
        let session = RenderSession::new(size.cols, size.rows)?;

        Ok(Self { session, terminal })
    }

    /// Restore the terminal. Equivalent to dropping the screen, but reports
    /// I/O errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the restore sequence or termios cannot be written.
    pub fn shutdown(mut self) -> Result<()> {
        self.terminal.leave()?;
        Ok(())
    }

    /// Current terminal size, re-queried from the OS.
    ///
    /// A changed size resizes the session, so the next flush repaints the
    /// whole screen. Query this once per frame before drawing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`](crate::Error::Alloc) if the grids cannot be
    /// resized.
    pub fn size(&mut self) -> Result<Size> {
        let size = self.terminal.refresh_size();
        self.session.resize_to(size.cols, size.rows)?;
        Ok(size)
    }

    /// The session, for read access to the grids.
    #[inline]
    #[must_use]
    pub const fn session(&self) -> &RenderSession {
        &self.session
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// See [`RenderSession::set_cell`].
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the current size.
    #[inline]
    #[track_caller]
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        self.session.set_cell(x, y, cell);
    }

    /// See [`RenderSession::set_string`].
    #[inline]
    #[track_caller]
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, fg: Fg, bg: Bg) -> u16 {
        self.session.set_string(x, y, text, fg, bg)
    }

    /// See [`RenderSession::cell_at`].
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the current size.
    #[inline]
    #[track_caller]
    pub fn cell_at(&mut self, x: u16, y: u16) -> &mut Cell {
        self.session.cell_at(x, y)
    }

    /// Reset the drawing to `fill`.
    #[inline]
    pub fn clear(&mut self, fill: Cell) {
        self.session.clear(fill);
    }

    /// Reset the drawing to [`Cell::DEFAULT`].
    #[inline]
    pub fn clear_default(&mut self) {
        self.session.clear_default();
    }

    /// Repaint every cell on the next flush.
    #[inline]
    pub const fn force_redraw(&mut self) {
        self.session.force_redraw();
    }

    /// Write the changes since the last flush to the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> Result<FlushStats> {
        Ok(self.session.flush()?)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Whether a byte can be read without blocking.
    #[inline]
    #[must_use]
    pub fn input_available(&self) -> bool {
        self.terminal.input_available()
    }

    /// Read one byte of input. Blocks unless
    /// [`input_available`](Self::input_available) returned true.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` when stdin is closed, or the OS read error.
    pub fn read_byte(&mut self) -> io::Result<u8> {
        self.terminal.read_byte()
    }
}
