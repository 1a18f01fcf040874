// SPDX-License-Identifier: MIT
//
// Terminal I/O driver — raw mode, size query, non-blocking input poll.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, poll, and raw fd reads/writes.
// These are the POSIX interfaces for terminal control. Each unsafe block is
// minimal.
#![allow(unsafe_code)]
//
// `Terminal` owns the terminal's raw state. Entering captures the original
// termios, switches to raw mode, hides the cursor and clears the screen.
// Leaving undoes all of it and homes the cursor so the shell prompt starts
// on a clean screen. `Drop` leaves on every path, including unwinding.
//
// The panic hook writes a pre-built restore sequence straight to fd 1,
// bypassing Rust's stdout lock (a flush may have been holding it), then
// reinstates the termios backup and hands over to the previous hook. The
// panic message therefore lands on a sane, cooked-mode terminal. The hook
// clears `ACTIVE` as it restores, and a `Drop` during that unwind then only
// puts termios back, so the message is never wiped by a second clear.
//
// Input is read byte by byte straight from fd 0. Going around `io::stdin()`
// keeps its internal buffer from hiding bytes that `poll()` would no longer
// report.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use log::debug;

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

impl Size {
    /// Used when the terminal cannot tell us its size.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Total number of cells (`cols × rows`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }

    /// Whether both dimensions are at least those of `min`.
    #[inline]
    #[must_use]
    pub const fn fits(self, min: Self) -> bool {
        self.cols >= min.cols && self.rows >= min.rows
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

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

/// Whether at least one byte can be read from stdin without blocking.
///
/// Never blocks. Also true at end of input, where the next
/// [`read_byte`] reports `UnexpectedEof` instead of blocking.
#[cfg(unix)]
#[must_use]
pub fn input_available() -> bool {
    fd_readable(libc::STDIN_FILENO)
}

#[cfg(not(unix))]
#[must_use]
pub fn input_available() -> bool {
    false
}

/// Read exactly one byte from stdin, blocking until it arrives.
///
/// Call only after [`input_available`] returned true to stay non-blocking.
///
/// # Errors
///
/// `UnexpectedEof` when stdin is closed, or the OS error of `read()`.
#[cfg(unix)]
pub fn read_byte() -> io::Result<u8> {
    read_byte_from(libc::STDIN_FILENO)
}

/// Zero-timeout `poll()`: readable data or a hang-up is pending on `fd`.
#[cfg(unix)]
fn fd_readable(fd: libc::c_int) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let ready = unsafe { libc::poll(&raw mut pfd, 1, 0) };
    ready > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP) != 0
}

/// One `read()` of a single byte from `fd`, retried on `EINTR`.
#[cfg(unix)]
fn read_byte_from(fd: libc::c_int) -> io::Result<u8> {
    let mut byte = 0u8;
    loop {
        let n = unsafe { libc::read(fd, (&raw mut byte).cast(), 1) };
        match n {
            1 => return Ok(byte),
            0 => return Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(not(unix))]
pub fn read_byte() -> io::Result<u8> {
    use std::io::Read;

    let mut byte = [0u8; 1];
    io::stdin().read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Whether stdin or stdout is an interactive terminal. Tests that would
/// enter raw mode on the developer's screen skip themselves when it is.
#[cfg(test)]
pub(crate) fn attached_to_terminal() -> bool {
    is_tty() || get_size().is_some()
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for the panic hook.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Restore sequence for emergency use: reset SGR attributes, show cursor,
/// clear screen, cursor home. Same effect as [`Terminal::leave`].
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[0m\
    \x1b[?25h\
    \x1b[2J\
    \x1b[1;1f";

/// Panic hook guard: ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            // Claim the restore so unwinding `Drop`s don't clear the screen
            // again after the message below is printed.
            if ACTIVE.swap(false, Ordering::SeqCst) {
                emergency_restore();

                #[cfg(unix)]
                restore_termios_from_backup();
            }

            original(info);
        }));
    });
}

/// Set while some `Terminal` is entered. Cleared by `leave`, or by the panic
/// hook once it has restored the terminal.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Write the restore sequence directly to stdout's file descriptor.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// ```no_run
/// use cell_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... draw frames, poll input ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Cached size, refreshed by [`refresh_size`](Self::refresh_size).
    size: Size,

    /// Whether we're in raw mode with the cursor hidden.
    active: bool,
}

impl Terminal {
    /// Create a terminal handle and query the current size.
    ///
    /// Does **not** enter raw mode. Falls back to 80×24 if the size cannot be
    /// determined (tests, pipes).
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    /// Cached terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the terminal size from the OS and cache it.
    ///
    /// Keeps the previous value if the query fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            if s != self.size {
                debug!("terminal size changed: {} -> {s}", self.size);
            }
            self.size = s;
        }
        self.size
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode, hide the cursor and clear the screen.
    ///
    /// Idempotent: calling `enter()` while already active is a no-op. When
    /// stdin is not a TTY the termios step is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or terminal output fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::cursor_hide(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        lock.flush()?;

        self.active = true;
        ACTIVE.store(true, Ordering::SeqCst);
        debug!("entered raw mode ({})", self.size);
        Ok(())
    }

    /// Restore the terminal: reset style, show the cursor, clear the
    /// screen, home the cursor, and reinstate the original termios.
    ///
    /// Idempotent: calling `leave()` while inactive is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::reset(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::cursor_to(&mut lock, 0, 0)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        ACTIVE.store(false, Ordering::SeqCst);
        debug!("left raw mode");
        Ok(())
    }

    /// See [`input_available`].
    #[inline]
    #[must_use]
    pub fn input_available(&self) -> bool {
        input_available()
    }

    /// See [`read_byte`].
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` when stdin is closed, or the OS error of `read()`.
    #[inline]
    pub fn read_byte(&mut self) -> io::Result<u8> {
        read_byte()
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let fd = libc::STDIN_FILENO;

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // cfmakeraw equivalent.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;

            // read() blocks until at least 1 byte is available.
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("size", &self.size)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if std::thread::panicking() && !ACTIVE.load(Ordering::SeqCst) {
            // The panic hook already restored the screen and printed the
            // message; only the termios bookkeeping is left.
            let _ = self.disable_raw_mode();
            self.active = false;
            debug!("left raw mode after panic");
        } else {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
