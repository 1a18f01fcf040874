// SPDX-License-Identifier: MIT
//
// Cell — the atomic unit of the grid.
//
// Every character position on screen is a Cell: one printable symbol plus a
// foreground and a background style. The whole renderer exists to produce,
// diff, and output these.
//
// Styles come from a closed palette. There is no RGB and no 256-color index:
// a foreground is one of the 8 standard colors, optionally high-intensity,
// optionally bold and/or underlined; a background is one of the 8 standard
// colors, optionally high-intensity. Every combination maps to plain SGR
// parameters that any ANSI terminal understands.
//
// Cells are `Copy` and compared by full structural equality. The diff pass
// repaints a cell when the character or either style differs.
//
// The renderer assumes every printed cell advances the terminal cursor by
// exactly one column. Characters that don't (controls, combining marks, wide
// CJK and emoji) are printed as `Cell::REPLACEMENT` instead.

use unicode_width::UnicodeWidthChar;

// ─── Palette ────────────────────────────────────────────────────────────────

/// The eight standard terminal colors.
///
/// The discriminant is the color's SGR offset: foreground `30 + n`,
/// background `40 + n`, high-intensity `90 + n` / `100 + n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    /// All colors in SGR order.
    pub const ALL: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// SGR offset of this color (0–7).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

bitflags::bitflags! {
    /// Foreground text attributes supported by the palette.
    ///
    /// ```
    /// use cell_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(style.contains(Attr::BOLD));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1, increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 4, underline.
        const UNDERLINE = 1 << 1;
    }
}

// ─── Foreground ─────────────────────────────────────────────────────────────

/// Foreground style: a palette color plus intensity and attributes.
///
/// Built with const combinators so styles can live in `const` items:
///
/// ```
/// use cell_term::cell::{Attr, Color, Fg};
///
/// const WARNING: Fg = Fg::new(Color::Yellow).bold().bright();
/// assert!(WARNING.attrs.contains(Attr::BOLD));
/// assert!(WARNING.bright);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fg {
    pub color: Color,
    /// High-intensity variant (SGR 90–97).
    pub bright: bool,
    pub attrs: Attr,
}

impl Fg {
    /// Regular white text.
    pub const DEFAULT: Self = Self::new(Color::White);

    #[inline]
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            bright: false,
            attrs: Attr::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn bold(self) -> Self {
        Self {
            attrs: self.attrs.union(Attr::BOLD),
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub const fn underline(self) -> Self {
        Self {
            attrs: self.attrs.union(Attr::UNDERLINE),
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub const fn bright(self) -> Self {
        Self {
            bright: true,
            ..self
        }
    }
}

impl Default for Fg {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── Background ─────────────────────────────────────────────────────────────

/// Background style: a palette color, optionally high-intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bg {
    pub color: Color,
    /// High-intensity variant (SGR 100–107).
    pub bright: bool,
}

impl Bg {
    /// Black background.
    pub const DEFAULT: Self = Self::new(Color::Black);

    #[inline]
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            bright: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn bright(self) -> Self {
        Self {
            bright: true,
            ..self
        }
    }
}

impl Default for Bg {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// One character position: a symbol and its styles.
///
/// ```
/// use cell_term::cell::{Bg, Cell, Color, Fg};
///
/// let ship = Cell::styled('>', Fg::new(Color::Magenta).bold(), Bg::DEFAULT);
/// assert_ne!(ship, Cell::DEFAULT);
/// assert_eq!(ship.with_char('>'), ship);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub fg: Fg,
    pub bg: Bg,
}

impl Cell {
    /// A space, white on black. Fills new grids and cleared frames.
    pub const DEFAULT: Self = Self {
        ch: ' ',
        fg: Fg::DEFAULT,
        bg: Bg::DEFAULT,
    };

    /// Printed in place of a character that does not occupy exactly one column.
    pub const REPLACEMENT: char = '?';

    /// A character with the default styles.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: Fg::DEFAULT,
            bg: Bg::DEFAULT,
        }
    }

    /// A character with explicit foreground and background styles.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: Fg, bg: Bg) -> Self {
        Self { ch, fg, bg }
    }

    #[inline]
    #[must_use]
    pub const fn with_char(self, ch: char) -> Self {
        Self { ch, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: Fg) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: Bg) -> Self {
        Self { bg, ..self }
    }

    /// The character actually sent to the terminal.
    #[inline]
    #[must_use]
    pub fn display_char(&self) -> char {
        if is_single_width(self.ch) {
            self.ch
        } else {
            Self::REPLACEMENT
        }
    }
}

/// Whether `ch` moves the terminal cursor exactly one column when printed.
#[inline]
#[must_use]
pub fn is_single_width(ch: char) -> bool {
    !ch.is_control() && ch.width() == Some(1)
}

impl Default for Cell {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
