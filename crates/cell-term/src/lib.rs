// SPDX-License-Identifier: MIT
//
// cell-term — double-buffered cell-grid rendering for raw-mode terminals.
//
// Programs draw into a grid of styled character cells. On flush, the grid is
// diffed against what the terminal already shows and only the changed cells
// are written, each as a cursor move (when not adjacent), a style (when
// different), and the character. Everything else stays untouched, so a
// mostly-static screen refreshed at a high frame rate costs almost no I/O.
//
// Layers, bottom up:
//
//   cell     — colors, attributes, the Cell value
//   ansi     — the handful of escape sequences we emit
//   grid     — a rectangular, resizable Cell array
//   output   — frame buffering and cursor/style tracking
//   session  — desired/baseline grids and the diff-and-flush
//   terminal — raw mode, size query, byte input, panic-safe restore
//   screen   — terminal + session as one value

pub mod ansi;
pub mod cell;
pub mod error;
pub mod grid;
pub mod output;
pub mod screen;
pub mod session;
pub mod terminal;

pub use cell::{Attr, Bg, Cell, Color, Fg};
pub use error::{Error, OutOfBounds, Result};
pub use grid::Grid;
pub use screen::Screen;
pub use session::{FlushStats, RenderSession};
pub use terminal::Size;
