// SPDX-License-Identifier: MIT
//
// Grid — the 2D cell buffer that frames are drawn into.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing (`y * width + x`). A row's
//     cells are contiguous, so the left-to-right scan the renderer does is a
//     linear walk and whole rows can be compared as slices.
//
//   - Two access styles. `get` is a non-fatal query returning `Option`.
//     `cell_at` is the drawing accessor: out-of-range coordinates are a bug
//     in the caller's geometry, so it panics with the offending point and the
//     grid's bounds instead of clamping or silently dropping the write.
//
//   - Allocation is fallible. Grids are sized from the terminal, which the
//     user controls, so `new` and `resize` report `Error::Alloc` rather than
//     aborting inside the allocator.
//
//   - `resize` preserves the overlapping top-left rectangle. Width and height
//     are independent: a grid can grow in one dimension while shrinking in
//     the other.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Bg, Cell, Fg};
use crate::error::{Error, OutOfBounds, Result};

/// A fixed-size rectangle of cells.
///
/// # Examples
///
/// ```
/// use cell_term::cell::Cell;
/// use cell_term::grid::Grid;
///
/// let mut grid = Grid::new(80, 24, Cell::DEFAULT)?;
/// *grid.cell_at(5, 3) = Cell::new('X');
/// assert_eq!(grid.get(5, 3), Some(&Cell::new('X')));
/// assert_eq!(grid.get(80, 0), None);
/// # Ok::<(), cell_term::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

/// Allocate `width × height` copies of `fill`, reporting failure instead of
/// aborting.
fn alloc_cells(width: u16, height: u16, fill: Cell) -> Result<Vec<Cell>> {
    let err = || Error::Alloc { width, height };
    let len = usize::from(width)
        .checked_mul(usize::from(height))
        .ok_or_else(err)?;
    let mut cells = Vec::new();
    cells.try_reserve_exact(len).map_err(|_| err())?;
    cells.resize(len, fill);
    Ok(cells)
}

impl Grid {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a grid where every cell equals `fill`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the backing buffer cannot be allocated.
    pub fn new(width: u16, height: u16, fill: Cell) -> Result<Self> {
        Ok(Self {
            width,
            height,
            cells: alloc_cells(width, height, fill)?,
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Grid width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Mutable access to the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics with an [`OutOfBounds`] message naming `(x, y)` and the grid
    /// size if the point is outside the grid.
    #[inline]
    #[track_caller]
    pub fn cell_at(&mut self, x: u16, y: u16) -> &mut Cell {
        if !self.in_bounds(x, y) {
            self.out_of_bounds(x, y);
        }
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    #[cold]
    #[inline(never)]
    #[track_caller]
    fn out_of_bounds(&self, x: u16, y: u16) -> ! {
        let oob = OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        };
        panic!("{oob}");
    }

    /// All cells in row-major order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All cells in row-major order, mutably. The length never changes.
    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Set every cell to `fill`.
    pub fn clear(&mut self, fill: Cell) {
        self.cells.fill(fill);
    }

    /// Write `cell` at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds (see [`cell_at`](Self::cell_at)).
    /// In debug builds, also panics if `cell` holds a control character;
    /// release builds print it as [`Cell::REPLACEMENT`].
    #[inline]
    #[track_caller]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        debug_assert!(
            !cell.ch.is_control(),
            "control character {:?} cannot be drawn into a cell",
            cell.ch
        );
        *self.cell_at(x, y) = cell;
    }

    /// Write `text` into row `y` starting at column `x`.
    ///
    /// One character per cell, left to right, stopping at the right edge of
    /// the grid. Nothing wraps to the next row. Zero-width and control
    /// characters are skipped since a cell holds exactly one printable
    /// symbol; double-width characters are stored as [`Cell::REPLACEMENT`]
    /// so every cell stays one terminal column. `text` must not contain line
    /// breaks.
    ///
    /// Returns the number of cells written.
    ///
    /// # Panics
    ///
    /// Panics if at least one character would be written and `y` is out of
    /// bounds. A start column at or past the right edge writes nothing.
    #[track_caller]
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Fg, bg: Bg) -> u16 {
        debug_assert!(
            !text.contains(['\n', '\r']),
            "put_str text must not contain line breaks: {text:?}"
        );

        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            if ch.is_control() {
                continue;
            }
            let ch = match ch.width() {
                None | Some(0) => continue,
                Some(1) => ch,
                Some(_) => Cell::REPLACEMENT,
            };
            *self.cell_at(col, y) = Cell::styled(ch, fg, bg);
            col += 1;
        }
        col.saturating_sub(x)
    }

    /// Resize to `width × height`, keeping the overlapping top-left
    /// rectangle and filling newly exposed cells with `fill`.
    ///
    /// Cells outside the new bounds are discarded. Resizing to the current
    /// size is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the new buffer cannot be allocated. The
    /// grid is left unchanged in that case.
    pub fn resize(&mut self, width: u16, height: u16, fill: Cell) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }

        let mut cells = alloc_cells(width, height, fill)?;

        let keep_w = usize::from(width.min(self.width));
        let keep_h = height.min(self.height);
        let old_w = usize::from(self.width);
        let new_w = usize::from(width);

        for y in 0..usize::from(keep_h) {
            let src = y * old_w;
            let dst = y * new_w;
            cells[dst..dst + keep_w].copy_from_slice(&self.cells[src..src + keep_w]);
        }

        self.width = width;
        self.height = height;
        self.cells = cells;
        Ok(())
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Color;
    use proptest::prelude::*;

    fn grid(w: u16, h: u16) -> Grid {
        Grid::new(w, h, Cell::DEFAULT).unwrap()
    }

    /// Fill every cell with a character derived from its position so moved
    /// or lost cells are detectable.
    fn numbered(w: u16, h: u16) -> Grid {
        let mut g = grid(w, h);
        for y in 0..h {
            for x in 0..w {
                let ch = char::from_u32(0x100 + u32::from(y) * 64 + u32::from(x)).unwrap();
                g.set(x, y, Cell::new(ch));
            }
        }
        g
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_has_requested_dimensions() {
        let g = grid(80, 24);
        assert_eq!(g.width(), 80);
        assert_eq!(g.height(), 24);
        assert_eq!(g.cells().len(), 1920);
    }

    #[test]
    fn zero_sized_grids_are_valid() {
        assert!(grid(0, 0).cells().is_empty());
        assert!(grid(0, 10).cells().is_empty());
        assert!(grid(10, 0).cells().is_empty());
    }

    #[test]
    fn debug_shows_dimensions() {
        assert_eq!(format!("{:?}", grid(3, 2)), "Grid(3x2)");
    }

    // ── Access ──────────────────────────────────────────────────────────

    #[test]
    fn get_out_of_bounds_is_none() {
        let g = grid(4, 3);
        assert!(g.get(3, 2).is_some());
        assert!(g.get(4, 0).is_none());
        assert!(g.get(0, 3).is_none());
    }

    #[test]
    fn cell_at_writes_through() {
        let mut g = grid(4, 3);
        g.cell_at(2, 1).ch = '@';
        assert_eq!(g.get(2, 1).unwrap().ch, '@');
        assert_eq!(g.cells()[6].ch, '@');
    }

    #[test]
    #[should_panic(expected = "cell (4, 0) is out of bounds for a 4x3 grid")]
    fn cell_at_x_out_of_bounds_panics() {
        let mut g = grid(4, 3);
        let _ = g.cell_at(4, 0);
    }

    #[test]
    #[should_panic(expected = "cell (0, 7) is out of bounds for a 4x3 grid")]
    fn cell_at_y_out_of_bounds_panics() {
        let mut g = grid(4, 3);
        let _ = g.cell_at(0, 7);
    }

    #[test]
    fn row_slices() {
        let g = numbered(3, 2);
        let row = g.row(1).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row[0], *g.get(0, 1).unwrap());
        assert!(g.row(2).is_none());
    }

    // ── Clear ───────────────────────────────────────────────────────────

    #[test]
    fn clear_sets_every_cell() {
        let mut g = numbered(5, 4);
        let fill = Cell::styled('.', Fg::new(Color::Blue), Bg::new(Color::Yellow));
        g.clear(fill);
        assert!(g.cells().iter().all(|c| *c == fill));
    }

    // ── Text ────────────────────────────────────────────────────────────

    #[test]
    fn put_str_writes_consecutive_cells() {
        let mut g = grid(10, 2);
        let fg = Fg::new(Color::Green);
        let n = g.put_str(2, 1, "abc", fg, Bg::DEFAULT);
        assert_eq!(n, 3);
        assert_eq!(*g.get(2, 1).unwrap(), Cell::styled('a', fg, Bg::DEFAULT));
        assert_eq!(*g.get(4, 1).unwrap(), Cell::styled('c', fg, Bg::DEFAULT));
        assert_eq!(*g.get(5, 1).unwrap(), Cell::DEFAULT);
        assert_eq!(*g.get(1, 1).unwrap(), Cell::DEFAULT);
    }

    #[test]
    fn put_str_clips_at_row_end() {
        let mut g = grid(5, 2);
        let n = g.put_str(3, 0, "hello", Fg::DEFAULT, Bg::DEFAULT);
        assert_eq!(n, 2);
        assert_eq!(g.get(3, 0).unwrap().ch, 'h');
        assert_eq!(g.get(4, 0).unwrap().ch, 'e');
        // Nothing wrapped onto the next row.
        assert!(g.row(1).unwrap().iter().all(|c| *c == Cell::DEFAULT));
    }

    #[test]
    fn put_str_at_last_column_writes_one_cell() {
        let mut g = grid(6, 1);
        let n = g.put_str(5, 0, "xyz", Fg::DEFAULT, Bg::DEFAULT);
        assert_eq!(n, 1);
        assert_eq!(g.get(5, 0).unwrap().ch, 'x');
    }

    #[test]
    fn put_str_past_right_edge_writes_nothing() {
        let mut g = grid(6, 1);
        assert_eq!(g.put_str(6, 0, "xyz", Fg::DEFAULT, Bg::DEFAULT), 0);
        assert_eq!(g.put_str(9, 5, "xyz", Fg::DEFAULT, Bg::DEFAULT), 0);
        assert!(g.cells().iter().all(|c| *c == Cell::DEFAULT));
    }

    #[test]
    fn put_str_skips_zero_width() {
        let mut g = grid(6, 1);
        // 'e' + combining acute accent.
        let n = g.put_str(0, 0, "e\u{301}x", Fg::DEFAULT, Bg::DEFAULT);
        assert_eq!(n, 2);
        assert_eq!(g.get(0, 0).unwrap().ch, 'e');
        assert_eq!(g.get(1, 0).unwrap().ch, 'x');
    }

    #[test]
    fn put_str_replaces_wide_chars() {
        let mut g = grid(6, 1);
        let n = g.put_str(0, 0, "中a😀", Fg::DEFAULT, Bg::DEFAULT);
        assert_eq!(n, 3);
        assert_eq!(g.get(0, 0).unwrap().ch, Cell::REPLACEMENT);
        assert_eq!(g.get(1, 0).unwrap().ch, 'a');
        assert_eq!(g.get(2, 0).unwrap().ch, Cell::REPLACEMENT);
    }

    #[test]
    fn put_str_skips_control_chars() {
        let mut g = grid(6, 1);
        let n = g.put_str(0, 0, "a\x1b\tb", Fg::DEFAULT, Bg::DEFAULT);
        assert_eq!(n, 2);
        assert_eq!(g.get(1, 0).unwrap().ch, 'b');
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "control character")]
    fn set_rejects_control_chars() {
        let mut g = grid(3, 1);
        g.set(0, 0, Cell::new('\x1b'));
    }

    #[test]
    fn put_str_empty_is_noop() {
        let mut g = grid(3, 1);
        assert_eq!(g.put_str(0, 0, "", Fg::DEFAULT, Bg::DEFAULT), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn put_str_bad_row_panics() {
        let mut g = grid(3, 1);
        g.put_str(0, 1, "a", Fg::DEFAULT, Bg::DEFAULT);
    }

    // ── Resize ──────────────────────────────────────────────────────────

    #[test]
    fn resize_same_size_is_noop() {
        let mut g = numbered(4, 4);
        let before = g.clone();
        g.resize(4, 4, Cell::new('!')).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn resize_grow_preserves_and_fills() {
        let old = numbered(3, 2);
        let mut g = old.clone();
        let fill = Cell::new('+');
        g.resize(5, 4, fill).unwrap();

        assert_eq!(g.width(), 5);
        assert_eq!(g.height(), 4);
        for y in 0..4 {
            for x in 0..5 {
                let expected = if x < 3 && y < 2 { *old.get(x, y).unwrap() } else { fill };
                assert_eq!(*g.get(x, y).unwrap(), expected, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn resize_shrink_keeps_top_left() {
        let old = numbered(6, 5);
        let mut g = old.clone();
        g.resize(2, 3, Cell::DEFAULT).unwrap();

        assert_eq!(g.cells().len(), 6);
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(g.get(x, y), old.get(x, y));
            }
        }
    }

    #[test]
    fn resize_wider_but_shorter() {
        let old = numbered(3, 4);
        let mut g = old.clone();
        let fill = Cell::new('~');
        g.resize(6, 2, fill).unwrap();

        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(g.get(x, y), old.get(x, y));
            }
            for x in 3..6 {
                assert_eq!(*g.get(x, y).unwrap(), fill);
            }
        }
    }

    #[test]
    fn resize_narrower_but_taller() {
        let old = numbered(5, 2);
        let mut g = old.clone();
        let fill = Cell::new('~');
        g.resize(2, 4, fill).unwrap();

        for x in 0..2 {
            assert_eq!(g.get(x, 0), old.get(x, 0));
            assert_eq!(g.get(x, 1), old.get(x, 1));
            assert_eq!(*g.get(x, 2).unwrap(), fill);
            assert_eq!(*g.get(x, 3).unwrap(), fill);
        }
    }

    #[test]
    fn resize_to_zero_and_back() {
        let mut g = numbered(3, 3);
        g.resize(0, 0, Cell::DEFAULT).unwrap();
        assert!(g.cells().is_empty());
        g.resize(2, 2, Cell::new('z')).unwrap();
        assert!(g.cells().iter().all(|c| c.ch == 'z'));
    }

    // ── Properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_new_fills_every_cell(w in 0u16..64, h in 0u16..64, ch in proptest::char::range('!', '~')) {
            let fill = Cell::new(ch);
            let g = Grid::new(w, h, fill).unwrap();
            prop_assert_eq!(g.cells().len(), usize::from(w) * usize::from(h));
            prop_assert!(g.cells().iter().all(|c| *c == fill));
        }

        #[test]
        fn prop_resize_preserves_overlap(
            w0 in 0u16..24, h0 in 0u16..24,
            w1 in 0u16..24, h1 in 0u16..24,
        ) {
            let old = numbered(w0, h0);
            let mut g = old.clone();
            let fill = Cell::new('#');
            g.resize(w1, h1, fill).unwrap();

            prop_assert_eq!(g.cells().len(), usize::from(w1) * usize::from(h1));
            for y in 0..h1 {
                for x in 0..w1 {
                    let expected = old.get(x, y).copied().unwrap_or(fill);
                    prop_assert_eq!(*g.get(x, y).unwrap(), expected);
                }
            }
        }
    }
}
