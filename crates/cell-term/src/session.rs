// SPDX-License-Identifier: MIT
//
// Render session — double-buffered diff-and-flush.
//
// The session owns two grids of identical size:
//
//   desired  — what the caller wants on screen. Mutated freely during a frame
//              through set_cell / set_string / clear.
//   baseline — what the terminal currently shows. Mutated only by flush.
//
// A flush walks both grids in row-major order. Each cell that differs is
// positioned, styled, printed, and copied into the baseline; equal cells cost
// nothing. Output size is proportional to the number of changed cells, not
// to the grid area, and a flush with nothing changed writes zero bytes.
//
// Full repaints (first frame, after a resize, on request) are driven by the
// `force_repaint` flag: while it is set every cell counts as changed. The
// baseline's contents are meaningless until the next flush clears the flag.
//
// Optimizations:
//
//   - Row-level skip: unchanged rows are detected with one slice comparison.
//   - CellWriter elides cursor moves for adjacent cells and repeated SGR
//     sequences for runs of equally styled cells.
//   - The whole frame is accumulated in an OutputBuffer and written once.

use std::io::{self, Write};

use log::{debug, trace};

use crate::cell::{Bg, Cell, Fg};
use crate::error::Result;
use crate::grid::Grid;
use crate::output::{CellWriter, OutputBuffer};
use crate::terminal::Size;

// ─── FlushStats ──────────────────────────────────────────────────────────────

/// What a flush did, for profiling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    /// Cells that differed from the baseline and were written.
    pub cells_rendered: usize,
    /// Cells that matched the baseline and were skipped.
    pub cells_skipped: usize,
    /// Bytes handed to the output stream.
    pub bytes_written: usize,
}

impl FlushStats {
    /// Total cells examined (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── RenderSession ───────────────────────────────────────────────────────────

/// Desired/baseline grid pair with a diff-and-flush renderer.
///
/// ```
/// use cell_term::cell::{Bg, Cell, Color, Fg};
/// use cell_term::session::RenderSession;
///
/// let mut session = RenderSession::new(20, 4)?;
/// session.set_string(0, 0, "score: 10", Fg::new(Color::Yellow), Bg::DEFAULT);
///
/// let mut out = Vec::new();
/// let first = session.flush_to(&mut out)?;
/// assert_eq!(first.cells_rendered, 80); // first frame repaints everything
///
/// session.set_cell(7, 0, Cell::styled('2', Fg::new(Color::Yellow), Bg::DEFAULT));
/// let second = session.flush_to(&mut out)?;
/// assert_eq!(second.cells_rendered, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RenderSession {
    desired: Grid,
    baseline: Grid,
    force_repaint: bool,
    output: OutputBuffer,
    writer: CellWriter,
}

impl RenderSession {
    /// Create a session of `width × height` with `desired` cleared to
    /// [`Cell::DEFAULT`]. The first flush repaints every cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`](crate::Error::Alloc) if either grid cannot be
    /// allocated.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        Ok(Self {
            desired: Grid::new(width, height, Cell::DEFAULT)?,
            baseline: Grid::new(width, height, Cell::DEFAULT)?,
            force_repaint: true,
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Current size of both grids.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        Size {
            cols: self.desired.width(),
            rows: self.desired.height(),
        }
    }

    /// The grid being drawn for the next frame.
    #[inline]
    #[must_use]
    pub const fn desired(&self) -> &Grid {
        &self.desired
    }

    /// The grid as last written to the terminal.
    #[inline]
    #[must_use]
    pub const fn baseline(&self) -> &Grid {
        &self.baseline
    }

    /// Whether the next flush will repaint every cell.
    #[inline]
    #[must_use]
    pub const fn needs_full_repaint(&self) -> bool {
        self.force_repaint
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    /// Match the session to a new terminal size.
    ///
    /// On a real change the baseline is recreated and a full repaint is
    /// scheduled; `desired` keeps its overlapping top-left content. The same
    /// size is a no-op. Returns whether the size changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`](crate::Error::Alloc) if a grid cannot be
    /// allocated. Both grids keep their previous size in that case.
    pub fn resize_to(&mut self, width: u16, height: u16) -> Result<bool> {
        if width == self.desired.width() && height == self.desired.height() {
            return Ok(false);
        }

        let baseline = Grid::new(width, height, Cell::DEFAULT)?;
        self.desired.resize(width, height, Cell::DEFAULT)?;
        self.baseline = baseline;
        self.force_repaint = true;

        debug!("render session resized to {width}x{height}");
        Ok(true)
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Mutable access to a cell of the desired grid.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn cell_at(&mut self, x: u16, y: u16) -> &mut Cell {
        self.desired.cell_at(x, y)
    }

    /// Write one cell of the desired grid. No output until [`flush`](Self::flush).
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        self.desired.set(x, y, cell);
    }

    /// Write `text` into row `y` from column `x`, clipped at the right edge.
    ///
    /// See [`Grid::put_str`]. Returns the number of cells written.
    #[track_caller]
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, fg: Fg, bg: Bg) -> u16 {
        self.desired.put_str(x, y, text, fg, bg)
    }

    /// Reset the desired grid to `fill`.
    pub fn clear(&mut self, fill: Cell) {
        self.desired.clear(fill);
    }

    /// Reset the desired grid to [`Cell::DEFAULT`].
    pub fn clear_default(&mut self) {
        self.desired.clear(Cell::DEFAULT);
    }

    /// Repaint every cell on the next flush, e.g. after the screen was
    /// disturbed by another program.
    pub const fn force_redraw(&mut self) {
        self.force_repaint = true;
    }

    // ─── Flush ───────────────────────────────────────────────────────────

    /// Diff desired against baseline and write the changes to `out`.
    ///
    /// After this returns `Ok`, the baseline equals the desired grid cell for
    /// cell. When a cell was written, the cursor is finally parked on the
    /// bottom-right cell and `out` is flushed. When nothing changed, `out` is
    /// not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails. The next flush then
    /// repaints everything, since the terminal state is unknown.
    pub fn flush_to(&mut self, out: &mut impl Write) -> io::Result<FlushStats> {
        self.output.clear();
        self.writer.reset_state();

        let width = self.desired.width();
        let height = self.desired.height();
        let mut stats = FlushStats::default();

        if width == 0 || height == 0 {
            self.force_repaint = false;
            return Ok(stats);
        }

        let full = self.force_repaint;
        let w = usize::from(width);
        let rows = self
            .desired
            .cells()
            .chunks_exact(w)
            .zip(self.baseline.cells_mut().chunks_exact_mut(w));

        for (y, (want_row, have_row)) in (0..height).zip(rows) {
            if !full && want_row == &*have_row {
                stats.cells_skipped += w;
                continue;
            }

            for (x, (want, have)) in (0..width).zip(want_row.iter().zip(have_row.iter_mut())) {
                if full || want != have {
                    self.writer.render_cell(&mut self.output, x, y, want);
                    *have = *want;
                    stats.cells_rendered += 1;
                } else {
                    stats.cells_skipped += 1;
                }
            }
        }

        if stats.cells_rendered > 0 {
            self.writer.move_to(&mut self.output, width - 1, height - 1);
        }

        stats.bytes_written = self.output.len();
        if let Err(e) = self.output.flush_to(out) {
            self.force_repaint = true;
            return Err(e);
        }
        self.force_repaint = false;

        trace!(
            "flush: {} rendered, {} skipped, {} bytes",
            stats.cells_rendered,
            stats.cells_skipped,
            stats.bytes_written
        );
        Ok(stats)
    }

    /// Diff and write the changes to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<FlushStats> {
        self.flush_to(&mut io::stdout().lock())
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("desired", &self.desired)
            .field("baseline", &self.baseline)
            .field("force_repaint", &self.force_repaint)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
