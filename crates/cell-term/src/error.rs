// SPDX-License-Identifier: MIT
//
// Error types.
//
// Two kinds of failure exist in this crate. Recoverable ones (I/O against
// the terminal, failing to allocate a grid) are returned as `Error`. Geometry
// violations are programming errors in the caller's drawing code and are
// fatal: they panic with an `OutOfBounds` message after the terminal has been
// restored by the panic hook.

use std::io;

use thiserror::Error;

/// Errors returned by grid, session, and terminal operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing buffer for a `width × height` grid could not be obtained.
    #[error("cannot allocate a {width}x{height} cell grid")]
    Alloc { width: u16, height: u16 },
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Diagnostic for a cell access outside the grid.
///
/// Carried as the panic message of every fatal accessor so the offending
/// coordinates and the grid's actual bounds are visible in the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cell ({x}, {y}) is out of bounds for a {width}x{height} grid")]
pub struct OutOfBounds {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn alloc_error_names_dimensions() {
        let err = Error::Alloc {
            width: 300,
            height: 200,
        };
        assert_eq!(err.to_string(), "cannot allocate a 300x200 cell grid");
    }

    #[test]
    fn out_of_bounds_names_point_and_bounds() {
        let oob = OutOfBounds {
            x: 12,
            y: 3,
            width: 10,
            height: 5,
        };
        assert_eq!(
            oob.to_string(),
            "cell (12, 3) is out of bounds for a 10x5 grid"
        );
    }
}
