//! Grid geometry for quantizing placement sizes into widget footprints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel size of one grid cell (matches the visual canvas grid).
pub const GRID_CELL: f64 = 20.0;

/// Smallest footprint ever offered, in cells per axis. No real widget
/// needs less, so sizing below this is clamped rather than rejected.
pub const MIN_GRID: u32 = 3;

/// A widget footprint expressed in grid columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub cols: u32,
    pub rows: u32,
}

impl Footprint {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// Component-wise containment check: does this footprint fit inside `other`?
    pub fn fits_within(self, other: Footprint) -> bool {
        self.cols <= other.cols && self.rows <= other.rows
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// Convert a pixel rectangle into grid columns/rows, flooring at [`MIN_GRID`].
///
/// Callers clamp their inputs to finite non-negative values; negative or
/// degenerate inputs still produce the minimum footprint rather than panic.
pub fn grid_cells_for(width: f64, height: f64, cell: f64) -> Footprint {
    if cell <= 0.0 {
        return Footprint::new(MIN_GRID, MIN_GRID);
    }
    let cols = ((width.max(0.0) / cell).ceil() as u32).max(MIN_GRID);
    let rows = ((height.max(0.0) / cell).ceil() as u32).max(MIN_GRID);
    Footprint::new(cols, rows)
}

/// Snap a value to the nearest multiple of the grid cell size.
pub fn snap_to_grid(value: f64, cell: f64) -> f64 {
    if cell <= 0.0 {
        return value;
    }
    (value / cell).round() * cell
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_cells_exact_multiple() {
        let fp = grid_cells_for(140.0, 80.0, GRID_CELL);
        assert_eq!(fp, Footprint::new(7, 4));
    }

    #[test]
    fn test_grid_cells_rounds_up() {
        let fp = grid_cells_for(141.0, 61.0, GRID_CELL);
        assert_eq!(fp, Footprint::new(8, 4));
    }

    #[test]
    fn test_grid_floor() {
        // Anything at or below 2x2 cells clamps to the minimum footprint.
        let fp = grid_cells_for(30.0, 30.0, GRID_CELL);
        assert_eq!(fp, Footprint::new(MIN_GRID, MIN_GRID));

        let fp = grid_cells_for(0.0, 0.0, GRID_CELL);
        assert_eq!(fp, Footprint::new(MIN_GRID, MIN_GRID));

        let fp = grid_cells_for(-10.0, -10.0, GRID_CELL);
        assert_eq!(fp, Footprint::new(MIN_GRID, MIN_GRID));
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(0.0, GRID_CELL), 0.0);
        assert_eq!(snap_to_grid(9.0, GRID_CELL), 0.0);
        assert_eq!(snap_to_grid(11.0, GRID_CELL), 20.0);
        assert_eq!(snap_to_grid(50.0, GRID_CELL), 60.0);
        assert_eq!(snap_to_grid(-29.0, GRID_CELL), -20.0);
    }

    #[test]
    fn test_footprint_fits_within() {
        assert!(Footprint::new(3, 3).fits_within(Footprint::new(7, 4)));
        assert!(Footprint::new(7, 4).fits_within(Footprint::new(7, 4)));
        assert!(!Footprint::new(10, 8).fits_within(Footprint::new(3, 3)));
        assert!(!Footprint::new(4, 5).fits_within(Footprint::new(7, 4)));
    }

    #[test]
    fn test_degenerate_cell_size() {
        assert_eq!(grid_cells_for(100.0, 100.0, 0.0), Footprint::new(MIN_GRID, MIN_GRID));
        assert_eq!(snap_to_grid(37.0, 0.0), 37.0);
    }
}
