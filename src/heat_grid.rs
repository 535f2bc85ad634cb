//! The weighted city-block grid and the search states laid over it.
//!
//! Cells are stored row-major in a flat vector. The origin is the top-left
//! cell `(0, 0)` and the destination is the bottom-right cell.

use std::fmt;

/// Orientation of the move that led into a search state.
///
/// Folding the axis into the state key is what forbids two consecutive runs
/// along the same axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// The axis a run must take after a run along `self`.
    #[inline]
    pub const fn turn(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Layer index used when the state space is drawn in 3D.
    #[inline]
    pub const fn layer(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }
}

/// A search state: a cell plus the axis of the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
    pub axis: Axis,
}

impl Pos {
    pub const fn new(x: usize, y: usize, axis: Axis) -> Self {
        Self { x, y, axis }
    }

    #[inline]
    pub const fn cell(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.axis.layer())
    }
}

/// Immutable grid of per-cell heat loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl HeatGrid {
    /// Builds a grid from equally long rows. Callers validate row lengths.
    pub(crate) fn from_rows(rows: Vec<Vec<u8>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let cells = rows.into_iter().flatten().collect();
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: isize, y: isize) -> bool {
        (0..self.width as isize).contains(&x) && (0..self.height as isize).contains(&y)
    }

    /// Returns the heat loss of a cell, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> Option<u32> {
        if !self.contains(x, y) {
            return None;
        }
        Some(u32::from(self.cells[y as usize * self.width + x as usize]))
    }

    /// The bottom-right cell.
    #[inline]
    pub fn destination(&self) -> (usize, usize) {
        (self.width.saturating_sub(1), self.height.saturating_sub(1))
    }
}

impl fmt::Display for HeatGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_index, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            if row_index > 0 {
                writeln!(f)?;
            }
            for &cell in row {
                write!(f, "{}", char::from(b'0' + cell))?;
            }
        }
        Ok(())
    }
}
