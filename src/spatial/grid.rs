//! Grid coordinate conventions and neighbor arithmetic
//!
//! Cells are indexed row-major (`cell = y * width + x`) and directions follow
//! the catalog edge order N, E, S, W. Edge lists, compatibility rows, and
//! propagation scratch all index by this order.

use serde::{Deserialize, Serialize};

/// Cardinal directions in catalog edge order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Negative y
    North = 0,
    /// Positive x
    East = 1,
    /// Positive y
    South = 2,
    /// Negative x
    West = 3,
}

impl Direction {
    /// Number of directions on a square grid
    pub const COUNT: usize = 4;

    /// All directions in index order
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Numeric index used for edge lists and compatibility rows
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The direction pointing back across the same border
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Grid offset (dx, dy) for one step in this direction
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Lowercase side label matching the persisted catalog format
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::East => "e",
            Self::South => "s",
            Self::West => "w",
        }
    }
}

/// Rectangular grid dimensions with row-major cell indexing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDims {
    width: usize,
    height: usize,
}

impl GridDims {
    /// Create grid dimensions
    ///
    /// Validation (non-zero sides, maximum dimension) is the engine's
    /// responsibility at construction time.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Grid width in cells
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total cell count
    pub const fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Row-major index of the cell at (x, y)
    pub const fn cell_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// (x, y) coordinates of a cell index
    pub const fn coords(&self, cell: usize) -> (usize, usize) {
        (cell % self.width, cell / self.width)
    }

    /// Neighbor of a cell in the given direction, or `None` off-grid
    pub fn neighbor(&self, cell: usize, direction: Direction) -> Option<usize> {
        let (x, y) = self.coords(cell);
        let (dx, dy) = direction.offset();
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some(self.cell_index(nx as usize, ny as usize))
    }
}
