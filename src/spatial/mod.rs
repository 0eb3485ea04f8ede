/// Grid dimensions, cell indexing, and cardinal directions
pub mod grid;

pub use grid::{Direction, GridDims};
