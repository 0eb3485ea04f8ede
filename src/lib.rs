//! Tile map generation by constraint propagation over a rectangular grid
//!
//! Each cell holds a bitset domain of still-possible tile variants; adjacent
//! cells must share an edge key across their common border. The engine
//! collapses the lowest-entropy cell, propagates the consequences, and
//! restarts on contradiction up to a configurable cap.

#![forbid(unsafe_code)]

/// Core collapse machinery: domains, propagation, selection, and the engine
pub mod algorithm;
/// Tile catalog preparation, compatibility tables, and persisted-JSON ingest
pub mod catalog;
/// Input/output operations, CLI, and error handling
pub mod io;
/// Grid coordinate conventions and neighbor arithmetic
pub mod spatial;
/// Host-facing background worker and message protocol
pub mod worker;

pub use io::error::{GenerationError, Result};
