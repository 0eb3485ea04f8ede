//! Deduplicated propagation work queue
//!
//! A stack of cells whose domains have shrunk but whose consequences have
//! not yet been pushed to neighbors, plus a membership bitmap so a cell
//! appears at most once. Popping from the back keeps propagation
//! depth-first, which empirically minimizes re-enqueues.

use bitvec::prelude::*;

/// Stack-backed cell queue with duplicate suppression
#[derive(Clone, Debug)]
pub struct PropagationQueue {
    stack: Vec<u32>,
    in_queue: BitVec,
}

impl PropagationQueue {
    /// Create an empty queue over `cells` cell indices
    pub fn new(cells: usize) -> Self {
        Self {
            stack: Vec::with_capacity(cells.min(1024)),
            in_queue: bitvec![0; cells],
        }
    }

    /// Push a cell unless it is already queued; returns whether it was added
    pub fn push(&mut self, cell: usize) -> bool {
        if self.contains(cell) {
            return false;
        }
        self.in_queue.set(cell, true);
        self.stack.push(cell as u32);
        true
    }

    /// Pop the most recently queued cell and clear its membership flag
    pub fn pop(&mut self) -> Option<usize> {
        let cell = self.stack.pop()? as usize;
        self.in_queue.set(cell, false);
        Some(cell)
    }

    /// Whether a cell is currently queued
    pub fn contains(&self, cell: usize) -> bool {
        self.in_queue.get(cell).as_deref() == Some(&true)
    }

    /// Number of queued cells
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether no cells are queued
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drop all queued cells and membership flags
    pub fn clear(&mut self) {
        self.stack.clear();
        self.in_queue.fill(false);
    }
}
