//! Arc-consistency drain over the propagation queue
//!
//! Each popped cell unions the compatibility rows of its surviving
//! variants into four preallocated direction masks, then intersects those
//! masks into its neighbors. A neighbor tile outside the union cannot be
//! paired with any remaining occupant of the popped cell, so removing it
//! is exactly AC-3 specialized to the four-direction grid. Version
//! counters skip pops that carry no new information, which is what keeps
//! dense runs from going quadratic.

use crate::algorithm::bitset::{DomainGrid, VariantMask};
use crate::algorithm::executor::Event;
use crate::algorithm::queue::PropagationQueue;
use crate::catalog::compat::CompatibilityTable;
use crate::io::configuration::PROGRESS_PROPAGATION_INTERVAL;
use crate::spatial::{Direction, GridDims};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Result of draining the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Queue emptied with every cell non-empty
    Completed,
    /// A neighbor's domain was emptied
    Contradiction {
        /// Cell whose domain became empty
        cell: usize,
    },
}

/// Advisory snapshot of a step's propagation work
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Cells processed since the step began
    pub propagations: u64,
    /// Wall time since the step began
    pub elapsed: Duration,
    /// Total variant options removed from domains
    pub eliminated: u64,
    /// Distinct cells whose domains shrank
    pub cells_touched: usize,
    /// Largest popcount drop observed in a single cell
    pub max_entropy_drop: usize,
}

/// Accumulated propagation bookkeeping for one step call
#[derive(Clone, Debug)]
pub struct DrainDiagnostics {
    /// Cells processed since the last reset
    pub propagations: u64,
    /// Options eliminated since the last reset
    pub eliminated: u64,
    /// Largest single-cell popcount drop since the last reset
    pub max_entropy_drop: usize,
    touched: BitVec,
    touched_count: usize,
}

impl DrainDiagnostics {
    /// Create diagnostics over `cells` cell indices
    pub fn new(cells: usize) -> Self {
        Self {
            propagations: 0,
            eliminated: 0,
            max_entropy_drop: 0,
            touched: bitvec![0; cells],
            touched_count: 0,
        }
    }

    /// Zero all counters at the start of a step
    pub fn reset(&mut self) {
        self.propagations = 0;
        self.eliminated = 0;
        self.max_entropy_drop = 0;
        self.touched.fill(false);
        self.touched_count = 0;
    }

    /// Distinct cells whose domains shrank since the last reset
    pub const fn cells_touched(&self) -> usize {
        self.touched_count
    }

    fn record_shrink(&mut self, cell: usize, before: usize, after: usize) {
        self.eliminated += (before - after) as u64;
        if before - after > self.max_entropy_drop {
            self.max_entropy_drop = before - after;
        }
        if self.touched.get(cell).as_deref() != Some(&true) {
            self.touched.set(cell, true);
            self.touched_count += 1;
        }
    }

    /// Snapshot for a progress event
    pub fn report(&self, elapsed: Duration) -> ProgressReport {
        ProgressReport {
            propagations: self.propagations,
            elapsed,
            eliminated: self.eliminated,
            cells_touched: self.touched_count,
            max_entropy_drop: self.max_entropy_drop,
        }
    }
}

/// Queue, version counters, and scratch for the arc-consistency drain
#[derive(Clone, Debug)]
pub struct Propagator {
    queue: PropagationQueue,
    dom_ver: Vec<u32>,
    prop_ver: Vec<u32>,
    allowed: [VariantMask; Direction::COUNT],
}

impl Propagator {
    /// Create a propagator with preallocated scratch
    pub fn new(cells: usize, variant_count: usize) -> Self {
        Self {
            queue: PropagationQueue::new(cells),
            dom_ver: vec![0; cells],
            prop_ver: vec![0; cells],
            allowed: std::array::from_fn(|_| VariantMask::empty(variant_count)),
        }
    }

    /// Clear the queue and zero both version arrays
    pub fn reset(&mut self) {
        self.queue.clear();
        self.dom_ver.fill(0);
        self.prop_ver.fill(0);
    }

    /// Record that a cell's domain shrank and enqueue it (deduped)
    pub fn mark_changed(&mut self, cell: usize) {
        if let Some(version) = self.dom_ver.get_mut(cell) {
            *version += 1;
        }
        self.queue.push(cell);
    }

    /// Number of cells currently queued
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Drain the queue until empty or a contradiction
    ///
    /// Appends an advisory progress event every few thousand pops so hosts
    /// can observe long drains; the drain itself never allocates.
    pub fn drain(
        &mut self,
        domains: &mut DomainGrid,
        compat: &CompatibilityTable,
        dims: GridDims,
        diag: &mut DrainDiagnostics,
        events: &mut Vec<Event>,
        started: Instant,
    ) -> DrainOutcome {
        while let Some(cell) = self.queue.pop() {
            let domain_version = self.dom_ver.get(cell).copied().unwrap_or(0);
            if self.prop_ver.get(cell).copied() == Some(domain_version) {
                continue;
            }
            if let Some(version) = self.prop_ver.get_mut(cell) {
                *version = domain_version;
            }
            diag.propagations += 1;

            for mask in &mut self.allowed {
                mask.clear();
            }
            // One pass over the surviving bits feeds all four direction masks
            for variant in domains.iter_variants(cell) {
                for direction in Direction::ALL {
                    if let Some(mask) = self.allowed.get_mut(direction.index()) {
                        mask.union_with(compat.allowed(direction, variant));
                    }
                }
            }

            for direction in Direction::ALL {
                let Some(neighbor) = dims.neighbor(cell, direction) else {
                    continue;
                };
                let Some(mask) = self.allowed.get(direction.index()) else {
                    continue;
                };
                let outcome = domains.intersect(neighbor, mask);
                if !outcome.changed {
                    continue;
                }
                diag.record_shrink(neighbor, outcome.before, outcome.after);
                if outcome.after == 0 {
                    return DrainOutcome::Contradiction { cell: neighbor };
                }
                if let Some(version) = self.dom_ver.get_mut(neighbor) {
                    *version += 1;
                }
                self.queue.push(neighbor);
            }

            if diag.propagations % PROGRESS_PROPAGATION_INTERVAL == 0 {
                events.push(Event::Progress(diag.report(started.elapsed())));
            }
        }

        DrainOutcome::Completed
    }
}
