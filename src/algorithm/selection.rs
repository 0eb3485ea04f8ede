//! Minimum-entropy cell selection and weighted variant choice
//!
//! Entropy is the domain popcount; the scan starts at a random offset so
//! ties break differently per seed, and exits early on a count of two
//! since nothing can beat it. The variant draw biases toward tiles whose
//! edge rules agree with already-collapsed neighbors.

use crate::algorithm::bitset::DomainGrid;
use crate::algorithm::rng::Mulberry32;
use crate::catalog::variants::Variant;
use crate::spatial::{Direction, GridDims};
use bitvec::prelude::*;

/// Preallocated buffers for the weighted draw
#[derive(Clone, Debug, Default)]
pub struct SelectionScratch {
    candidates: Vec<usize>,
    scores: Vec<f64>,
}

impl SelectionScratch {
    /// Create scratch sized for the variant count
    pub fn new(variant_count: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(variant_count),
            scores: Vec::with_capacity(variant_count),
        }
    }
}

/// Find the unsettled cell with the smallest domain
///
/// Scans all cells from a random start offset (one PRNG draw), skipping
/// cells already settled by an explicit collapse. Ties break first-seen
/// from the start offset, and the scan exits early at a count of two or
/// below since nothing left can beat it. Returns `None` when every cell
/// is settled, meaning generation is complete.
///
/// A cell whose domain was driven to one variant by propagation alone is
/// still selectable: it gets its own collapse event (a no-op restriction)
/// so hosts that accumulate the event stream see every cell exactly once.
pub fn find_min_entropy_cell(
    domains: &DomainGrid,
    settled: &BitSlice,
    rng: &mut Mulberry32,
) -> Option<usize> {
    let cells = domains.cells();
    if cells == 0 {
        return None;
    }
    let start = rng.below(cells as u32) as usize;

    let mut best: Option<(usize, usize)> = None;
    for offset in 0..cells {
        let cell = (start + offset) % cells;
        if settled.get(cell).as_deref() == Some(&true) {
            continue;
        }
        let count = domains.popcount(cell);
        let beats = best.is_none_or(|(_, best_count)| count < best_count);
        if beats {
            best = Some((cell, count));
        }
        if count <= 2 {
            break;
        }
    }

    best.map(|(cell, _)| cell)
}

/// Pick a variant from a cell's domain by weighted sampling
///
/// Each candidate's base weight is multiplied, per collapsed neighbor, by
/// one plus the summed agreement between the candidate's facing rules and
/// the neighbor's opposite side. A vanishing total falls back to a uniform
/// draw; either path consumes exactly one PRNG draw.
pub fn pick_weighted_variant(
    domains: &DomainGrid,
    dims: GridDims,
    cell: usize,
    variants: &[Variant],
    scratch: &mut SelectionScratch,
    rng: &mut Mulberry32,
) -> Option<usize> {
    scratch.candidates.clear();
    scratch.scores.clear();
    scratch.candidates.extend(domains.iter_variants(cell));
    if scratch.candidates.is_empty() {
        return None;
    }

    let mut total = 0.0;
    for &candidate_index in &scratch.candidates {
        let Some(candidate) = variants.get(candidate_index) else {
            scratch.scores.push(0.0);
            continue;
        };
        let mut score = candidate.weight.max(0.0);
        for direction in Direction::ALL {
            let Some(neighbor) = dims.neighbor(cell, direction) else {
                continue;
            };
            let Some(fixed) = domains.sole_variant(neighbor) else {
                continue;
            };
            let Some(neighbor_variant) = variants.get(fixed) else {
                continue;
            };
            let mut agreement = 0.0;
            for rule in &candidate.sides[direction.index()] {
                agreement +=
                    rule.weight * neighbor_variant.key_weight(direction.opposite(), &rule.key);
            }
            score *= 1.0 + agreement;
        }
        scratch.scores.push(score);
        total += score;
    }

    if total <= 0.0 {
        let index = rng.below(scratch.candidates.len() as u32) as usize;
        return scratch.candidates.get(index).copied();
    }

    let mut draw = rng.next_f64() * total;
    for (candidate, score) in scratch.candidates.iter().zip(&scratch.scores) {
        draw -= score;
        if draw <= 0.0 {
            return Some(*candidate);
        }
    }
    scratch.candidates.last().copied()
}
