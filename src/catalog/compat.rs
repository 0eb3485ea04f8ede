//! Pairwise edge-compatibility table
//!
//! For every ordered pair of variants and every direction, records whether
//! the second may sit on that side of the first. Rows are variant bitsets
//! so the propagator can union them directly into its scratch masks.

use crate::algorithm::bitset::VariantMask;
use crate::catalog::variants::Variant;
use crate::spatial::Direction;

/// 4-way table of allowed-neighbor bitsets indexed by (direction, variant)
#[derive(Clone, Debug)]
pub struct CompatibilityTable {
    rows: [Vec<VariantMask>; Direction::COUNT],
    variant_count: usize,
}

impl CompatibilityTable {
    /// Build the table from the ordered variant list
    ///
    /// Quadratic in the variant count, which stays small relative to the
    /// grid; the result is immutable for the life of the engine.
    pub fn build(variants: &[Variant]) -> Self {
        let variant_count = variants.len();
        let mut rows: [Vec<VariantMask>; Direction::COUNT] =
            std::array::from_fn(|_| Vec::with_capacity(variant_count));

        for direction in Direction::ALL {
            let row = &mut rows[direction.index()];
            for anchor in variants {
                let mut mask = VariantMask::empty(variant_count);
                for (candidate_index, candidate) in variants.iter().enumerate() {
                    if anchor.fits(direction, candidate) {
                        mask.insert(candidate_index);
                    }
                }
                row.push(mask);
            }
        }

        Self {
            rows,
            variant_count,
        }
    }

    /// Variants allowed on the `direction` side of variant `anchor`
    ///
    /// # Panics
    ///
    /// Panics if `anchor` is out of range; callers index with bits drawn
    /// from domains sized to this table.
    pub fn allowed(&self, direction: Direction, anchor: usize) -> &VariantMask {
        &self.rows[direction.index()][anchor]
    }

    /// Number of variants the table was built over
    pub const fn variant_count(&self) -> usize {
        self.variant_count
    }

    /// Whether `candidate` may sit on the `direction` side of `anchor`
    pub fn check(&self, direction: Direction, anchor: usize, candidate: usize) -> bool {
        self.rows
            .get(direction.index())
            .and_then(|row| row.get(anchor))
            .is_some_and(|mask| mask.contains(candidate))
    }
}
