//! Macro continent seeding
//!
//! Before the main loop (and again after every restart) a few random
//! disk-shaped regions are intersected with precomputed bias masks so the
//! finished map grows large coherent areas instead of uniform noise. The
//! intersect is the non-emptying variant: a cell that would lose its last
//! option is left alone, so seeding can never cause a contradiction.

use crate::algorithm::bitset::{DomainGrid, VariantMask};
use crate::algorithm::propagation::Propagator;
use crate::algorithm::rng::Mulberry32;
use crate::catalog::variants::Variant;
use crate::io::configuration::{
    CORE_RADIUS_FACTOR, DEFAULT_CONTINENTS, DEFAULT_CORE_MIN_MARKS, DEFAULT_RADIUS_MAX,
    DEFAULT_RADIUS_MIN, DEFAULT_RIM_MIN_MARKS, MACRO_MARK,
};
use crate::spatial::GridDims;
use serde::{Deserialize, Serialize};

/// Configuration for the macro seeding pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacroSeedConfig {
    /// Number of disk regions to carve
    pub continents: usize,
    /// Minimum disk radius as a fraction of min(width, height)
    pub radius_min: f64,
    /// Maximum disk radius as a fraction of min(width, height)
    pub radius_max: f64,
    /// Mark count a variant's base id needs to qualify for the core mask
    pub core_min_marks: usize,
    /// Mark count a variant's base id needs to qualify for the rim mask
    pub rim_min_marks: usize,
    /// The designated character counted in base identifiers
    pub mark: char,
}

impl Default for MacroSeedConfig {
    fn default() -> Self {
        Self {
            continents: DEFAULT_CONTINENTS,
            radius_min: DEFAULT_RADIUS_MIN,
            radius_max: DEFAULT_RADIUS_MAX,
            core_min_marks: DEFAULT_CORE_MIN_MARKS,
            rim_min_marks: DEFAULT_RIM_MIN_MARKS,
            mark: MACRO_MARK,
        }
    }
}

/// Bias mask over variants whose base id carries at least `min_marks`
/// occurrences of the mark character
pub fn bias_mask(variants: &[Variant], mark: char, min_marks: usize) -> VariantMask {
    let mut mask = VariantMask::empty(variants.len());
    for (index, variant) in variants.iter().enumerate() {
        let marks = variant.tile_id.chars().filter(|ch| *ch == mark).count();
        if marks >= min_marks {
            mask.insert(index);
        }
    }
    mask
}

/// Precomputed masks plus the disk-carving pass
#[derive(Clone, Debug)]
pub struct MacroSeeder {
    config: MacroSeedConfig,
    core: VariantMask,
    rim: VariantMask,
}

impl MacroSeeder {
    /// Precompute the strict (core) and loose (rim) masks
    pub fn new(variants: &[Variant], config: MacroSeedConfig) -> Self {
        let core = bias_mask(variants, config.mark, config.core_min_marks);
        let rim = bias_mask(variants, config.mark, config.rim_min_marks);
        Self { config, core, rim }
    }

    /// The strict core mask
    pub const fn core_mask(&self) -> &VariantMask {
        &self.core
    }

    /// The loose rim mask
    pub const fn rim_mask(&self) -> &VariantMask {
        &self.rim
    }

    // A full mask cannot clear bits and an empty one always aborts the
    // non-emptying intersect, so a pass with two such masks must not
    // consume PRNG draws: the stream has to match a disabled seeder.
    fn is_inert(&self) -> bool {
        let core_inert = self.core.is_empty() || self.core.is_full();
        let rim_inert = self.rim.is_empty() || self.rim.is_full();
        core_inert && rim_inert
    }

    /// Carve the configured continents into the domain grid
    ///
    /// Changed cells are marked for propagation; cells whose intersection
    /// would be empty are left untouched. Returns how many cells the pass
    /// changed.
    pub fn apply(
        &self,
        domains: &mut DomainGrid,
        propagator: &mut Propagator,
        dims: GridDims,
        rng: &mut Mulberry32,
    ) -> usize {
        if self.is_inert() || dims.cells() == 0 {
            return 0;
        }

        let span = dims.width().min(dims.height()) as f64;
        let mut changed_cells = 0;

        for _ in 0..self.config.continents {
            let center_x = rng.below(dims.width() as u32) as i64;
            let center_y = rng.below(dims.height() as u32) as i64;
            let radius = rng.range(self.config.radius_min * span, self.config.radius_max * span);
            let core_radius = (radius * CORE_RADIUS_FACTOR).floor();

            let reach = radius.ceil() as i64;
            let min_x = (center_x - reach).max(0);
            let max_x = (center_x + reach).min(dims.width() as i64 - 1);
            let min_y = (center_y - reach).max(0);
            let max_y = (center_y + reach).min(dims.height() as i64 - 1);

            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let dx = (x - center_x) as f64;
                    let dy = (y - center_y) as f64;
                    let dist_sq = dx * dx + dy * dy;
                    if dist_sq > radius * radius {
                        continue;
                    }
                    let mask = if dist_sq <= core_radius * core_radius && !self.core.is_empty() {
                        &self.core
                    } else {
                        &self.rim
                    };
                    let cell = dims.cell_index(x as usize, y as usize);
                    let outcome = domains.intersect_if_nonempty(cell, mask);
                    if outcome.changed {
                        changed_cells += 1;
                        propagator.mark_changed(cell);
                    }
                }
            }
        }

        changed_cells
    }
}
