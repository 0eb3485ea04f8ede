//! Word-packed variant bitsets
//!
//! [`VariantMask`] is a single row over the variant space; [`DomainGrid`]
//! packs one such row per grid cell into a contiguous word array. All hot
//! operations are in-place and report popcount deltas so propagation
//! diagnostics come for free. Bits above the variant count in the last
//! word of a row are permanently zero.

use std::fmt;

/// Bits per storage word
pub const WORD_BITS: usize = 32;

/// Number of words needed for one row over `variant_count` bits
pub const fn words_for(variant_count: usize) -> usize {
    variant_count.div_ceil(WORD_BITS)
}

// Mask of valid bits in the last word of a row; all-ones when the count
// is word-aligned.
const fn tail_mask(variant_count: usize) -> u32 {
    let rem = variant_count % WORD_BITS;
    if rem == 0 {
        u32::MAX
    } else {
        (1u32 << rem) - 1
    }
}

/// Result of an in-place domain mutation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShrinkOutcome {
    /// Whether any bit was cleared
    pub changed: bool,
    /// Popcount before the operation
    pub before: usize,
    /// Popcount after the operation
    pub after: usize,
}

/// Fixed-size bitset over the variant space
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantMask {
    words: Vec<u32>,
    variant_count: usize,
}

impl VariantMask {
    /// Mask with no variants present
    pub fn empty(variant_count: usize) -> Self {
        Self {
            words: vec![0; words_for(variant_count)],
            variant_count,
        }
    }

    /// Mask containing every variant
    pub fn full(variant_count: usize) -> Self {
        let mut mask = Self {
            words: vec![u32::MAX; words_for(variant_count)],
            variant_count,
        };
        if let Some(last) = mask.words.last_mut() {
            *last &= tail_mask(variant_count);
        }
        mask
    }

    /// Insert a variant index; out-of-range indices are ignored
    pub fn insert(&mut self, variant: usize) {
        if variant >= self.variant_count {
            return;
        }
        if let Some(word) = self.words.get_mut(variant / WORD_BITS) {
            *word |= 1 << (variant % WORD_BITS);
        }
    }

    /// Test variant membership
    pub fn contains(&self, variant: usize) -> bool {
        self.words
            .get(variant / WORD_BITS)
            .is_some_and(|word| word & (1 << (variant % WORD_BITS)) != 0)
    }

    /// Count variants in the mask
    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Test if no variants are present
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Whether every variant is present
    pub fn is_full(&self) -> bool {
        self.count() == self.variant_count
    }

    /// Remove every variant
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// In-place union with another mask of the same width
    pub fn union_with(&mut self, other: &Self) {
        for (word, incoming) in self.words.iter_mut().zip(&other.words) {
            *word |= incoming;
        }
    }

    /// In-place intersection with another mask of the same width
    pub fn intersect_with(&mut self, other: &Self) {
        for (word, incoming) in self.words.iter_mut().zip(&other.words) {
            *word &= incoming;
        }
    }

    /// Backing words, low variant indices first
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of bits the mask ranges over
    pub const fn variant_count(&self) -> usize {
        self.variant_count
    }

    /// Iterate set variant indices in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        iter_word_ones(&self.words)
    }
}

impl fmt::Display for VariantMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariantMask({} of {})", self.count(), self.variant_count)
    }
}

fn iter_word_ones(words: &[u32]) -> impl Iterator<Item = usize> + '_ {
    words.iter().enumerate().flat_map(|(word_index, word)| {
        let mut remaining = *word;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let bit = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            Some(word_index * WORD_BITS + bit)
        })
    })
}

/// Per-cell variant domains packed into one contiguous word array
#[derive(Clone, Debug)]
pub struct DomainGrid {
    words: Vec<u32>,
    words_per_cell: usize,
    cells: usize,
    variant_count: usize,
    tail: u32,
}

impl DomainGrid {
    /// Create a grid with every variant possible at every cell
    pub fn new(cells: usize, variant_count: usize) -> Self {
        let words_per_cell = words_for(variant_count);
        let mut grid = Self {
            words: vec![0; cells * words_per_cell],
            words_per_cell,
            cells,
            variant_count,
            tail: tail_mask(variant_count),
        };
        grid.reset_full();
        grid
    }

    /// Refill every cell with the all-ones mask (tail bits stay zero)
    pub fn reset_full(&mut self) {
        self.words.fill(u32::MAX);
        if self.words_per_cell == 0 {
            return;
        }
        for cell in 0..self.cells {
            let last = (cell + 1) * self.words_per_cell - 1;
            if let Some(word) = self.words.get_mut(last) {
                *word &= self.tail;
            }
        }
    }

    /// Number of cells
    pub const fn cells(&self) -> usize {
        self.cells
    }

    /// Number of variants each domain ranges over
    pub const fn variant_count(&self) -> usize {
        self.variant_count
    }

    /// Words per cell row
    pub const fn words_per_cell(&self) -> usize {
        self.words_per_cell
    }

    /// Backing words of one cell's domain
    pub fn cell_words(&self, cell: usize) -> &[u32] {
        let start = cell * self.words_per_cell;
        self.words
            .get(start..start + self.words_per_cell)
            .unwrap_or(&[])
    }

    fn cell_words_mut(&mut self, cell: usize) -> &mut [u32] {
        let start = cell * self.words_per_cell;
        self.words
            .get_mut(start..start + self.words_per_cell)
            .unwrap_or(&mut [])
    }

    /// Popcount of one cell's domain
    pub fn popcount(&self, cell: usize) -> usize {
        self.cell_words(cell)
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    /// Whether a cell's domain is empty
    pub fn is_empty(&self, cell: usize) -> bool {
        self.cell_words(cell).iter().all(|word| *word == 0)
    }

    /// Whether a variant is still possible at a cell
    pub fn contains(&self, cell: usize, variant: usize) -> bool {
        self.cell_words(cell)
            .get(variant / WORD_BITS)
            .is_some_and(|word| word & (1 << (variant % WORD_BITS)) != 0)
    }

    /// The single surviving variant of a collapsed cell, if collapsed
    pub fn sole_variant(&self, cell: usize) -> Option<usize> {
        let mut found = None;
        for (word_index, word) in self.cell_words(cell).iter().enumerate() {
            match word.count_ones() {
                0 => {}
                1 if found.is_none() => {
                    found = Some(word_index * WORD_BITS + word.trailing_zeros() as usize);
                }
                _ => return None,
            }
        }
        found
    }

    /// Iterate the surviving variants of one cell in ascending order
    pub fn iter_variants(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        iter_word_ones(self.cell_words(cell))
    }

    /// Write zeros everywhere except the chosen variant's bit
    ///
    /// The variant must be in the cell's current domain; collapsing to a
    /// vacant bit would empty the cell.
    pub fn restrict_to(&mut self, cell: usize, variant: usize) -> ShrinkOutcome {
        debug_assert!(self.contains(cell, variant));
        let before = self.popcount(cell);
        let keep_word = variant / WORD_BITS;
        let keep_bit = 1u32 << (variant % WORD_BITS);
        let mut after = 0usize;
        for (word_index, word) in self.cell_words_mut(cell).iter_mut().enumerate() {
            if word_index == keep_word {
                *word &= keep_bit;
            } else {
                *word = 0;
            }
            after += word.count_ones() as usize;
        }
        ShrinkOutcome {
            changed: after != before,
            before,
            after,
        }
    }

    /// In-place AND of a cell's domain with a mask
    pub fn intersect(&mut self, cell: usize, mask: &VariantMask) -> ShrinkOutcome {
        let mut before = 0usize;
        let mut after = 0usize;
        for (word, keep) in self.cell_words_mut(cell).iter_mut().zip(mask.words()) {
            before += word.count_ones() as usize;
            *word &= keep;
            after += word.count_ones() as usize;
        }
        ShrinkOutcome {
            changed: after != before,
            before,
            after,
        }
    }

    /// AND that previews the result and aborts without mutating when the
    /// intersection would empty the cell
    pub fn intersect_if_nonempty(&mut self, cell: usize, mask: &VariantMask) -> ShrinkOutcome {
        let mut before = 0usize;
        let mut after = 0usize;
        for (word, keep) in self.cell_words(cell).iter().zip(mask.words()) {
            before += word.count_ones() as usize;
            after += (word & keep).count_ones() as usize;
        }
        if after == 0 {
            return ShrinkOutcome {
                changed: false,
                before,
                after: before,
            };
        }
        for (word, keep) in self.cell_words_mut(cell).iter_mut().zip(mask.words()) {
            *word &= keep;
        }
        ShrinkOutcome {
            changed: after != before,
            before,
            after,
        }
    }
}
