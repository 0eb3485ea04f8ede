//! Generation engine: construction, the budgeted step loop, and restarts
//!
//! The engine owns every mutable array exclusively and performs no
//! allocation on the step path: the event buffer, the propagation scratch,
//! and the selection buffers are all created at construction. Hosts drive
//! it in short `step` bursts and observe the returned event slice.

use crate::algorithm::bitset::DomainGrid;
use crate::algorithm::propagation::{
    DrainDiagnostics, DrainOutcome, ProgressReport, Propagator,
};
use crate::algorithm::rng::Mulberry32;
use crate::algorithm::seeding::{MacroSeedConfig, MacroSeeder};
use crate::algorithm::selection::{find_min_entropy_cell, pick_weighted_variant, SelectionScratch};
use crate::catalog::compat::CompatibilityTable;
use crate::catalog::tiles::{normalize_tiles, TileDef};
use crate::catalog::variants::{expand_variants, Variant};
use crate::io::configuration::{DEFAULT_MAX_RESTARTS, DEFAULT_SEED, MAX_GRID_DIMENSION};
use crate::io::error::{invalid_parameter, GenerationError, Result};
use crate::spatial::GridDims;
use bitvec::prelude::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Engine construction options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// PRNG seed; the whole generation is a pure function of this
    pub seed: u32,
    /// Contradictions tolerated before the session fails terminally
    pub max_restarts: u32,
    /// Whether to expand 90° rotation variants at catalog preparation
    pub allow_rotate: bool,
    /// Macro continent seeding; `None` disables the pass
    pub macro_seeds: Option<MacroSeedConfig>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_restarts: DEFAULT_MAX_RESTARTS,
            allow_rotate: false,
            macro_seeds: None,
        }
    }
}

/// One entry of the step event stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A cell was restricted to a single variant; emitted before the
    /// propagation drain it triggers
    Collapse {
        /// Row-major cell index
        cell: usize,
        /// Chosen variant index
        variant: usize,
    },
    /// A contradiction reset the grid; collapses emitted earlier in the
    /// same step call are logically invalid
    Restart {
        /// Contradictions encountered so far this session
        attempt: u32,
    },
    /// Advisory drain diagnostics; may be throttled or dropped by hosts
    Progress(ProgressReport),
    /// Every cell holds exactly one variant; terminal
    Done,
    /// The restart cap was exceeded; terminal
    Error {
        /// Human-readable failure description
        message: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Terminal {
    Done,
    Failed,
}

/// Constraint-propagation generation engine over a fixed grid
pub struct Engine {
    variants: Vec<Variant>,
    compat: CompatibilityTable,
    dims: GridDims,
    domains: DomainGrid,
    propagator: Propagator,
    diag: DrainDiagnostics,
    seeder: Option<MacroSeeder>,
    rng: Mulberry32,
    scratch: SelectionScratch,
    events: Vec<Event>,
    // A cell is settled once the collapser has explicitly pinned it;
    // propagation can shrink a domain to one variant without settling it,
    // so every cell still receives exactly one collapse event.
    settled: BitVec,
    max_restarts: u32,
    attempt: u32,
    collapsed: usize,
    terminal: Option<Terminal>,
}

impl Engine {
    /// Build an engine from base tiles and options
    ///
    /// The catalog and compatibility table are immutable afterwards; all
    /// mutable state is initialized here and on every restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is degenerate or oversized, or if the
    /// catalog yields no variants. No partial state is left behind.
    pub fn new(
        tiles: Vec<TileDef>,
        width: usize,
        height: usize,
        options: EngineOptions,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(invalid_parameter(
                "grid",
                &format!("{width}x{height}"),
                &"both grid dimensions must be at least 1",
            ));
        }
        if width > MAX_GRID_DIMENSION || height > MAX_GRID_DIMENSION {
            return Err(invalid_parameter(
                "grid",
                &format!("{width}x{height}"),
                &format!("grid dimensions are capped at {MAX_GRID_DIMENSION}"),
            ));
        }

        let variants = expand_variants(&normalize_tiles(tiles), options.allow_rotate);
        if variants.is_empty() {
            return Err(GenerationError::InvalidCatalog {
                reason: "catalog produced no variants".to_string(),
            });
        }

        let dims = GridDims::new(width, height);
        let compat = CompatibilityTable::build(&variants);
        let domains = DomainGrid::new(dims.cells(), variants.len());
        let propagator = Propagator::new(dims.cells(), variants.len());
        let diag = DrainDiagnostics::new(dims.cells());
        let scratch = SelectionScratch::new(variants.len());
        let seeder = options
            .macro_seeds
            .map(|config| MacroSeeder::new(&variants, config));
        let rng = Mulberry32::new(options.seed);

        let mut engine = Self {
            variants,
            compat,
            dims,
            domains,
            propagator,
            diag,
            seeder,
            rng,
            scratch,
            events: Vec::new(),
            settled: bitvec![0; dims.cells()],
            max_restarts: options.max_restarts,
            attempt: 0,
            collapsed: 0,
            terminal: None,
        };
        engine.apply_seeds();
        Ok(engine)
    }

    /// Run one budgeted burst: drain, then up to `max_collapses` collapses
    ///
    /// Events are returned in occurrence order; a `Restart` invalidates
    /// the collapses emitted before it in the same call. After a terminal
    /// event the engine is inert: further calls return an empty slice and
    /// mutate nothing.
    pub fn step(&mut self, max_collapses: usize) -> &[Event] {
        self.events.clear();
        if self.terminal.is_some() {
            return &self.events;
        }

        self.diag.reset();
        let started = Instant::now();

        if !self.drain_until_stable(started) {
            return &self.events;
        }

        for _ in 0..max_collapses {
            let Some(cell) = find_min_entropy_cell(&self.domains, &self.settled, &mut self.rng)
            else {
                self.terminal = Some(Terminal::Done);
                self.events.push(Event::Done);
                break;
            };
            let Some(variant) = pick_weighted_variant(
                &self.domains,
                self.dims,
                cell,
                &self.variants,
                &mut self.scratch,
                &mut self.rng,
            ) else {
                break;
            };

            self.domains.restrict_to(cell, variant);
            self.settled.set(cell, true);
            self.collapsed += 1;
            self.propagator.mark_changed(cell);
            self.events.push(Event::Collapse { cell, variant });

            if !self.drain_until_stable(started) {
                break;
            }
        }

        // Completion can land exactly on the budget boundary; report it in
        // the same call rather than making the host pay one empty step.
        if self.terminal.is_none() && self.remaining() == 0 {
            self.terminal = Some(Terminal::Done);
            self.events.push(Event::Done);
        }

        &self.events
    }

    // Drain the queue, absorbing restarts until the state is stable.
    // Returns false when the restart cap made the session terminal.
    fn drain_until_stable(&mut self, started: Instant) -> bool {
        loop {
            let outcome = self.propagator.drain(
                &mut self.domains,
                &self.compat,
                self.dims,
                &mut self.diag,
                &mut self.events,
                started,
            );
            match outcome {
                DrainOutcome::Completed => return true,
                DrainOutcome::Contradiction { .. } => {
                    self.attempt += 1;
                    if self.attempt > self.max_restarts {
                        self.terminal = Some(Terminal::Failed);
                        self.events.push(Event::Error {
                            message: format!(
                                "unresolvable contradiction after {} restarts.",
                                self.max_restarts
                            ),
                        });
                        return false;
                    }
                    self.reset_attempt();
                    self.events.push(Event::Restart {
                        attempt: self.attempt,
                    });
                }
            }
        }
    }

    // Restart controller: refill domains, clear queue and versions, reroll
    // macro seeds. The PRNG keeps its state so attempts diverge.
    fn reset_attempt(&mut self) {
        self.domains.reset_full();
        self.propagator.reset();
        self.settled.fill(false);
        self.collapsed = 0;
        self.apply_seeds();
    }

    fn apply_seeds(&mut self) {
        if let Some(seeder) = &self.seeder {
            seeder.apply(
                &mut self.domains,
                &mut self.propagator,
                self.dims,
                &mut self.rng,
            );
        }
    }

    /// Grid dimensions
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Ordered variant list defining the engine's bit positions
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Number of variants
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Read access to the domain grid, for observers and tests
    pub const fn domains(&self) -> &DomainGrid {
        &self.domains
    }

    /// The compatibility table, immutable and shareable
    pub const fn compatibility(&self) -> &CompatibilityTable {
        &self.compat
    }

    /// Cells explicitly collapsed so far this attempt
    pub const fn collapsed_count(&self) -> usize {
        self.collapsed
    }

    /// Cells the collapser has not yet visited
    pub fn remaining(&self) -> usize {
        self.dims.cells().saturating_sub(self.collapsed)
    }

    /// Whether a cell has been explicitly collapsed this attempt
    pub fn is_settled(&self, cell: usize) -> bool {
        self.settled.get(cell).as_deref() == Some(&true)
    }

    /// Cells queued for propagation
    pub fn queue_len(&self) -> usize {
        self.propagator.queue_len()
    }

    /// Contradictions encountered so far this session
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether generation finished with every cell collapsed
    pub fn is_complete(&self) -> bool {
        self.terminal == Some(Terminal::Done)
    }

    /// Whether the restart cap was exceeded
    pub fn is_failed(&self) -> bool {
        self.terminal == Some(Terminal::Failed)
    }

    /// Whether the session accepts further work
    pub const fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Snapshot of collapsed cells, `None` where a domain is still open
    ///
    /// Shaped `(height, width)` so renderers index `[y, x]`.
    pub fn collapsed_map(&self) -> Array2<Option<u32>> {
        Array2::from_shape_fn((self.dims.height(), self.dims.width()), |(y, x)| {
            self.domains
                .sole_variant(self.dims.cell_index(x, y))
                .map(|variant| variant as u32)
        })
    }
}
