//! Constants and runtime configuration defaults

// Engine defaults
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u32 = 42;
/// Contradictions tolerated before a session fails terminally
pub const DEFAULT_MAX_RESTARTS: u32 = 10;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

// Grid defaults for the CLI
/// Default grid width in cells
pub const DEFAULT_GRID_WIDTH: usize = 64;
/// Default grid height in cells
pub const DEFAULT_GRID_HEIGHT: usize = 64;
/// Collapse budget per step call when batch-running
pub const DEFAULT_STEP_BUDGET: usize = 64;

// Catalog format
/// The only catalog file version the loader accepts
pub const SUPPORTED_CATALOG_VERSION: u32 = 2;
/// Tile edge length assumed when the catalog omits one
pub const DEFAULT_TILE_SIZE: u32 = 16;
/// Extension appended when archiving a bad catalog
pub const ARCHIVE_SUFFIX: &str = "bak";

// Macro seeding defaults
/// Continents carved per seeding pass
pub const DEFAULT_CONTINENTS: usize = 3;
/// Minimum disk radius as a fraction of the short grid side
pub const DEFAULT_RADIUS_MIN: f64 = 0.15;
/// Maximum disk radius as a fraction of the short grid side
pub const DEFAULT_RADIUS_MAX: f64 = 0.35;
/// Core radius as a fraction of the sampled disk radius
pub const CORE_RADIUS_FACTOR: f64 = 0.85;
/// Mark count required for the strict core mask
pub const DEFAULT_CORE_MIN_MARKS: usize = 2;
/// Mark count required for the loose rim mask
pub const DEFAULT_RIM_MIN_MARKS: usize = 1;
/// Character counted in base identifiers for the bias masks
pub const MACRO_MARK: char = 'g';

// Diagnostics
/// Pops between advisory progress events during a drain
pub const PROGRESS_PROPAGATION_INTERVAL: u64 = 4096;
/// Minimum milliseconds between forwarded progress replies
pub const PROGRESS_THROTTLE_MS: u64 = 100;

// Output settings
/// Suffix added to derived output filenames
pub const OUTPUT_SUFFIX: &str = "_map";
