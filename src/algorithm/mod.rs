/// Word-packed variant bitsets and the per-cell domain grid
pub mod bitset;
/// Engine construction, the budgeted step loop, and the event stream
pub mod executor;
/// Arc-consistency drain over the propagation queue
pub mod propagation;
/// Deduplicated propagation work queue
pub mod queue;
/// Deterministic 32-bit-state PRNG
pub mod rng;
/// Macro continent seeding
pub mod seeding;
/// Minimum-entropy cell selection and weighted collapse
pub mod selection;
