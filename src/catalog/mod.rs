/// Pairwise edge-compatibility table over the variant list
pub mod compat;
/// Persisted-JSON catalog ingest with archive-on-error recovery
pub mod loader;
/// Base tile definitions and normalization
pub mod tiles;
/// Rotation expansion and variant deduplication
pub mod variants;
