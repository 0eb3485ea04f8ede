/// Command-line interface and generation driver
pub mod cli;
/// Constants and runtime configuration defaults
pub mod configuration;
/// Error types for generation and I/O operations
pub mod error;
/// PNG export of collapsed maps
pub mod image;
/// Progress reporting for long generations
pub mod progress;
