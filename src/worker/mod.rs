/// Host↔engine message protocol types
pub mod messages;
/// Background worker thread and run-loop state machine
pub mod runtime;

pub use messages::{BatchStats, CellCollapse, Command, Mode, Reply};
pub use runtime::EngineWorker;
