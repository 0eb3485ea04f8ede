//! Host↔engine message protocol
//!
//! The boundary is a typed channel whose messages are all serde-
//! serializable, so hosts that marshal across a process or socket see the
//! same logically-JSON protocol the in-process channel carries. Because
//! commands are a closed enum, the "unknown message kind" failure class
//! of looser transports cannot be represented here.

use crate::algorithm::executor::EngineOptions;
use crate::algorithm::propagation::ProgressReport;
use crate::catalog::tiles::TileDef;
use serde::{Deserialize, Serialize};

/// Host-to-engine commands, processed strictly in order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Cancel any in-flight loop, rebuild from scratch, leave paused
    Init {
        /// Base tile definitions
        tiles: Vec<TileDef>,
        /// Grid width in cells
        width: usize,
        /// Grid height in cells
        height: usize,
        /// Engine construction options
        options: EngineOptions,
    },
    /// Start a chunked loop of single-collapse steps
    Run,
    /// Stop after the current chunk; acknowledged with a paused state
    Pause,
    /// Stop any run loop, perform exactly one step call, then pause
    Step {
        /// Collapse budget for the step call
        #[serde(default = "default_step_collapses")]
        collapses: usize,
    },
    /// End the worker loop; the thread joins after processing this
    Shutdown,
}

const fn default_step_collapses() -> usize {
    1
}

/// Worker execution modes mirrored to the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Idle; waiting for commands
    Paused,
    /// Chunked run loop in progress
    Running,
    /// Executing an explicit step command
    Stepping,
    /// Generation finished; terminal
    Done,
    /// Construction or generation failed; terminal
    Error,
}

/// One collapsed cell within a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCollapse {
    /// Row-major cell index
    pub cell: usize,
    /// Chosen variant index
    pub variant: usize,
}

/// Session statistics attached to every batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Cells currently holding exactly one variant
    pub collapsed: usize,
    /// Total grid cells
    pub cells: usize,
    /// Catalog variant count
    pub variants: usize,
    /// Cells awaiting propagation
    pub queue: usize,
    /// Cells still holding more than one variant
    pub remaining: usize,
}

/// Engine-to-host replies
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Mode transition acknowledgement
    State {
        /// Current worker mode
        mode: Mode,
        /// Collapse budget of an in-flight step command, if any
        target_collapses: Option<usize>,
        /// Optional human-readable detail
        message: Option<String>,
    },
    /// Collapses from one step call plus session statistics
    Batch {
        /// Collapses in occurrence order
        collapsed: Vec<CellCollapse>,
        /// Session statistics after the step
        stats: BatchStats,
    },
    /// Advisory drain diagnostics, throttled by the worker
    Progress {
        /// Diagnostic snapshot
        diag: ProgressReport,
    },
    /// A contradiction reset the grid; discard in-flight collapses
    Restart {
        /// Contradictions encountered so far
        attempt: u32,
    },
    /// Terminal success
    Done,
    /// Terminal failure
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl Reply {
    /// Convenience constructor for a bare state acknowledgement
    pub fn state(mode: Mode) -> Self {
        Self::State {
            mode,
            target_collapses: None,
            message: None,
        }
    }
}
