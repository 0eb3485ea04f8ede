//! Background worker thread driving an engine cooperatively
//!
//! The engine runs on its own thread and talks to the host over a pair of
//! mpsc channels. Commands are handled strictly FIFO; while running, the
//! loop interleaves one single-collapse step per iteration with a command
//! poll, so pause and reinitialize are honored at chunk boundaries and a
//! fresh `Init` cancels any in-flight run by replacing the session
//! wholesale.

use crate::algorithm::executor::{Engine, Event};
use crate::io::configuration::PROGRESS_THROTTLE_MS;
use crate::worker::messages::{BatchStats, CellCollapse, Command, Mode, Reply};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Handle to a background engine worker
pub struct EngineWorker {
    commands: Sender<Command>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
}

impl EngineWorker {
    /// Spawn the worker thread, initially paused with no session
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn a thread.
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = channel();
        let (reply_tx, reply_rx) = channel();
        let handle = std::thread::Builder::new()
            .name("wavemap-engine".to_string())
            .spawn(move || run_loop(&command_rx, &reply_tx))
            .expect("failed to spawn engine worker thread");

        Self {
            commands: command_tx,
            replies: reply_rx,
            handle: Some(handle),
        }
    }

    /// Send a command; returns false if the worker has exited
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// The reply channel, for hosts that integrate their own polling
    pub const fn replies(&self) -> &Receiver<Reply> {
        &self.replies
    }

    /// Block for the next reply up to a timeout
    pub fn wait_reply(&self, timeout: Duration) -> Option<Reply> {
        self.replies.recv_timeout(timeout).ok()
    }

    /// Request shutdown and join the thread
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

struct WorkerState {
    engine: Option<Engine>,
    mode: Mode,
    last_progress: Option<Instant>,
}

fn run_loop(commands: &Receiver<Command>, replies: &Sender<Reply>) {
    let mut state = WorkerState {
        engine: None,
        mode: Mode::Paused,
        last_progress: None,
    };

    loop {
        // Block while idle; poll between chunks while running so pause and
        // reinitialize are honored without stalling the loop.
        let command = if state.mode == Mode::Running {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => return,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => return,
            }
        };

        if let Some(command) = command {
            if !handle_command(command, &mut state, replies) {
                return;
            }
        }

        if state.mode == Mode::Running {
            run_chunk(&mut state, replies);
            std::thread::yield_now();
        }
    }
}

// Returns false when the loop should exit.
fn handle_command(command: Command, state: &mut WorkerState, replies: &Sender<Reply>) -> bool {
    match command {
        Command::Init {
            tiles,
            width,
            height,
            options,
        } => match Engine::new(tiles, width, height, options) {
            Ok(engine) => {
                state.engine = Some(engine);
                state.mode = Mode::Paused;
                state.last_progress = None;
                let _ = replies.send(Reply::state(Mode::Paused));
            }
            Err(error) => {
                state.engine = None;
                state.mode = Mode::Error;
                let _ = replies.send(Reply::Error {
                    message: error.to_string(),
                });
                let _ = replies.send(Reply::State {
                    mode: Mode::Error,
                    target_collapses: None,
                    message: Some(error.to_string()),
                });
            }
        },
        Command::Run => {
            if state.engine.is_some() && !matches!(state.mode, Mode::Done | Mode::Error) {
                state.mode = Mode::Running;
            }
            let _ = replies.send(Reply::state(state.mode));
        }
        Command::Pause => {
            if state.mode == Mode::Running {
                state.mode = Mode::Paused;
            }
            let _ = replies.send(Reply::state(state.mode));
        }
        Command::Step { collapses } => {
            if state.engine.is_none() || matches!(state.mode, Mode::Done | Mode::Error) {
                let _ = replies.send(Reply::state(state.mode));
                return true;
            }
            state.mode = Mode::Stepping;
            let _ = replies.send(Reply::State {
                mode: Mode::Stepping,
                target_collapses: Some(collapses),
                message: None,
            });
            step_engine(state, replies, collapses);
            if !matches!(state.mode, Mode::Done | Mode::Error) {
                state.mode = Mode::Paused;
            }
            let _ = replies.send(Reply::state(state.mode));
        }
        Command::Shutdown => return false,
    }
    true
}

fn run_chunk(state: &mut WorkerState, replies: &Sender<Reply>) {
    step_engine(state, replies, 1);
    if matches!(state.mode, Mode::Done | Mode::Error) {
        let _ = replies.send(Reply::state(state.mode));
    }
}

// One engine step: forward its events in order, flushing collapses into a
// batch before any restart so hosts can discard stale draws.
fn step_engine(state: &mut WorkerState, replies: &Sender<Reply>, collapses: usize) {
    let Some(engine) = state.engine.as_mut() else {
        return;
    };

    let events: Vec<Event> = engine.step(collapses).to_vec();
    let stats = BatchStats {
        collapsed: engine.collapsed_count(),
        cells: engine.dims().cells(),
        variants: engine.variant_count(),
        queue: engine.queue_len(),
        remaining: engine.remaining(),
    };

    let mut batch: Vec<CellCollapse> = Vec::new();
    for event in events {
        match event {
            Event::Collapse { cell, variant } => {
                batch.push(CellCollapse { cell, variant });
            }
            Event::Restart { attempt } => {
                flush_batch(&mut batch, stats, replies);
                let _ = replies.send(Reply::Restart { attempt });
            }
            Event::Progress(diag) => {
                let throttle = Duration::from_millis(PROGRESS_THROTTLE_MS);
                let due = state
                    .last_progress
                    .is_none_or(|sent| sent.elapsed() >= throttle);
                if due {
                    state.last_progress = Some(Instant::now());
                    let _ = replies.send(Reply::Progress { diag });
                }
            }
            Event::Done => {
                flush_batch(&mut batch, stats, replies);
                state.mode = Mode::Done;
                let _ = replies.send(Reply::Done);
            }
            Event::Error { message } => {
                flush_batch(&mut batch, stats, replies);
                state.mode = Mode::Error;
                let _ = replies.send(Reply::Error { message });
            }
        }
    }
    flush_batch(&mut batch, stats, replies);
}

fn flush_batch(batch: &mut Vec<CellCollapse>, stats: BatchStats, replies: &Sender<Reply>) {
    if batch.is_empty() {
        return;
    }
    let _ = replies.send(Reply::Batch {
        collapsed: std::mem::take(batch),
        stats,
    });
}
