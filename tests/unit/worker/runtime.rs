//! Tests for the background worker loop

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use wavemap::algorithm::executor::EngineOptions;
    use wavemap::catalog::tiles::{EdgeRule, TileDef};
    use wavemap::worker::{Command, EngineWorker, Mode, Reply};

    const WAIT: Duration = Duration::from_secs(5);

    fn open_tile(id: &str) -> TileDef {
        let rule = || vec![EdgeRule::keyed("x")];
        TileDef::new(id, format!("{id}.png"), [rule(), rule(), rule(), rule()])
    }

    fn init(worker: &EngineWorker, width: usize, height: usize) {
        assert!(worker.send(Command::Init {
            tiles: vec![open_tile("a"), open_tile("b")],
            width,
            height,
            options: EngineOptions {
                seed: 12345,
                ..EngineOptions::default()
            },
        }));
    }

    fn wait_for<F: Fn(&Reply) -> bool>(worker: &EngineWorker, accept: F) -> Reply {
        loop {
            let reply = worker.wait_reply(WAIT).expect("worker reply before timeout");
            if accept(&reply) {
                return reply;
            }
        }
    }

    // Tests init leaves the worker paused with a fresh session
    // Verified by starting the run loop from init
    #[test]
    fn test_init_acknowledges_paused() {
        let worker = EngineWorker::spawn();
        init(&worker, 3, 3);
        let reply = wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));
        assert_eq!(reply, Reply::state(Mode::Paused));
        worker.shutdown();
    }

    // Tests a failed init surfaces an error reply and error mode
    // Verified by silently dropping construction failures
    #[test]
    fn test_init_failure_reports_error() {
        let worker = EngineWorker::spawn();
        assert!(worker.send(Command::Init {
            tiles: Vec::new(),
            width: 3,
            height: 3,
            options: EngineOptions::default(),
        }));
        let reply = wait_for(&worker, |reply| matches!(reply, Reply::Error { .. }));
        let Reply::Error { message } = reply else {
            unreachable!("filtered to errors");
        };
        assert!(message.contains("catalog"));

        // run in the failed state is a no-op acknowledged with the mode
        assert!(worker.send(Command::Run));
        let state = wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));
        assert_eq!(state, Reply::state(Mode::Error));
        worker.shutdown();
    }

    // Tests an explicit step produces a batch and returns to paused
    // Verified by leaving the worker in stepping mode
    #[test]
    fn test_step_batches_then_pauses() {
        let worker = EngineWorker::spawn();
        init(&worker, 3, 3);
        wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));

        assert!(worker.send(Command::Step { collapses: 2 }));
        let stepping = wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));
        assert_eq!(
            stepping,
            Reply::State {
                mode: Mode::Stepping,
                target_collapses: Some(2),
                message: None,
            }
        );

        let batch = wait_for(&worker, |reply| matches!(reply, Reply::Batch { .. }));
        let Reply::Batch { collapsed, stats } = batch else {
            unreachable!("filtered to batches");
        };
        assert_eq!(collapsed.len(), 2);
        assert_eq!(stats.cells, 9);
        assert_eq!(stats.collapsed, 2);
        assert_eq!(stats.remaining, 7);

        let paused = wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));
        assert_eq!(paused, Reply::state(Mode::Paused));
        worker.shutdown();
    }

    // Tests a run loop reaches done and reports the terminal state
    // Verified by never leaving running mode
    #[test]
    fn test_run_to_completion() {
        let worker = EngineWorker::spawn();
        init(&worker, 4, 4);
        wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));

        assert!(worker.send(Command::Run));
        let mut saw_done = false;
        let mut collapsed = 0usize;
        loop {
            match worker.wait_reply(WAIT).expect("reply") {
                Reply::Batch { collapsed: cells, .. } => collapsed += cells.len(),
                Reply::Done => {
                    saw_done = true;
                }
                Reply::State { mode: Mode::Done, .. } => break,
                _ => {}
            }
        }
        assert!(saw_done);
        assert_eq!(collapsed, 16);
        worker.shutdown();
    }

    // Tests pause stops a run loop at a chunk boundary
    // Verified by ignoring pause while running
    #[test]
    fn test_pause_acknowledged() {
        let worker = EngineWorker::spawn();
        init(&worker, 16, 16);
        wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));

        assert!(worker.send(Command::Run));
        assert!(worker.send(Command::Pause));
        let paused = wait_for(&worker, |reply| {
            matches!(
                reply,
                Reply::State {
                    mode: Mode::Paused | Mode::Done,
                    ..
                }
            )
        });
        // a 256-cell grid cannot finish within the handful of chunks that
        // fit between run and pause
        assert_eq!(paused, Reply::state(Mode::Paused));
        worker.shutdown();
    }

    // Tests a fresh init cancels the previous session entirely
    // Verified by letting the old run loop keep stepping
    #[test]
    fn test_reinit_cancels_run() {
        let worker = EngineWorker::spawn();
        init(&worker, 8, 8);
        wait_for(&worker, |reply| matches!(reply, Reply::State { .. }));
        assert!(worker.send(Command::Run));

        init(&worker, 2, 2);
        let paused = wait_for(&worker, |reply| {
            matches!(reply, Reply::State { mode: Mode::Paused, .. })
        });
        assert_eq!(paused, Reply::state(Mode::Paused));

        // the new session is 2x2: run finishes after exactly four collapses
        assert!(worker.send(Command::Run));
        let mut collapsed = 0usize;
        loop {
            match worker.wait_reply(WAIT).expect("reply") {
                Reply::Batch { collapsed: cells, .. } => collapsed += cells.len(),
                Reply::State { mode: Mode::Done, .. } => break,
                _ => {}
            }
        }
        assert_eq!(collapsed, 4);
        worker.shutdown();
    }
}
