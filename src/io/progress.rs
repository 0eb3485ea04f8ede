//! Progress reporting for long generations

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static GENERATION_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cells {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar tracking collapsed cells across one generation
pub struct GenerationProgress {
    bar: ProgressBar,
}

impl GenerationProgress {
    /// Create a bar spanning the grid's cell count
    pub fn new(total_cells: u64) -> Self {
        let bar = ProgressBar::new(total_cells);
        bar.set_style(GENERATION_STYLE.clone());
        Self { bar }
    }

    /// Report collapsed cells and session counters
    pub fn update(&self, collapsed: u64, attempts: u32, queued: usize) {
        self.bar.set_position(collapsed);
        if attempts > 0 {
            self.bar
                .set_message(format!("(restarts: {attempts}, queue: {queued})"));
        } else if queued > 0 {
            self.bar.set_message(format!("(queue: {queued})"));
        }
    }

    /// Finish with a closing message
    pub fn finish(&self, message: impl Into<String>) {
        self.bar.finish_with_message(message.into());
    }

    /// Abandon the bar, leaving it in place for error context
    pub fn abandon(&self, message: impl Into<String>) {
        self.bar.abandon_with_message(message.into());
    }
}
