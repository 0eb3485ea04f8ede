//! Command-line interface for generating maps from catalog files

use crate::algorithm::executor::{Engine, EngineOptions, Event};
use crate::algorithm::seeding::MacroSeedConfig;
use crate::catalog::loader::load_catalog;
use crate::io::configuration::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_MAX_RESTARTS, DEFAULT_SEED,
    DEFAULT_STEP_BUDGET, OUTPUT_SUFFIX,
};
use crate::io::error::{GenerationError, Result};
use crate::io::image::{export_map_png, variant_colors};
use crate::io::progress::GenerationProgress;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "wavemap")]
#[command(
    author,
    version,
    about = "Generate 2D tile maps by edge-constraint collapse"
)]
/// Command-line arguments for the map generation tool
pub struct Cli {
    /// Tileset catalog JSON file (version 2)
    #[arg(value_name = "CATALOG")]
    pub catalog: PathBuf,

    /// Grid width in cells
    #[arg(short = 'w', long, default_value_t = DEFAULT_GRID_WIDTH)]
    pub width: usize,

    /// Grid height in cells
    #[arg(short = 'H', long, default_value_t = DEFAULT_GRID_HEIGHT)]
    pub height: usize,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u32,

    /// Contradictions tolerated before giving up
    #[arg(long = "max-restarts", default_value_t = DEFAULT_MAX_RESTARTS)]
    pub max_restarts: u32,

    /// Expand 90-degree rotation variants
    #[arg(short, long)]
    pub rotate: bool,

    /// Enable macro continent seeding with this many continents
    #[arg(short, long)]
    pub continents: Option<usize>,

    /// Output PNG path (defaults next to the catalog)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pixels per cell in the exported PNG
    #[arg(long, default_value_t = 1)]
    pub scale: u32,

    /// Collapses per step call while batch-running
    #[arg(short, long, default_value_t = DEFAULT_STEP_BUDGET)]
    pub batch: usize,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Engine options assembled from the flags
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            seed: self.seed,
            max_restarts: self.max_restarts,
            allow_rotate: self.rotate,
            macro_seeds: self.continents.map(|continents| MacroSeedConfig {
                continents,
                ..MacroSeedConfig::default()
            }),
        }
    }

    /// Output path: explicit flag, or `<catalog stem>_map.png` alongside
    pub fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        derive_output_path(&self.catalog)
    }
}

/// Derive the default output path for a catalog file
pub fn derive_output_path(catalog: &Path) -> PathBuf {
    let stem = catalog.file_stem().unwrap_or_default();
    let output_name = format!("{}{}.png", stem.to_string_lossy(), OUTPUT_SUFFIX);
    catalog
        .parent()
        .map_or_else(|| PathBuf::from(&output_name), |dir| dir.join(&output_name))
}

/// Drives one generation from catalog load to PNG export
pub struct MapRunner {
    cli: Cli,
    progress: Option<GenerationProgress>,
}

impl MapRunner {
    /// Create a runner from parsed arguments
    pub const fn new(cli: Cli) -> Self {
        Self {
            cli,
            progress: None,
        }
    }

    /// Run the generation to a terminal state and export the map
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read, the engine rejects
    /// the configuration, generation fails terminally, or export fails.
    /// A terminal generation failure still exports the partial map first.
    #[allow(clippy::print_stdout)]
    pub fn process(&mut self) -> Result<()> {
        let started = Instant::now();
        let catalog = load_catalog(&self.cli.catalog)?;

        let mut engine = Engine::new(
            catalog.tiles,
            self.cli.width,
            self.cli.height,
            self.cli.engine_options(),
        )?;

        if self.cli.should_show_progress() {
            self.progress = Some(GenerationProgress::new(engine.dims().cells() as u64));
        }

        let budget = self.cli.batch.max(1);
        let mut failure: Option<String> = None;
        while !engine.is_terminal() {
            for event in engine.step(budget) {
                if let Event::Error { message } = event {
                    failure = Some(message.clone());
                }
            }
            if let Some(progress) = &self.progress {
                progress.update(
                    engine.collapsed_count() as u64,
                    engine.attempt(),
                    engine.queue_len(),
                );
            }
        }

        let output_path = self.cli.output_path();
        let output = output_path
            .to_str()
            .ok_or_else(|| crate::io::error::invalid_parameter(
                "output",
                &output_path.display(),
                &"output path is not valid UTF-8",
            ))?;

        let colors = variant_colors(engine.variants());
        export_map_png(&engine.collapsed_map(), &colors, self.cli.scale.max(1), output)?;

        if let Some(message) = failure {
            if let Some(progress) = &self.progress {
                progress.abandon(format!("failed: {message}"));
            }
            return Err(GenerationError::Generation { message });
        }

        if let Some(progress) = &self.progress {
            progress.finish("done");
        }
        if !self.cli.quiet {
            println!(
                "Generated {}x{} cells ({} variants, {} restarts) in {:.2?} -> {}",
                engine.dims().width(),
                engine.dims().height(),
                engine.variant_count(),
                engine.attempt(),
                started.elapsed(),
                output
            );
        }

        Ok(())
    }

    /// Entry point used by the binary
    ///
    /// # Errors
    ///
    /// Propagates everything [`MapRunner::process`] can fail with.
    pub fn run(&mut self) -> Result<()> {
        self.process()
    }
}
