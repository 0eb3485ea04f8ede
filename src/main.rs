//! CLI entry point for the tile map generator

use clap::Parser;
use wavemap::io::cli::{Cli, MapRunner};

fn main() -> wavemap::Result<()> {
    let cli = Cli::parse();
    let mut runner = MapRunner::new(cli);
    runner.run()
}
