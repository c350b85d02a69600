//! pwvault CLI entry point.

use clap::Parser;
use pwvault_cli::{logging, render, run, Cli};
use pwvault_core::Config;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    render::init();

    // Logging needs the configured level, so the config is loaded first
    let config = Config::load_or_default(cli.config.as_deref());
    let level = config
        .as_ref()
        .map_or("warn", |config| config.logging.level.as_str());
    logging::init(cli.verbose, level);

    // Run the command
    run(cli, config?)
}
