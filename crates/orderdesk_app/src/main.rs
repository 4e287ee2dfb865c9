mod app;
mod config;
mod console;
mod effects;
mod logging;

use std::path::PathBuf;

use clap::Parser;

/// Order dashboard widget driven over stdin/stdout.
///
/// Host messages and UI commands are read from stdin, one per line; outbound
/// host messages are written to stdout as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "orderdesk", version)]
struct Cli {
    /// Configuration file (RON).
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::DeskConfig::load(&cli.config)?;
    logging::initialize(config.log_destination, config.log_level()?);
    app::run(config)
}
