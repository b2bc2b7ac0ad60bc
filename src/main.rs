use clap::Parser;
use tracing_subscriber::EnvFilter;

use tunebox::cli::Cli;
use tunebox::config::{LogSettings, Settings};
use tunebox::runtime;

fn init_logging(log: &LogSettings, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = Settings::load();
    let log = loaded
        .as_ref()
        .map(|s| s.log.clone())
        .unwrap_or_default();
    init_logging(&log, cli.verbose);

    let settings = runtime::resolve_settings(loaded);
    runtime::run(cli, settings)?;
    Ok(())
}
