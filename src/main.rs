// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, open the record store and hand it to
//   the UI loop.
// - Returns `anyhow::Result` so a failed login exits non-zero with its
//   message.

use anyhow::Context;
use clap::Parser;
use school_records::{config::Cli, store::Database, ui::run};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_filter())?;

    let data_dir = cli.data_dir();
    let db = Database::open(&data_dir)
        .with_context(|| format!("failed to open record store at {}", data_dir.display()))?;

    // Blocks until the user quits or runs out of login attempts.
    run(&db)?;
    Ok(())
}

fn init_logging(filter: &str) -> anyhow::Result<()> {
    // Logs go to stderr so they never land inside the menus.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
