// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, hand over to `ui`.
// - `--help` and `--version` exit inside `Cli::parse`, before any prompt or
//   network activity.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vulncheck_cli::{cli::Cli, ui};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the report and JSON output.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    ui::run(&cli)
}
