use clap::Parser;
use stockmetrics::cli::{Cli, run};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> std::process::ExitCode {
    // RUST_LOG overrides; results go to stdout so logs stay on stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    run(Cli::parse())
}
