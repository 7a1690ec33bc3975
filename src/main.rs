//! pytidy - Python source hygiene CLI
//!
//! Lints whitespace, proposes identifier typo renames, removes unused
//! imports, reports project dependencies, and optionally formats with
//! black and audits dependencies with pip-audit.

mod cli;
mod config;
mod deps;
mod detectors;
mod errors;
mod external;
mod fixes;
mod models;
mod parsers;
mod pipeline;
mod reporters;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level when both are set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(1);
        }
    }
}
