#![warn(missing_docs)]

//! Entry point for the `windodge` binary.

mod app;
mod cli;
mod error;

use std::process;

use clap::Parser;
use tracing::error;

use crate::{cli::Cli, error::Result};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, resolve configuration, and launch.
fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.log.init();
    let config = cli.resolve_config()?;
    app::launch(&config)
}
