//! Binary crate for the `skydeck` terminal dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Rendering the dashboard and scene animation as text

use clap::Parser;

mod canvas;
mod cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cmd = cli::Cli::parse();
    cmd.run()
}
