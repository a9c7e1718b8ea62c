//! # rootswitch
//!
//! Switches a process onto a prepared root filesystem and exposes the
//! helpers a container entry script needs around it.

mod commands;
mod logging;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    logging::init(&config);
    commands::execute(cli, &config)
}
