//! CLI command definitions and dispatch.

pub mod mkfifo;
pub mod pivot;
pub mod probe;
pub mod revisions;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rootswitch_common::config::{LogFormat, RootSwitchConfig};
use rootswitch_common::constants;

/// rootswitch — switch a process onto a prepared root filesystem.
#[derive(Parser, Debug)]
#[command(name = constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the JSON configuration file.
    #[arg(long, global = true, env = constants::CONFIG_ENV, default_value = constants::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Diagnostic log format, overriding the configuration file.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,
}

impl Cli {
    /// Loads the configuration file and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but is invalid.
    pub fn load_config(&self) -> anyhow::Result<RootSwitchConfig> {
        let mut config = RootSwitchConfig::load(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?;
        if let Some(format) = self.log_format {
            config.log_format = format.into();
        }
        Ok(config)
    }
}

/// Command-line spelling of [`LogFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Make a prepared directory the root filesystem, then optionally exec a command in it.
    Pivot(pivot::PivotArgs),
    /// Create a named pipe.
    Mkfifo(mkfifo::MkfifoArgs),
    /// Emit a trace probe.
    Probe(probe::ProbeArgs),
    /// Show the compiled-in component revisions.
    Revisions(revisions::RevisionsArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli, config: &RootSwitchConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Pivot(args) => pivot::execute(args, config),
        Command::Mkfifo(args) => mkfifo::execute(&args, config),
        Command::Probe(args) => {
            probe::execute(&args);
            Ok(())
        }
        Command::Revisions(args) => revisions::execute(&args),
    }
}
