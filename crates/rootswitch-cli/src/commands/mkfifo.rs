//! `rootswitch mkfifo` — Create a named pipe.

use std::path::PathBuf;

use clap::Args;
use rootswitch_common::config::RootSwitchConfig;
use rootswitch_core::filesystem::fifo;

/// Arguments for the `mkfifo` command.
#[derive(Args, Debug)]
pub struct MkfifoArgs {
    /// Path of the FIFO to create.
    pub path: PathBuf,

    /// Permission bits in octal (defaults to the configured mode).
    #[arg(long, value_parser = parse_octal_mode)]
    pub mode: Option<u32>,
}

/// Executes the `mkfifo` command.
///
/// # Errors
///
/// Returns an error if the FIFO cannot be created.
pub fn execute(args: &MkfifoArgs, config: &RootSwitchConfig) -> anyhow::Result<()> {
    let mode = args.mode.unwrap_or(config.fifo_mode);
    let path = fifo::create_fifo(&args.path, Some(mode))?;
    println!("{}", path.display());
    Ok(())
}

/// Parses `0640`, `0o640` or `640` as an octal mode.
fn parse_octal_mode(raw: &str) -> Result<u32, String> {
    let digits = raw.strip_prefix("0o").unwrap_or(raw);
    let mode = u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal mode {raw:?}: {e}"))?;
    if mode > 0o7777 {
        return Err(format!("mode {raw} has bits outside 0o7777"));
    }
    Ok(mode)
}
