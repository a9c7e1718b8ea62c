//! Diagnostic log and system log initialisation.

use std::io::IsTerminal;

use rootswitch_common::config::{LogFormat, RootSwitchConfig};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Installs the global `tracing` subscriber and opens the system log.
///
/// Diagnostics go to stderr so that stdout carries only command output.
pub fn init(config: &RootSwitchConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    if config.syslog.enabled {
        rootswitch_core::syslog::init(&config.syslog.ident);
    }
}
