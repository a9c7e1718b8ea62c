//! `rootswitch probe` — Emit a trace probe.

use clap::{Args, Subcommand};
use rootswitch_common::types::ProbePayload;

/// Arguments for the `probe` command.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Probe to emit.
    #[command(subcommand)]
    pub kind: ProbeKind,
}

/// Probe kinds.
#[derive(Subcommand, Debug)]
pub enum ProbeKind {
    /// Boot-time clock reading tagged with a flag.
    Boottime {
        /// Numeric tag.
        #[arg(allow_negative_numbers = true)]
        flag: i64,
    },
    /// Tagged value; integers are sent as integers, anything else as text.
    Misc {
        /// Numeric tag.
        #[arg(allow_negative_numbers = true)]
        flag: i64,
        /// Payload.
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

/// Executes the `probe` command. Probes never fail.
pub fn execute(args: &ProbeArgs) {
    match &args.kind {
        ProbeKind::Boottime { flag } => rootswitch_core::probe::probe_boottime(*flag),
        ProbeKind::Misc { flag, value } => {
            rootswitch_core::probe::probe(*flag, &ProbePayload::parse_arg(value));
        }
    }
}
