//! `rootswitch pivot` — Make a prepared directory the root filesystem.

use std::os::unix::process::CommandExt;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use rootswitch_common::config::RootSwitchConfig;
use rootswitch_common::types::OperationReport;
use rootswitch_core::RootSwitcher;
use rootswitch_core::filesystem::mount;

use crate::output;

/// Arguments for the `pivot` command.
#[derive(Args, Debug)]
pub struct PivotArgs {
    /// Directory to become the new root. Must already be a mount point.
    pub root: PathBuf,

    /// Bind mount the directory onto itself first so it is a mount point.
    /// The bind is removed again if the switch fails before the swap.
    #[arg(long)]
    pub bind_self: bool,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,

    /// Program and arguments to exec inside the new root on success.
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Executes the `pivot` command.
///
/// # Errors
///
/// Returns an error if any step of the switch fails or the command cannot
/// be executed. The outcome is printed before the error is returned.
pub fn execute(args: PivotArgs, config: &RootSwitchConfig) -> anyhow::Result<()> {
    if args.bind_self {
        mount::bind_mount_self(&args.root)
            .with_context(|| format!("preparing {}", args.root.display()))?;
    }

    let mut switcher = RootSwitcher::new().with_syslog(config.syslog.enabled);
    let result = switcher.pivot_to(&args.root);
    // Before the swap the mount table is ours to restore.
    if args.bind_self && result.as_ref().is_err_and(|e| !e.is_after_swap()) {
        match mount::lazy_unmount(&args.root) {
            Ok(()) => tracing::info!(root = %args.root.display(), "self bind mount removed"),
            Err(e) => tracing::warn!(
                root = %args.root.display(),
                error = %e,
                "failed to remove self bind mount"
            ),
        }
    }
    let report = OperationReport::from_result(&args.root, &result);
    output::print_report(&report, args.json)?;
    result.context("pivot_root failed")?;

    let Some((program, rest)) = args.command.split_first() else {
        return Ok(());
    };
    tracing::info!(program = %program, "executing in new root");
    let err = std::process::Command::new(program).args(rest).exec();
    Err(anyhow::Error::new(err).context(format!("exec {program}")))
}
