//! `rootswitch revisions` — Show the compiled-in component revisions.

use clap::Args;

use crate::output;

/// Arguments for the `revisions` command.
#[derive(Args, Debug)]
pub struct RevisionsArgs {
    /// Print the table as a JSON object.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `revisions` command.
///
/// # Errors
///
/// Returns an error if the table cannot be serialized.
pub fn execute(args: &RevisionsArgs) -> anyhow::Result<()> {
    let table = rootswitch_core::revisions::revisions();
    if args.json {
        println!("{}", serde_json::to_string_pretty(table)?);
    } else {
        print!("{}", output::format_revisions(table));
    }
    Ok(())
}
