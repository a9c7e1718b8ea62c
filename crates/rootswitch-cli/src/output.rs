//! Formatted output helpers for CLI commands.

use std::collections::BTreeMap;
use std::fmt::Write;

use rootswitch_common::types::OperationReport;

/// Prints a switch outcome to stdout, as JSON or as one line.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn print_report(report: &OperationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

/// Formats the revision table as aligned `NAME  VERSION` lines.
#[must_use]
pub fn format_revisions(table: &BTreeMap<&str, &str>) -> String {
    let width = table.keys().map(|k| k.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, version) in table {
        let _ = writeln!(out, "{name:<width$}  {version}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_are_aligned() {
        let table = BTreeMap::from([("build", "abc123"), ("rootswitch-core", "0.1.0")]);
        assert_eq!(
            format_revisions(&table),
            "build            abc123\nrootswitch-core  0.1.0\n"
        );
    }

    #[test]
    fn empty_table_prints_nothing() {
        assert_eq!(format_revisions(&BTreeMap::new()), "");
    }
}
