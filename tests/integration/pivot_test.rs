//! Integration tests for root switching.
//!
//! These tests are implemented in the crates that own the behavior:
//!
//! `crates/rootswitch-core/tests/descriptor_hygiene.rs`
//! - `failed_switches_leave_descriptor_table_unchanged`: missing, non-directory
//!   and same-mount roots fail at the right step without leaking descriptors
//!
//! `crates/rootswitch-core/tests/pivot_privileged.rs` (root only, `--ignored`)
//! - `pivot_switches_root_and_detaches_old_root`: cwd is `/`, new root content is
//!   visible, only the new root and `/proc` remain mounted
//! - `second_pivot_without_fresh_mount_fails`: the switch is not repeatable
//! - `detaching_old_root_does_not_reach_sibling_namespace`: a peer namespace keeps
//!   its mounts after the switch
//!
//! `crates/rootswitch-cli/tests/cli.rs`
//! - failure reports in JSON and text, config errors, `mkfifo`, `revisions`,
//!   `probe`, and an end-to-end switch under `unshare(1)` (root only, `--ignored`)
