//! # rootswitch-core
//!
//! Switches a process onto a prepared root filesystem.
//!
//! This crate provides:
//! - **Filesystem**: the `pivot_root(2)` sequence that swaps the root,
//!   isolates and detaches the old one, plus mount and FIFO helpers.
//! - **Probes**: boot-time and tagged trace events for external tracers.
//! - **Revisions**: the compiled-in component version table.
//! - **Syslog**: the system log sink used for failure diagnostics.
//!
//! All unsafe system calls are encapsulated in safe wrappers with
//! proper error handling and `// SAFETY:` documentation.

pub mod filesystem;
pub mod probe;
pub mod revisions;
pub mod syslog;

pub use filesystem::pivot_root::{RootOps, RootSwitcher, SyscallOps, pivot_to};
