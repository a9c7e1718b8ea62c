//! # rootswitch-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the rootswitch workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and performs no system calls.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

/// Version of this crate, recorded in the component revision table.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
