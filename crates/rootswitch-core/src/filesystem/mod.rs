//! Filesystem management for container entry.
//!
//! Provides the `pivot_root` sequence for secure root filesystem
//! switching, mount utilities, and FIFO creation.

pub mod fifo;
pub mod mount;
pub mod pivot_root;
