//! Unified error types for the rootswitch workspace.
//!
//! Every kernel failure in the root switch sequence is tagged with the
//! [`PivotStep`] that produced it and keeps the underlying OS error, so the
//! driver can report both the step and the errno.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::PivotStep;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum RootSwitchError {
    /// The old or new root directory could not be opened.
    #[error("{} {} - {source}", .step.description(), .path.display())]
    ResourceAcquisition {
        /// Step that failed.
        step: PivotStep,
        /// Directory that could not be opened.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// A working-directory change failed.
    #[error("{} - {source}", .step.description())]
    Transition {
        /// Step that failed.
        step: PivotStep,
        /// Underlying OS error.
        source: io::Error,
    },

    /// `pivot_root(2)` itself failed.
    #[error("{} - {source}", .step.description())]
    Pivot {
        /// Step that failed.
        step: PivotStep,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The old root could not be made recursively slave.
    #[error("{} - {source}", .step.description())]
    Isolation {
        /// Step that failed.
        step: PivotStep,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The old root could not be detached.
    #[error("{} - {source}", .step.description())]
    Detach {
        /// Step that failed.
        step: PivotStep,
        /// Underlying OS error.
        source: io::Error,
    },

    /// An I/O operation outside the switch sequence failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The operation needs Linux.
    #[error("{operation} requires Linux")]
    Unsupported {
        /// Name of the unavailable operation.
        operation: &'static str,
    },
}

impl RootSwitchError {
    /// Wraps an OS error raised while executing `step`.
    ///
    /// `path` is only kept for the descriptor acquisition steps.
    #[must_use]
    pub fn at_step(step: PivotStep, path: &Path, source: io::Error) -> Self {
        match step {
            PivotStep::OpenOldRoot | PivotStep::OpenNewRoot => Self::ResourceAcquisition {
                step,
                path: path.to_path_buf(),
                source,
            },
            PivotStep::EnterNewRoot | PivotStep::ReturnToOldRoot | PivotStep::ReenterNewRoot => {
                Self::Transition { step, source }
            }
            PivotStep::SwapRoot => Self::Pivot { step, source },
            PivotStep::IsolatePropagation => Self::Isolation { step, source },
            PivotStep::DetachOldRoot => Self::Detach { step, source },
        }
    }

    /// Step of the switch sequence that failed, if this is a sequence error.
    #[must_use]
    pub const fn step(&self) -> Option<PivotStep> {
        match self {
            Self::ResourceAcquisition { step, .. }
            | Self::Transition { step, .. }
            | Self::Pivot { step, .. }
            | Self::Isolation { step, .. }
            | Self::Detach { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Raw OS error number behind this error, if any.
    #[must_use]
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            Self::ResourceAcquisition { source, .. }
            | Self::Transition { source, .. }
            | Self::Pivot { source, .. }
            | Self::Isolation { source, .. }
            | Self::Detach { source, .. }
            | Self::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// Whether the failure happened after the root was already swapped.
    #[must_use]
    pub fn is_after_swap(&self) -> bool {
        self.step().is_some_and(PivotStep::is_after_swap)
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, RootSwitchError>;
