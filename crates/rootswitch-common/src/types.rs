//! Domain primitive types used across the rootswitch workspace.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RootSwitchError;

/// One fallible step of the root switch sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotStep {
    /// Open `/` as a directory descriptor.
    OpenOldRoot,
    /// Open the requested new root as a directory descriptor.
    OpenNewRoot,
    /// `fchdir` into the new root.
    EnterNewRoot,
    /// `pivot_root(".", ".")`.
    SwapRoot,
    /// `fchdir` back into the old root, now stacked on top of the new one.
    ReturnToOldRoot,
    /// Make the old root mount recursively slave.
    IsolatePropagation,
    /// Lazily unmount the old root.
    DetachOldRoot,
    /// `fchdir` into the new root for the caller.
    ReenterNewRoot,
}

impl PivotStep {
    /// Every step, in the order the switcher attempts them.
    pub const ALL: [Self; 8] = [
        Self::OpenOldRoot,
        Self::OpenNewRoot,
        Self::EnterNewRoot,
        Self::SwapRoot,
        Self::ReturnToOldRoot,
        Self::IsolatePropagation,
        Self::DetachOldRoot,
        Self::ReenterNewRoot,
    ];

    /// Operator-facing description used in logs and error messages.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::OpenOldRoot => "failed to open old root directory",
            Self::OpenNewRoot => "failed to open new root directory",
            Self::EnterNewRoot => "failed to change to new root directory",
            Self::SwapRoot => "failed to pivot_root()",
            Self::ReturnToOldRoot => "failed to enter old root directory",
            Self::IsolatePropagation => "failed to make old root rslave",
            Self::DetachOldRoot => "failed to detach old root directory",
            Self::ReenterNewRoot => "failed to re-enter new root directory",
        }
    }

    /// Whether the root has already been swapped when this step runs.
    ///
    /// A failure in such a step leaves a hybrid mount layout that is not
    /// rolled back.
    #[must_use]
    pub fn is_after_swap(self) -> bool {
        self > Self::SwapRoot
    }

    /// State entered when this step succeeds.
    #[must_use]
    pub const fn target_state(self) -> PivotState {
        match self {
            Self::OpenOldRoot => PivotState::OldOpened,
            Self::OpenNewRoot => PivotState::BothOpened,
            Self::EnterNewRoot => PivotState::EnteredNew,
            Self::SwapRoot => PivotState::Pivoted,
            Self::ReturnToOldRoot => PivotState::BackInOld,
            Self::IsolatePropagation => PivotState::Isolated,
            Self::DetachOldRoot => PivotState::Detached,
            Self::ReenterNewRoot => PivotState::Done,
        }
    }

    /// Short machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenOldRoot => "open_old_root",
            Self::OpenNewRoot => "open_new_root",
            Self::EnterNewRoot => "enter_new_root",
            Self::SwapRoot => "swap_root",
            Self::ReturnToOldRoot => "return_to_old_root",
            Self::IsolatePropagation => "isolate_propagation",
            Self::DetachOldRoot => "detach_old_root",
            Self::ReenterNewRoot => "reenter_new_root",
        }
    }
}

impl fmt::Display for PivotStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a single root switch.
///
/// Failures are carried by [`RootSwitchError`], so there is no failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PivotState {
    /// Nothing acquired yet.
    Init,
    /// Old root descriptor held.
    OldOpened,
    /// Both descriptors held.
    BothOpened,
    /// Working directory is the new root.
    EnteredNew,
    /// `pivot_root` succeeded.
    Pivoted,
    /// Working directory is the old root again.
    BackInOld,
    /// Old root no longer propagates.
    Isolated,
    /// Old root unmounted.
    Detached,
    /// Positioned at the new root; the only successful terminal state.
    Done,
}

impl PivotState {
    /// The step that leaves this state, or `None` once done.
    #[must_use]
    pub const fn next_step(self) -> Option<PivotStep> {
        match self {
            Self::Init => Some(PivotStep::OpenOldRoot),
            Self::OldOpened => Some(PivotStep::OpenNewRoot),
            Self::BothOpened => Some(PivotStep::EnterNewRoot),
            Self::EnteredNew => Some(PivotStep::SwapRoot),
            Self::Pivoted => Some(PivotStep::ReturnToOldRoot),
            Self::BackInOld => Some(PivotStep::IsolatePropagation),
            Self::Isolated => Some(PivotStep::DetachOldRoot),
            Self::Detached => Some(PivotStep::ReenterNewRoot),
            Self::Done => None,
        }
    }
}

impl fmt::Display for PivotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::OldOpened => "old_opened",
            Self::BothOpened => "both_opened",
            Self::EnteredNew => "entered_new",
            Self::Pivoted => "pivoted",
            Self::BackInOld => "back_in_old",
            Self::Isolated => "isolated",
            Self::Detached => "detached",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Payload attached to a tagged trace probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProbePayload {
    /// Integer payload.
    Integer(i64),
    /// Text payload.
    Text(String),
    /// Any other value, identified by its type name only.
    Opaque(&'static str),
}

impl ProbePayload {
    /// Describes a value that is neither an integer nor text.
    #[must_use]
    pub fn opaque<T: ?Sized>(_value: &T) -> Self {
        Self::Opaque(std::any::type_name::<T>())
    }

    /// Parses a command-line style argument: integers stay integers,
    /// anything else is text.
    #[must_use]
    pub fn parse_arg(arg: &str) -> Self {
        arg.parse::<i64>()
            .map_or_else(|_| Self::Text(arg.to_owned()), Self::Integer)
    }
}

impl From<i64> for ProbePayload {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for ProbePayload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ProbePayload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for ProbePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Opaque(type_name) => write!(f, "opaque({type_name})"),
        }
    }
}

/// Line logged and printed when a switch to `root` completes.
#[must_use]
pub fn success_message(root: &Path) -> String {
    format!("pivot_root(\"{}\") successful", root.display())
}

/// Serializable outcome of one root switch, handed back to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    /// Requested new root.
    pub root: String,
    /// Whether the sequence reached [`PivotState::Done`].
    pub success: bool,
    /// Failing step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<PivotStep>,
    /// Raw OS error number, if the failure came from the kernel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    /// Full failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationReport {
    /// Builds a report from the result of a switch to `root`.
    #[must_use]
    pub fn from_result(root: &Path, result: &Result<(), RootSwitchError>) -> Self {
        let root = root.display().to_string();
        match result {
            Ok(()) => Self {
                root,
                success: true,
                step: None,
                errno: None,
                message: None,
            },
            Err(e) => Self {
                root,
                success: false,
                step: e.step(),
                errno: e.os_error_code(),
                message: Some(e.to_string()),
            },
        }
    }
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            return f.write_str(&success_message(Path::new(&self.root)));
        }
        write!(f, "pivot_root(\"{}\") failed", self.root)?;
        if let Some(step) = self.step {
            write!(f, " at {step}")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}
