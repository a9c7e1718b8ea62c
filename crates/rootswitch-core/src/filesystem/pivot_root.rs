//! Secure root filesystem switching via `pivot_root(2)`.
//!
//! More secure than `chroot` because it actually changes the root mount
//! rather than just the process's view of `/`. The sequence follows the
//! one used by LXC:
//!
//! 1. open `/` and the new root as directory descriptors,
//! 2. `fchdir` into the new root and `pivot_root(".", ".")`,
//! 3. `fchdir` back into the old root, which is now stacked on top,
//! 4. make it `rslave` so the unmount cannot reach the host,
//! 5. detach it and `fchdir` into the new root again.
//!
//! Both descriptors are owned by the call and closed when it returns,
//! whichever step fails.

use std::io;
use std::path::Path;

use rootswitch_common::constants::{CURRENT_DIR, OLD_ROOT};
use rootswitch_common::error::{Result, RootSwitchError};
use rootswitch_common::types::{PivotState, PivotStep, success_message};

/// Kernel operations the switch sequence is built from.
///
/// Every operation that acts on the current location uses `"."`.
pub trait RootOps {
    /// Open directory. Dropping it must close the descriptor.
    type Handle;

    /// Opens `path` as a read-only, close-on-exec directory descriptor.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `open(2)`.
    fn open_dir(&mut self, path: &Path) -> io::Result<Self::Handle>;

    /// Changes the working directory to `dir`.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `fchdir(2)`.
    fn change_dir(&mut self, dir: &Self::Handle) -> io::Result<()>;

    /// Calls `pivot_root(".", ".")`.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `pivot_root(2)`.
    fn pivot_here(&mut self) -> io::Result<()>;

    /// Makes the mount at `"."` recursively slave.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `mount(2)`.
    fn make_rslave_here(&mut self) -> io::Result<()>;

    /// Lazily unmounts `"."`.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `umount2(2)`.
    fn detach_here(&mut self) -> io::Result<()>;
}

/// [`RootOps`] backed by the real system calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyscallOps;

#[cfg(target_os = "linux")]
impl RootOps for SyscallOps {
    type Handle = std::os::fd::OwnedFd;

    fn open_dir(&mut self, path: &Path) -> io::Result<Self::Handle> {
        use nix::fcntl::{OFlag, open};
        use nix::sys::stat::Mode;

        open(
            path,
            OFlag::O_DIRECTORY | OFlag::O_RDONLY | OFlag::O_CLOEXEC,
            Mode::empty(),
        )
        .map_err(io::Error::from)
    }

    fn change_dir(&mut self, dir: &Self::Handle) -> io::Result<()> {
        nix::unistd::fchdir(dir).map_err(io::Error::from)
    }

    fn pivot_here(&mut self) -> io::Result<()> {
        nix::unistd::pivot_root(CURRENT_DIR, CURRENT_DIR).map_err(io::Error::from)
    }

    fn make_rslave_here(&mut self) -> io::Result<()> {
        super::mount::make_rslave(Path::new(CURRENT_DIR))
    }

    fn detach_here(&mut self) -> io::Result<()> {
        super::mount::lazy_unmount(Path::new(CURRENT_DIR))
    }
}

#[cfg(not(target_os = "linux"))]
impl RootOps for SyscallOps {
    type Handle = ();

    fn open_dir(&mut self, _path: &Path) -> io::Result<Self::Handle> {
        Err(unsupported())
    }

    fn change_dir(&mut self, _dir: &Self::Handle) -> io::Result<()> {
        Err(unsupported())
    }

    fn pivot_here(&mut self) -> io::Result<()> {
        Err(unsupported())
    }

    fn make_rslave_here(&mut self) -> io::Result<()> {
        Err(unsupported())
    }

    fn detach_here(&mut self) -> io::Result<()> {
        Err(unsupported())
    }
}

#[cfg(not(target_os = "linux"))]
fn unsupported() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "pivot_root requires Linux")
}

/// Performs the root switch.
///
/// Taking `&mut self` keeps a single switcher from running two sequences
/// at once; the process-wide root and working directory are still shared,
/// so the driver must not run two switchers concurrently either.
#[derive(Debug)]
pub struct RootSwitcher<O = SyscallOps> {
    ops: O,
    syslog: bool,
}

impl RootSwitcher<SyscallOps> {
    /// Creates a switcher that uses the real system calls and logs to syslog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: SyscallOps,
            syslog: true,
        }
    }
}

impl Default for RootSwitcher<SyscallOps> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: RootOps> RootSwitcher<O> {
    /// Creates a switcher over custom kernel operations.
    #[must_use]
    pub const fn with_ops(ops: O) -> Self {
        Self { ops, syslog: true }
    }

    /// Enables or disables system log output.
    #[must_use]
    pub fn with_syslog(mut self, enabled: bool) -> Self {
        self.syslog = enabled;
        self
    }

    /// Returns the underlying kernel operations.
    pub const fn ops(&self) -> &O {
        &self.ops
    }

    /// Makes `new_root` the root filesystem and working directory of the
    /// calling process, detaching the old root.
    ///
    /// `new_root` must already be a mount point distinct from the current
    /// root; this is not checked here and surfaces as a `pivot_root` failure.
    /// Nothing is rolled back: after a failure past the swap step the mount
    /// layout is left as it is (see [`RootSwitchError::is_after_swap`]).
    ///
    /// # Errors
    ///
    /// Returns the first failing step together with its OS error. The
    /// failure has already been written to the system log.
    pub fn pivot_to(&mut self, new_root: &Path) -> Result<()> {
        tracing::info!(new_root = %new_root.display(), "performing pivot_root");

        let mut progress = Progress {
            state: PivotState::Init,
            new_root,
            syslog: self.syslog,
        };

        let old_root_dir = progress.step(
            PivotStep::OpenOldRoot,
            self.ops.open_dir(Path::new(OLD_ROOT)),
        )?;
        let new_root_dir = progress.step(PivotStep::OpenNewRoot, self.ops.open_dir(new_root))?;

        progress.step(PivotStep::EnterNewRoot, self.ops.change_dir(&new_root_dir))?;
        progress.step(PivotStep::SwapRoot, self.ops.pivot_here())?;

        // The old root is now stacked on top of the new one. Step back into
        // it so that "." names the old root mount for the next two calls.
        progress.step(PivotStep::ReturnToOldRoot, self.ops.change_dir(&old_root_dir))?;
        progress.step(PivotStep::IsolatePropagation, self.ops.make_rslave_here())?;
        progress.step(PivotStep::DetachOldRoot, self.ops.detach_here())?;
        progress.step(PivotStep::ReenterNewRoot, self.ops.change_dir(&new_root_dir))?;

        drop(new_root_dir);
        drop(old_root_dir);

        let message = success_message(new_root);
        if self.syslog {
            crate::syslog::info(&message);
        }
        tracing::info!(new_root = %new_root.display(), state = %progress.state, "{message}");
        Ok(())
    }
}

/// Switches the calling process to `new_root` with the default switcher.
///
/// # Errors
///
/// See [`RootSwitcher::pivot_to`].
pub fn pivot_to(new_root: &Path) -> Result<()> {
    RootSwitcher::new().pivot_to(new_root)
}

/// Tracks the state machine of one `pivot_to` call and reports failures
/// where they are detected.
struct Progress<'a> {
    state: PivotState,
    new_root: &'a Path,
    syslog: bool,
}

impl Progress<'_> {
    /// Records the outcome of `step`, advancing the state on success.
    ///
    /// `pivot_to` passes the steps in [`PivotStep::ALL`] order, so `step` is
    /// always `self.state.next_step()`. That is an internal invariant of
    /// this module, checked only in debug builds.
    fn step<T>(&mut self, step: PivotStep, outcome: io::Result<T>) -> Result<T> {
        debug_assert_eq!(self.state.next_step(), Some(step));
        match outcome {
            Ok(value) => {
                self.state = step.target_state();
                tracing::debug!(%step, state = %self.state, "pivot step complete");
                Ok(value)
            }
            Err(source) => {
                let path = if step == PivotStep::OpenOldRoot {
                    Path::new(OLD_ROOT)
                } else {
                    self.new_root
                };
                let err = RootSwitchError::at_step(step, path, source);
                self.report(&err);
                Err(err)
            }
        }
    }

    fn report(&self, err: &RootSwitchError) {
        if self.syslog {
            crate::syslog::error(&err.to_string());
        }
        tracing::error!(
            new_root = %self.new_root.display(),
            state = %self.state,
            errno = err.os_error_code(),
            after_swap = err.is_after_swap(),
            error = %err,
            "pivot_root sequence failed"
        );
    }
}
