//! Mount utilities for root switching.
//!
//! Propagation changes and lazy unmounts used by the `pivot_root`
//! sequence, a self bind mount for turning a plain directory into a
//! distinct mount, and a reader for `/proc/self/mountinfo`.

use std::io;
use std::path::{Path, PathBuf};

use rootswitch_common::error::{Result, RootSwitchError};

/// Mount table of the calling process.
pub const MOUNTINFO_PATH: &str = "/proc/self/mountinfo";

/// Makes the mount at `target` and everything below it slave mounts.
///
/// Events from the peer group still reach `target`, but nothing done
/// under it propagates back.
///
/// # Errors
///
/// Returns the raw OS error so callers can tag it with their own context.
#[cfg(target_os = "linux")]
pub fn make_rslave(target: &Path) -> io::Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        None::<&str>,
        target,
        None::<&str>,
        MsFlags::MS_SLAVE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(io::Error::from)?;
    tracing::debug!(target = %target.display(), "mount made rslave");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error; mount propagation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_rslave(_target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "mount propagation requires Linux",
    ))
}

/// Detaches the mount at `target` with `MNT_DETACH`.
///
/// # Errors
///
/// Returns the raw OS error so callers can tag it with their own context.
#[cfg(target_os = "linux")]
pub fn lazy_unmount(target: &Path) -> io::Result<()> {
    nix::mount::umount2(target, nix::mount::MntFlags::MNT_DETACH).map_err(io::Error::from)?;
    tracing::debug!(target = %target.display(), "mount detached");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error; unmounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn lazy_unmount(_target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unmounting requires Linux",
    ))
}

/// Recursively bind mounts `path` onto itself.
///
/// Afterwards `path` is a mount point of its own, which `pivot_root(2)`
/// requires of the new root.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn bind_mount_self(path: &Path) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some(path),
        path,
        None::<&str>,
        MsFlags::MS_BIND | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| RootSwitchError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    tracing::info!(path = %path.display(), "bind mounted onto itself");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error; bind mounts require Linux.
#[cfg(not(target_os = "linux"))]
pub fn bind_mount_self(_path: &Path) -> Result<()> {
    Err(RootSwitchError::Unsupported {
        operation: "bind mount",
    })
}

/// Extracts the mount points from `mountinfo` text.
///
/// Lines that do not have a mount point field are skipped. Octal escapes
/// (`\040` for space and friends) are decoded.
#[must_use]
pub fn parse_mountinfo(text: &str) -> Vec<PathBuf> {
    text.lines()
        .filter_map(|line| line.split_whitespace().nth(4))
        .map(|field| PathBuf::from(unescape_octal(field)))
        .collect()
}

fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits
                    .iter()
                    .fold(0_u16, |acc, d| acc * 8 + u16::from(d - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Lists the mount points visible to the calling process.
///
/// # Errors
///
/// Returns an error if `/proc/self/mountinfo` cannot be read.
pub fn mount_points() -> Result<Vec<PathBuf>> {
    let text = std::fs::read_to_string(MOUNTINFO_PATH).map_err(|e| RootSwitchError::Io {
        path: PathBuf::from(MOUNTINFO_PATH),
        source: e,
    })?;
    Ok(parse_mountinfo(&text))
}

/// Whether `path` is itself a mount point in the calling process.
///
/// # Errors
///
/// Returns an error if the mount table cannot be read or `path` cannot
/// be canonicalized.
pub fn is_mount_point(path: &Path) -> Result<bool> {
    let canonical = path.canonicalize().map_err(|e| RootSwitchError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(mount_points()?.iter().any(|p| *p == canonical))
}
