//! Named pipes used by drivers for auxiliary signaling.

use std::path::{Path, PathBuf};

use rootswitch_common::error::{Result, RootSwitchError};

/// Creates a FIFO at `path` with `mode`, or `0o600` when `mode` is `None`.
///
/// The mode is subject to the process umask, as with `mkfifo(3)`.
///
/// # Errors
///
/// Returns an error if the FIFO cannot be created, for example because
/// `path` already exists or its parent directory is missing.
#[cfg(target_os = "linux")]
pub fn create_fifo(path: &Path, mode: Option<u32>) -> Result<PathBuf> {
    use nix::sys::stat::Mode;
    use rootswitch_common::constants::DEFAULT_FIFO_MODE;

    let mode = mode.unwrap_or(DEFAULT_FIFO_MODE);
    nix::unistd::mkfifo(path, Mode::from_bits_truncate(mode)).map_err(|e| {
        RootSwitchError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        }
    })?;
    let octal = format!("{mode:#o}");
    tracing::debug!(path = %path.display(), mode = %octal, "fifo created");
    Ok(path.to_path_buf())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error.
#[cfg(not(target_os = "linux"))]
pub fn create_fifo(_path: &Path, _mode: Option<u32>) -> Result<PathBuf> {
    Err(RootSwitchError::Unsupported { operation: "mkfifo" })
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    use super::*;

    #[test]
    fn creates_fifo_with_default_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ready.fifo");

        let created = create_fifo(&path, None).expect("mkfifo");
        assert_eq!(created, path);

        let meta = std::fs::metadata(&path).expect("stat");
        assert!(meta.file_type().is_fifo());
        assert_eq!(meta.permissions().mode() & 0o777 & !0o600, 0);
    }

    #[test]
    fn explicit_mode_never_widens_permissions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("signal");

        let _ = create_fifo(&path, Some(0o640)).expect("mkfifo");
        let mode = std::fs::metadata(&path).expect("stat").permissions().mode();
        assert_eq!(mode & 0o777 & !0o640, 0);
    }

    #[test]
    fn existing_path_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("taken");
        std::fs::write(&path, b"").expect("write");

        let err = create_fifo(&path, None).expect_err("should fail");
        assert!(matches!(err, RootSwitchError::Io { .. }));
        assert_eq!(err.os_error_code(), Some(libc::EEXIST));
    }

    #[test]
    fn missing_parent_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = create_fifo(&dir.path().join("no/such/dir/fifo"), Some(0o600))
            .expect_err("should fail");
        assert_eq!(err.os_error_code(), Some(libc::ENOENT));
    }
}
