//! End-to-end root switches inside throwaway mount namespaces.
//!
//! These need `CAP_SYS_ADMIN` and are ignored by default:
//! `cargo test -p rootswitch-core --test pivot_privileged -- --ignored --test-threads=1`
//!
//! Every switch runs in a forked child that first unshares its mount
//! namespace, so the test process and the host are never pivoted.

#![cfg(target_os = "linux")]
#![allow(
    unsafe_code,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::print_stderr
)]

use std::path::Path;

use nix::mount::{MsFlags, mount};
use nix::sched::{CloneFlags, unshare};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, fork};
use rootswitch_common::types::PivotStep;
use rootswitch_core::RootSwitcher;
use rootswitch_core::filesystem::mount::{is_mount_point, mount_points};

const MARKER: &str = "marker";

fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Runs `body` in a forked child and returns its exit code.
fn in_child(body: impl FnOnce() -> i32) -> i32 {
    // SAFETY: the child only runs `body` and leaves through `_exit`, never
    // returning into the test harness.
    match unsafe { fork() }.expect("fork") {
        ForkResult::Child => {
            let code = std::panic::catch_unwind(std::panic::AssertUnwindSafe(body)).unwrap_or(101);
            // SAFETY: terminating the forked child without running the
            // parent's atexit handlers.
            unsafe { libc::_exit(code) }
        }
        ForkResult::Parent { child } => match waitpid(child, None).expect("waitpid") {
            WaitStatus::Exited(_, code) => code,
            other => panic!("child ended abnormally: {other:?}"),
        },
    }
}

/// Unshares the mount namespace and isolates it from the parent.
fn private_namespace() {
    unshare(CloneFlags::CLONE_NEWNS).expect("unshare");
    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_REC | MsFlags::MS_PRIVATE,
        None::<&str>,
    )
    .expect("make / rprivate");
}

/// Mounts a tmpfs at `dir` holding a marker file and a bind of `/proc`.
fn prepare_new_root(dir: &Path) {
    mount(
        Some("tmpfs"),
        dir,
        Some("tmpfs"),
        MsFlags::empty(),
        None::<&str>,
    )
    .expect("mount tmpfs");
    std::fs::write(dir.join(MARKER), b"new root").expect("write marker");
    let proc_dir = dir.join("proc");
    std::fs::create_dir(&proc_dir).expect("mkdir proc");
    mount(
        Some("/proc"),
        &proc_dir,
        None::<&str>,
        MsFlags::MS_BIND | MsFlags::MS_REC,
        None::<&str>,
    )
    .expect("bind /proc");
}

#[test]
#[ignore = "requires CAP_SYS_ADMIN"]
fn pivot_switches_root_and_detaches_old_root() {
    if !is_root() {
        eprintln!("skipping: not running as root");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let new_root = dir.path().to_path_buf();

    let code = in_child(move || {
        private_namespace();
        prepare_new_root(&new_root);

        let mut switcher = RootSwitcher::new().with_syslog(false);
        if switcher.pivot_to(&new_root).is_err() {
            return 10;
        }
        if std::env::current_dir().ok().as_deref() != Some(Path::new("/")) {
            return 11;
        }
        if !Path::new("/").join(MARKER).exists() {
            return 12;
        }
        let Ok(points) = mount_points() else {
            return 13;
        };
        if !points
            .iter()
            .all(|p| p == Path::new("/") || p.starts_with("/proc"))
        {
            return 14;
        }
        0
    });
    assert_eq!(code, 0, "child failed with code {code}");
}

#[test]
#[ignore = "requires CAP_SYS_ADMIN"]
fn second_pivot_without_fresh_mount_fails() {
    if !is_root() {
        eprintln!("skipping: not running as root");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let new_root = dir.path().to_path_buf();

    let code = in_child(move || {
        private_namespace();
        prepare_new_root(&new_root);

        let mut switcher = RootSwitcher::new().with_syslog(false);
        if switcher.pivot_to(&new_root).is_err() {
            return 20;
        }
        match switcher.pivot_to(&new_root) {
            Ok(()) => 21,
            Err(e) if e.step() == Some(PivotStep::OpenNewRoot) => 0,
            Err(e) if e.step() == Some(PivotStep::SwapRoot) => 0,
            Err(_) => 22,
        }
    });
    assert_eq!(code, 0, "child failed with code {code}");
}

#[test]
#[ignore = "requires CAP_SYS_ADMIN"]
fn detaching_old_root_does_not_reach_sibling_namespace() {
    if !is_root() {
        eprintln!("skipping: not running as root");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let new_root = dir.path().to_path_buf();

    let code = in_child(move || {
        // Outer namespace: private from the host, shared within itself so
        // the inner namespace's copies join the same peer groups.
        private_namespace();
        prepare_new_root(&new_root);
        mount(
            None::<&str>,
            "/",
            None::<&str>,
            MsFlags::MS_REC | MsFlags::MS_SHARED,
            None::<&str>,
        )
        .expect("make / rshared");
        let before = mount_points().expect("mountinfo");

        let inner_root = new_root.clone();
        let inner = in_child(move || {
            unshare(CloneFlags::CLONE_NEWNS).expect("unshare inner");
            // pivot_root refuses a shared old root; slave keeps the peer
            // relationship in one direction only.
            mount(
                None::<&str>,
                "/",
                None::<&str>,
                MsFlags::MS_REC | MsFlags::MS_SLAVE,
                None::<&str>,
            )
            .expect("make / rslave");
            match RootSwitcher::new().with_syslog(false).pivot_to(&inner_root) {
                Ok(()) => 0,
                Err(_) => 30,
            }
        });
        if inner != 0 {
            return inner;
        }

        let Ok(after) = mount_points() else {
            return 31;
        };
        if after != before {
            return 32;
        }
        if !new_root.join(MARKER).exists() {
            return 33;
        }
        0
    });
    assert_eq!(code, 0, "child failed with code {code}");
}

#[test]
#[ignore = "requires CAP_SYS_ADMIN"]
fn switcher_keeps_old_root_unmount_out_of_shared_peers() {
    if !is_root() {
        eprintln!("skipping: not running as root");
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let peer = tempfile::tempdir().expect("tempdir");
    let new_root = dir.path().to_path_buf();
    let shared = peer.path().to_path_buf();

    let code = in_child(move || {
        private_namespace();
        prepare_new_root(&new_root);

        // A shared mount outside the new root with a submount. The inner
        // namespace's copy joins the same peer group, so only the
        // switcher's own rslave step keeps its detach from reaching here.
        mount(
            Some("tmpfs"),
            &shared,
            Some("tmpfs"),
            MsFlags::empty(),
            None::<&str>,
        )
        .expect("mount shared tmpfs");
        mount(
            None::<&str>,
            &shared,
            None::<&str>,
            MsFlags::MS_SHARED,
            None::<&str>,
        )
        .expect("make shared");
        let sub = shared.join("sub");
        std::fs::create_dir(&sub).expect("mkdir sub");
        mount(
            Some("tmpfs"),
            &sub,
            Some("tmpfs"),
            MsFlags::empty(),
            None::<&str>,
        )
        .expect("mount sub tmpfs");

        let inner_root = new_root.clone();
        let inner = in_child(move || {
            unshare(CloneFlags::CLONE_NEWNS).expect("unshare inner");
            match RootSwitcher::new().with_syslog(false).pivot_to(&inner_root) {
                Ok(()) => 0,
                Err(_) => 40,
            }
        });
        if inner != 0 {
            return inner;
        }

        match is_mount_point(&sub) {
            Ok(true) => 0,
            Ok(false) => 41,
            Err(_) => 42,
        }
    });
    assert_eq!(code, 0, "child failed with code {code}");
}
