//! Trace probes for external timing analysis.
//!
//! Drivers call these at interesting points of container startup. Each
//! probe becomes a `tracing` event on the [`PROBE_TARGET`] target, so a
//! subscriber can route them wherever the tracer expects them.

use std::time::Duration;

use rootswitch_common::constants::PROBE_TARGET;
use rootswitch_common::types::ProbePayload;

/// Reads `CLOCK_BOOTTIME`, which keeps counting across suspend.
///
/// Returns `None` if the clock is unavailable.
#[cfg(target_os = "linux")]
pub fn boottime() -> Option<Duration> {
    use nix::time::{ClockId, clock_gettime};

    clock_gettime(ClockId::CLOCK_BOOTTIME)
        .map(Duration::from)
        .ok()
}

/// Stub for non-Linux platforms.
#[cfg(not(target_os = "linux"))]
pub fn boottime() -> Option<Duration> {
    None
}

/// Emits a boot-time probe tagged with `flag`.
pub fn probe_boottime(flag: i64) {
    match boottime() {
        Some(elapsed) => tracing::info!(
            target: PROBE_TARGET,
            flag,
            sec = elapsed.as_secs(),
            nsec = elapsed.subsec_nanos(),
            "probe-boottime"
        ),
        None => tracing::info!(target: PROBE_TARGET, flag, "probe-boottime: clock unavailable"),
    }
}

/// Emits a probe tagged with `flag` carrying `payload`.
pub fn probe(flag: i64, payload: &ProbePayload) {
    match payload {
        ProbePayload::Integer(value) => {
            tracing::info!(target: PROBE_TARGET, flag, value = *value, "probe-misc");
        }
        ProbePayload::Text(value) => {
            tracing::info!(target: PROBE_TARGET, flag, value = value.as_str(), "probe-misc");
        }
        ProbePayload::Opaque(type_name) => {
            tracing::info!(target: PROBE_TARGET, flag, opaque = *type_name, "probe-misc");
        }
    }
}
