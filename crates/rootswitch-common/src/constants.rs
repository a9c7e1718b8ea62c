//! System-wide constants and default paths.

/// Application name used in CLI output and log identities.
pub const APP_NAME: &str = "rootswitch";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "rootswitch";

/// Identity passed to `openlog(3)` unless configured otherwise.
pub const DEFAULT_SYSLOG_IDENT: &str = APP_NAME;

/// Permission bits for FIFOs created without an explicit mode.
pub const DEFAULT_FIFO_MODE: u32 = 0o600;

/// `tracing` target used by the trace probes.
pub const PROBE_TARGET: &str = "rootswitch::probe";

/// Default configuration file location.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/rootswitch/config.json";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "ROOTSWITCH_CONFIG";

/// Target path for `pivot_root(2)` and its `put_old` argument.
pub const CURRENT_DIR: &str = ".";

/// Path opened as the old root.
pub const OLD_ROOT: &str = "/";
