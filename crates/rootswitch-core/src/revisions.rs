//! Compiled-in component revision table.

use std::collections::BTreeMap;
use std::sync::OnceLock;

const BUILD_REVISION: &str = match option_env!("ROOTSWITCH_BUILD_REVISION") {
    Some(revision) => revision,
    None => "unknown",
};

/// Component name and version pairs fixed at compile time.
pub const COMPONENTS: &[(&str, &str)] = &[
    ("rootswitch-common", rootswitch_common::VERSION),
    ("rootswitch-core", env!("CARGO_PKG_VERSION")),
    ("build", BUILD_REVISION),
];

static REVISIONS: OnceLock<BTreeMap<&'static str, &'static str>> = OnceLock::new();

/// Returns the component to version mapping.
///
/// The map is built on first use and never changes afterwards.
pub fn revisions() -> &'static BTreeMap<&'static str, &'static str> {
    REVISIONS.get_or_init(|| COMPONENTS.iter().copied().collect())
}
