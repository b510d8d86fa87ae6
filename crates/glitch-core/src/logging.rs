#![forbid(unsafe_code)]

//! Structured log output for hosts.
//!
//! Components log through `tracing` directly; this module only helps a
//! standalone host install a subscriber.

/// Install a JSON `tracing` subscriber filtered by `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed. Hosts that
/// embed components in a larger application should install their own
/// subscriber instead.
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
        .is_ok()
}
