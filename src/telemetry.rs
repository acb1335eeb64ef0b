//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The filter comes from `SEAWALL_LOG`, then `RUST_LOG`, then falls back
/// to `info`. Calling this more than once is harmless; later calls leave
/// the installed subscriber in place.
pub fn init() {
    let filter = EnvFilter::try_from_env("SEAWALL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
