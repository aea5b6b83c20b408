//! Log output setup for processes embedding the client.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing-subscriber` fmt subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `info` with `debug`
/// on (so `[TX]`/`[RX]` trace lines show) and `warn` with it off.
///
/// Returns `false` if a global subscriber was already installed; calling
/// this more than once is harmless.
pub fn init(debug: bool) -> bool {
    let default = if debug { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
