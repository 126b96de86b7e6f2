//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize logging with `RUST_LOG` support.
///
/// Defaults to `hookup=info`, or `hookup=debug` when `verbose` is set.
/// Later calls are ignored, so tests can call it freely.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "hookup=debug" } else { "hookup=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
