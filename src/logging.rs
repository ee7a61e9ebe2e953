//! Diagnostic output
//!
//! The binding always emits `tracing` events. A subscriber is only installed
//! when verbose output is requested, and never over one the host installed.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_VERBOSE_FILTER: &str = "luafann=debug";

/// Install the stderr subscriber if `config.verbose` is set.
///
/// Returns `true` if this call installed it.
pub fn init(config: &LoggingConfig) -> bool {
    if !config.verbose {
        return false;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_VERBOSE_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
