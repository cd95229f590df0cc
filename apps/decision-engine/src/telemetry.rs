//! Console tracing setup.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with environment filter.
///
/// Defaults to `info` for this crate when `RUST_LOG` is unset. All
/// diagnostics go to stderr so stdout stays reserved for command
/// output (previews, reports).
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("decision_engine=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
