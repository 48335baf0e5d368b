//! Logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber filtered by `level`
/// (e.g. `info` or `commodity_dash=debug`). An unparsable directive falls
/// back to `info`.
pub fn init(level: &str) {
    let env = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .try_init();
}
