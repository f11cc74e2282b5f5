use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so query output on stdout stays machine readable.
pub fn init_tracing_with_level(level: &str) {
    // Prefer RUST_LOG from env, otherwise use the configured level.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
