use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter for fixture logs.
pub const LOG_ENV: &str = "FIXTURE_TREE_LOG";

/// Install a `tracing` subscriber that writes through libtest's output
/// capture, filtered by `FIXTURE_TREE_LOG` (default `warn`).
///
/// Safe to call from every test: only the first call installs anything.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .compact()
        .try_init();
}
