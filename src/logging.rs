use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "FAIRPLAY_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

/// Installs the global fmt subscriber. Logs go to stderr so JSON on stdout stays clean.
/// A second call is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
