use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr; stdout is the protocol channel.
/// `RUST_LOG` wins over `fallback` (the configured `LOG_LEVEL`).
pub fn init(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
