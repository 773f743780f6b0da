use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. Output goes to stderr so CSV and JSON on
/// stdout stay machine-readable. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    let default_filter = format!("nestegg={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {e}");
    }
}
