use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console-only logging, used when observability is switched off.
///
/// - **Log Level**: `LOG_LEVEL` (default "info"), overridden entirely by `RUST_LOG`
/// - **Filtering**: noisy dependencies held at warn
/// - **Format**: compact, with ANSI colors
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&log_level)));

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_filter(env_filter);

    // try_init: a subscriber may already be installed (tests, embedding).
    let _ = tracing_subscriber::registry().with(console_layer).try_init();

    eprintln!(
        "ℹ️  Observability disabled - console logging only (OBSERVABILITY_ENABLED=false or feature not compiled)"
    );
}

/// Filter directives for our own crates at `level`, dependencies at warn.
pub(crate) fn default_directives(level: &str) -> String {
    format!(
        "civicwatch={level},civicwatch_auth={level},civicwatch_ratelimit={level},civicwatch_db={level},tower_http=warn,hyper=warn,h2=warn,sqlx=warn"
    )
}
