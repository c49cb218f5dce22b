use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_INIT: Once = Once::new();

/// Default filter used when neither `RUST_LOG` nor an override is set
pub const DEFAULT_LOG_FILTER: &str = "info,tessera_authn=info,tessera_crypto=info";

/// Install the global tracing subscriber, once per process.
///
/// The filter is taken, in order, from `rust_log_override`, the `RUST_LOG`
/// environment variable, then [`DEFAULT_LOG_FILTER`].
/// Subsequent calls are no-ops, which lets every test call it freely.
pub fn log_init(rust_log_override: Option<&str>) {
    LOG_INIT.call_once(|| {
        let filter = rust_log_override
            .map(EnvFilter::new)
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));
        tracing_setup(filter);
    });
}

fn tracing_setup(filter: EnvFilter) {
    let format = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .compact();

    // another subscriber may already be installed by the host process
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
    {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
