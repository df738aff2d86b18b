use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber, once per process.
///
/// `RUST_LOG` takes precedence; otherwise `default_value` is used as the
/// filter directive, falling back to `info`.
/// Tests call it as `log_init(option_env!("RUST_LOG"))`.
///
/// A subscriber installed beforehand by the embedding application is
/// left in place.
pub fn log_init(default_value: Option<&str>) {
    LOG_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(default_value.unwrap_or(DEFAULT_FILTER))
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        });
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
        .with_test_writer()
        .compact();

    // fails only when a global subscriber already exists
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init();
}
