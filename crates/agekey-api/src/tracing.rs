//! Logging setup.
//!
//! Development gets pretty, human-readable output; production gets JSON lines
//! for log aggregation. `RUST_LOG` overrides the default filter in both.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Install the global subscriber for `env`.
///
/// # Development
/// - Pretty, multi-line output with file and line numbers
/// - Default filter: `debug`, with `hyper_util` and `reqwest` held at `info`
///
/// # Production
/// - One flattened JSON object per event, including the current span
///   (which carries the request id) and its parents
/// - Default filter: `info`
///
/// # Environment Variables
/// - `RUST_LOG`: replaces the default filter (e.g. `RUST_LOG=agekey_api=trace,info`)
///
/// Must be called at most once per process.
pub fn init_tracing(env: &Environment) {
    let filter = env_filter(env);

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(filter),
            )
            .init();
    }

    tracing::info!(environment = ?env, "Tracing initialized");
}

/// `RUST_LOG` when set and valid, otherwise the default for `env`.
fn env_filter(env: &Environment) -> EnvFilter {
    let default = if env.is_development() {
        DEVELOPMENT_FILTER
    } else {
        PRODUCTION_FILTER
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

const DEVELOPMENT_FILTER: &str = "debug,hyper_util=info,reqwest=info";
const PRODUCTION_FILTER: &str = "info";
