/*!
 * Structured Tracing
 * Log setup for the coordinator and worker binaries using the tracing crate
 */

use crate::core::config::RunConfig;
use tracing::{info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Environment variable enabling JSON log output
pub const TRACE_JSON_ENV: &str = "OSS_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - OSS_TRACE_JSON: Enable JSON output (default: false)
///
/// Logs go to stderr; stdout is reserved for reports. Calling this twice is
/// harmless, the second subscriber is not installed.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with a fallback filter used when RUST_LOG is unset
pub fn init_tracing_with_default(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if result.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one coordinator run
pub fn span_run(config: &RunConfig, segment: Option<&str>) -> Span {
    span!(
        Level::INFO,
        "run",
        pid = std::process::id(),
        total = config.total_workers,
        ceiling = config.max_concurrent,
        segment = segment.unwrap_or("local"),
    )
}
