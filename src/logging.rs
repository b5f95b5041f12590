//! Logging utilities for the covidpt server.
//!
//! This module provides structured logging functionality to make logs more
//! searchable, analyzable, and useful for production deployments.

use std::time::Duration;
use tracing::{error, info, warn, Level};

use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use uuid::Uuid;

use crate::error::CovidPtError;
use crate::table::Table;

/// Creates the tracing layer for HTTP request/response logging
pub fn create_http_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
> {
    let response_formatter = DefaultOnResponse::new()
        .level(Level::DEBUG)
        .latency_unit(LatencyUnit::Micros);

    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(response_formatter)
}

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Log a summary of a freshly parsed table
pub fn log_table_load_stats(source: &str, table: &Table, elapsed: Duration) {
    let (first, last) = match table.date_span() {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };

    info!(
        operation = "table_load",
        source = source,
        kind = %table.kind(),
        rows = table.len(),
        skipped = table.skipped(),
        columns = table.columns().count(),
        first_date = %first,
        last_date = %last,
        duration_ms = elapsed.as_secs_f64() * 1000.0,
        "Table loaded"
    );
}

/// Level a failed request is logged at: client mistakes are `WARN`,
/// upstream and internal failures are `ERROR`
pub fn request_error_level(error: &CovidPtError) -> Level {
    if error.is_not_found() || matches!(error, CovidPtError::InvalidParameter { .. }) {
        Level::WARN
    } else {
        Level::ERROR
    }
}

/// Log an error that occurred during request processing
pub fn log_request_error(
    error: &CovidPtError,
    endpoint: &str,
    request_id: &str,
    params: Option<&str>,
) {
    let params = params.unwrap_or("none");
    if request_error_level(error) == Level::WARN {
        warn!(
            error = %error,
            endpoint = endpoint,
            request_id = request_id,
            params = params,
            "Request rejected"
        );
    } else {
        error!(
            error = %error,
            endpoint = endpoint,
            request_id = request_id,
            params = params,
            "Request processing error"
        );
    }
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
