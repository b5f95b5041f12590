//! HTTP request handlers for the covidpt API.
//!
//! Each handler turns its path into a [`QueryDescriptor`], loads a fresh table
//! and hands both to the query engine.

pub mod heartbeat;
pub mod national;
pub mod params;
pub mod regional;
pub mod status;

pub use heartbeat::heartbeat_handler;
pub use status::status_handler;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::error::{CovidPtError, Result};
use crate::logging::{create_http_trace_layer, generate_request_id, log_request_error};
use crate::query::{execute, QueryDescriptor, QueryOutput};
use crate::state::AppState;
use crate::table::TableKind;

/// Build the route table
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_status", get(status_handler))
        .route("/heartbeat", get(heartbeat_handler))
        .route("/get_last_update", get(national::last_update_handler))
        .route("/get_full_dataset", get(national::full_dataset_handler))
        .route("/get_entry/:segment", get(national::entry_handler))
        .route(
            "/get_last_update_counties",
            get(regional::last_update_counties_handler),
        )
        .route(
            "/get_last_update_specific_county/:county",
            get(regional::last_update_county_handler),
        )
        .route(
            "/get_full_dataset_counties",
            get(regional::full_dataset_counties_handler),
        )
        .route(
            "/get_entry_counties/:segment",
            get(regional::entry_counties_handler),
        )
        .route(
            "/get_entry_county/:segment",
            get(regional::entry_county_handler),
        )
        .route("/get_county_list", get(regional::county_list_handler))
        .layer(create_http_trace_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// How a row result is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The last row as a bare object
    Single,
    /// Every row in an array
    List,
}

/// Status code for a failed request
pub fn status_for(error: &CovidPtError) -> StatusCode {
    if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else if error.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else if matches!(error, CovidPtError::InvalidParameter { .. }) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Run `query` against a fresh `kind` table and build the response
pub async fn answer(
    state: &AppState,
    endpoint: &'static str,
    kind: TableKind,
    query: Result<QueryDescriptor>,
    shape: Shape,
) -> Response {
    let request_id = generate_request_id();
    let start_time = Instant::now();

    let query = match query {
        Ok(query) => query,
        Err(error) => return error_response(error, endpoint, &request_id, None),
    };

    debug!(
        endpoint = endpoint,
        request_id = %request_id,
        kind = %kind,
        query = ?query,
        "Processing query"
    );

    match resolve(state, kind, &query, shape).await {
        Ok((response, count)) => {
            let duration = start_time.elapsed();
            info!(
                endpoint = endpoint,
                request_id = %request_id,
                query = query.name(),
                results = count,
                duration_us = duration.as_micros() as u64,
                "Query successful"
            );
            response
        }
        Err(error) => {
            let params = format!("{:?}", query);
            error_response(error, endpoint, &request_id, Some(params.as_str()))
        }
    }
}

async fn resolve(
    state: &AppState,
    kind: TableKind,
    query: &QueryDescriptor,
    shape: Shape,
) -> Result<(Response, usize)> {
    let table = state.loader.load(kind).await?;
    let output = execute(&table, query)?;

    // serialized straight from the rows so keys keep source column order
    let response = match (shape, &output) {
        (Shape::Single, QueryOutput::Rows(rows)) if !rows.is_empty() => {
            Json(rows[rows.len() - 1]).into_response()
        }
        _ => Json(&output).into_response(),
    };
    Ok((response, output.len()))
}

fn error_response(
    error: CovidPtError,
    endpoint: &str,
    request_id: &str,
    params: Option<&str>,
) -> Response {
    log_request_error(&error, endpoint, request_id, params);

    (
        status_for(&error),
        Json(serde_json::json!({
            "error": error.to_string(),
            "request_id": request_id
        })),
    )
        .into_response()
}
