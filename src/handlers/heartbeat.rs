//! Heartbeat endpoint handler.
//!
//! Returns server identity, uptime and the configured dataset sources. It never
//! touches the sources themselves, so it stays cheap and answers even when the
//! upstream is down.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use crate::state::AppState;
use crate::table::TableKind;

/// Server ID, unique per process
static SERVER_ID: once_cell::sync::Lazy<String> =
    once_cell::sync::Lazy::new(|| Uuid::new_v4().to_string());

/// Heartbeat response structure
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    /// Server ID (unique per instance)
    pub server_id: String,
    /// Current timestamp (ISO 8601 format)
    pub timestamp: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Where each table is loaded from
    pub sources: SourcesInfo,
    /// Seconds a loaded table is reused, 0 when every request refetches
    pub cache_ttl_seconds: u64,
    /// Server status
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SourcesInfo {
    pub national: String,
    pub regional: String,
}

/// Handle GET /heartbeat requests
pub async fn heartbeat_handler(State(state): State<Arc<AppState>>) -> Json<HeartbeatResponse> {
    let now = SystemTime::now();
    let timestamp = chrono::DateTime::<chrono::Utc>::from(now)
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    let uptime = now
        .duration_since(state.started_at)
        .unwrap_or(Duration::from_secs(0));

    Json(HeartbeatResponse {
        server_id: SERVER_ID.clone(),
        timestamp,
        uptime_seconds: uptime.as_secs(),
        sources: SourcesInfo {
            national: state.loader.source(TableKind::National).to_string(),
            regional: state.loader.source(TableKind::Regional).to_string(),
        },
        cache_ttl_seconds: state.loader.cache_ttl().as_secs(),
        status: "healthy".to_string(),
    })
}
