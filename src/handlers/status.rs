//! Status probe.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Handle GET /get_status requests
pub async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Server is OK",
    })
}
