//! Endpoints over the per-county table.

use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;

use super::{answer, params, Shape};
use crate::query::QueryDescriptor;
use crate::state::AppState;
use crate::table::TableKind;

/// Handle GET /get_last_update_counties requests
pub async fn last_update_counties_handler(State(state): State<Arc<AppState>>) -> Response {
    answer(
        &state,
        "/get_last_update_counties",
        TableKind::Regional,
        Ok(QueryDescriptor::LastUpdate),
        Shape::List,
    )
    .await
}

/// Handle GET /get_last_update_specific_county/{county} requests
pub async fn last_update_county_handler(
    State(state): State<Arc<AppState>>,
    Path(county): Path<String>,
) -> Response {
    answer(
        &state,
        "/get_last_update_specific_county",
        TableKind::Regional,
        Ok(QueryDescriptor::LastUpdateCounty { county }),
        Shape::List,
    )
    .await
}

/// Handle GET /get_full_dataset_counties requests
pub async fn full_dataset_counties_handler(State(state): State<Arc<AppState>>) -> Response {
    answer(
        &state,
        "/get_full_dataset_counties",
        TableKind::Regional,
        Ok(QueryDescriptor::FullDataset),
        Shape::List,
    )
    .await
}

/// Handle GET /get_entry_counties/{date} and /get_entry_counties/{from}_until_{to} requests
pub async fn entry_counties_handler(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
) -> Response {
    answer(
        &state,
        "/get_entry_counties",
        TableKind::Regional,
        Ok(params::entry_query(&segment)),
        Shape::List,
    )
    .await
}

/// Handle GET /get_entry_county/{from}_until_{to}_{county} and /get_entry_county/{date}_{county} requests
pub async fn entry_county_handler(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
) -> Response {
    answer(
        &state,
        "/get_entry_county",
        TableKind::Regional,
        params::county_entry_query(&segment),
        Shape::List,
    )
    .await
}

/// Handle GET /get_county_list requests
pub async fn county_list_handler(State(state): State<Arc<AppState>>) -> Response {
    answer(
        &state,
        "/get_county_list",
        TableKind::Regional,
        Ok(QueryDescriptor::CountyList),
        Shape::List,
    )
    .await
}
