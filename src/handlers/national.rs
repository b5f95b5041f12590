//! Endpoints over the national daily table.

use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;

use super::{answer, params, Shape};
use crate::query::QueryDescriptor;
use crate::state::AppState;
use crate::table::TableKind;

/// Handle GET /get_last_update requests
pub async fn last_update_handler(State(state): State<Arc<AppState>>) -> Response {
    answer(
        &state,
        "/get_last_update",
        TableKind::National,
        Ok(QueryDescriptor::LastUpdate),
        Shape::Single,
    )
    .await
}

/// Handle GET /get_full_dataset requests
pub async fn full_dataset_handler(State(state): State<Arc<AppState>>) -> Response {
    answer(
        &state,
        "/get_full_dataset",
        TableKind::National,
        Ok(QueryDescriptor::FullDataset),
        Shape::List,
    )
    .await
}

/// Handle GET /get_entry/{date} and /get_entry/{from}_until_{to} requests
pub async fn entry_handler(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
) -> Response {
    answer(
        &state,
        "/get_entry",
        TableKind::National,
        Ok(params::entry_query(&segment)),
        Shape::List,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, app_with, get};
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dates(body: &serde_json::Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|row| row["data"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_last_update() {
        let app = app();
        let (status, body) = get(&app, "/get_last_update").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"data": "10-04-2020", "confirmados": 1000, "obitos": 10})
        );
    }

    #[tokio::test]
    async fn test_last_update_on_empty_table() {
        let app = app_with("data,confirmados\n", "data,concelho\n");
        let (status, body) = get(&app, "/get_last_update").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "The dataset has no entries");
    }

    #[tokio::test]
    async fn test_full_dataset() {
        let app = app();
        let (status, body) = get(&app, "/get_full_dataset").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 10);
        assert_eq!(body[0]["data"], "01-04-2020");
    }

    #[tokio::test]
    async fn test_entry() {
        let app = app();
        let (status, body) = get(&app, "/get_entry/03-04-2020").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"data": "03-04-2020", "confirmados": 300, "obitos": 3}])
        );
    }

    #[tokio::test]
    async fn test_entry_not_found() {
        let app = app();
        for path in ["/get_entry/20-04-2020", "/get_entry/31-02-2020"] {
            let (status, body) = get(&app, path).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(body["error"].as_str().unwrap().starts_with("No entry found"));
        }
    }

    #[tokio::test]
    async fn test_range_in_either_order() {
        let app = app();
        let (status, forward) = get(&app, "/get_entry/03-04-2020_until_05-04-2020").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dates(&forward), vec!["03-04-2020", "04-04-2020", "05-04-2020"]);

        let (_, backward) = get(&app, "/get_entry/05-04-2020_until_03-04-2020").await;
        assert_eq!(forward, backward);
    }

    #[tokio::test]
    async fn test_range_not_found() {
        let app = app();
        let (status, body) = get(&app, "/get_entry/01-01-2020_until_31-01-2020").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No entries between 01-01-2020 and 31-01-2020");
    }
}
