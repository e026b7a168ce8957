//! REST integration test macro for record stores.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that run
//! list requests through the full stack:
//! JSON → HTTP request → handler → engine → RecordStore → HTTP response → JSON.

/// Generate a REST integration test suite for a record store backend.
///
/// `$seeded_store` must be an async fn taking `Vec<TestTask>` and returning
/// an `impl RecordStore<TestTask>` holding exactly those tasks.
///
/// # Generated Tests
///
/// ## Envelope and paging
/// - `test_rest_health`: /health and /healthz answer
/// - `test_rest_second_page_of_open_tasks`: 25 open / 10 closed, page 2 of 10
/// - `test_rest_single_page_of_closed_tasks`: 10 closed fit one page
/// - `test_rest_beyond_last_page`: empty data, metadata intact
/// - `test_rest_get_with_query_string`: GET form of the same query
/// - `test_rest_get_query_keys_are_filters`: `?status=closed`
/// - `test_rest_mistyped_sort_uses_default`: non-string sort parts
/// - `test_rest_empty_body_uses_defaults`: PATCH without a body
/// - `test_rest_limit_is_capped`: limit above max_limit
///
/// ## Error handling
/// - `test_rest_malformed_body`: 400 INVALID_BODY
/// - `test_rest_unknown_filter`: 400 VALIDATION_ERROR
/// - `test_rest_get_unknown_filter`: same policy for query keys
/// - `test_rest_unknown_collection`: 404 COLLECTION_NOT_FOUND
#[macro_export]
macro_rules! rest_integration_tests {
    ($seeded_store:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use pagequery::config::QueryConfig;
            use serde_json::{Value, json};
            use std::sync::Arc;

            async fn make_server() -> TestServer {
                let store = $seeded_store(seed_tasks()).await;
                let router = storage_harness::integration::build_test_router(
                    Arc::new(store),
                    QueryConfig::default(),
                );
                TestServer::new(router).unwrap()
            }

            fn data_ids(body: &Value) -> Vec<String> {
                body["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|t| t["id"].as_str().unwrap().to_string())
                    .collect()
            }

            #[tokio::test]
            async fn test_rest_health() {
                let server = make_server().await;

                for path in ["/health", "/healthz"] {
                    let response = server.get(path).await;
                    response.assert_status_ok();
                    let body: Value = response.json();
                    assert_eq!(body, json!({"status": "ok", "service": "pagequery"}));
                }
            }

            #[tokio::test]
            async fn test_rest_second_page_of_open_tasks() {
                let server = make_server().await;

                let response = server
                    .patch("/test_tasks")
                    .json(&json!({
                        "filters": {"status": "open"},
                        "page": 2,
                        "limit": 10
                    }))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(
                    body["pagination"],
                    json!({"current": 2, "limit": 10, "records": 25, "pages": 3})
                );
                let data = body["data"].as_array().unwrap();
                assert_eq!(data.len(), 10);
                assert!(data.iter().all(|t| t["status"] == "open"));
            }

            #[tokio::test]
            async fn test_rest_single_page_of_closed_tasks() {
                let server = make_server().await;

                let response = server
                    .patch("/test_tasks")
                    .json(&json!({
                        "filters": {"status": "closed"},
                        "page": 1,
                        "limit": 10
                    }))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(
                    body["pagination"],
                    json!({"current": 1, "limit": 10, "records": 10, "pages": 1})
                );
                let data = body["data"].as_array().unwrap();
                assert_eq!(data.len(), 10);
                assert!(data.iter().all(|t| t["status"] == "closed"));
            }

            #[tokio::test]
            async fn test_rest_beyond_last_page() {
                let server = make_server().await;

                let response = server
                    .patch("/test_tasks")
                    .json(&json!({"status": "open", "page": 4, "limit": 10}))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"], json!([]));
                assert_eq!(
                    body["pagination"],
                    json!({"current": 4, "limit": 10, "records": 25, "pages": 3})
                );
            }

            #[tokio::test]
            async fn test_rest_get_with_query_string() {
                let server = make_server().await;

                let patch: Value = server
                    .patch("/test_tasks")
                    .json(&json!({
                        "filters": {"status": "open"},
                        "sort": {"field": "title", "direction": "asc"},
                        "page": 2,
                        "limit": 5
                    }))
                    .await
                    .json();

                let get: Value = server
                    .get("/test_tasks")
                    .add_query_param("filter", r#"{"status":"open"}"#)
                    .add_query_param("sort", "title:asc")
                    .add_query_param("page", 2)
                    .add_query_param("limit", 5)
                    .await
                    .json();

                assert_eq!(get["pagination"], patch["pagination"]);
                assert_eq!(data_ids(&get), data_ids(&patch));
                assert_eq!(get["data"][0]["title"], "Task 06");
            }

            #[tokio::test]
            async fn test_rest_get_query_keys_are_filters() {
                let server = make_server().await;

                let response = server
                    .get("/test_tasks")
                    .add_query_param("status", "closed")
                    .add_query_param("priority", 3)
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                // closed tasks are 26..=35; priority is n % 5
                assert_eq!(body["pagination"]["records"], 2);
                let data = body["data"].as_array().unwrap();
                assert!(data.iter().all(|t| t["status"] == "closed" && t["priority"] == 3));

                let closed: Value = server
                    .get("/test_tasks")
                    .add_query_param("status", "closed")
                    .await
                    .json();
                assert_eq!(closed["pagination"]["records"], 10);
            }

            #[tokio::test]
            async fn test_rest_mistyped_sort_uses_default() {
                let server = make_server().await;

                for sort in [
                    json!({"field": "title", "direction": 5}),
                    json!({"field": 7, "direction": "asc"}),
                    json!(5),
                ] {
                    let response = server
                        .patch("/test_tasks")
                        .json(&json!({"sort": sort, "limit": 1}))
                        .await;

                    response.assert_status_ok();
                    let body: Value = response.json();
                    assert_eq!(body["pagination"]["records"], 35);
                    assert_eq!(body["data"].as_array().unwrap().len(), 1);
                }

                // missing direction falls back to desc
                let by_title: Value = server
                    .patch("/test_tasks")
                    .json(&json!({"sort": {"field": "title", "direction": 5}, "limit": 1}))
                    .await
                    .json();
                assert_eq!(by_title["data"][0]["title"], "Task 35");

                // mistyped field falls back to created_at, here ascending
                let by_default: Value = server
                    .patch("/test_tasks")
                    .json(&json!({"sort": {"field": 7, "direction": "asc"}, "limit": 1}))
                    .await
                    .json();
                assert_eq!(by_default["data"][0]["title"], "Task 01");
            }

            #[tokio::test]
            async fn test_rest_empty_body_uses_defaults() {
                let server = make_server().await;

                let response = server.patch("/test_tasks").await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(
                    body["pagination"],
                    json!({"current": 1, "limit": 20, "records": 35, "pages": 2})
                );
                // default sort: created_at descending
                assert_eq!(body["data"][0]["title"], "Task 35");
            }

            #[tokio::test]
            async fn test_rest_limit_is_capped() {
                let server = make_server().await;

                let body: Value = server
                    .patch("/test_tasks")
                    .json(&json!({"limit": 1000, "page": "nonsense"}))
                    .await
                    .json();

                assert_eq!(body["pagination"]["limit"], 100);
                assert_eq!(body["pagination"]["current"], 1);
                assert_eq!(body["data"].as_array().unwrap().len(), 35);
            }

            #[tokio::test]
            async fn test_rest_malformed_body() {
                let server = make_server().await;

                let response = server
                    .patch("/test_tasks")
                    .text(r#"{"page": 2,"#)
                    .content_type("application/json")
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "INVALID_BODY");
            }

            #[tokio::test]
            async fn test_rest_unknown_filter() {
                let server = make_server().await;

                let response = server
                    .patch("/test_tasks")
                    .json(&json!({"filters": {"password": "hunter2"}}))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
                assert_eq!(body["message"], "Invalid filter field: password");
                assert_eq!(body["details"]["field"], "password");
            }

            #[tokio::test]
            async fn test_rest_get_unknown_filter() {
                let server = make_server().await;

                let response = server
                    .get("/test_tasks")
                    .add_query_param("password", "x")
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
                assert_eq!(body["details"]["field"], "password");
            }

            #[tokio::test]
            async fn test_rest_unknown_collection() {
                let server = make_server().await;

                let response = server.patch("/users").json(&json!({})).await;

                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["code"], "COLLECTION_NOT_FOUND");
                assert_eq!(body["details"]["collection"], "users");
            }
        }
    };
}
