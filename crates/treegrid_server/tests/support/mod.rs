//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use serde_json::json;
use treegrid_server::{create_app, AppState, Config, Engine};

pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        max_request_size: 1_000_000,
        event_log_limit: 100,
    }
}

pub(crate) fn test_server_for_state(state: AppState) -> TestServer {
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

/// Server with an empty engine.
pub(crate) fn setup_test_server() -> (TestServer, AppState) {
    let state = AppState::new(test_config(), Engine::new());
    (test_server_for_state(state.clone()), state)
}

/// Server seeded through the snapshot endpoint with:
///
/// ```text
/// 1
/// ├── 1-1
/// │   └── 1-1-1
/// └── 1-2
/// 2
/// ```
pub(crate) async fn setup_seeded_server() -> (TestServer, AppState) {
    let (server, state) = setup_test_server();
    server
        .post("/api/snapshot")
        .json(&json!({
            "config": [
                {"id": "name", "field": "name", "label": "Name", "type": "plain-text"},
                {"id": "budget", "field": "budget", "label": "Budget", "type": "numeric"},
                {"id": "tags", "field": "tags", "label": "Tags", "type": "multi-choice", "selectAll": true}
            ],
            "data": [
                {"id": "1", "parentId": null, "name": "Engineering"},
                {"id": "1-1", "parentId": "1", "name": "Platform"},
                {"id": "1-1-1", "parentId": "1-1", "name": "Storage"},
                {"id": "1-2", "parentId": "1", "name": "Apps"},
                {"id": "2", "parentId": null, "name": "Operations"}
            ]
        }))
        .await
        .assert_status_ok();
    (server, state)
}

pub(crate) fn ids(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}
