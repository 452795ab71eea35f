//! Unit tests for the `tgctl` CLI entrypoint module.

use super::{
    api_url, describe_event, error_message_for_response, format_columns_output,
    format_events_output, format_rows_output, format_tree_output, normalize_server,
    parse_field_assignments, parse_value_arg, read_import_file, resolve_server,
};
use super::{Cli, Commands};
use clap::Parser;
use serde_json::json;
use treegrid_core::env::{env_lock, EnvGuard};
use treegrid_core::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};

#[test]
fn normalize_server_matrix() {
    let cases = [
        (
            DEFAULT_CLI_SERVER_URL.to_string(),
            format!("http://127.0.0.1:{}", DEFAULT_PORT),
        ),
        (
            format!("https://localhost:{}", DEFAULT_PORT),
            format!("https://localhost:{}", DEFAULT_PORT),
        ),
        (
            format!("http://127.0.0.1:{}/", DEFAULT_PORT),
            format!("http://127.0.0.1:{}", DEFAULT_PORT),
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(normalize_server(input), expected);
    }
}

#[test]
fn default_cli_server_url_uses_default_port_constant() {
    assert_eq!(
        DEFAULT_CLI_SERVER_URL,
        format!("http://localhost:{}", DEFAULT_PORT)
    );
}

#[test]
fn resolve_server_treats_blank_override_as_absent() {
    assert_eq!(resolve_server(None), DEFAULT_CLI_SERVER_URL);
    assert_eq!(resolve_server(Some("   ".to_string())), DEFAULT_CLI_SERVER_URL);
    assert_eq!(
        resolve_server(Some(" http://127.0.0.1:9 ".to_string())),
        "http://127.0.0.1:9"
    );
}

#[test]
fn tg_server_env_value_is_used() {
    let _lock = env_lock().lock().expect("env lock");
    let _server = EnvGuard::set("TG_SERVER", "http://127.0.0.1:47777");
    let cli = Cli::parse_from(["tgctl", "rows"]);
    assert_eq!(resolve_server(cli.server), "http://127.0.0.1:47777");
}

#[test]
fn error_message_for_response_prefers_json_error_field() {
    let status = reqwest::StatusCode::CONFLICT;
    let message = error_message_for_response(
        status,
        r#"{"error":"Moving '1' under '1-1' would create a cycle"}"#,
    );
    assert_eq!(message, "Moving '1' under '1-1' would create a cycle");
}

#[test]
fn error_message_for_response_uses_reason_for_empty_body() {
    let status = reqwest::StatusCode::BAD_REQUEST;
    let message = error_message_for_response(status, "   ");
    assert_eq!(message, "Bad Request");
    assert_eq!(
        error_message_for_response(status, "plain text"),
        "plain text"
    );
}

#[test]
fn api_url_encodes_path_segments() {
    let url = api_url(
        &format!("http://127.0.0.1:{}", DEFAULT_PORT),
        &["api", "records", "id/with?reserved#chars", "field"],
    )
    .expect("api_url should build");
    assert_eq!(
        url.as_str(),
        &format!(
            "http://127.0.0.1:{}/api/records/id%2Fwith%3Freserved%23chars/field",
            DEFAULT_PORT
        )
    );
}

#[test]
fn api_url_appends_segments_to_existing_base_path() {
    let url = api_url(
        &format!("http://127.0.0.1:{}/base", DEFAULT_PORT),
        &["api", "rows"],
    )
    .expect("api_url should build");
    assert_eq!(
        url.as_str(),
        &format!("http://127.0.0.1:{}/base/api/rows", DEFAULT_PORT)
    );
    assert!(api_url("not a url", &["api"]).is_err());
}

#[test]
fn value_args_parse_as_json_when_possible() {
    assert_eq!(parse_value_arg("20000"), json!(20000));
    assert_eq!(parse_value_arg("null"), json!(null));
    assert_eq!(parse_value_arg(r#"["a","b"]"#), json!(["a", "b"]));
    assert_eq!(parse_value_arg("Operations"), json!("Operations"));
    assert_eq!(parse_value_arg(""), json!(""));
}

#[test]
fn field_assignments_require_key_and_equals() {
    let data = parse_field_assignments(&["name=Ops".to_string(), "budget=10".to_string()])
        .expect("valid assignments");
    assert_eq!(data.get("name"), Some(&json!("Ops")));
    assert_eq!(data.get("budget"), Some(&json!(10)));
    assert_eq!(
        data.keys().collect::<Vec<_>>(),
        vec!["name", "budget"],
        "insertion order kept"
    );

    assert!(parse_field_assignments(&["novalue".to_string()]).is_err());
    assert!(parse_field_assignments(&["=1".to_string()]).is_err());
}

#[test]
fn rows_output_indents_by_depth() {
    let rows = json!([
        {"id": "1", "parentId": null, "name": "Engineering", "depth": 0, "childCount": 2, "expanded": true},
        {"id": "1-1", "parentId": "1", "name": "Platform", "depth": 1, "childCount": 1, "expanded": false},
        {"id": "1-2", "parentId": "1", "depth": 1, "childCount": 0, "expanded": false},
        {"id": "2", "parentId": null, "name": "Operations", "depth": 0, "childCount": 0, "expanded": false}
    ]);
    let rendered = format_rows_output(&rows, false).expect("rows render");
    assert_eq!(
        rendered,
        "- 1 Engineering\n  + 1-1 Platform\n    1-2\n  2 Operations"
    );

    assert!(format_rows_output(&json!([{"id": "1"}]), false).is_err());
    let as_json = format_rows_output(&rows, true).expect("json render");
    let parsed: serde_json::Value = serde_json::from_str(&as_json).expect("valid json");
    assert_eq!(parsed, rows);
}

#[test]
fn tree_output_walks_children() {
    let tree = json!([
        {"id": "1", "name": "Engineering", "children": [
            {"id": "1-1", "name": "Platform", "children": []}
        ]},
        {"id": "2", "children": []}
    ]);
    let rendered = format_tree_output(&tree, false).expect("tree render");
    assert_eq!(rendered, "1 Engineering\n  1-1 Platform\n2");
}

#[test]
fn columns_output_lists_field_type_label() {
    let columns = json!([
        {"id": "budget", "field": "budget", "label": "Budget", "type": "numeric"}
    ]);
    let rendered = format_columns_output(&columns, false).expect("columns render");
    assert!(rendered.starts_with("budget"));
    assert!(rendered.contains("numeric"));
    assert!(rendered.ends_with("Budget"));
}

#[test]
fn describe_event_matrix() {
    let cases = [
        (
            json!({"type": "NODE_DATA_UPDATED", "payload": {"nodeId": "2", "field": "budget", "newValue": 20000}}),
            "Updated 2.budget = 20000",
        ),
        (
            json!({"type": "NODE_MOVED", "payload": {"nodeId": "1-1", "oldParentId": "1", "newParentId": null, "newIndex": 0}}),
            "Moved 1-1 under (root) at 0",
        ),
        (
            json!({"type": "NODE_CREATED", "payload": {"nodeId": "9", "parentId": null, "initialData": {}}}),
            "Created 9",
        ),
        (
            json!({"type": "NODE_DELETED", "payload": {"targetNodeId": "1", "allRemovedNodeIds": ["1", "1-1"]}}),
            "Deleted 1 (2 records)",
        ),
        (
            json!({"type": "CONFIG_UPDATED", "payload": {"newConfig": []}}),
            "Replaced columns (0)",
        ),
        (
            json!({"type": "DATA_IMPORTED", "payload": {"data": [{"id": "a"}], "config": []}}),
            "Imported 1 records",
        ),
    ];
    for (event, expected) in cases {
        assert_eq!(describe_event(&event), expected);
    }
}

#[test]
fn events_output_prefixes_sequence() {
    let events = json!([
        {"seq": 7, "type": "NODE_CREATED", "payload": {"nodeId": "a"}}
    ]);
    let rendered = format_events_output(&events, false).expect("events render");
    assert_eq!(rendered, "     7 Created a");
}

#[test]
fn import_file_requires_data_array() {
    let dir = tempfile::tempdir().expect("temp dir");
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"{"config": [], "data": [{"id": "1"}]}"#).expect("write");
    assert_eq!(
        read_import_file(&good).expect("valid import")["data"][0]["id"],
        "1"
    );

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"config": []}"#).expect("write");
    assert!(read_import_file(&bad)
        .expect_err("missing data")
        .contains("'data'"));

    assert!(read_import_file(&dir.path().join("missing.json")).is_err());
}

#[test]
fn cli_parses_move_and_create() {
    let cli = Cli::try_parse_from(["tgctl", "move", "1-1", "--index", "2"]).expect("move parses");
    match cli.command {
        Commands::Move { id, parent, index } => {
            assert_eq!(id, "1-1");
            assert_eq!(parent, None);
            assert_eq!(index, 2);
        }
        _ => panic!("expected move command"),
    }

    let cli = Cli::try_parse_from([
        "tgctl", "create", "--parent", "1", "-f", "name=New", "-f", "budget=5",
    ])
    .expect("create parses");
    match cli.command {
        Commands::Create { id, parent, fields } => {
            assert_eq!(id, None);
            assert_eq!(parent.as_deref(), Some("1"));
            assert_eq!(fields, vec!["name=New", "budget=5"]);
        }
        _ => panic!("expected create command"),
    }
}
