//! Command-line client for the TreeGrid API.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use treegrid_core::DEFAULT_CLI_SERVER_URL;

#[cfg(test)]
mod tests;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "tgctl", about = "TreeGrid CLI", version)]
struct Cli {
    /// Server URL (can also be set via TG_SERVER env var)
    #[arg(short, long, env = "TG_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show rows visible under the current expansion state
    Rows,
    /// Show the full hierarchy
    Tree,
    /// Print one record
    Get { id: String },
    /// Create a record
    Create {
        /// Record id (generated by the server when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Parent record id (root when omitted)
        #[arg(short, long)]
        parent: Option<String>,
        /// Initial field as KEY=VALUE; VALUE is parsed as JSON when possible
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Set one field (dotted paths allowed); VALUE is parsed as JSON when possible
    Set {
        id: String,
        field: String,
        value: String,
    },
    /// Move a record under a new parent at a sibling index
    Move {
        id: String,
        /// New parent id (root when omitted)
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
    /// Delete a record and its descendants
    Delete { id: String },
    /// Expand or collapse a record
    Toggle { id: String },
    /// List the column schema
    Columns,
    /// Export a snapshot of columns and records
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace records (and columns, when present) from a snapshot file
    Import { file: PathBuf },
    /// List events recorded by the server
    Events {
        /// Only show events after this sequence number
        #[arg(long)]
        since: Option<u64>,
    },
}

fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

fn log_timing_parts(timing: bool, label: &str, request: Duration, parse: Option<Duration>) {
    if !timing {
        return;
    }
    if let Some(parse) = parse {
        let total = request + parse;
        eprintln!(
            "[timing] {}: request {:.1} ms, parse {:.1} ms, total {:.1} ms",
            label,
            request.as_secs_f64() * 1000.0,
            parse.as_secs_f64() * 1000.0,
            total.as_secs_f64() * 1000.0
        );
    } else {
        log_timing(timing, label, request);
    }
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

fn exit_with(action: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

async fn ensure_success_or_exit(res: reqwest::Response, action: &str) -> reqwest::Response {
    let status = res.status();
    if status.is_success() {
        return res;
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    eprintln!("{} failed ({}): {}", action, status, message);
    std::process::exit(1);
}

/// Send a request and decode its JSON body, exiting on non-2xx responses.
async fn send_json(
    request: reqwest::RequestBuilder,
    action: &str,
    timing: bool,
) -> CliResult<Value> {
    let request_start = Instant::now();
    let res = request.send().await?;
    let request_elapsed = request_start.elapsed();
    let res = ensure_success_or_exit(res, action).await;

    let parse_start = Instant::now();
    let value: Value = res.json().await?;
    let parse_elapsed = parse_start.elapsed();

    log_timing_parts(
        timing,
        &action.to_ascii_lowercase(),
        request_elapsed,
        Some(parse_elapsed),
    );
    Ok(value)
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn api_url_or_exit(server: &str, action: &str, segments: &[&str]) -> reqwest::Url {
    api_url(server, segments).unwrap_or_else(|message| exit_with(action, message))
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn resolve_server(server: Option<String>) -> String {
    server
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

/// Interpret a command-line value: valid JSON as-is, anything else as a string.
fn parse_value_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_field_assignments(fields: &[String]) -> Result<Map<String, Value>, String> {
    let mut data = Map::new();
    for assignment in fields {
        let Some((key, raw)) = assignment.split_once('=') else {
            return Err(format!("expected KEY=VALUE, got '{}'", assignment));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing field name in '{}'", assignment));
        }
        data.insert(key.to_string(), parse_value_arg(raw));
    }
    Ok(data)
}

fn render_json(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("response encoding error: {}", err))
}

fn record_label(record: &Value) -> &str {
    record.get("name").and_then(Value::as_str).unwrap_or("")
}

fn format_rows_output(rows: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(rows);
    }
    let rows = rows
        .as_array()
        .ok_or_else(|| "response is not a list of rows".to_string())?;

    let mut lines = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let (Some(id), Some(depth)) = (
            row.get("id").and_then(Value::as_str),
            row.get("depth").and_then(Value::as_u64),
        ) else {
            return Err(format!("row {} missing 'id' or 'depth' field", index));
        };
        let children = row.get("childCount").and_then(Value::as_u64).unwrap_or(0);
        let expanded = row.get("expanded").and_then(Value::as_bool).unwrap_or(false);
        let marker = match (children, expanded) {
            (0, _) => ' ',
            (_, true) => '-',
            (_, false) => '+',
        };
        let indent = "  ".repeat(depth as usize);
        let line = format!("{}{} {} {}", indent, marker, id, record_label(row));
        lines.push(line.trim_end().to_string());
    }
    Ok(lines.join("\n"))
}

fn push_tree_lines(nodes: &[Value], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        let id = node.get("id").and_then(Value::as_str).unwrap_or("?");
        let line = format!("{}{} {}", "  ".repeat(depth), id, record_label(node));
        lines.push(line.trim_end().to_string());
        if let Some(children) = node.get("children").and_then(Value::as_array) {
            push_tree_lines(children, depth + 1, lines);
        }
    }
}

fn format_tree_output(tree: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(tree);
    }
    let roots = tree
        .as_array()
        .ok_or_else(|| "response is not a list of nodes".to_string())?;
    let mut lines = Vec::new();
    push_tree_lines(roots, 0, &mut lines);
    Ok(lines.join("\n"))
}

fn format_columns_output(columns: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(columns);
    }
    let columns = columns
        .as_array()
        .ok_or_else(|| "response is not a list of columns".to_string())?;
    let lines: Vec<String> = columns
        .iter()
        .map(|column| {
            let text = |key: &str| column.get(key).and_then(Value::as_str).unwrap_or("");
            format!("{:<20} {:<14} {}", text("field"), text("type"), text("label"))
                .trim_end()
                .to_string()
        })
        .collect();
    Ok(lines.join("\n"))
}

fn count_of(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map(Vec::len).unwrap_or(0)
}

/// One-line human description of an event.
fn describe_event(event: &Value) -> String {
    let kind = event.get("type").and_then(Value::as_str).unwrap_or("UNKNOWN");
    let payload = event.get("payload").unwrap_or(&Value::Null);
    let text = |key: &str| payload.get(key).and_then(Value::as_str).unwrap_or("?");

    match kind {
        "NODE_DATA_UPDATED" => format!(
            "Updated {}.{} = {}",
            text("nodeId"),
            text("field"),
            payload.get("newValue").unwrap_or(&Value::Null)
        ),
        "NODE_MOVED" => format!(
            "Moved {} under {} at {}",
            text("nodeId"),
            payload
                .get("newParentId")
                .and_then(Value::as_str)
                .unwrap_or("(root)"),
            payload.get("newIndex").and_then(Value::as_u64).unwrap_or(0)
        ),
        "NODE_CREATED" => format!("Created {}", text("nodeId")),
        "NODE_DELETED" => format!(
            "Deleted {} ({} records)",
            text("targetNodeId"),
            count_of(payload.get("allRemovedNodeIds"))
        ),
        "CONFIG_UPDATED" => format!(
            "Replaced columns ({})",
            count_of(payload.get("newConfig"))
        ),
        "DATA_IMPORTED" => format!("Imported {} records", count_of(payload.get("data"))),
        other => other.to_string(),
    }
}

fn format_event_output(event: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(event);
    }
    Ok(describe_event(event))
}

fn format_events_output(events: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(events);
    }
    let events = events
        .as_array()
        .ok_or_else(|| "response is not a list of events".to_string())?;
    Ok(events
        .iter()
        .map(|event| {
            let seq = event.get("seq").and_then(Value::as_u64).unwrap_or(0);
            format!("{:>6} {}", seq, describe_event(event))
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn read_import_file(path: &Path) -> Result<Value, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {}", path.display(), err))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|err| format!("{} is not valid JSON: {}", path.display(), err))?;
    if !value.get("data").is_some_and(Value::is_array) {
        return Err(format!("{} has no 'data' array", path.display()));
    }
    Ok(value)
}

fn print_output(action: &str, output: Result<String, String>) {
    match output {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{}", output),
        Err(message) => exit_with(action, message),
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let Cli {
        server,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    let server = normalize_server(resolve_server(server));

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Rows => {
            let endpoint = api_url_or_exit(&server, "Rows", &["api", "rows"]);
            let rows = send_json(client.get(endpoint), "Rows", timing).await?;
            print_output("Rows", format_rows_output(&rows, json));
        }
        Commands::Tree => {
            let endpoint = api_url_or_exit(&server, "Tree", &["api", "tree"]);
            let tree = send_json(client.get(endpoint), "Tree", timing).await?;
            print_output("Tree", format_tree_output(&tree, json));
        }
        Commands::Get { id } => {
            let endpoint = api_url_or_exit(&server, "Get", &["api", "records", id.as_str()]);
            let record = send_json(client.get(endpoint), "Get", timing).await?;
            print_output("Get", render_json(&record));
        }
        Commands::Create { id, parent, fields } => {
            let data = parse_field_assignments(&fields)
                .unwrap_or_else(|message| exit_with("Create", message));
            let endpoint = api_url_or_exit(&server, "Create", &["api", "records"]);
            let body = serde_json::json!({ "id": id, "parentId": parent, "data": data });
            let event = send_json(client.post(endpoint).json(&body), "Create", timing).await?;
            print_output("Create", format_event_output(&event, json));
        }
        Commands::Set { id, field, value } => {
            let endpoint =
                api_url_or_exit(&server, "Set", &["api", "records", id.as_str(), "field"]);
            let body = serde_json::json!({ "field": field, "value": parse_value_arg(&value) });
            let event = send_json(client.put(endpoint).json(&body), "Set", timing).await?;
            print_output("Set", format_event_output(&event, json));
        }
        Commands::Move { id, parent, index } => {
            let endpoint =
                api_url_or_exit(&server, "Move", &["api", "records", id.as_str(), "move"]);
            let body = serde_json::json!({ "newParentId": parent, "newIndex": index });
            let event = send_json(client.post(endpoint).json(&body), "Move", timing).await?;
            print_output("Move", format_event_output(&event, json));
        }
        Commands::Delete { id } => {
            let endpoint = api_url_or_exit(&server, "Delete", &["api", "records", id.as_str()]);
            let event = send_json(client.delete(endpoint), "Delete", timing).await?;
            print_output("Delete", format_event_output(&event, json));
        }
        Commands::Toggle { id } => {
            let endpoint = api_url_or_exit(
                &server,
                "Toggle",
                &["api", "expansion", id.as_str(), "toggle"],
            );
            let state = send_json(client.post(endpoint), "Toggle", timing).await?;
            let output = if json {
                render_json(&state)
            } else {
                let expanded = state.get("expanded").and_then(Value::as_bool).unwrap_or(false);
                Ok(format!(
                    "{} {}",
                    if expanded { "Expanded" } else { "Collapsed" },
                    id
                ))
            };
            print_output("Toggle", output);
        }
        Commands::Columns => {
            let endpoint = api_url_or_exit(&server, "Columns", &["api", "columns"]);
            let columns = send_json(client.get(endpoint), "Columns", timing).await?;
            print_output("Columns", format_columns_output(&columns, json));
        }
        Commands::Export { output } => {
            let endpoint = api_url_or_exit(&server, "Export", &["api", "snapshot"]);
            let snapshot = send_json(client.get(endpoint), "Export", timing).await?;
            let rendered =
                render_json(&snapshot).unwrap_or_else(|message| exit_with("Export", message));
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered + "\n")?;
                    eprintln!(
                        "Exported {} records to {}",
                        count_of(snapshot.get("data")),
                        path.display()
                    );
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Import { file } => {
            let body =
                read_import_file(&file).unwrap_or_else(|message| exit_with("Import", message));
            let endpoint = api_url_or_exit(&server, "Import", &["api", "snapshot"]);
            let event = send_json(client.post(endpoint).json(&body), "Import", timing).await?;
            print_output("Import", format_event_output(&event, json));
        }
        Commands::Events { since } => {
            let endpoint = api_url_or_exit(&server, "Events", &["api", "events"]);
            let mut request = client.get(endpoint);
            if let Some(since) = since {
                request = request.query(&[("since", since)]);
            }
            let events = send_json(request, "Events", timing).await?;
            print_output("Events", format_events_output(&events, json));
        }
    }

    Ok(())
}
