//! Spawns the server binary and drives it over stdio with real JSON-RPC
//! lines. Ignored by default since it shells out to `cargo run`; run with
//! `cargo test -- --ignored`.

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::timeout;

#[tokio::test]
#[ignore = "spawns a subprocess; run with `cargo test -- --ignored`"]
async fn initialize_then_tools_list_over_stdio() {
    let mut child = Command::new("cargo")
        .args(["run", "--package", "adt-cli", "--bin", "adt-mcp-server"])
        .env("ADT_BASE_URL", "https://sap.example.com:8000")
        .env("ADT_USER", "DEVELOPER")
        .env("ADT_PASSWORD", "irrelevant-for-this-test")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start adt-mcp-server");

    let mut stdin = child.stdin.take().expect("no stdin");
    let stdout = child.stdout.take().expect("no stdout");
    let mut reader = BufReader::new(stdout);

    let init_request = json!({
        "jsonrpc": "2.0",
        "method": "initialize",
        "params": { "protocolVersion": "2024-11-05", "capabilities": {} },
        "id": 1
    });
    writeln!(stdin, "{}", init_request).expect("failed to write initialize request");

    let mut line = String::new();
    timeout(Duration::from_secs(15), async { reader.read_line(&mut line) })
        .await
        .expect("timed out waiting for initialize response")
        .expect("failed to read initialize response");
    let response: Value = serde_json::from_str(line.trim()).expect("malformed initialize response");
    assert_eq!(response["id"], 1);
    assert!(response["result"]["serverInfo"]["name"].is_string());

    let tools_request = json!({ "jsonrpc": "2.0", "method": "tools/list", "id": 2 });
    writeln!(stdin, "{}", tools_request).expect("failed to write tools/list request");

    line.clear();
    timeout(Duration::from_secs(15), async { reader.read_line(&mut line) })
        .await
        .expect("timed out waiting for tools/list response")
        .expect("failed to read tools/list response");
    let response: Value = serde_json::from_str(line.trim()).expect("malformed tools/list response");
    let tools = response["result"]["tools"].as_array().expect("tools/list result missing tools array");
    assert!(!tools.is_empty());
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(names.contains(&"GrepObject"));
    assert!(names.contains(&"WriteSource"));

    drop(stdin);
    let status = child.wait().expect("failed to wait for child process");
    assert!(status.success());
}
