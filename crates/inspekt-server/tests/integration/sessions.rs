//! Whole sessions over the stream and single-shot transports.

use crate::common::{SHOP, Site, call_request, payload};
use inspekt_mcp::StreamTransport;
use inspekt_server::{InvocationContext, Outcome};
use serde_json::{Value, json};

fn lines(output: &[u8]) -> Vec<Value> {
    std::str::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_stream_session() {
    let serving = Site::new().with_snapshot(SHOP).serving();
    let input = [
        json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "session-test", "version": "1.0.0"}
            }
        }),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        call_request(1, "db_get_columns", json!({"table": "nonexistent"})),
        call_request(2, "db_get_tables", json!({})),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n");

    let mut output = Vec::new();
    let handled = serving
        .server()
        .run(StreamTransport::new(input.as_bytes(), &mut output))
        .await
        .unwrap();
    assert_eq!(handled, 4);

    let responses = lines(&output);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "inspekt");

    assert_eq!(responses[1]["id"], 1);
    assert_eq!(
        payload(&responses[1]),
        json!({"error": "Table 'nonexistent' not found: Table 'nonexistent' does not exist"})
    );

    assert_eq!(responses[2]["id"], 2);
    assert_eq!(payload(&responses[2])["count"], 2);
}

#[tokio::test]
async fn test_stream_lists_tools_in_order() {
    let serving = Site::new().with_snapshot(r#"{"services": []}"#).serving();
    let input = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}).to_string();

    let mut output = Vec::new();
    serving
        .server()
        .run(StreamTransport::new(input.as_bytes(), &mut output))
        .await
        .unwrap();

    let responses = lines(&output);
    let names: Vec<&str> = responses[0]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["di_get_services", "di_get_service"]);
    assert_eq!(responses[0]["result"]["tools"][0]["annotations"]["readOnlyHint"], true);
}

#[tokio::test]
async fn test_run_with_http_context() {
    let serving = Site::new().with_snapshot(SHOP).serving();
    let body = call_request(3, "router_get_routes", json!({})).to_string();
    let request = http::Request::post("/mcp").body(body).unwrap();

    let outcome = serving.run(InvocationContext::Http(request)).await.unwrap();
    let Outcome::Response(response) = outcome else {
        panic!("expected a response");
    };
    assert_eq!(response.status(), http::StatusCode::OK);

    let value: Value = serde_json::from_str(response.body()).unwrap();
    assert_eq!(value["id"], 3);
    assert_eq!(payload(&value)["routes"][0]["mask"], "article/<id \\d+>");
}

#[tokio::test]
async fn test_notification_only_request() {
    let serving = Site::new().with_snapshot(SHOP).serving();
    let body = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
    let request = http::Request::post("/mcp").body(body).unwrap();

    let response = serving.serve_request(request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::ACCEPTED);
    assert!(response.body().is_empty());
}
