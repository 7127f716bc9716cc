//! Tool calls against assembled servers.

use crate::common::{SHOP, Site, call, call_request, exchange};
use serde_json::json;

#[tokio::test]
async fn test_di_lists_snapshot_services() {
    let serving = Site::new().with_snapshot(SHOP).serving();

    let value = call(&serving, "di_get_services", json!({"filter": "mail"})).await;
    assert_eq!(value["count"], 1);
    assert_eq!(value["services"][0]["name"], "mailer");

    let value = call(&serving, "di_get_service", json!({"name": "session"})).await;
    assert_eq!(value, json!({"error": "Service 'session' not found"}));
}

#[tokio::test]
async fn test_empty_database() {
    let serving = Site::new()
        .with_snapshot(r#"{"database": {"tables": []}}"#)
        .serving();

    let value = call(&serving, "db_get_tables", json!({})).await;
    assert_eq!(value, json!({"tables": [], "count": 0}));
}

#[tokio::test]
async fn test_missing_table() {
    let serving = Site::new().with_snapshot(SHOP).serving();

    let value = call(&serving, "db_get_columns", json!({"table": "nonexistent"})).await;
    assert_eq!(
        value,
        json!({"error": "Table 'nonexistent' not found: Table 'nonexistent' does not exist"})
    );
}

#[tokio::test]
async fn test_foreign_key_points_at_referenced_primary_key() {
    let serving = Site::new().with_snapshot(SHOP).serving();

    let value = call(&serving, "db_get_columns", json!({"table": "article"})).await;
    assert_eq!(value["columns"][1]["foreignKey"], json!({"table": "author", "column": "id"}));

    let value = call(&serving, "db_get_relationships", json!({})).await;
    assert_eq!(value["count"], 2);
}

#[tokio::test]
async fn test_suggest_entity() {
    let serving = Site::new().with_snapshot(SHOP).serving();

    let value = call(&serving, "db_suggest_entity", json!({"table": "article"})).await;
    assert_eq!(value, json!({"error": "Not yet implemented"}));
}

#[tokio::test]
async fn test_match_and_generate() {
    let serving = Site::new().with_snapshot(SHOP).serving();

    let value = call(&serving, "router_match_url", json!({"url": "/article/123"})).await;
    assert_eq!(value["matched"], true);
    assert_eq!(value["presenter"], "Article");
    assert_eq!(value["action"], "show");

    let value = call(&serving, "router_match_url", json!({"url": "nothing/here/at/all"})).await;
    assert_eq!(value["matched"], false);
    assert_eq!(value["error"], "No route matches this URL");

    let value = call(
        &serving,
        "router_generate_url",
        json!({"destination": "Article:show", "params": {"id": 7}}),
    )
    .await;
    assert_eq!(value["url"], "http://localhost/article/7");
}

#[tokio::test]
async fn test_user_tool_failure_is_a_payload() {
    let serving = Site::new()
        .with_snapshot(SHOP)
        .with_config(r#"toolkits = ["audit"]"#)
        .serving();

    let value = call(&serving, "audit_row_count", json!({"table": "article"})).await;
    assert_eq!(value, json!({"table": "article", "rows": 0}));

    let value = call(&serving, "audit_row_count", json!({"table": "locked"})).await;
    assert_eq!(value, json!({"error": "table is locked"}));
}

#[tokio::test]
async fn test_missing_argument_is_a_protocol_error() {
    let serving = Site::new().with_snapshot(SHOP).serving();
    let request = call_request(9, "db_get_columns", json!({}));

    let response = exchange(&serving, &request).await;
    assert_eq!(response["id"], 9);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(
        response["error"]["message"],
        "Missing required argument 'table' for tool 'db_get_columns'"
    );
}
