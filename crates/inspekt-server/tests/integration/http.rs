//! The axum embedding, driven with `tower::ServiceExt::oneshot`.

use crate::common::{SHOP, Site, call_request, payload};
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(site: &Site) -> axum::Router {
    let assembly = site.assembly();
    inspekt_server::http::router("/mcp", move || inspekt_server::assemble(assembly.clone()))
}

fn post(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_post_call() {
    let site = Site::new().with_snapshot(SHOP);
    let response = app(&site)
        .oneshot(post(&call_request(1, "db_get_tables", json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let value = body_json(response).await;
    assert_eq!(payload(&value)["count"], 2);
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let site = Site::new().with_snapshot(SHOP);
    let request = Request::builder().uri("/mcp").body(Body::empty()).unwrap();
    let response = app(&site).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "POST");
}

#[tokio::test]
async fn test_other_methods_are_rejected_by_router() {
    let site = Site::new().with_snapshot(SHOP);
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/mcp")
        .body(Body::empty())
        .unwrap();
    let response = app(&site).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unparseable_body() {
    let site = Site::new().with_snapshot(SHOP);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app(&site).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response).await;
    assert_eq!(value["error"]["code"], -32700);
    assert_eq!(value["id"], Value::Null);
}

#[tokio::test]
async fn test_non_utf8_body_is_a_parse_error() {
    let site = Site::new().with_snapshot(SHOP);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .body(Body::from(&b"\xff\xfe{\"jsonrpc\":\"2.0\"}"[..]))
        .unwrap();
    let response = app(&site).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let value = body_json(response).await;
    assert_eq!(value["jsonrpc"], "2.0");
    assert_eq!(value["error"]["code"], -32700);
    assert_eq!(value["id"], Value::Null);
}

#[tokio::test]
async fn test_assembly_failure_is_500() {
    let site = Site::new();
    let response = app(&site)
        .oneshot(post(&call_request(1, "di_get_services", json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let value = body_json(response).await;
    assert_eq!(value["error"]["code"], -32603);
    let message = value["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Failed to boot application"));
}

#[tokio::test]
async fn test_each_request_assembles_afresh() {
    let site = Site::new().with_snapshot(r#"{"services": []}"#);
    let app = app(&site);

    let response = app
        .clone()
        .oneshot(post(&call_request(1, "db_get_tables", json!({}))))
        .await
        .unwrap();
    let value = body_json(response).await;
    assert_eq!(value["error"]["message"], "Unknown tool: db_get_tables");

    std::fs::write(site.path().join("app/inspekt.json"), SHOP).unwrap();

    let response = app
        .oneshot(post(&call_request(2, "db_get_tables", json!({}))))
        .await
        .unwrap();
    let value = body_json(response).await;
    assert_eq!(payload(&value)["count"], 2);
}
