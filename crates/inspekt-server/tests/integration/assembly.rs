//! Assembly: which toolkits end up registered, and which failures are fatal.

use crate::common::{SHOP, Site};
use inspekt_mcp::DuplicatePolicy;
use inspekt_server::{Error, assemble};

const BUILTIN_TOOLS: [&str; 9] = [
    "di_get_services",
    "di_get_service",
    "db_get_tables",
    "db_get_columns",
    "db_get_relationships",
    "db_suggest_entity",
    "router_get_routes",
    "router_match_url",
    "router_generate_url",
];

#[test]
fn test_all_builtins_in_fixed_order() {
    let site = Site::new().with_snapshot(SHOP);
    assert_eq!(site.serving().tool_names(), BUILTIN_TOOLS);
}

#[test]
fn test_user_toolkits_follow_builtins() {
    let site = Site::new()
        .with_snapshot(SHOP)
        .with_config(r#"toolkits = ["audit"]"#);

    let names = site.serving().tool_names().join(",");
    assert_eq!(names, format!("{},audit_row_count", BUILTIN_TOOLS.join(",")));
}

#[test]
fn test_missing_data_sources_are_skipped() {
    let site = Site::new().with_snapshot(r#"{"services": []}"#);
    assert_eq!(site.serving().tool_names(), vec!["di_get_services", "di_get_service"]);
}

#[test]
fn test_database_only() {
    let site = Site::new().with_snapshot(r#"{"database": {"tables": []}}"#);
    let serving = site.serving();
    let names = serving.tool_names();
    assert!(names.contains(&"db_get_tables"));
    assert!(!names.contains(&"router_get_routes"));
}

#[test]
fn test_failing_container_keeps_di() {
    let site = Site::new()
        .with_snapshot("not read")
        .with_config(r#"bootstrapClass = "services-only""#);
    assert_eq!(site.serving().tool_names(), vec!["di_get_services", "di_get_service"]);
}

#[test]
fn test_failing_user_toolkit_is_fatal() {
    let site = Site::new().with_snapshot("not read").with_config(
        r#"
bootstrapClass = "services-only"
toolkits = ["audit"]
"#,
    );

    let err = assemble(site.assembly()).unwrap_err();
    assert!(matches!(err, Error::ToolkitConstruction { ref name, .. } if name == "audit"));
    assert!(err.to_string().contains("container compilation failed"));
}

#[test]
fn test_unknown_user_toolkit_is_fatal() {
    let site = Site::new()
        .with_snapshot(SHOP)
        .with_config(r#"toolkits = ["orders"]"#);

    let err = assemble(site.assembly()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown toolkit 'orders' (registered: audit, shadow)"
    );
}

#[test]
fn test_unknown_bootstrap_is_fatal() {
    let site = Site::new()
        .with_snapshot(SHOP)
        .with_config(r#"bootstrapClass = "laravel""#);

    let err = assemble(site.assembly()).unwrap_err();
    assert!(matches!(err, Error::Bootstrap(_)));
}

#[test]
fn test_malformed_snapshot_is_fatal() {
    let site = Site::new().with_snapshot(r#"{"servics": []}"#);
    let err = assemble(site.assembly()).unwrap_err();
    assert!(matches!(err, Error::Bootstrap(_)));
}

#[test]
fn test_unknown_config_key_is_fatal() {
    let site = Site::new()
        .with_snapshot(SHOP)
        .with_config(r#"plugins = ["audit"]"#);

    let err = assemble(site.assembly()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_explicit_config_path() {
    let site = Site::new().with_snapshot(SHOP);
    let elsewhere = site.path().join("conf");
    std::fs::create_dir_all(&elsewhere).unwrap();
    std::fs::write(elsewhere.join("inspekt.toml"), r#"toolkits = ["shadow"]"#).unwrap();

    let assembly = site.assembly().with_config_path(elsewhere.join("inspekt.toml"));
    let serving = assemble(assembly).unwrap();
    assert_eq!(serving.tool_names(), BUILTIN_TOOLS);
}

#[tokio::test]
async fn test_duplicate_replaces_in_place() {
    let site = Site::new()
        .with_snapshot(SHOP)
        .with_config(r#"toolkits = ["shadow"]"#);

    let serving = site.serving();
    assert_eq!(serving.tool_names(), BUILTIN_TOOLS);

    let value = crate::common::call(&serving, "db_get_tables", serde_json::json!({})).await;
    assert_eq!(value, serde_json::json!({"shadowed": true}));
}

#[test]
fn test_duplicate_rejected_under_reject_policy() {
    let site = Site::new()
        .with_snapshot(SHOP)
        .with_config(r#"toolkits = ["shadow"]"#);

    let err = assemble(site.assembly().with_policy(DuplicatePolicy::Reject)).unwrap_err();
    assert!(matches!(err, Error::DuplicateTool { ref name } if name == "db_get_tables"));
}
