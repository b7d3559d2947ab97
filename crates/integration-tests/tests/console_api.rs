//! Navigation, layout, session and UI state endpoints.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use arioncomply_integration_tests::{TestApp, spawn_app, test_config};

async fn get_json(app: &TestApp, path: &str) -> Value {
    let resp = app.client.get(app.url(path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
    resp.json().await.unwrap()
}

async fn post_json(app: &TestApp, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = app
        .client
        .post(app.url(path))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

// ============================================================================
// Navigation & layout
// ============================================================================

#[tokio::test]
async fn test_navigation_for_demo_admin() {
    let app = spawn_app(test_config()).await;

    let nav = get_json(&app, "/api/navigation").await;
    assert_eq!(nav["role"], "admin");

    let ids: Vec<&str> = nav["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"dashboard"));
    assert_eq!(ids.last(), Some(&"settings"));
    assert_eq!(nav["shortcuts"]["d"], "/dashboard");
}

#[tokio::test]
async fn test_navigation_follows_signed_in_role() {
    let app = spawn_app(test_config()).await;

    let (status, body) = post_json(&app, "/api/session/profile", &json!({"role": "user"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["name"], "Demo User");

    let nav = get_json(&app, "/api/navigation").await;
    assert_eq!(nav["role"], "user");
    let ids: Vec<&str> = nav["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert!(!ids.contains(&"settings"));
    assert!(!ids.contains(&"dashboard"));
}

#[tokio::test]
async fn test_navigation_empty_when_signed_out() {
    let app = spawn_app(test_config()).await;
    app.client.post(app.url("/auth/logout")).send().await.unwrap();

    let nav = get_json(&app, "/api/navigation").await;
    assert!(nav["role"].is_null());
    assert_eq!(nav["entries"], json!([]));
    assert_eq!(nav["shortcuts"], json!({}));
}

#[tokio::test]
async fn test_layout_endpoint() {
    let app = spawn_app(test_config()).await;

    let layout = get_json(&app, "/api/layout?path=/assessments/gdpr").await;
    assert_eq!(layout["layout"], "full-app");
    assert_eq!(layout["chrome"]["has_sidebar"], true);
    assert_eq!(layout["chatContext"], "GDPR Assessment");
    assert_eq!(layout["bodyClass"], "layout-full-app");
    assert!(layout["redirect"].is_null());

    let layout = get_json(&app, "/api/layout?path=/reports&header-only=1").await;
    assert_eq!(layout["layout"], "header-only");
    assert_eq!(layout["chatContext"], "Reporting & Analytics");

    let layout = get_json(&app, "/api/layout?path=/unknown").await;
    assert_eq!(layout["layout"], "full-app");
    assert_eq!(layout["chatContext"], "General Assistance");
}

#[tokio::test]
async fn test_layout_when_signed_out() {
    let app = spawn_app(test_config()).await;
    app.client.post(app.url("/auth/logout")).send().await.unwrap();

    let layout = get_json(&app, "/api/layout?path=/controls").await;
    assert_eq!(layout["layout"], "standalone");
    assert_eq!(layout["authenticated"], false);
    assert_eq!(layout["redirect"], "/auth");

    let layout = get_json(&app, "/api/layout?path=/help").await;
    assert_eq!(layout["layout"], "standalone");
    assert!(layout["redirect"].is_null());
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_session_endpoint_reports_demo_identity() {
    let app = spawn_app(test_config()).await;

    let session = get_json(&app, "/api/session").await;
    assert_eq!(session["authenticated"], true);
    assert_eq!(session["user"]["id"], "demo_user");
    assert_eq!(session["user"]["email"], "demo@arioncomply.com");
    assert_eq!(session["user"]["permissions"], json!(["all"]));
}

#[tokio::test]
async fn test_profile_update_rejects_invalid_identity() {
    let app = spawn_app(test_config()).await;

    let resp = app
        .client
        .post(app.url("/api/session/profile"))
        .json(&json!({"email": "nope"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());

    let (status, body) = post_json(&app, "/api/session/profile", &json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let session = get_json(&app, "/api/session").await;
    assert_eq!(session["user"]["email"], "demo@arioncomply.com");
}

#[tokio::test]
async fn test_profile_update_requires_sign_in() {
    let app = spawn_app(test_config()).await;
    app.client.post(app.url("/auth/logout")).send().await.unwrap();

    let (status, _) = post_json(&app, "/api/session/profile", &json!({"name": "Eve"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// UI state
// ============================================================================

#[tokio::test]
async fn test_ui_state_defaults() {
    let app = spawn_app(test_config()).await;

    let ui = get_json(&app, "/api/ui").await;
    assert_eq!(ui["unreadCount"], 2);
    assert_eq!(ui["searchActive"], false);
    assert_eq!(ui["state"]["layout"]["sidebarOpen"], false);
}

#[tokio::test]
async fn test_ui_actions_persist_across_requests() {
    let app = spawn_app(test_config()).await;

    let (status, ui) = post_json(&app, "/api/ui/actions", &json!({"type": "toggle_sidebar"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ui["state"]["layout"]["sidebarOpen"], true);

    post_json(
        &app,
        "/api/ui/actions",
        &json!({"type": "mark_notification_read", "id": "1"}),
    )
    .await;
    // Marking the same notification twice does not decrement again.
    let (_, ui) = post_json(
        &app,
        "/api/ui/actions",
        &json!({"type": "mark_notification_read", "id": "1"}),
    )
    .await;
    assert_eq!(ui["unreadCount"], 1);

    let ui = get_json(&app, "/api/ui").await;
    assert_eq!(ui["state"]["layout"]["sidebarOpen"], true);
    assert_eq!(ui["unreadCount"], 1);
}

#[tokio::test]
async fn test_unknown_ui_action_is_rejected() {
    let app = spawn_app(test_config()).await;

    let resp = app
        .client
        .post(app.url("/api/ui/actions"))
        .json(&json!({"type": "launch_rockets"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_alt_shortcut_navigates() {
    let app = spawn_app(test_config()).await;

    let (status, result) = post_json(
        &app,
        "/api/ui/keys",
        &json!({"key": "d", "altKey": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["command"], json!({"type": "navigate", "path": "/dashboard"}));
}

#[tokio::test]
async fn test_escape_dismisses_transient_ui() {
    let app = spawn_app(test_config()).await;

    post_json(&app, "/api/ui/actions", &json!({"type": "open_sidebar"})).await;
    post_json(&app, "/api/ui/actions", &json!({"type": "toggle_notifications"})).await;
    post_json(
        &app,
        "/api/ui/actions",
        &json!({"type": "set_search_query", "query": "gdpr"}),
    )
    .await;

    let (_, result) = post_json(&app, "/api/ui/keys", &json!({"key": "Escape"})).await;
    assert_eq!(result["command"]["type"], "dismiss_transient");

    let state = &result["ui"]["state"];
    assert_eq!(state["layout"]["sidebarOpen"], false);
    assert_eq!(state["header"]["notificationsOpen"], false);
    assert_eq!(state["header"]["searchQuery"], "");
    assert_eq!(result["ui"]["searchActive"], false);
}

#[tokio::test]
async fn test_ctrl_k_focuses_search_and_unbound_keys_do_nothing() {
    let app = spawn_app(test_config()).await;

    let (_, result) = post_json(&app, "/api/ui/keys", &json!({"key": "k", "ctrlKey": true})).await;
    assert_eq!(result["command"]["type"], "focus_search");

    let (_, result) = post_json(&app, "/api/ui/keys", &json!({"key": "q", "altKey": true})).await;
    assert!(result["command"].is_null());
}
