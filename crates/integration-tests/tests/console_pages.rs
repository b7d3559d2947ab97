//! Page rendering, login redirects and sign-in.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, LOCATION};

use arioncomply_integration_tests::{TestApp, spawn_app, test_config};

const FORM: &str = "application/x-www-form-urlencoded";

async fn sign_out(app: &TestApp) {
    let resp = app
        .client
        .post(app.url("/auth/logout"))
        .send()
        .await
        .expect("Failed to sign out");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/auth");
}

// ============================================================================
// Rendering
// ============================================================================

#[tokio::test]
async fn test_first_visit_renders_full_app_for_demo_user() {
    let app = spawn_app(test_config()).await;

    let resp = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();

    assert!(body.contains("layout-full-app"));
    assert!(body.contains("Demo User"));
    assert!(body.contains("app-sidebar"));
    assert!(body.contains("Application Center"));
    assert!(body.contains("Alt+D"));
}

#[tokio::test]
async fn test_header_only_page_has_no_sidebar() {
    let app = spawn_app(test_config()).await;

    let body = app
        .client
        .get(app.url("/help"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("layout-header-only"));
    assert!(body.contains("app-header"));
    assert!(!body.contains("app-sidebar"));
    assert!(body.contains("Help Center"));
}

#[tokio::test]
async fn test_embed_flag_strips_chrome() {
    let app = spawn_app(test_config()).await;

    let body = app
        .client
        .get(app.url("/controls?embed=1"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("embedded-mode"));
    assert!(!body.contains("app-header"));
    assert!(!body.contains("app-sidebar"));
}

#[tokio::test]
async fn test_iframe_request_is_embedded() {
    let app = spawn_app(test_config()).await;

    let body = app
        .client
        .get(app.url("/controls"))
        .header("sec-fetch-dest", "iframe")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("layout-embedded"));
}

// ============================================================================
// Login redirects
// ============================================================================

#[tokio::test]
async fn test_signed_out_visitor_is_sent_to_login() {
    let app = spawn_app(test_config()).await;
    app.client.get(app.url("/")).send().await.unwrap();
    sign_out(&app).await;

    let resp = app.client.get(app.url("/dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/auth");

    // Public pages stay reachable.
    let resp = app.client.get(app.url("/privacy")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.client.get(app.url("/auth")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("layout-standalone"));
    assert!(body.contains("Sign in"));
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_sign_in_replaces_identity() {
    let app = spawn_app(test_config()).await;
    app.client.get(app.url("/")).send().await.unwrap();
    sign_out(&app).await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .header(CONTENT_TYPE, FORM)
        .body("name=Ada+Lovelace&email=ada%40example.com&role=auditor&next=%2Fcontrols")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/controls");

    let body = app
        .client
        .get(app.url("/controls"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("Internal Auditor"));
    // Auditors do not see settings.
    assert!(!body.contains("href=\"/settings\""));
}

#[tokio::test]
async fn test_sign_in_ignores_off_site_next() {
    let app = spawn_app(test_config()).await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .header(CONTENT_TYPE, FORM)
        .body("name=Ada&email=ada%40example.com&role=user&next=%2F%5Cevil.example")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/");
}

#[tokio::test]
async fn test_invalid_sign_in_re_renders_form() {
    let app = spawn_app(test_config()).await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .header(CONTENT_TYPE, FORM)
        .body("name=Ada&email=not-an-email&role=manager")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("auth-error"));
    assert!(body.contains("value=\"not-an-email\""));
}

#[tokio::test]
async fn test_sessions_are_per_visitor() {
    let app = spawn_app(test_config()).await;
    app.client.get(app.url("/")).send().await.unwrap();
    sign_out(&app).await;

    // A different visitor still gets the demo identity.
    let other = app.new_client();
    let resp = other.get(app.url("/dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app(test_config()).await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = app.client.get(app.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}
