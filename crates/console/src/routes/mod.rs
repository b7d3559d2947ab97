//! HTTP routes for the console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database when configured)
//!
//! # Auth
//! GET  /auth                            - Sign-in page
//! POST /auth/login                      - Sign in
//! POST /auth/logout                     - Sign out
//!
//! # Compliance proxy (CORS: any origin)
//! POST /api/compliance-proxy            - Chat with OpenAI or Claude
//! POST /api/compliance-proxy/save-test  - Store a test transcript
//! GET  /api/compliance-proxy/get-tests  - List stored transcripts
//!
//! # Console API
//! GET  /api/session                     - Current identity
//! POST /api/session/profile             - Update the identity
//! GET  /api/navigation                  - Sidebar for the current role
//! GET  /api/layout?path=..              - Resolved layout for a path
//! GET  /api/ui                          - UI state
//! POST /api/ui/actions                  - Apply a UI action
//! POST /api/ui/keys                     - Dispatch a key press
//!
//! # Pages
//! GET  /                                - AppCenter
//! GET  /{*path}                         - Any other console page
//! ```

pub mod api;
pub mod auth;
pub mod health;
pub mod pages;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{create_memory_session_layer, create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/console/static";

/// Create all routes for the console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(api::router())
        .route("/", get(pages::show))
        .route("/{*path}", get(pages::show))
}

/// The console application with its session, request id and trace layers.
///
/// Sessions go to `PostgreSQL` when the state has a pool, otherwise they
/// are kept in memory.
pub fn app(state: AppState) -> Router {
    let router = routes().nest_service("/static", ServeDir::new(STATIC_DIR));

    let router = match state.pool() {
        Some(pool) => router.layer(create_session_layer(pool, state.config())),
        None => router.layer(create_memory_session_layer(state.config())),
    };

    router
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
