//! Integration test harness for the ArionComply console.
//!
//! Each test spawns the full console router on an ephemeral port, with an
//! in-memory session store and no database, and talks to it over HTTP with
//! a cookie-keeping client. Provider calls go to a mock upstream spawned
//! the same way.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p arioncomply-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `console_pages` - page rendering, redirects, sign-in and sign-out
//! - `console_api` - navigation, layout, session and UI state endpoints
//! - `compliance_proxy` - proxy validation and provider mapping

#![allow(clippy::missing_panics_doc)]

use axum::Router;
use reqwest::{Client, redirect::Policy};
use secrecy::SecretString;
use tokio::net::TcpListener;
use url::Url;

use arioncomply_console::config::ConsoleConfig;
use arioncomply_console::state::AppState;

/// Keys that pass the console's placeholder and entropy checks.
pub const TEST_OPENAI_KEY: &str = "sk-Q8v2LmZ7rT4wK1pN9xB6cH3jF5";
pub const TEST_ANTHROPIC_KEY: &str = "sk-ant-REDACTED";

/// A running console.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
}

impl TestApp {
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh client with its own cookie jar.
    #[must_use]
    pub fn new_client(&self) -> Client {
        client()
    }
}

/// Client that keeps cookies and does not follow redirects.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Console configuration with no database and no provider keys.
#[must_use]
pub fn test_config() -> ConsoleConfig {
    ConsoleConfig::local("http://127.0.0.1").expect("valid local config")
}

/// Point both providers at `upstream` and give them keys.
#[must_use]
pub fn with_mock_providers(mut config: ConsoleConfig, upstream: &str) -> ConsoleConfig {
    config.openai.api_url =
        Url::parse(&format!("{upstream}/v1/chat/completions")).expect("valid mock url");
    config.openai.api_key = Some(SecretString::from(TEST_OPENAI_KEY));
    config.claude.api_url = Url::parse(&format!("{upstream}/v1/messages")).expect("valid mock url");
    config.claude.api_key = Some(SecretString::from(TEST_ANTHROPIC_KEY));
    config
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server error");
    });
    format!("http://{addr}")
}

/// Spawn the console with `config`.
pub async fn spawn_app(config: ConsoleConfig) -> TestApp {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let state = AppState::new(config, None).expect("Failed to create application state");
    let base_url = serve(arioncomply_console::app(state)).await;

    TestApp {
        base_url,
        client: client(),
    }
}

/// Spawn a stand-in for the provider APIs and return its base URL.
pub async fn spawn_mock_upstream(router: Router) -> String {
    serve(router).await
}
