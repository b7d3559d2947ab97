//! Compliance proxy: forwards chat requests to `OpenAI` or Claude and keeps
//! a log of compliance test transcripts.
//!
//! The proxy is mounted under one prefix and branches on the path suffix,
//! so `/api/compliance-proxy/save-test` and `/api/compliance-proxy/any/get-tests`
//! both reach their handler.

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderName, Method},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::instrument;

use arioncomply_core::PageLimit;

use crate::db::ComplianceTestRepository;
use crate::error::AppError;
use crate::llm::{ChatMessage, Parameters, Provider};
use crate::models::{ComplianceTest, NewComplianceTest};
use crate::state::AppState;

const SAVE_TEST_SUFFIX: &str = "save-test";
const GET_TESTS_SUFFIX: &str = "get-tests";

/// Chat request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub provider: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub save_test: bool,
    pub test_name: Option<String>,
    pub category: Option<String>,
}

/// Chat response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub usage: Value,
    /// Round trip to the provider in milliseconds.
    pub response_time: i64,
}

#[derive(Debug, Serialize)]
pub struct SaveTestResponse {
    pub success: bool,
    pub test: ComplianceTest,
}

#[derive(Debug, Serialize)]
pub struct TestsResponse {
    pub tests: Vec<ComplianceTest>,
}

/// Query for the test log listing.
#[derive(Debug, Default, Deserialize)]
pub struct TestsQuery {
    pub limit: Option<i64>,
    pub category: Option<String>,
}

/// Build the proxy router with its permissive CORS policy.
pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("content-type"),
        ]);

    Router::new()
        .route("/api/compliance-proxy", post(chat))
        .route(
            "/api/compliance-proxy/{*rest}",
            post(dispatch).get(dispatch),
        )
        .layer(cors)
}

/// Route a suffixed proxy request.
///
/// POST /api/compliance-proxy/{*rest}
/// GET  /api/compliance-proxy/{*rest}
async fn dispatch(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    method: Method,
    Query(query): Query<TestsQuery>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let rest = rest.trim_end_matches('/');

    if rest.ends_with(GET_TESTS_SUFFIX) {
        let tests = list_tests(&state, query).await?;
        return to_value(&tests);
    }

    if method != Method::POST {
        return Err(AppError::BadRequest("Method not allowed".to_string()));
    }

    if rest.ends_with(SAVE_TEST_SUFFIX) {
        let test: NewComplianceTest = parse_body(&body)?;
        let saved = save_test(&state, &test).await?;
        return to_value(&saved);
    }

    let request: ChatRequest = parse_body(&body)?;
    let response = run_chat(&state, request).await?;
    to_value(&response)
}

/// Proxy a chat completion.
///
/// POST /api/compliance-proxy
async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = parse_body(&body)?;
    Ok(Json(run_chat(&state, request).await?))
}

/// Validate, forward and optionally record one chat request.
///
/// # Errors
///
/// Returns 400 for a missing provider or message list or an unknown
/// provider; provider failures surface as a generic 500.
#[instrument(skip(state, request), fields(provider = ?request.provider))]
pub async fn run_chat(state: &AppState, request: ChatRequest) -> Result<ChatResponse, AppError> {
    let (Some(provider), Some(messages)) = (request.provider.as_deref(), request.messages.as_ref())
    else {
        return Err(AppError::BadRequest(
            "Missing provider or messages".to_string(),
        ));
    };

    let provider: Provider = provider.parse().map_err(|_| {
        AppError::BadRequest(r#"Invalid provider. Use "openai" or "claude""#.to_string())
    })?;

    let started = Instant::now();
    let completion = state
        .providers()
        .complete(
            provider,
            messages,
            request.system_prompt.as_deref(),
            &request.parameters,
        )
        .await?;
    let response_time = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

    if request.save_test
        && let Some(last) = messages.last()
    {
        let test = NewComplianceTest::from_completion(
            provider,
            request.test_name.clone(),
            request.category.clone(),
            last.text(),
            request.system_prompt.clone(),
            &completion,
            response_time,
        );
        // The chat answer is returned even when the transcript cannot be stored.
        if let Err(e) = save_test(state, &test).await {
            tracing::warn!(error = %e, "Failed to save compliance test");
        }
    }

    tracing::info!(%provider, model = %completion.model, response_time, "Chat completed");

    Ok(ChatResponse {
        content: completion.content,
        model: completion.model,
        usage: completion.usage,
        response_time,
    })
}

async fn save_test(state: &AppState, test: &NewComplianceTest) -> Result<SaveTestResponse, AppError> {
    let pool = state.require_pool()?;
    let test = ComplianceTestRepository::new(pool).insert(test).await?;
    Ok(SaveTestResponse {
        success: true,
        test,
    })
}

async fn list_tests(state: &AppState, query: TestsQuery) -> Result<TestsResponse, AppError> {
    let pool = state.require_pool()?;
    let limit = query.limit.map_or_else(PageLimit::default, PageLimit::clamped);
    let category = query.category.as_deref().filter(|c| !c.trim().is_empty());
    let tests = ComplianceTestRepository::new(pool)
        .list(limit, category)
        .await?;
    Ok(TestsResponse { tests })
}

fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

fn to_value<T: Serialize>(value: &T) -> Result<Json<Value>, AppError> {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| AppError::Internal(format!("failed to encode response: {e}")))
}
