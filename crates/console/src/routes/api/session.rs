//! Session identity API.

use axum::{Json, Router, routing::{get, post}};
use serde::Serialize;

use arioncomply_core::{Identity, IdentityPatch};

use crate::error::AppError;
use crate::middleware::Visitor;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<Identity>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(show))
        .route("/api/session/profile", post(update_profile))
}

/// GET /api/session
async fn show(mut visitor: Visitor) -> Result<Json<SessionResponse>, AppError> {
    visitor.restore();
    let response = SessionResponse {
        authenticated: visitor.is_authenticated(),
        user: visitor.identity().cloned(),
    };
    visitor.commit().await?;
    Ok(Json(response))
}

/// POST /api/session/profile
///
/// Merges the posted fields into the signed-in identity.
async fn update_profile(
    mut visitor: Visitor,
    Json(patch): Json<IdentityPatch>,
) -> Result<Json<SessionResponse>, AppError> {
    visitor.restore();
    if !visitor.sessions().update(patch)? {
        return Err(AppError::Unauthorized("not signed in".to_string()));
    }
    let response = SessionResponse {
        authenticated: true,
        user: visitor.identity().cloned(),
    };
    visitor.commit().await?;
    Ok(Json(response))
}
