//! UI state API.
//!
//! The browser reports clicks and key presses here; the reducer runs on the
//! server and the resulting state is kept in the session.

use axum::{Json, Router, extract::State, routing::{get, post}};
use serde::Serialize;

use arioncomply_core::{Command, KeyEvent, UiAction, UiState};

use crate::error::AppError;
use crate::middleware::Visitor;
use crate::state::AppState;

/// UI state with the values the client would otherwise derive itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiView {
    pub state: UiState,
    pub unread_count: usize,
    pub search_active: bool,
}

impl From<UiState> for UiView {
    fn from(state: UiState) -> Self {
        Self {
            unread_count: state.unread_count(),
            search_active: state.search_active(),
            state,
        }
    }
}

/// Result of a key press.
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub command: Option<Command>,
    pub ui: UiView,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ui", get(show))
        .route("/api/ui/actions", post(apply_action))
        .route("/api/ui/keys", post(press_key))
}

/// GET /api/ui
async fn show(visitor: Visitor) -> Result<Json<UiView>, AppError> {
    let view = UiView::from(visitor.ui().clone());
    visitor.commit().await?;
    Ok(Json(view))
}

/// POST /api/ui/actions
async fn apply_action(
    mut visitor: Visitor,
    Json(action): Json<UiAction>,
) -> Result<Json<UiView>, AppError> {
    tracing::debug!(?action, "UI action");
    let ui = visitor.ui().clone().reduce(action);
    visitor.set_ui(ui.clone());
    visitor.commit().await?;
    Ok(Json(UiView::from(ui)))
}

/// POST /api/ui/keys
///
/// Unbound keys leave the state untouched and return a null command.
async fn press_key(
    State(state): State<AppState>,
    mut visitor: Visitor,
    Json(event): Json<KeyEvent>,
) -> Result<Json<KeyResponse>, AppError> {
    let command = state.shell().dispatcher().dispatch(&event);
    let mut ui = visitor.ui().clone();
    if let Some(command) = &command {
        ui = ui.apply(command);
        visitor.set_ui(ui.clone());
    }
    visitor.commit().await?;

    Ok(Json(KeyResponse {
        command,
        ui: UiView::from(ui),
    }))
}
