//! Navigation and layout API for client-side chrome.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use arioncomply_core::{Chrome, LayoutVariant, NavigationEntry, PageRequest, QueryFlags, Role};

use crate::error::AppError;
use crate::middleware::Visitor;
use crate::routes::pages::normalize_path;
use crate::state::AppState;

/// Sidebar tree for the visitor's role.
#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub role: Option<Role>,
    pub entries: Vec<NavigationEntry>,
    /// Alt+key to destination path.
    pub shortcuts: BTreeMap<char, String>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    pub path: Option<String>,
    pub embed: Option<String>,
    pub standalone: Option<String>,
    #[serde(rename = "header-only")]
    pub header_only: Option<String>,
    /// Treat the request as coming from inside a frame.
    pub framed: Option<bool>,
}

impl LayoutQuery {
    fn flags(&self) -> QueryFlags {
        QueryFlags::from_pairs(
            [
                ("embed", self.embed.as_deref()),
                ("standalone", self.standalone.as_deref()),
                ("header-only", self.header_only.as_deref()),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value))),
        )
    }
}

/// Resolved layout for a path.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub path: String,
    pub layout: LayoutVariant,
    pub chrome: Chrome,
    pub body_class: String,
    pub chat_context: String,
    pub authenticated: bool,
    pub redirect: Option<&'static str>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/navigation", get(navigation))
        .route("/api/layout", get(layout))
}

/// GET /api/navigation
async fn navigation(
    State(state): State<AppState>,
    mut visitor: Visitor,
) -> Result<Json<NavigationResponse>, AppError> {
    visitor.restore();
    let navigation = state.shell().navigation();
    let role = visitor.identity().map(|identity| identity.role);
    let entries = role
        .map(|role| {
            navigation
                .visible_entries(role)
                .into_iter()
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    let shortcuts = if role.is_some() {
        navigation.shortcuts()
    } else {
        BTreeMap::new()
    };
    visitor.commit().await?;

    Ok(Json(NavigationResponse {
        role,
        entries,
        shortcuts,
    }))
}

/// GET /api/layout?path=..
async fn layout(
    State(state): State<AppState>,
    mut visitor: Visitor,
    Query(query): Query<LayoutQuery>,
) -> Result<Json<LayoutResponse>, AppError> {
    let path = normalize_path(query.path.as_deref().unwrap_or("/")).to_string();
    let request = PageRequest::new(path)
        .with_flags(query.flags())
        .embedded(query.framed.unwrap_or(false));
    let frame = visitor.run_page(&state.shell(), &request);
    let authenticated = visitor.is_authenticated();
    visitor.commit().await?;

    Ok(Json(LayoutResponse {
        layout: frame.variant(),
        chrome: frame.chrome,
        body_class: frame.body_class,
        chat_context: frame.chat_context,
        authenticated,
        redirect: frame.redirect,
        path: frame.path,
    }))
}
