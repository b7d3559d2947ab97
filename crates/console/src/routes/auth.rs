//! Sign-in and sign-out.
//!
//! There is no credential check: the form picks a name, email and role and
//! stores that identity in the session.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use arioncomply_core::{Email, Identity, Role, RoleParseError, UserId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::Visitor;
use crate::routes::pages::{PageInfo, page_info, page_request};
use crate::state::AppState;

/// Where sign-out lands.
pub const LOGIN_PATH: &str = "/auth";

/// Role choice in the sign-in form.
#[derive(Debug, Clone)]
pub struct RoleOption {
    pub value: &'static str,
    pub title: &'static str,
    pub selected: bool,
}

impl RoleOption {
    fn all(selected: Role) -> Vec<Self> {
        Role::ALL
            .into_iter()
            .map(|role| Self {
                value: role.as_str(),
                title: role.title(),
                selected: role == selected,
            })
            .collect()
    }
}

/// Sign-in page.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct LoginTemplate {
    pub page: PageInfo,
    pub body_class: String,
    pub error: Option<String>,
    pub current_user: Option<String>,
    pub next: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleOption>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub next: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(login_page))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// GET /auth
async fn login_page(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
    mut visitor: Visitor,
) -> Result<Response, AppError> {
    let frame = visitor.run_page(&state.shell(), &page_request(&uri, &headers));
    visitor.commit().await?;

    Ok(LoginTemplate {
        page: page_info(state.shell().navigation(), LOGIN_PATH),
        body_class: frame.body_class,
        error: None,
        current_user: frame.identity.map(|identity| identity.name),
        next: safe_next(query.next.as_deref()).to_string(),
        name: String::new(),
        email: String::new(),
        roles: RoleOption::all(Role::User),
    }
    .into_response())
}

/// POST /auth/login
///
/// Invalid input re-renders the form with a message instead of failing.
async fn login(
    State(state): State<AppState>,
    mut visitor: Visitor,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref()).to_string();

    let identity = match identity_from_form(&form) {
        Ok(identity) => identity,
        Err(message) => {
            tracing::info!(%message, "Rejected sign-in form");
            let role = form.role.parse().unwrap_or(Role::User);
            return Ok(LoginTemplate {
                page: page_info(state.shell().navigation(), LOGIN_PATH),
                body_class: state
                    .shell()
                    .layouts()
                    .default_for(LOGIN_PATH)
                    .body_classes(),
                error: Some(message),
                current_user: None,
                next,
                name: form.name,
                email: form.email,
                roles: RoleOption::all(role),
            }
            .into_response());
        }
    };

    tracing::info!(user_id = %identity.id, role = identity.role.as_str(), "Signed in");
    visitor.sessions().set(identity)?;
    visitor.cycle_id().await?;
    visitor.commit().await?;

    Ok(Redirect::to(&next).into_response())
}

/// POST /auth/logout
async fn logout(mut visitor: Visitor) -> Result<Response, AppError> {
    visitor.restore();
    if let Some(identity) = visitor.identity() {
        tracing::info!(user_id = %identity.id, "Signed out");
    }
    visitor.sign_out();
    visitor.commit().await?;

    Ok(Redirect::to(LOGIN_PATH).into_response())
}

fn identity_from_form(form: &LoginForm) -> Result<Identity, String> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err("Please enter your name".to_string());
    }
    let email = Email::parse(form.email.trim()).map_err(|e| e.to_string())?;
    let role: Role = form.role.parse().map_err(|e: RoleParseError| e.to_string())?;

    Ok(Identity {
        id: UserId::generate(),
        name: name.to_string(),
        email,
        role,
        permissions: BTreeSet::new(),
        avatar: None,
    })
}

/// Only same-site absolute paths are followed after sign-in.
///
/// A path a browser could read as another host (`//`, `/\` or their
/// percent-encoded forms) falls back to `/`. So does the sign-in page.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) && !is_login_path(path) => path,
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if path.contains('\\') || path.chars().any(char::is_control) {
        return false;
    }
    let lower = rest.get(..3).map(str::to_ascii_lowercase);
    !(rest.starts_with('/') || matches!(lower.as_deref(), Some("%2f" | "%5c")))
}

fn is_login_path(path: &str) -> bool {
    path.strip_prefix(LOGIN_PATH)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}
