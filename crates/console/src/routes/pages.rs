//! Server-rendered console pages.
//!
//! Every page goes through the same pipeline; the shell template then draws
//! the header, sidebar and chat widget the resolved layout asks for.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use arioncomply_core::navigation::PLACEHOLDER_PATH;
use arioncomply_core::ui::Notification;
use arioncomply_core::{
    Chrome, Identity, NavItem, NavigationTable, PageFrame, PageRequest, QueryFlags, UiState,
};

use crate::error::AppError;
use crate::filters;
use crate::middleware::Visitor;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Title and lead text of a page.
#[derive(Debug, Clone)]
pub struct PageInfo {
    pub title: String,
    pub description: String,
}

/// Signed-in user for the header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub email: String,
    pub role: String,
    pub initials: String,
}

impl From<&Identity> for UserView {
    fn from(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            email: identity.email.to_string(),
            role: identity.role.title().to_string(),
            initials: identity.initials(),
        }
    }
}

/// Child link in a sidebar group.
#[derive(Debug, Clone)]
pub struct NavLinkView {
    pub name: String,
    pub icon: String,
    pub path: String,
    pub active: bool,
}

/// Sidebar entry.
#[derive(Debug, Clone)]
pub struct NavItemView {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub path: String,
    pub description: String,
    pub shortcut: Option<String>,
    pub active: bool,
    pub is_group: bool,
    pub children: Vec<NavLinkView>,
}

impl NavItemView {
    fn new(item: &NavItem, current_path: &str) -> Self {
        let entry = &item.entry;
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            icon: entry.icon.clone(),
            path: entry.path.clone(),
            description: entry.description.clone(),
            shortcut: entry.shortcut.map(String::from),
            active: item.active,
            is_group: entry.is_placeholder(),
            children: entry
                .children
                .iter()
                .map(|child| NavLinkView {
                    name: child.name.clone(),
                    icon: child.icon.clone(),
                    path: child.path.clone(),
                    active: child.path == current_path,
                })
                .collect(),
        }
    }
}

/// Notification row in the header dropdown.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub icon: String,
    pub read: bool,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            title: notification.title.clone(),
            message: notification.message.clone(),
            kind: notification.kind.as_str().to_string(),
            icon: notification
                .icon
                .clone()
                .unwrap_or_else(|| "fas fa-bell".to_string()),
            read: notification.read,
        }
    }
}

/// The application shell around every console page.
#[derive(Template, WebTemplate)]
#[template(path = "shell.html")]
pub struct ShellTemplate {
    pub page: PageInfo,
    pub path: String,
    pub chrome: Chrome,
    pub body_class: String,
    pub user: Option<UserView>,
    pub navigation: Vec<NavItemView>,
    pub chat_context: String,
    pub chat_open: bool,
    pub sidebar_open: bool,
    pub search_query: String,
    pub unread_count: usize,
    pub notifications: Vec<NotificationView>,
}

impl ShellTemplate {
    #[must_use]
    pub fn new(frame: &PageFrame, ui: &UiState, page: PageInfo) -> Self {
        Self {
            page,
            path: frame.path.clone(),
            chrome: frame.chrome,
            body_class: frame.body_class.clone(),
            user: frame.identity.as_ref().map(UserView::from),
            navigation: frame
                .navigation
                .iter()
                .map(|item| NavItemView::new(item, &frame.path))
                .collect(),
            chat_context: frame.chat_context.clone(),
            chat_open: ui.chat.open,
            sidebar_open: ui.layout.sidebar_open,
            search_query: ui.header.search_query.clone(),
            unread_count: ui.unread_count(),
            notifications: ui
                .notifications
                .items()
                .iter()
                .map(NotificationView::from)
                .collect(),
        }
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Whether the browser is loading this page inside a frame.
#[must_use]
pub fn is_embedded_frame(headers: &HeaderMap) -> bool {
    headers
        .get("sec-fetch-dest")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|dest| dest.eq_ignore_ascii_case("iframe"))
}

/// Strip a trailing slash so `/controls/` and `/controls` resolve alike.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Build the pipeline request for a page URI.
#[must_use]
pub fn page_request(uri: &Uri, headers: &HeaderMap) -> PageRequest {
    PageRequest::new(normalize_path(uri.path()))
        .with_flags(QueryFlags::from_query(uri.query().unwrap_or_default()))
        .embedded(is_embedded_frame(headers))
}

/// Title and description for a path.
///
/// Navigation entries name their own pages; a few pages outside the sidebar
/// are listed here; anything else is titled from its last path segment.
#[must_use]
pub fn page_info(navigation: &NavigationTable, path: &str) -> PageInfo {
    if let Some(entry) = navigation
        .iter()
        .find(|entry| entry.path == path && entry.path != PLACEHOLDER_PATH)
    {
        return PageInfo {
            title: entry.name.clone(),
            description: entry.description.clone(),
        };
    }

    let (title, description) = match path {
        "/assessments" => ("Assessments", "Compliance framework assessments"),
        "/chat" => ("Compliance Assistant", "Ask questions about your compliance programme"),
        "/help" => ("Help Center", "Guides and answers for the ArionComply console"),
        "/privacy" => ("Privacy Policy", "How ArionComply handles personal data"),
        "/terms" => ("Terms of Service", "Terms governing use of ArionComply"),
        "/auth" | "/login" => ("Sign In", "Sign in to ArionComply"),
        "/register" => ("Create Account", "Register for ArionComply"),
        "/forgot-password" => ("Reset Password", "Recover access to your account"),
        _ => {
            return PageInfo {
                title: title_from_segment(path),
                description: String::new(),
            };
        }
    };

    PageInfo {
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn title_from_segment(path: &str) -> String {
    let segment = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("ArionComply");
    segment
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Handlers
// =============================================================================

/// Render any console page.
///
/// Unauthenticated visitors asking for a protected page are redirected to
/// the login page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
#[instrument(skip(state, headers, visitor), fields(path = %uri.path()))]
pub async fn show(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    mut visitor: Visitor,
) -> Result<Response, AppError> {
    let shell = state.shell();
    let request = page_request(&uri, &headers);
    let frame = visitor.run_page(&shell, &request);
    let ui = visitor.ui().clone();
    visitor.commit().await?;

    if let Some(target) = frame.redirect {
        return Ok(Redirect::to(target).into_response());
    }

    let page = page_info(shell.navigation(), &frame.path);
    Ok(ShellTemplate::new(&frame, &ui, page).into_response())
}
