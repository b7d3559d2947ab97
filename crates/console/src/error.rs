//! Unified error handling for the console.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use arioncomply_core::SessionStoreError;

use crate::db::RepositoryError;
use crate::llm::ProviderError;

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Application-level error type for the console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Upstream LLM provider failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The HTTP session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The identity could not be stored.
    #[error("Identity error: {0}")]
    Identity(#[from] SessionStoreError),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_)
            | Self::Provider(_)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Identity(SessionStoreError::InvalidIdentity(_)) => StatusCode::BAD_REQUEST,
            Self::Identity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server errors go to Sentry with full detail; the client gets none of it.
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Console request error"
            );
        }

        let error = match &self {
            Self::Provider(_) => "Failed to get a response from the provider".to_string(),
            _ if status.is_server_error() => "Internal server error".to_string(),
            Self::BadRequest(message) => message.clone(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Set the Sentry user context from the session identity.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use arioncomply_core::IdentityError;

    use super::*;
    use crate::llm::Provider;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("Missing provider or messages".to_string());
        assert_eq!(err.to_string(), "Bad request: Missing provider or messages");

        let err = AppError::Database(RepositoryError::NotConfigured);
        assert_eq!(err.to_string(), "Database error: database not configured");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Provider(ProviderError::NotConfigured(Provider::OpenAi))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotConfigured)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Identity(SessionStoreError::InvalidIdentity(
                IdentityError::EmptyName
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn test_bad_request_message_is_passed_through() {
        let body = body_of(AppError::BadRequest("Missing provider or messages".to_string())).await;
        assert_eq!(body["error"], "Missing provider or messages");
    }

    #[tokio::test]
    async fn test_server_error_details_are_hidden() {
        let body = body_of(AppError::Provider(ProviderError::Upstream {
            provider: Provider::Claude,
            status: 401,
            message: "authentication_error: invalid x-api-key".to_string(),
        }))
        .await;
        let text = body["error"].as_str().expect("string");
        assert!(!text.contains("x-api-key"));
        assert!(!text.contains("401"));

        let body = body_of(AppError::Database(RepositoryError::NotConfigured)).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
