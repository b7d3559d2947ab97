//! Error types for the upstream LLM clients.

use thiserror::Error;

use super::types::Provider;

/// Errors that can occur when calling an upstream provider.
///
/// None of these are shown to the caller verbatim; the HTTP layer logs them
/// and answers with a generic message.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key was configured for the provider.
    #[error("{0} API key not configured")]
    NotConfigured(Provider),

    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API key could not be used as a header value.
    #[error("invalid API key for {0}")]
    InvalidKey(Provider),

    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {message}")]
    Upstream {
        provider: Provider,
        status: u16,
        /// Provider error message when the body parsed, otherwise the raw body.
        message: String,
    },

    /// Rate limited by the provider.
    #[error("{provider} rate limited, retry after {retry_after} seconds")]
    RateLimited { provider: Provider, retry_after: u64 },

    /// Failed to parse a success response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Error body shared by both providers: `{"error": {"type", "message"}}`.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    pub message: String,
}

/// Turn a non-success response into a [`ProviderError`].
pub(super) async fn error_from_status(
    provider: Provider,
    response: reqwest::Response,
) -> ProviderError {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return ProviderError::RateLimited {
            provider,
            retry_after,
        };
    }

    match response.text().await {
        Ok(body) => {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|api_error| match api_error.error.error_type {
                    Some(error_type) => format!("{error_type}: {}", api_error.error.message),
                    None => api_error.error.message,
                })
                .unwrap_or(body);
            ProviderError::Upstream {
                provider,
                status: status.as_u16(),
                message,
            }
        }
        Err(e) => ProviderError::Http(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::NotConfigured(Provider::OpenAi);
        assert_eq!(err.to_string(), "openai API key not configured");

        let err = ProviderError::Upstream {
            provider: Provider::Claude,
            status: 400,
            message: "invalid_request_error: max_tokens too large".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "claude API error (400): invalid_request_error: max_tokens too large"
        );

        let err = ProviderError::RateLimited {
            provider: Provider::OpenAi,
            retry_after: 20,
        };
        assert_eq!(err.to_string(), "openai rate limited, retry after 20 seconds");
    }

    #[test]
    fn test_api_error_response_deserialize() {
        let json = r#"{
            "type": "error",
            "error": {
                "type": "invalid_request_error",
                "message": "messages: field required"
            }
        }"#;
        let response: ApiErrorResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(
            response.error.error_type.as_deref(),
            Some("invalid_request_error")
        );
        assert_eq!(response.error.message, "messages: field required");
    }

    #[test]
    fn test_openai_error_shape_deserialize() {
        let json = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let response: ApiErrorResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(response.error.message, "Incorrect API key provided");
    }
}
