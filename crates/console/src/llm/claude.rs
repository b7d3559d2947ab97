//! Anthropic Messages API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::instrument;
use url::Url;

use crate::config::ProviderConfig;

use super::error::{ProviderError, error_from_status};
use super::types::{ChatMessage, Completion, Parameters, Provider, content_or_placeholder};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: Number,
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<Number>,
    messages: Vec<&'a ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Claude API client.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl ClaudeClient {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn from_config(
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Option<Self>, ProviderError> {
        let Some(api_key) = &config.api_key else {
            return Ok(None);
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|_| ProviderError::InvalidKey(Provider::Claude))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Some(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                endpoint: config.api_url.clone(),
                model: config.model.clone(),
            }),
        }))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Send one messages request.
    ///
    /// System-role messages are dropped from the list; the system prompt
    /// travels in the dedicated `system` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the provider answers with a
    /// non-success status, or the body cannot be parsed.
    #[instrument(skip(self, messages, system_prompt), fields(model = %self.inner.model, messages = messages.len()))]
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        parameters: &Parameters,
    ) -> Result<Completion, ProviderError> {
        let request = build_request(&self.inner.model, messages, system_prompt, parameters);

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_status(Provider::Claude, response).await);
        }

        let body = response.text().await?;
        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Parse(format!("Failed to parse response: {e}")))?;

        Ok(Completion {
            content: content_or_placeholder(
                parsed.content.into_iter().next().and_then(|block| block.text),
            ),
            model: parsed.model.unwrap_or_else(|| self.inner.model.clone()),
            usage: parsed.usage,
        })
    }
}

fn build_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    system_prompt: Option<&'a str>,
    parameters: &Parameters,
) -> MessagesRequest<'a> {
    MessagesRequest {
        model,
        max_tokens: parameters.max_tokens(),
        temperature: parameters.temperature(),
        top_p: parameters.top_p(),
        top_k: parameters.top_k.clone(),
        messages: messages.iter().filter(|m| !m.is_system()).collect(),
        system: system_prompt.filter(|prompt| !prompt.is_empty()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_are_moved_to_system_field() {
        let messages = [
            ChatMessage::new("system", "ignored"),
            ChatMessage::new("user", "Summarise Article 32 GDPR."),
        ];
        let request = build_request(
            "claude-3-5-sonnet-20241022",
            &messages,
            Some("Answer as a DPO."),
            &Parameters::default(),
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "Answer as a DPO.");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("top_k").is_none());
    }

    #[test]
    fn test_top_k_only_when_given() {
        let messages = [ChatMessage::new("user", "hi")];
        let params = Parameters {
            top_k: Some(Number::from(5)),
            ..Parameters::default()
        };
        let json = serde_json::to_value(build_request("m", &messages, None, &params)).unwrap();
        assert_eq!(json["top_k"], 5);
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_response_parse() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [{"type": "text", "text": "Encryption at rest."}],
            "usage": {"input_tokens": 20, "output_tokens": 4}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content[0].text.as_deref(), Some("Encryption at rest."));
        assert_eq!(parsed.usage["output_tokens"], 4);
    }
}
