//! `OpenAI` chat completions client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::instrument;
use url::Url;

use crate::config::ProviderConfig;

use super::error::{ProviderError, error_from_status};
use super::types::{ChatMessage, Completion, Parameters, Provider, content_or_placeholder};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: Number,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `OpenAI` API client.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

struct OpenAiClientInner {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl OpenAiClient {
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
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|_| ProviderError::InvalidKey(Provider::OpenAi))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Some(Self {
            inner: Arc::new(OpenAiClientInner {
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

    /// Run one chat completion.
    ///
    /// The system prompt, when given, is sent as a leading system message.
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
            return Err(error_from_status(Provider::OpenAi, response).await);
        }

        let body = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Parse(format!("Failed to parse response: {e}")))?;

        Ok(Completion {
            content: content_or_placeholder(
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message)
                    .and_then(|message| message.content),
            ),
            model: parsed.model.unwrap_or_else(|| self.inner.model.clone()),
            usage: parsed.usage,
        })
    }
}

fn build_request<'a>(
    model: &'a str,
    messages: &[ChatMessage],
    system_prompt: Option<&str>,
    parameters: &Parameters,
) -> CompletionRequest<'a> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if let Some(prompt) = system_prompt.filter(|prompt| !prompt.is_empty()) {
        wire.push(ChatMessage::new("system", prompt));
    }
    wire.extend(messages.iter().cloned());

    CompletionRequest {
        model,
        messages: wire,
        temperature: parameters.temperature(),
        max_tokens: parameters.max_tokens(),
        top_p: parameters.top_p(),
        frequency_penalty: parameters.frequency_penalty.unwrap_or(0.0),
        presence_penalty: parameters.presence_penalty.unwrap_or(0.0),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_is_prepended() {
        let messages = [ChatMessage::new("user", "Is MFA required by ISO 27001?")];
        let request = build_request(
            "gpt-4o",
            &messages,
            Some("You are a compliance assistant."),
            &Parameters::default(),
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are a compliance assistant.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["frequency_penalty"], 0.0);
        assert_eq!(json["presence_penalty"], 0.0);
    }

    #[test]
    fn test_no_system_prompt() {
        let messages = [ChatMessage::new("user", "hello")];
        let params = Parameters {
            temperature: Some(0.1),
            presence_penalty: Some(0.5),
            ..Parameters::default()
        };
        let request = build_request("gpt-4o", &messages, None, &params);

        assert_eq!(request.messages.len(), 1);
        assert!((request.temperature - 0.1).abs() < f64::EPSILON);
        assert!((request.presence_penalty - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_response_parse() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-2024-08-06",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Yes."}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 2, "total_tokens": 14}
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.model.as_deref(), Some("gpt-4o-2024-08-06"));
        assert_eq!(parsed.usage["total_tokens"], 14);
    }

    #[test]
    fn test_client_requires_key() {
        let config = ProviderConfig {
            api_key: None,
            api_url: Url::parse("https://api.openai.com/v1/chat/completions").unwrap(),
            model: "gpt-4o".to_string(),
        };
        let client = OpenAiClient::from_config(&config, Duration::from_secs(5)).unwrap();
        assert!(client.is_none());
    }
}
