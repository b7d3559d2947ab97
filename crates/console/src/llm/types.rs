//! Request and response types shared by the provider clients.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TOP_P: f64 = 1.0;

/// Upstream LLM provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "claude")]
    Claude,
}

impl Provider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a provider name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl std::str::FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "claude" => Ok(Self::Claude),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// One conversation turn as posted by the client.
///
/// `content` is forwarded untouched: a string or an array of content blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.role == "system"
    }

    /// Plain text of the message.
    ///
    /// Block arrays contribute their `text` fields joined by newlines; any
    /// other shape is rendered as JSON.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(text) => text.clone(),
            Value::Array(blocks) => {
                let texts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect();
                if texts.is_empty() {
                    self.content.to_string()
                } else {
                    texts.join("\n")
                }
            }
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Sampling parameters. Unset values fall back to provider defaults.
///
/// Both `max_tokens` and `maxTokens` spellings are read; the snake_case one
/// wins when a body carries both. Token counts keep the number exactly as
/// sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParametersBody")]
pub struct Parameters {
    pub temperature: Option<f64>,
    pub max_tokens: Option<Number>,
    pub top_p: Option<f64>,
    pub top_k: Option<Number>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ParametersBody {
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    max_tokens: Option<Number>,
    #[serde(default, rename = "maxTokens")]
    max_tokens_camel: Option<Number>,
    #[serde(default)]
    top_p: Option<f64>,
    #[serde(default, rename = "topP")]
    top_p_camel: Option<f64>,
    #[serde(default)]
    top_k: Option<Number>,
    #[serde(default, rename = "topK")]
    top_k_camel: Option<Number>,
    #[serde(default)]
    frequency_penalty: Option<f64>,
    #[serde(default, rename = "frequencyPenalty")]
    frequency_penalty_camel: Option<f64>,
    #[serde(default)]
    presence_penalty: Option<f64>,
    #[serde(default, rename = "presencePenalty")]
    presence_penalty_camel: Option<f64>,
}

impl From<ParametersBody> for Parameters {
    fn from(body: ParametersBody) -> Self {
        Self {
            temperature: body.temperature,
            max_tokens: body.max_tokens.or(body.max_tokens_camel),
            top_p: body.top_p.or(body.top_p_camel),
            top_k: body.top_k.or(body.top_k_camel),
            frequency_penalty: body.frequency_penalty.or(body.frequency_penalty_camel),
            presence_penalty: body.presence_penalty.or(body.presence_penalty_camel),
        }
    }
}

impl Parameters {
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    #[must_use]
    pub fn max_tokens(&self) -> Number {
        self.max_tokens
            .clone()
            .unwrap_or_else(|| Number::from(DEFAULT_MAX_TOKENS))
    }

    #[must_use]
    pub fn top_p(&self) -> f64 {
        self.top_p.unwrap_or(DEFAULT_TOP_P)
    }
}

/// A normalised completion from either provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub content: String,
    pub model: String,
    /// Token usage exactly as the provider reported it.
    pub usage: Value,
}

/// Placeholder content when the provider returned no text.
pub const NO_RESPONSE: &str = "No response";

/// Replace missing or empty content with [`NO_RESPONSE`].
pub(super) fn content_or_placeholder(content: Option<String>) -> String {
    content
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}
