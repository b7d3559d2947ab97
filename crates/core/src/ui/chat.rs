//! Chat panel state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::DEFAULT_CHAT_CONTEXT;
use crate::types::ChatMessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub open: bool,
    pub context: String,
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            open: false,
            context: DEFAULT_CHAT_CONTEXT.to_owned(),
            messages: Vec::new(),
            loading: false,
        }
    }
}

impl ChatState {
    #[must_use]
    pub fn with_open(self, open: bool) -> Self {
        Self { open, ..self }
    }

    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_loading(self, loading: bool) -> Self {
        Self { loading, ..self }
    }

    /// Append a message, oldest first.
    #[must_use]
    pub fn push(mut self, role: ChatRole, content: String, now: DateTime<Utc>) -> Self {
        self.messages.push(ChatMessage {
            id: ChatMessageId::generate(),
            role,
            content,
            timestamp: now,
        });
        self
    }

    #[must_use]
    pub fn cleared(self) -> Self {
        Self {
            messages: Vec::new(),
            ..self
        }
    }
}
