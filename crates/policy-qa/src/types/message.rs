//! Chat messages and the per-session transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role/content pair sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A rendered transcript entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// `user` or `assistant`
    pub role: Role,
    /// Message text as shown to the user
    pub content: String,
    /// True when the assistant turn reports a failed question
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

/// Append-only history of one session.
///
/// Only `user` and `assistant` turns can be recorded; system prompts never
/// appear in the transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user question
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into(), false);
    }

    /// Record a model answer
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into(), false);
    }

    /// Record a failed question as an assistant turn
    pub fn push_error(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into(), true);
    }

    fn push(&mut self, role: Role, content: String, is_error: bool) {
        self.turns.push(Turn {
            role,
            content,
            is_error,
            timestamp: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
