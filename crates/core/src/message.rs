//! Message domain types.
//!
//! A `Message` is one entry in the conversation log. `MessageRecord` is the
//! loose shape seed data arrives in (config file, JSON) before it has been
//! checked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MemoryError;

/// Tool metadata recorded on messages produced without a tool call.
pub const NO_TOOL_USED: &str = "no tool used";

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

fn default_tool_message() -> String {
    NO_TOOL_USED.into()
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Description of the tool invocation behind this message
    #[serde(default = "default_tool_message")]
    pub tool_message: String,

    /// Identifier of the tool invocation, if one ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_message: default_tool_message(),
            tool_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Attach tool invocation metadata.
    pub fn with_tool(mut self, tool_message: impl Into<String>, tool_id: impl Into<String>) -> Self {
        self.tool_message = tool_message.into();
        self.tool_id = Some(tool_id.into());
        self
    }
}

/// An unvalidated message, as found in seed data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
}

impl MessageRecord {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            content: content.into(),
            tool_message: None,
            tool_id: None,
        }
    }
}

impl TryFrom<MessageRecord> for Message {
    type Error = MemoryError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        let role = record.role.ok_or_else(|| {
            MemoryError::Validation(format!("message '{}' has no role", record.content))
        })?;
        let mut message = Message::with_role(role, record.content);
        if let Some(tool_message) = record.tool_message {
            message.tool_message = tool_message;
        }
        message.tool_id = record.tool_id;
        Ok(message)
    }
}
