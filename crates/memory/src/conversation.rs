//! In-process conversation log for the lifetime of one session.

use atomchat_core::error::MemoryError;
use atomchat_core::memory::MemoryStore;
use atomchat_core::message::{Message, MessageRecord};
use tracing::debug;

/// An ordered, append-only log of the messages exchanged in one session.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory already seeded with `records`.
    pub fn seeded(records: Vec<MessageRecord>) -> Result<Self, MemoryError> {
        let mut memory = Self::new();
        memory.load(records)?;
        Ok(memory)
    }

    /// Load seed data from a JSON array of message records.
    pub fn load_json(&mut self, json: &str) -> Result<(), MemoryError> {
        let records: Vec<MessageRecord> = serde_json::from_str(json)
            .map_err(|e| MemoryError::Validation(format!("seed is not a message list: {e}")))?;
        self.load(records)
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl MemoryStore for ConversationMemory {
    fn load(&mut self, records: Vec<MessageRecord>) -> Result<(), MemoryError> {
        if records.is_empty() {
            return Err(MemoryError::Validation(
                "seed must contain at least one message".into(),
            ));
        }

        let messages = records
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = messages.len(), "Loaded conversation memory");
        self.messages = messages;
        Ok(())
    }

    fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn history(&self) -> &[Message] {
        &self.messages
    }
}
