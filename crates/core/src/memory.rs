//! Memory trait: the conversation log an agent carries between turns.
//!
//! The log is ordered and append-only. It can be replaced wholesale with
//! `load`, which is how a session gets its initial greeting.

use crate::error::MemoryError;
use crate::message::{Message, MessageRecord};

/// The core MemoryStore trait.
///
/// Implementations: in-process `ConversationMemory`.
pub trait MemoryStore: Send + Sync {
    /// Replace the whole log with `records`.
    ///
    /// Every record is validated before anything is replaced; on error the
    /// previous content is left as it was.
    fn load(&mut self, records: Vec<MessageRecord>) -> std::result::Result<(), MemoryError>;

    /// Add one message to the end of the log.
    fn append(&mut self, message: Message);

    /// All messages, oldest first.
    fn history(&self) -> &[Message];

    /// Number of messages in the log.
    fn len(&self) -> usize {
        self.history().len()
    }

    fn is_empty(&self) -> bool {
        self.history().is_empty()
    }
}
