//! Memory implementations for atomchat.

pub mod conversation;

pub use conversation::ConversationMemory;
