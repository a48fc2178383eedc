//! # atomchat core
//!
//! Domain types, capability traits, and error definitions for atomchat.
//! Every collaborator of the chat session is a trait here; the concrete
//! adapters live in their own crates and depend inward on this one.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod memory;
pub mod prompt;
pub mod agent;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, MessageRecord, Role, NO_TOOL_USED};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ReplyToolCall, ToolDefinition};
pub use tool::{Tool, ToolResult};
pub use memory::MemoryStore;
pub use prompt::{ContextProvider, PromptRenderable};
pub use agent::Agent;
