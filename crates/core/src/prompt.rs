//! Prompt capabilities: things that render into the system prompt.

use crate::error::ContextError;

/// A pluggable source of one line of dynamic context.
pub trait ContextProvider: Send + Sync {
    /// Section heading shown above the line.
    fn title(&self) -> &str;

    /// Produce the context line for this moment.
    fn info(&self) -> std::result::Result<String, ContextError>;
}

/// Anything that can produce the instruction text for a model call.
pub trait PromptRenderable: Send + Sync {
    fn render(&self) -> std::result::Result<String, ContextError>;
}
