//! Agent trait: one user message in, one assistant reply out.

use async_trait::async_trait;

/// A conversational agent driven one turn at a time.
///
/// Callers never have more than one `submit` outstanding.
#[async_trait]
pub trait Agent: Send {
    /// The opening assistant line, if the agent was seeded with one.
    fn greeting(&self) -> Option<String>;

    /// Answer a single user message.
    async fn submit(&mut self, user_text: &str) -> crate::Result<String>;
}
