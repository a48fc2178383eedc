//! Error types for the atomchat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all atomchat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider (transport) errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Prompt context errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether a chat turn that failed with this error can be abandoned
    /// while the session keeps going.
    ///
    /// Only transport failures qualify. Everything else means the session
    /// itself is broken (a dead clock, bad seed data, bad config).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Provider(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed reply from model: {0}")]
    MalformedReply(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Invalid message data: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ContextError {
    #[error("System clock unavailable: {0}")]
    Clock(String),

    #[error("Invalid date format '{0}'")]
    InvalidFormat(String),
}

/// Failures of the expression evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn only_transport_errors_are_recoverable() {
        assert!(Error::Provider(ProviderError::Network("reset".into())).is_recoverable());
        assert!(!Error::Context(ContextError::Clock("gone".into())).is_recoverable());
        assert!(!Error::Memory(MemoryError::Validation("no role".into())).is_recoverable());
    }

    #[test]
    fn expression_error_passes_through_tool_error() {
        let err = ToolError::from(ExpressionError::Evaluation("division by zero".into()));
        assert_eq!(err.to_string(), "Evaluation error: division by zero");
    }
}
