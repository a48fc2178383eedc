//! Session construction from `AppConfig`.

use std::sync::Arc;

use atomchat_config::AppConfig;
use atomchat_core::provider::Provider;
use atomchat_memory::ConversationMemory;

use crate::context::{Clock, DateTimeContextProvider, SystemClock};
use crate::prompt::PromptSpec;
use crate::session::AgentSession;

/// Name the date/time provider is registered under.
pub const DATETIME_PROVIDER: &str = "datetime";

/// Build a session as configured, reading the host clock.
pub fn build_session(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
) -> atomchat_core::Result<AgentSession> {
    build_session_with_clock(config, provider, SystemClock)
}

/// Build a session as configured, reading time from `clock`.
///
/// Fails on a bad `prompt.date_format` or an invalid `memory.seed`.
pub fn build_session_with_clock(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    clock: impl Clock + 'static,
) -> atomchat_core::Result<AgentSession> {
    let date = DateTimeContextProvider::new(&config.prompt.date_title)
        .with_format(&config.prompt.date_format)?
        .with_clock(clock);

    let prompt = PromptSpec::new(
        config.prompt.background.clone(),
        config.prompt.steps.clone(),
        config.prompt.output_instructions.clone(),
    )
    .with_context_provider(DATETIME_PROVIDER, Box::new(date));

    let memory = ConversationMemory::seeded(config.memory.seed.clone())?;

    let mut session = AgentSession::new(provider, &config.model, prompt, memory)
        .with_temperature(config.temperature);
    if let Some(max) = config.max_tokens {
        session = session.with_max_tokens(max);
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atomchat_core::agent::Agent;
    use atomchat_core::error::{ContextError, Error, MemoryError, ProviderError};
    use atomchat_core::memory::MemoryStore;
    use atomchat_core::message::{MessageRecord, Role};
    use atomchat_core::provider::{ProviderRequest, ProviderResponse};

    struct OfflineProvider;

    #[async_trait]
    impl Provider for OfflineProvider {
        fn name(&self) -> &str {
            "offline"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Network("offline".into()))
        }
    }

    #[test]
    fn default_config_builds_with_greeting() {
        let session = build_session(&AppConfig::default(), Arc::new(OfflineProvider)).unwrap();
        assert_eq!(
            session.greeting().as_deref(),
            Some("How do you do and what can I do for you today?")
        );
        assert_eq!(session.model(), "llama3-70b-8192");
    }

    #[test]
    fn seed_comes_from_config() {
        let mut config = AppConfig::default();
        config.model = "mixtral-8x7b-32768".into();
        config.memory.seed = vec![
            MessageRecord::new(Role::User, "hello"),
            MessageRecord::new(Role::Assistant, "Ready to crunch numbers."),
        ];

        let session = build_session(&config, Arc::new(OfflineProvider)).unwrap();
        assert_eq!(session.greeting().as_deref(), Some("Ready to crunch numbers."));
        assert_eq!(session.memory().len(), 2);
        assert_eq!(session.model(), "mixtral-8x7b-32768");
    }

    #[test]
    fn bad_date_format_fails_at_startup() {
        let mut config = AppConfig::default();
        config.prompt.date_format = "%Q nonsense".into();

        let err = build_session(&config, Arc::new(OfflineProvider)).err().unwrap();
        assert!(matches!(err, Error::Context(ContextError::InvalidFormat(_))));
    }

    #[test]
    fn seed_without_role_fails_at_startup() {
        let mut config = AppConfig::default();
        config.memory.seed = vec![MessageRecord {
            content: "anonymous".into(),
            ..MessageRecord::default()
        }];

        let err = build_session(&config, Arc::new(OfflineProvider)).err().unwrap();
        assert!(matches!(err, Error::Memory(MemoryError::Validation(_))));
    }
}
