//! A single chat session: prompt, memory, and provider wired together.

use std::sync::Arc;

use async_trait::async_trait;
use atomchat_core::agent::Agent;
use atomchat_core::error::ProviderError;
use atomchat_core::memory::MemoryStore;
use atomchat_core::message::{Message, Role};
use atomchat_core::prompt::PromptRenderable;
use atomchat_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use serde::Deserialize;
use tracing::{debug, warn};

/// Name of the forced tool carrying the structured reply.
pub const OUTPUT_TOOL: &str = "AgentOutput";

/// The structured reply the model fills in.
#[derive(Debug, Deserialize)]
struct AgentOutput {
    chat_message: String,
}

/// Tool definition that forces the model to answer as `{chat_message}`.
pub fn output_tool() -> ToolDefinition {
    ToolDefinition {
        name: OUTPUT_TOOL.into(),
        description: format!(
            "Correctly extracted `{OUTPUT_TOOL}` with all the required parameters with correct types"
        ),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "chat_message": {
                    "type": "string",
                    "description": "The chat message exchanged between the user and the chat agent."
                }
            },
            "required": ["chat_message"]
        }),
    }
}

/// Conversational agent over one LLM provider.
pub struct AgentSession {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    prompt: Box<dyn PromptRenderable>,
    memory: Box<dyn MemoryStore>,
}

impl AgentSession {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        prompt: impl PromptRenderable + 'static,
        memory: impl MemoryStore + 'static,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: atomchat_core::provider::default_temperature(),
            max_tokens: None,
            prompt: Box::new(prompt),
            memory: Box::new(memory),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The conversation so far.
    pub fn memory(&self) -> &dyn MemoryStore {
        self.memory.as_ref()
    }

    /// Pull the chat message out of a provider reply.
    fn decode(response: ProviderResponse) -> Result<String, ProviderError> {
        if let Some(call) = response.tool_calls.iter().find(|c| c.name == OUTPUT_TOOL) {
            let output: AgentOutput = serde_json::from_str(&call.arguments).map_err(|e| {
                ProviderError::MalformedReply(format!("{OUTPUT_TOOL} arguments: {e}"))
            })?;
            return Ok(output.chat_message);
        }

        if !response.content.trim().is_empty() {
            debug!("Model answered without the output tool; using plain content");
            return Ok(response.content);
        }

        Err(ProviderError::MalformedReply(
            "reply carried neither an output tool call nor text".into(),
        ))
    }
}

#[async_trait]
impl Agent for AgentSession {
    fn greeting(&self) -> Option<String> {
        self.memory
            .history()
            .iter()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.clone())
    }

    async fn submit(&mut self, user_text: &str) -> atomchat_core::Result<String> {
        self.memory.append(Message::user(user_text));

        let system_prompt = self.prompt.render()?;

        let request = ProviderRequest {
            model: self.model.clone(),
            system_prompt,
            messages: self.memory.history().to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: vec![output_tool()],
            tool_choice: Some(OUTPUT_TOOL.into()),
        };

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            history = request.messages.len(),
            "Submitting turn"
        );

        let reply = self
            .provider
            .complete(request)
            .await
            .and_then(Self::decode)
            .inspect_err(|e| warn!(error = %e, "Turn failed"))?;

        self.memory.append(Message::assistant(reply.clone()));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptSpec;
    use atomchat_core::error::{ContextError, Error};
    use atomchat_core::message::MessageRecord;
    use atomchat_core::prompt::ContextProvider;
    use atomchat_core::provider::ReplyToolCall;
    use atomchat_memory::ConversationMemory;
    use std::sync::Mutex;

    /// A provider that replays scripted results and records every request.
    struct ScriptedProvider {
        replies: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<ProviderResponse, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ProviderRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop()
                .expect("ScriptedProvider: no more replies")
        }
    }

    fn tool_reply(text: &str) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            content: String::new(),
            tool_calls: vec![ReplyToolCall {
                id: "call_1".into(),
                name: OUTPUT_TOOL.into(),
                arguments: serde_json::json!({ "chat_message": text }).to_string(),
            }],
            usage: None,
            model: "llama3-70b-8192".into(),
        })
    }

    fn text_reply(text: &str) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            content: text.into(),
            tool_calls: vec![],
            usage: None,
            model: "llama3-70b-8192".into(),
        })
    }

    fn memory() -> ConversationMemory {
        ConversationMemory::seeded(vec![MessageRecord::new(
            Role::Assistant,
            "How do you do and what can I do for you today?",
        )])
        .unwrap()
    }

    fn prompt() -> PromptSpec {
        PromptSpec::new(vec!["You are a helpful assistant.".into()], vec![], vec![])
    }

    fn session(provider: Arc<ScriptedProvider>) -> AgentSession {
        AgentSession::new(provider, "llama3-70b-8192", prompt(), memory())
    }

    #[test]
    fn greeting_is_first_assistant_message() {
        let session = session(ScriptedProvider::new(vec![]));
        assert_eq!(
            session.greeting().as_deref(),
            Some("How do you do and what can I do for you today?")
        );
    }

    #[tokio::test]
    async fn submit_appends_both_messages() {
        let provider = ScriptedProvider::new(vec![tool_reply("2 + 2 is 4.")]);
        let mut session = session(provider.clone()).with_temperature(0.2).with_max_tokens(64);

        let reply = session.submit("What is 2 + 2?").await.unwrap();
        assert_eq!(reply, "2 + 2 is 4.");

        let history = session.memory().history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].content, "What is 2 + 2?");
        assert_eq!(history[2].role, Role::Assistant);
        assert_eq!(history[2].content, "2 + 2 is 4.");
    }

    #[tokio::test]
    async fn request_carries_prompt_history_and_forced_tool() {
        let provider = ScriptedProvider::new(vec![tool_reply("Hi.")]);
        let mut session = session(provider.clone()).with_max_tokens(64);
        session.submit("Hello").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, "llama3-70b-8192");
        assert_eq!(req.system_prompt, "# IDENTITY and PURPOSE\n- You are a helpful assistant.");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[1].content, "Hello");
        assert_eq!(req.tool_choice.as_deref(), Some(OUTPUT_TOOL));
        assert_eq!(req.tools[0].name, OUTPUT_TOOL);
        assert_eq!(req.max_tokens, Some(64));
    }

    #[tokio::test]
    async fn history_grows_across_turns() {
        let provider = ScriptedProvider::new(vec![tool_reply("one"), tool_reply("two")]);
        let mut session = session(provider.clone());
        session.submit("first").await.unwrap();
        session.submit("second").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests[1].messages.len(), 4);
        assert_eq!(requests[1].messages[2].content, "one");
        assert_eq!(session.memory().len(), 5);
    }

    #[tokio::test]
    async fn plain_content_accepted() {
        let provider = ScriptedProvider::new(vec![text_reply("Just text.")]);
        let mut session = session(provider);
        assert_eq!(session.submit("hi").await.unwrap(), "Just text.");
    }

    #[tokio::test]
    async fn transport_error_keeps_user_message_only() {
        let provider = ScriptedProvider::new(vec![Err(ProviderError::Network("reset".into()))]);
        let mut session = session(provider);

        let err = session.submit("hello?").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Network(_))));
        assert!(err.is_recoverable());

        let history = session.memory().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].content, "hello?");
    }

    #[tokio::test]
    async fn empty_reply_is_malformed() {
        let provider = ScriptedProvider::new(vec![text_reply("  ")]);
        let mut session = session(provider);
        let err = session.submit("hi").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::MalformedReply(_))));
    }

    #[tokio::test]
    async fn bad_tool_arguments_are_malformed() {
        let provider = ScriptedProvider::new(vec![Ok(ProviderResponse {
            content: String::new(),
            tool_calls: vec![ReplyToolCall {
                id: "call_1".into(),
                name: OUTPUT_TOOL.into(),
                arguments: r#"{"message": "wrong field"}"#.into(),
            }],
            usage: None,
            model: String::new(),
        })]);
        let mut session = session(provider);
        let err = session.submit("hi").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::MalformedReply(_))));
    }

    #[tokio::test]
    async fn clock_failure_is_fatal() {
        struct DeadClock;
        impl ContextProvider for DeadClock {
            fn title(&self) -> &str {
                "Date"
            }
            fn info(&self) -> Result<String, ContextError> {
                Err(ContextError::Clock("stopped".into()))
            }
        }

        let provider = ScriptedProvider::new(vec![]);
        let prompt = prompt().with_context_provider("date", Box::new(DeadClock));
        let mut session = AgentSession::new(provider.clone(), "m", prompt, memory());

        let err = session.submit("hi").await.unwrap_err();
        assert!(matches!(err, Error::Context(ContextError::Clock(_))));
        assert!(!err.is_recoverable());
        assert!(provider.requests().is_empty());
    }
}
