//! Configuration loading, validation, and management for atomchat.
//!
//! Loads configuration from `~/.atomchat/config.toml` (or an explicit path)
//! with environment variable overrides. A `.env` file in the working
//! directory is read first. Validates all settings at startup.

use atomchat_core::message::{MessageRecord, Role};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Message shown when no credential can be found.
pub const MISSING_API_KEY: &str =
    "API key is not set. Please set the API key as a static variable or in an environment variable.";

/// The root configuration structure.
///
/// Maps directly to `~/.atomchat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Static API key; wins over the environment when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable the API key is read from
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// LLM provider ("groq", "openai", "ollama", or any name with `api_url`)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// System prompt contents
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Conversation memory seed
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama3-70b-8192".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("prompt", &self.prompt)
            .field("memory", &self.memory)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_background")]
    pub background: Vec<String>,

    #[serde(default = "default_steps")]
    pub steps: Vec<String>,

    #[serde(default = "default_output_instructions")]
    pub output_instructions: Vec<String>,

    /// Heading of the date/time context section
    #[serde(default = "default_date_title")]
    pub date_title: String,

    /// strftime format for the date/time context line
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_background() -> Vec<String> {
    vec!["This assistant is a general-purpose AI designed to be helpful and friendly.".into()]
}
fn default_steps() -> Vec<String> {
    vec![
        "Understand the user input.".into(),
        "Reason about the input.".into(),
        "Respond to the user.".into(),
    ]
}
fn default_output_instructions() -> Vec<String> {
    vec![
        "Provide helpful and relevant information to assist the user.".into(),
        "Be friendly and respectful in all conversations.".into(),
        "Always use the available additional information and context to enhance the response".into(),
    ]
}
fn default_date_title() -> String {
    "Datetime Context Provider".into()
}
fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".into()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            steps: default_steps(),
            output_instructions: default_output_instructions(),
            date_title: default_date_title(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Messages the conversation starts with; the first assistant
    /// message is printed as the greeting.
    #[serde(default = "default_seed")]
    pub seed: Vec<MessageRecord>,
}

fn default_seed() -> Vec<MessageRecord> {
    vec![MessageRecord {
        role: Some(Role::Assistant),
        content: "How do you do and what can I do for you today?".into(),
        tool_message: Some(atomchat_core::NO_TOOL_USED.into()),
        tool_id: None,
    }]
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// A validated, non-empty API key.
///
/// Never printed: `Debug` and `Display` redact the value.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret, rejecting blank values.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self(secret))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.atomchat/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, then apply `.env` and process
    /// environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
        }

        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// - the variable named by `api_key_env` fills `api_key` when no static key is set
    /// - `ATOMCHAT_PROVIDER` overrides `provider`
    /// - `ATOMCHAT_MODEL` overrides `model`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let has_static_key = self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if !has_static_key {
            self.api_key = lookup(&self.api_key_env);
        }

        if let Some(provider) = lookup("ATOMCHAT_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = lookup("ATOMCHAT_MODEL") {
            self.model = model;
        }
    }

    /// The API key, or the startup error explaining how to set one.
    pub fn credential(&self) -> Result<Credential, ConfigError> {
        match &self.api_key {
            Some(key) => Credential::new(key.clone()),
            None => Err(ConfigError::MissingApiKey),
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".atomchat")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if self.memory.seed.is_empty() {
            return Err(ConfigError::ValidationError(
                "memory.seed must contain at least one message".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            provider: default_provider(),
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            prompt: PromptConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("API key is not set. Please set the API key as a static variable or in an environment variable.")]
    MissingApiKey,

    #[error("Unknown provider '{0}': set api_url to use a custom OpenAI-compatible endpoint")]
    UnknownProvider(String),
}
