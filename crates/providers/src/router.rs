//! Provider router: builds the configured LLM provider.

use std::sync::Arc;

use atomchat_config::{AppConfig, ConfigError, Credential};
use atomchat_core::provider::Provider;
use tracing::debug;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named in `config`.
///
/// Well-known names resolve to their public endpoint; `api_url` overrides it.
/// An unknown name without `api_url` is rejected.
pub fn build_from_config(
    config: &AppConfig,
    credential: &Credential,
) -> Result<Arc<dyn Provider>, ConfigError> {
    let name = config.provider.as_str();

    let base_url = match (&config.api_url, default_base_url(name)) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => url,
        (None, None) => return Err(ConfigError::UnknownProvider(name.to_string())),
    };

    debug!(provider = name, base_url = %base_url, "Building provider");

    let provider = match (name, &config.api_url) {
        ("groq", None) => OpenAiCompatProvider::groq(credential.clone()),
        ("openai", None) => OpenAiCompatProvider::openai(credential.clone()),
        ("ollama", None) => OpenAiCompatProvider::ollama(None, credential.clone()),
        _ => OpenAiCompatProvider::new(name, base_url, credential.clone()),
    };

    Ok(Arc::new(provider))
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "groq" => "https://api.groq.com/openai/v1",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.into())
}
