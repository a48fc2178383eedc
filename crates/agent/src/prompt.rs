//! System prompt assembly.
//!
//! A `PromptSpec` holds the fixed instruction text plus an ordered set of
//! named context providers. Rendering produces markdown sections in a fixed
//! order and asks every provider for a fresh line each time.

use atomchat_core::error::ContextError;
use atomchat_core::prompt::{ContextProvider, PromptRenderable};

/// The instruction text and context sources for one agent.
pub struct PromptSpec {
    background: Vec<String>,
    steps: Vec<String>,
    output_instructions: Vec<String>,
    context_providers: Vec<(String, Box<dyn ContextProvider>)>,
}

impl PromptSpec {
    pub fn new(
        background: Vec<String>,
        steps: Vec<String>,
        output_instructions: Vec<String>,
    ) -> Self {
        Self {
            background,
            steps,
            output_instructions,
            context_providers: Vec::new(),
        }
    }

    /// Register a context provider under `name`.
    ///
    /// Registering the same name again swaps the provider but keeps its slot.
    pub fn add_context_provider(
        &mut self,
        name: impl Into<String>,
        provider: Box<dyn ContextProvider>,
    ) {
        let name = name.into();
        match self.context_providers.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = provider,
            None => self.context_providers.push((name, provider)),
        }
    }

    pub fn with_context_provider(
        mut self,
        name: impl Into<String>,
        provider: Box<dyn ContextProvider>,
    ) -> Self {
        self.add_context_provider(name, provider);
        self
    }

    pub fn background(&self) -> &[String] {
        &self.background
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn output_instructions(&self) -> &[String] {
        &self.output_instructions
    }

    /// Registered provider names, in registration order.
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.context_providers.iter().map(|(name, _)| name.as_str())
    }
}

fn push_section(out: &mut Vec<String>, heading: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push(format!("# {heading}"));
    out.extend(lines.iter().map(|line| format!("- {line}")));
    out.push(String::new());
}

/// Render the system prompt text.
pub fn render(spec: &PromptSpec) -> Result<String, ContextError> {
    let mut out = Vec::new();
    push_section(&mut out, "IDENTITY and PURPOSE", &spec.background);
    push_section(&mut out, "INTERNAL ASSISTANT STEPS", &spec.steps);
    push_section(&mut out, "OUTPUT INSTRUCTIONS", &spec.output_instructions);

    if !spec.context_providers.is_empty() {
        out.push("# EXTRA INFORMATION AND CONTEXT".into());
        for (_, provider) in &spec.context_providers {
            let info = provider.info()?;
            if !info.is_empty() {
                out.push(format!("## {}", provider.title()));
                out.push(info);
                out.push(String::new());
            }
        }
    }

    Ok(out.join("\n").trim().to_string())
}

impl PromptRenderable for PromptSpec {
    fn render(&self) -> Result<String, ContextError> {
        render(self)
    }
}
