//! The chat agent for atomchat.
//!
//! Each turn follows the same path:
//!
//! 1. **Record** the user message in conversation memory
//! 2. **Render** the system prompt, pulling fresh context lines
//! 3. **Send** prompt + full history to the provider, forcing the
//!    structured `AgentOutput` reply
//! 4. **Record** the decoded reply and hand it back to the channel

pub mod builder;
pub mod context;
pub mod prompt;
pub mod session;

pub use builder::{build_session, build_session_with_clock};
pub use context::{Clock, DateTimeContextProvider, FixedClock, SystemClock, DEFAULT_DATE_FORMAT};
pub use prompt::{PromptSpec, render};
pub use session::{AgentSession, OUTPUT_TOOL, output_tool};
