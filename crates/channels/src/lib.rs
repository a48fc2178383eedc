//! Chat channel implementations for atomchat.
//!
//! A channel relays user input to an agent and prints the replies.
//!
//! Available channels:
//! - **CLI**: Interactive terminal chat (stdin/stdout, or any buffered reader/writer)

pub mod cli;

pub use cli::{ChatLoop, ChatState, ExitStatus};
