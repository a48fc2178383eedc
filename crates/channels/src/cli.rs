//! CLI channel: interactive terminal-based chat.
//!
//! Reads one line at a time, hands it to the agent, and prints the reply.
//! Input and output are generic so the loop can run over stdin/stdout or
//! over byte buffers.

use std::io::Write;

use atomchat_core::agent::Agent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, warn};

pub const USER_LABEL: &str = "User: ";
pub const AGENT_LABEL: &str = "Agent: ";
pub const FAREWELL: &str = "Exiting chat, see you later ...";

/// How the chat ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

/// Where the loop is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    Greeting,
    AwaitingInput,
    Processing(String),
    Terminated(ExitStatus),
}

fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("/exit") || line.eq_ignore_ascii_case("/quit")
}

/// Interactive read-eval-print loop around an [`Agent`].
pub struct ChatLoop<A, R, W> {
    agent: A,
    input: R,
    output: W,
    state: ChatState,
}

impl<A, R, W> ChatLoop<A, R, W>
where
    A: Agent,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(agent: A, input: R, output: W) -> Self {
        Self {
            agent,
            input,
            output,
            state: ChatState::Greeting,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user leaves, input ends, or a fatal error occurs.
    pub async fn run(&mut self) -> std::io::Result<ExitStatus> {
        loop {
            if let ChatState::Terminated(status) = self.state {
                return Ok(status);
            }
            self.step().await?;
        }
    }

    /// Perform one state transition.
    pub async fn step(&mut self) -> std::io::Result<()> {
        let state = std::mem::replace(&mut self.state, ChatState::AwaitingInput);
        self.state = match state {
            ChatState::Greeting => {
                if let Some(greeting) = self.agent.greeting() {
                    writeln!(self.output, "{AGENT_LABEL}{greeting}")?;
                }
                ChatState::AwaitingInput
            }
            ChatState::AwaitingInput => self.read_input().await?,
            ChatState::Processing(text) => self.process(&text).await?,
            ChatState::Terminated(status) => ChatState::Terminated(status),
        };
        Ok(())
    }

    async fn read_input(&mut self) -> std::io::Result<ChatState> {
        write!(self.output, "{USER_LABEL}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            debug!("Input closed");
            writeln!(self.output)?;
            return Ok(ChatState::Terminated(ExitStatus::Success));
        }

        if line.trim().is_empty() {
            return Ok(ChatState::AwaitingInput);
        }

        if is_exit_command(&line) {
            writeln!(self.output, "{FAREWELL}")?;
            return Ok(ChatState::Terminated(ExitStatus::Success));
        }

        Ok(ChatState::Processing(
            line.trim_end_matches(['\r', '\n']).to_string(),
        ))
    }

    async fn process(&mut self, text: &str) -> std::io::Result<ChatState> {
        match self.agent.submit(text).await {
            Ok(reply) => {
                writeln!(self.output, "{AGENT_LABEL}{reply}")?;
                Ok(ChatState::AwaitingInput)
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Turn failed; waiting for next input");
                writeln!(self.output, "Error: {e}")?;
                Ok(ChatState::AwaitingInput)
            }
            Err(e) => {
                error!(error = %e, "Chat stopped");
                writeln!(self.output, "Error: {e}")?;
                Ok(ChatState::Terminated(ExitStatus::Failure))
            }
        }
    }
}
