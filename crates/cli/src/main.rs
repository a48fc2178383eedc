//! atomchat CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive chat or single-message mode (default)
//! - `calc`: Evaluate an expression with the calculator tool

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "atomchat",
    about = "atomchat: chat with an LLM agent from your terminal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: ~/.atomchat/config.toml)
    #[arg(long, global = true, env = "ATOMCHAT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat {
        /// Override the configured model
        #[arg(long)]
        model: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Evaluate a mathematical expression
    Calc {
        /// The expression, e.g. "2 * sin(pi / 4)"
        expression: Option<String>,

        /// Print the tool definition instead of evaluating
        #[arg(long)]
        schema: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so the transcript on stdout stays clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.unwrap_or(Commands::Chat {
        model: None,
        message: None,
    });

    let result = match command {
        Commands::Chat { model, message } => commands::chat::run(cli.config, model, message).await,
        Commands::Calc { expression, schema } => commands::calc::run(expression, schema).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
