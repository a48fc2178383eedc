//! `atomchat chat`: Interactive or single-message chat mode.

use std::path::PathBuf;
use std::process::ExitCode;

use atomchat_agent::build_session;
use atomchat_channels::ChatLoop;
use atomchat_config::AppConfig;
use atomchat_core::agent::Agent;
use tracing::info;

pub async fn run(
    config_path: Option<PathBuf>,
    model: Option<String>,
    message: Option<String>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => AppConfig::load_with_env(&path)?,
        None => AppConfig::load()?,
    };
    if let Some(model) = model {
        config.model = model;
    }

    let credential = config.credential()?;
    let provider = atomchat_providers::build_from_config(&config, &credential)?;
    let mut session = build_session(&config, provider)?;
    info!(provider = %config.provider, model = session.model(), "Starting chat");

    if let Some(msg) = message {
        let reply = session.submit(&msg).await?;
        println!("{reply}");
        return Ok(ExitCode::SUCCESS);
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut chat = ChatLoop::new(session, stdin, std::io::stdout());
    let status = chat.run().await?;

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
