pub mod agent;
pub mod models;
pub mod console;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;
pub mod offload;

use agent::ChatAgent;
use cli::Args;
use history::format_transcript;
use log::{ info, error };
use std::error::Error;
use tokio::io::AsyncWriteExt;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Config Path: {}", args.config_path);
    info!("API Key From Flag/Env: {}", args.api_key.is_some());
    info!("API Flavor: {}", args.api_flavor);
    info!("Model: {}", args.model.as_deref().unwrap_or("flavor default"));
    info!("Base URL: {}", args.base_url.as_deref().unwrap_or("provider default"));
    info!("History Store Type: {}", args.history_type);
    info!("History Path: {}", args.history_path);
    info!("-------------------------");

    let agent = ChatAgent::from_args(&args)?;
    let mut stdout = tokio::io::stdout();

    if args.show_history {
        match agent.history().await {
            Ok(conversation) => {
                stdout.write_all(format_transcript(&conversation).as_bytes()).await?;
                stdout.flush().await?;
            }
            Err(e) => error!("Failed to load history: {}", e),
        }
    }

    console::run_console(&agent, console::stdin_lines(), stdout).await
}
