mod json_file;
mod memory;
use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::models::chat::{ Conversation, MessageRecord };

pub use json_file::JsonFileHistoryStore;
pub use memory::MemoryHistoryStore;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history file is not a valid message array: {0}")]
    Json(#[from] serde_json::Error),
    #[error("history task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Append-only store of conversation turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn add_message(&self, record: &MessageRecord) -> Result<(), HistoryError>;

    /// Every record stored so far, oldest first.
    async fn load(&self) -> Result<Conversation, HistoryError>;
}

pub fn create_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "json" | "file" => Ok(Arc::new(JsonFileHistoryStore::new(&args.history_path))),
        "memory" => Ok(Arc::new(MemoryHistoryStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    let store = create_history_store(args)?;
    info!("Chat history will be stored in: {}", storage_description(args));
    Ok(store)
}

fn storage_description(args: &Args) -> String {
    match args.history_type.to_lowercase().as_str() {
        "memory" => "memory only".to_string(),
        _ => format!("{} at {}", args.history_type, args.history_path),
    }
}

pub fn format_transcript(conversation: &Conversation) -> String {
    let mut result = String::new();
    for msg in &conversation.messages {
        result.push_str(&format!("[{}] {}: {}\n", msg.timestamp, msg.role, msg.text));
    }
    result
}
