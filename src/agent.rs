use crate::cli::Args;
use crate::config::load_api_key;
use crate::history::{ initialize_history_store, HistoryError, HistoryStore };
use crate::llm::{ ApiFlavor, LlmConfig };
use crate::llm::chat::{ new_client as new_chat_client, ChatClient };
use crate::models::chat::{ Conversation, MessageRecord, Role };
use crate::offload::{ self, Delivery, PendingReply };

use log::{ info, debug, error };
use std::error::Error;
use std::sync::Arc;

/// A user turn that has been recorded and handed to a worker.
pub struct Submission {
    pub record: MessageRecord,
    pub reply: PendingReply,
}

#[derive(Clone)]
pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
}

impl ChatAgent {
    pub fn new(chat_client: Arc<dyn ChatClient>, history_store: Arc<dyn HistoryStore>) -> Self {
        Self {
            chat_client,
            history_store,
        }
    }

    pub fn llm_config_from_args(args: &Args) -> Result<LlmConfig, Box<dyn Error + Send + Sync>> {
        let flavor: ApiFlavor = args.api_flavor.parse()?;
        let api_key = match args.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => load_api_key(&args.config_path)?,
        };
        Ok(LlmConfig {
            flavor,
            api_key,
            completion_model: args.model.clone(),
            base_url: args.base_url.clone(),
            system_prompt: args.system_prompt.clone(),
        })
    }

    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_config = Self::llm_config_from_args(args)?;
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Flavor={}, Model={}, BaseURL={}",
            chat_config.flavor,
            chat_client.get_model(),
            chat_client.get_base_url()
        );
        let history_store = initialize_history_store(args)?;
        Ok(Self::new(chat_client, history_store))
    }

    /// Records the user turn and starts the completion in the background.
    /// Blank input is ignored: nothing is recorded and no call is made.
    pub async fn submit(&self, input: &str) -> Option<Submission> {
        if input.trim().is_empty() {
            return None;
        }
        let record = MessageRecord::now(Role::User, input);
        self.record(&record).await;
        debug!("Submitting message ({} chars)", input.len());
        let reply = offload::submit(self.chat_client.clone(), input.to_string());
        Some(Submission { record, reply })
    }

    /// Stamps and records the bot turn for a finished exchange.
    pub async fn deliver(&self, delivery: Delivery) -> MessageRecord {
        let record = MessageRecord::now(Role::Bot, delivery.response);
        self.record(&record).await;
        record
    }

    pub async fn history(&self) -> Result<Conversation, HistoryError> {
        self.history_store.load().await
    }

    async fn record(&self, record: &MessageRecord) {
        if let Err(e) = self.history_store.add_message(record).await {
            error!("Failed to record {} message: {}", record.role, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_api_key_flag_skips_config_file() {
        let args = Args::parse_from([
            "chat-bridge",
            "--api-key",
            "sk-flag",
            "--config-path",
            "/nonexistent/config.ini",
        ]);
        let config = ChatAgent::llm_config_from_args(&args).unwrap();
        assert_eq!(config.api_key, "sk-flag");
        assert_eq!(config.flavor, ApiFlavor::Chat);
    }

    #[test]
    fn test_config_file_supplies_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[DEFAULT]\nOPENAI_API_KEY = sk-file\n").unwrap();
        let path = path.to_string_lossy().to_string();
        let args = Args::parse_from([
            "chat-bridge",
            "--api-key",
            "",
            "--config-path",
            path.as_str(),
            "--api-flavor",
            "completion",
        ]);

        let config = ChatAgent::llm_config_from_args(&args).unwrap();
        assert_eq!(config.api_key, "sk-file");
        assert_eq!(config.flavor, ApiFlavor::Completion);
    }

    #[test]
    fn test_missing_credentials_fail_at_startup() {
        let args = Args::parse_from([
            "chat-bridge",
            "--api-key",
            "",
            "--config-path",
            "/nonexistent/config.ini",
        ]);
        assert!(ChatAgent::from_args(&args).is_err());
    }
}
