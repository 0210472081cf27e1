use async_trait::async_trait;
use tokio::sync::Mutex;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::{ Conversation, MessageRecord };

#[derive(Default)]
pub struct MemoryHistoryStore {
    messages: Mutex<Vec<MessageRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn add_message(&self, record: &MessageRecord) -> Result<(), HistoryError> {
        self.messages.lock().await.push(record.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Conversation, HistoryError> {
        Ok(Conversation {
            messages: self.messages.lock().await.clone(),
        })
    }
}
