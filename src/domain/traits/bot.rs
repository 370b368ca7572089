use async_trait::async_trait;
use crate::domain::entities::ParseMode;
use crate::application::errors::BotError;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the bot and begin listening for messages
    async fn start(&self) -> Result<(), BotError>;

    /// Send a reply to a chat, returns the sent message id
    async fn send_reply(&self, chat_id: i64, text: &str, parse_mode: Option<ParseMode>) -> Result<i64, BotError>;

    /// Delete a message from a chat
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
