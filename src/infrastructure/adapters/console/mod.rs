//! Console adapter for development/testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::domain::entities::{IncomingMessage, ParseMode, UserId};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Chat id used for every console message
pub const CONSOLE_CHAT: i64 = 0;

/// Console bot adapter for local development.
///
/// Each stdin line is a message from `user_id`; a leading `@<id>` sends the
/// line as another user, e.g. `@222 !greet`.
pub struct ConsoleAdapter {
    info: BotInfo,
    user_id: UserId,
    lines: Mutex<Lines<BufReader<Stdin>>>,
    next_message_id: AtomicI64,
}

impl ConsoleAdapter {
    pub fn new(user_id: UserId) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "gatekeeper-bot".to_string(),
                username: "console".to_string(),
            },
            user_id,
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            next_message_id: AtomicI64::new(1),
        }
    }

    /// Read the next non-empty line; `None` on end of input
    pub async fn read_message(&self) -> Result<Option<IncomingMessage>, BotError> {
        let mut lines = self.lines.lock().await;
        loop {
            let Some(line) = lines.next_line().await.map_err(|e| BotError::Internal(e.to_string()))? else {
                return Ok(None);
            };
            if let Some(message) = self.to_message(&line) {
                return Ok(Some(message));
            }
        }
    }

    fn to_message(&self, line: &str) -> Option<IncomingMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (sender, text) = match line.strip_prefix('@').and_then(|rest| rest.split_once(char::is_whitespace)) {
            Some((id, text)) => match id.parse::<UserId>() {
                Ok(id) => (id, text.trim()),
                Err(_) => (self.user_id, line),
            },
            None => (self.user_id, line),
        };

        let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        Some(IncomingMessage::new(CONSOLE_CHAT, message_id, sender, text))
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode) as user {}", self.user_id);
        Ok(())
    }

    async fn send_reply(&self, _chat_id: i64, text: &str, _parse_mode: Option<ParseMode>) -> Result<i64, BotError> {
        println!("[BOT] {}", text);
        Ok(self.next_message_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn delete_message(&self, _chat_id: i64, message_id: i64) -> Result<(), BotError> {
        println!("[BOT] (deleted message {})", message_id);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_line_parsing() {
        let console = ConsoleAdapter::new(UserId(111));

        let msg = console.to_message("  /help ").unwrap();
        assert_eq!(msg.sender, UserId(111));
        assert_eq!(msg.text, "/help");

        let msg = console.to_message("@222 !greet now").unwrap();
        assert_eq!(msg.sender, UserId(222));
        assert_eq!(msg.text, "!greet now");

        let msg = console.to_message("@someone hi").unwrap();
        assert_eq!(msg.sender, UserId(111));
        assert_eq!(msg.text, "@someone hi");

        assert!(console.to_message("   ").is_none());
    }
}
