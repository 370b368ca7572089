//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entities::{Builtin, IncomingMessage, ParseMode, UserId};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

impl Message {
    /// Text message with a known sender, as the dispatcher sees it
    pub fn to_incoming(&self) -> Option<IncomingMessage> {
        let from = self.from.as_ref()?;
        let text = self.text.as_ref()?;
        Some(IncomingMessage::new(self.chat.id, self.message_id, UserId(from.id), text.clone()))
    }
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, poll_timeout: Duration) -> Result<Self, BotError> {
        // HTTP timeout must outlive the long-poll timeout
        let client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(|e| BotError::Network(e.to_string()))?;

        Ok(Self {
            token: token.into(),
            client,
            info: BotInfo {
                id: "unknown".to_string(),
                name: "gatekeeper-bot".to_string(),
                username: "gatekeeper_bot".to_string(),
            },
        })
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// POST a method call and unwrap the `result` field
    async fn call<Req: Serialize + ?Sized, Res: DeserializeOwned>(&self, method: &str, request: &Req) -> Result<Res, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        let body: ApiResponse<Res> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("{} ({}): {}", method, status, e)))?;

        if !body.ok {
            let description = body.description.unwrap_or_else(|| status.to_string());
            return Err(BotError::Api(format!("{}: {}", method, description)));
        }

        body.result
            .ok_or_else(|| BotError::Parse(format!("{}: missing result", method)))
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let data: BotInfoResponse = self.call("getMe", &serde_json::json!({})).await?;

        self.info = BotInfo {
            id: data.id.to_string(),
            name: data.first_name,
            username: data.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
    }

    /// Send a message with specific parse mode
    pub async fn send_message_with_format(&self, chat_id: i64, text: &str, parse_mode: Option<ParseMode>) -> Result<i64, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: i64,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            parse_mode: Option<&'static str>,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: parse_mode.map(|m| m.as_str()),
        };

        let result: MessageResult = self.call("sendMessage", &request).await?;
        Ok(result.message_id)
    }

    /// Register the built-in commands with Telegram
    pub async fn register_commands(&self) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command {
            command: &'static str,
            description: &'static str,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<Command>,
        }

        let commands = Builtin::ALL
            .iter()
            .map(|b| Command {
                command: b.command_name(),
                description: b.description(),
            })
            .collect();

        let _: bool = self.call("setMyCommands", &SetMyCommandsRequest { commands }).await?;

        tracing::info!("Registered bot commands with Telegram");
        Ok(())
    }
}

/// First characters of the token, safe to log
fn token_preview(token: &str) -> String {
    token.chars().take(8).collect()
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting Telegram bot (token: {}...)", token_preview(&self.token));
        Ok(())
    }

    /// Try the requested markup first, fall back to plain text if Telegram
    /// rejects it
    async fn send_reply(&self, chat_id: i64, text: &str, parse_mode: Option<ParseMode>) -> Result<i64, BotError> {
        match self.send_message_with_format(chat_id, text, parse_mode).await {
            Ok(id) => Ok(id),
            Err(BotError::Api(e)) if parse_mode.is_some() => {
                tracing::warn!("Markdown failed, using plain text: {}", e);
                self.send_message_with_format(chat_id, text, None).await
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct DeleteMessageRequest {
            chat_id: i64,
            message_id: i64,
        }

        let _: bool = self.call("deleteMessage", &DeleteMessageRequest { chat_id, message_id }).await?;
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
