use super::UserId;

/// Markup applied to an outgoing reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// A text message delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender: UserId,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(chat_id: i64, message_id: i64, sender: UserId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            sender,
            text: text.into(),
        }
    }
}
