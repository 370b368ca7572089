//! Message parser - Turns raw message text into command invocations

use crate::domain::entities::{CommandInvocation, IncomingMessage};

/// Recognizes command messages by their leading marker character
pub struct MessageParser {
    markers: Vec<char>,
}

impl MessageParser {
    pub fn new(markers: impl Into<Vec<char>>) -> Self {
        Self {
            markers: markers.into(),
        }
    }

    pub fn is_command(&self, text: &str) -> bool {
        text.trim_start()
            .chars()
            .next()
            .map(|c| self.markers.contains(&c))
            .unwrap_or(false)
    }

    /// Parse a message into an invocation. Plain text and a bare marker
    /// yield `None`. The token keeps its marker (`/help`, `!greet`).
    pub fn parse(&self, message: &IncomingMessage) -> Option<CommandInvocation> {
        if !self.is_command(&message.text) {
            return None;
        }

        let mut parts = message.text.split_whitespace();
        let token = parts.next()?;
        if token.chars().count() < 2 {
            return None;
        }

        let args = parts.map(|s| s.to_string()).collect();
        Some(CommandInvocation::new(message.sender, token, args))
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(vec!['/', '!'])
    }
}
