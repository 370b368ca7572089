use std::sync::Arc;

use crate::application::audit::AuditLog;
use crate::application::messaging::{Dispatch, Dispatcher, MessageParser};
use crate::domain::entities::IncomingMessage;
use crate::domain::traits::Bot;

/// Service for processing messages: parse, dispatch, reply, clean up, audit
pub struct MessageService<B: Bot> {
    bot: B,
    parser: MessageParser,
    dispatcher: Arc<Dispatcher>,
    audit: Arc<AuditLog>,
}

impl<B: Bot> MessageService<B> {
    pub fn new(bot: B, parser: MessageParser, dispatcher: Arc<Dispatcher>, audit: Arc<AuditLog>) -> Self {
        Self {
            bot,
            parser,
            dispatcher,
            audit,
        }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    /// Handle one incoming message. Failures are logged, never returned, so
    /// the caller's loop keeps running.
    pub async fn process(&self, message: &IncomingMessage) -> Option<Dispatch> {
        let invocation = self.parser.parse(message)?;
        tracing::debug!("Command {} from user {} in chat {}", invocation.token, invocation.sender, message.chat_id);

        let dispatch = self.dispatcher.dispatch(&invocation).await;

        if let Some(reply) = &dispatch.reply {
            match self.bot.send_reply(message.chat_id, &reply.text, reply.parse_mode).await {
                Ok(_) if reply.delete_trigger => {
                    if let Err(e) = self.bot.delete_message(message.chat_id, message.message_id).await {
                        tracing::error!("Failed to delete message {} in chat {}: {}", message.message_id, message.chat_id, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Failed to send reply to chat {}: {}", message.chat_id, e);
                }
            }
        }

        if let Some(record) = &dispatch.audit {
            self.audit.record(record.clone()).await;
        }

        Some(dispatch)
    }
}
