//! Chat channel I/O: inbound webhook and outbound acknowledgments.

pub mod telegram;
pub mod webhook;

pub use telegram::{TelegramClient, Update};
pub use webhook::{WebhookState, webhook_routes};

use async_trait::async_trait;

use crate::error::ChannelError;

/// Sends a plain-text message back to a chat.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ChannelError>;
}
