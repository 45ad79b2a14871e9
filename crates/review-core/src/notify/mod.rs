//! Outbound chat notifications.

mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("bot API request failed: {0}")]
    Transport(String),
    #[error("bot API returned HTTP {status}: {description}")]
    Rejected { status: u16, description: String },
}

/// Delivers a text message to the configured chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError>;
}
