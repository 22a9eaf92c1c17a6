pub mod split;
pub mod telegram;

use async_trait::async_trait;

use crate::error::NotifyError;

pub use split::split_message;
pub use telegram::TelegramNotifier;

/// Delivers text to a chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}
