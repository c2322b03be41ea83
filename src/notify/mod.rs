pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

pub use telegram::TelegramNotifier;

/// Outbound text channel for alerts and liveness messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}
