use async_trait::async_trait;
use opsdash_core::AppResult;

/// Port for outbound team notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Posts a plain-text message.
    async fn notify(&self, text: &str) -> AppResult<()>;
}
