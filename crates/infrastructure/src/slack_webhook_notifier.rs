//! Team notifications through a Slack incoming webhook.

use std::time::Duration;

use async_trait::async_trait;
use opsdash_application::Notifier;
use opsdash_core::AppResult;
use serde_json::json;

use crate::http_callout_client::{CalloutClient, CalloutConfig, CalloutRequest};

/// Posts plain-text messages to one Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackWebhookNotifier {
    callout: CalloutClient,
    webhook_url: String,
}

impl SlackWebhookNotifier {
    /// Creates a notifier for the webhook URL.
    pub fn new(
        http_client: reqwest::Client,
        webhook_url: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let webhook_url = webhook_url.into();
        let config = CalloutConfig::new(&webhook_url)?.with_timeout(timeout);

        Ok(Self {
            callout: CalloutClient::new(http_client, config),
            webhook_url,
        })
    }
}

#[async_trait]
impl Notifier for SlackWebhookNotifier {
    async fn notify(&self, text: &str) -> AppResult<()> {
        // The webhook URL is absolute, so it is sent as-is instead of being joined to the base.
        let request = CalloutRequest::post(self.webhook_url.as_str()).json(json!({ "text": text }));
        self.callout.send(request).await?;

        tracing::debug!("slack notification posted");
        Ok(())
    }
}

/// Notifier used when no webhook is configured. Writes messages to the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    /// Creates a logging notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, text: &str) -> AppResult<()> {
        tracing::info!(text, "notification (no webhook configured)");
        Ok(())
    }
}
