use std::sync::Arc;

use opsdash_application::{CrmGateway, HrSystem, Notifier};
use opsdash_core::AppResult;
use opsdash_infrastructure::{
    FlexHrClient, LoggingNotifier, SalesforceClient, SlackWebhookNotifier,
};
use tracing::info;

use crate::api_config::ApiConfig;

pub(super) struct Integrations {
    pub(super) hr_system: Arc<dyn HrSystem>,
    pub(super) crm_gateway: Arc<dyn CrmGateway>,
    pub(super) notifier: Arc<dyn Notifier>,
}

pub(super) fn build_integrations(
    http_client: reqwest::Client,
    config: &ApiConfig,
) -> AppResult<Integrations> {
    let hr_system = Arc::new(FlexHrClient::new(http_client.clone(), config.flex.clone())?);
    let crm_gateway = Arc::new(SalesforceClient::new(
        http_client.clone(),
        config.salesforce.clone(),
    )?);

    let notifier: Arc<dyn Notifier> = match config.slack_webhook_url.as_deref() {
        Some(webhook_url) => Arc::new(SlackWebhookNotifier::new(
            http_client,
            webhook_url,
            config.callout_timeout,
        )?),
        None => {
            info!("SLACK_WEBHOOK_URL not set, notifications are only logged");
            Arc::new(LoggingNotifier::new())
        }
    };

    Ok(Integrations {
        hr_system,
        crm_gateway,
        notifier,
    })
}
