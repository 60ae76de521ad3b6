//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod flex_hr_client;
mod http_callout_client;
mod in_memory_read_cache;
mod postgres_rbac_repository;
mod redis_read_cache;
mod salesforce_client;
mod slack_webhook_notifier;

pub use flex_hr_client::{FlexHrClient, FlexSettings};
pub use http_callout_client::{
    CalloutBody, CalloutClient, CalloutConfig, CalloutError, CalloutRequest, CalloutResponse,
    DEFAULT_CALLOUT_TIMEOUT,
};
pub use in_memory_read_cache::InMemoryReadCache;
pub use postgres_rbac_repository::PostgresRbacRepository;
pub use redis_read_cache::RedisReadCache;
pub use salesforce_client::{
    DEFAULT_SALESFORCE_API_VERSION, SalesforceClient, SalesforceSession, SalesforceSettings,
    SoqlStatement, SoqlValue, escape_literal, escape_sosl_term,
};
pub use slack_webhook_notifier::{LoggingNotifier, SlackWebhookNotifier};
