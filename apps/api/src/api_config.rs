use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use opsdash_core::AppError;
use opsdash_infrastructure::{
    DEFAULT_CALLOUT_TIMEOUT, DEFAULT_SALESFORCE_API_VERSION, FlexSettings, SalesforceSettings,
};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_AUTH_PROXY_HEADER: &str = "x-forwarded-email";
const DEFAULT_CACHE_TTL_SECONDS: u32 = 300;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub auth_proxy_header: String,
    pub redis_url: Option<String>,
    pub cache_ttl_seconds: u32,
    pub flex: FlexSettings,
    pub salesforce: SalesforceSettings,
    pub slack_webhook_url: Option<String>,
    pub callout_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        Url::parse(&frontend_url)
            .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let auth_proxy_header = optional_env("AUTH_PROXY_HEADER")
            .unwrap_or_else(|| DEFAULT_AUTH_PROXY_HEADER.to_owned())
            .to_ascii_lowercase();

        let redis_url = optional_env("REDIS_URL");
        let cache_ttl_seconds = optional_env("CACHE_TTL_SECONDS")
            .map(|value| {
                value.parse::<u32>().map_err(|error| {
                    AppError::Validation(format!("invalid CACHE_TTL_SECONDS: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_CACHE_TTL_SECONDS);

        let callout_timeout = optional_env("CALLOUT_TIMEOUT_SECONDS")
            .map(|value| parse_timeout_seconds(&value))
            .transpose()?
            .unwrap_or(DEFAULT_CALLOUT_TIMEOUT);

        let flex = FlexSettings {
            base_url: required_non_empty_env("FLEX_BASE_URL")?,
            instance: required_non_empty_env("FLEX_INSTANCE")?,
            company_number: required_non_empty_env("FLEX_COMPANY_NUMBER")?,
            username: required_non_empty_env("FLEX_USERNAME")?,
            password: required_non_empty_env("FLEX_PASSWORD")?,
            timeout: callout_timeout,
        };

        let salesforce = SalesforceSettings {
            login_url: required_non_empty_env("SALESFORCE_LOGIN_URL")?,
            client_id: required_non_empty_env("SALESFORCE_CLIENT_ID")?,
            client_secret: required_non_empty_env("SALESFORCE_CLIENT_SECRET")?,
            api_version: optional_env("SALESFORCE_API_VERSION")
                .unwrap_or_else(|| DEFAULT_SALESFORCE_API_VERSION.to_owned()),
            timeout: callout_timeout,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            auth_proxy_header,
            redis_url,
            cache_ttl_seconds,
            flex,
            salesforce,
            slack_webhook_url: optional_env("SLACK_WEBHOOK_URL"),
            callout_timeout,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_timeout_seconds(value: &str) -> Result<Duration, AppError> {
    let seconds = value.parse::<u64>().map_err(|error| {
        AppError::Validation(format!("invalid CALLOUT_TIMEOUT_SECONDS: {error}"))
    })?;
    if seconds == 0 {
        return Err(AppError::Validation(
            "CALLOUT_TIMEOUT_SECONDS must be greater than zero".to_owned(),
        ));
    }

    Ok(Duration::from_secs(seconds))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
