//! Shared HTTP callout client used by every outbound integration.
//!
//! Each integration owns a [`CalloutClient`] built from its own
//! [`CalloutConfig`]. Requests are bounded by a timeout unless the caller
//! supplies a cancellation token, non-success statuses are translated into
//! [`CalloutError::Api`] and nothing is retried here.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

mod error;
mod request;

pub use error::CalloutError;
pub use request::{CalloutBody, CalloutRequest};

/// Default timeout applied when a request does not override it.
pub const DEFAULT_CALLOUT_TIMEOUT: Duration = Duration::from_secs(60);

/// Message fields checked in order when extracting an error message.
const MESSAGE_FIELDS: [&str; 3] = ["message", "error", "Message"];

/// Connection settings for one remote system.
#[derive(Debug, Clone)]
pub struct CalloutConfig {
    base_url: Url,
    default_headers: Vec<(String, String)>,
    basic_auth: Option<(String, String)>,
    timeout: Duration,
}

impl CalloutConfig {
    /// Creates a config for the given base URL.
    pub fn new(base_url: &str) -> Result<Self, CalloutError> {
        let base_url = Url::parse(base_url).map_err(|error| {
            CalloutError::Decode(format!("invalid callout base url '{base_url}': {error}"))
        })?;

        Ok(Self {
            base_url,
            default_headers: Vec::new(),
            basic_auth: None,
            timeout: DEFAULT_CALLOUT_TIMEOUT,
        })
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sends HTTP Basic credentials with every request.
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    /// Replaces the default timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Successful response of a callout.
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutResponse {
    status: u16,
    payload: Option<Value>,
    text: String,
}

impl CalloutResponse {
    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the parsed JSON body. `None` for empty or non-JSON bodies.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Returns the raw body text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Decodes the JSON body into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, CalloutError> {
        let payload = self.payload.ok_or_else(|| {
            CalloutError::Decode(format!(
                "expected a JSON body in response with status {}",
                self.status
            ))
        })?;

        serde_json::from_value(payload)
            .map_err(|error| CalloutError::Decode(format!("unexpected response shape: {error}")))
    }
}

/// HTTP client bound to one remote system.
#[derive(Debug, Clone)]
pub struct CalloutClient {
    http_client: reqwest::Client,
    config: CalloutConfig,
}

impl CalloutClient {
    /// Creates a client from a shared reqwest client and a config.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: CalloutConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &CalloutConfig {
        &self.config
    }

    /// Builds the absolute URL for a request, including query parameters.
    pub fn url_for(&self, request: &CalloutRequest) -> Result<Url, CalloutError> {
        let path = request.path.as_str();
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
        } else {
            Url::parse(&format!(
                "{}/{}",
                self.config.base_url.as_str().trim_end_matches('/'),
                path.trim_start_matches('/')
            ))
        }
        .map_err(|error| CalloutError::Decode(format!("invalid callout path '{path}': {error}")))?;

        let pairs = request::query_pairs(&request.params);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    /// Sends a request.
    ///
    /// Without a caller-supplied cancellation token the request is aborted
    /// after its timeout. With a token only the caller can abort it.
    pub async fn send(&self, request: CalloutRequest) -> Result<CalloutResponse, CalloutError> {
        let url = self.url_for(&request)?;
        let method = request.method.clone();
        let builder = self.build(&request, url.clone());

        let (token, deadline) = match request.cancellation {
            Some(token) => (token, None),
            None => (
                tokio_util::sync::CancellationToken::new(),
                Some(request.timeout.unwrap_or(self.config.timeout)),
            ),
        };

        tracing::debug!(method = %method, url = %url, "sending callout");

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, CalloutError>((status, bytes))
        };
        let timer = async {
            match deadline {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        let (status, bytes) = tokio::select! {
            result = exchange => result?,
            () = token.cancelled() => {
                tracing::debug!(method = %method, url = %url, "callout cancelled by caller");
                return Err(CalloutError::Network {
                    message: format!("request to {url} was cancelled"),
                    status: None,
                    code: Some("ABORTED".to_owned()),
                });
            }
            () = timer => {
                token.cancel();
                let timeout = deadline.unwrap_or_default();
                tracing::debug!(method = %method, url = %url, timeout_ms = timeout.as_millis(), "callout timed out");
                return Err(CalloutError::Network {
                    message: format!("request to {url} aborted after {} ms", timeout.as_millis()),
                    status: None,
                    code: Some("ABORTED".to_owned()),
                });
            }
        };

        tracing::debug!(method = %method, url = %url, status = status.as_u16(), "callout completed");

        if status.as_u16() >= 300 {
            return Err(api_error(status, &bytes));
        }

        let text = String::from_utf8_lossy(&bytes).into_owned();
        let payload = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice::<Value>(&bytes).ok()
        };

        Ok(CalloutResponse {
            status: status.as_u16(),
            payload,
            text,
        })
    }

    /// Sends a request and decodes the JSON response.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: CalloutRequest,
    ) -> Result<T, CalloutError> {
        self.send(request).await?.json()
    }

    fn build(&self, request: &CalloutRequest, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.http_client.request(request.method.clone(), url);

        for (name, value) in self.config.default_headers.iter().chain(&request.headers) {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some((username, password)) = &self.config.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }

        match &request.body {
            Some(CalloutBody::Json(body)) => builder.json(body),
            Some(CalloutBody::Form(fields)) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish();
                builder
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(encoded)
            }
            None => builder,
        }
    }
}

/// Translates a non-success response into [`CalloutError::Api`].
fn api_error(status: StatusCode, bytes: &[u8]) -> CalloutError {
    let text = String::from_utf8_lossy(bytes).trim().to_owned();
    let payload = serde_json::from_slice::<Value>(bytes).ok();

    let detail = match &payload {
        Some(Value::Array(items)) => items.first(),
        other => other.as_ref(),
    };

    let reason = status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.as_str().to_owned());

    let message = detail
        .and_then(message_field)
        .or_else(|| payload.as_ref().map(Value::to_string))
        .or_else(|| (!text.is_empty()).then(|| text.clone()))
        .unwrap_or_else(|| reason.clone());

    let code = detail
        .and_then(|detail| {
            ["errorCode", "code"]
                .iter()
                .find_map(|field| detail.get(field).and_then(value_text))
        })
        .unwrap_or(reason);

    CalloutError::Api {
        status: status.as_u16(),
        code,
        message,
        payload,
    }
}

fn message_field(detail: &Value) -> Option<String> {
    MESSAGE_FIELDS
        .iter()
        .find_map(|field| detail.get(field).and_then(value_text))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
