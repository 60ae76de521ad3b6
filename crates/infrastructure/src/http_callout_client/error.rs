use opsdash_core::AppError;
use serde_json::Value;
use thiserror::Error;

/// Failure raised by [`super::CalloutClient`].
#[derive(Debug, Error)]
pub enum CalloutError {
    /// The remote API answered with a status of 300 or above.
    #[error("remote API returned {status} {code}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Remote error code or the canonical status reason.
        code: String,
        /// Human-readable message extracted from the body.
        message: String,
        /// Parsed JSON body, when the body was JSON.
        payload: Option<Value>,
    },

    /// The request never produced a response: transport failure, timeout or
    /// cancellation.
    #[error("network failure: {message}")]
    Network {
        /// Failure description.
        message: String,
        /// HTTP status when one was observed.
        status: Option<u16>,
        /// Transport error code when one is known.
        code: Option<String>,
    },

    /// The request could not be built or the response body could not be decoded.
    #[error("callout decode failure: {0}")]
    Decode(String),
}

impl CalloutError {
    /// Returns the HTTP status when the failure carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network { status, .. } => *status,
            Self::Decode(_) => None,
        }
    }

    /// Returns the remote or transport error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code.as_str()),
            Self::Network { code, .. } => code.as_deref(),
            Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for CalloutError {
    fn from(error: reqwest::Error) -> Self {
        let code = if error.is_timeout() {
            Some("TIMEOUT".to_owned())
        } else if error.is_connect() {
            Some("CONNECT".to_owned())
        } else {
            None
        };

        Self::Network {
            message: error.to_string(),
            status: error.status().map(|status| status.as_u16()),
            code,
        }
    }
}

impl From<CalloutError> for AppError {
    fn from(error: CalloutError) -> Self {
        match error {
            CalloutError::Api {
                status,
                code,
                message,
                ..
            } => AppError::Upstream(format!("{status} {code}: {message}")),
            CalloutError::Network { message, .. } => AppError::Network(message),
            CalloutError::Decode(message) => AppError::Internal(message),
        }
    }
}
