//! Error types shared by every part of the client
//!
//! The enum is `Clone` because a single refresh outcome is handed to every
//! request that waited on it.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Federated sign-in failed: {0}")]
    FederatedAuth(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
        message: Option<String>,
    },

    #[error("Failed to fetch: {0}")]
    Fetch(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Response too large ({size} bytes, max {max})", max = crate::http::MAX_RESPONSE_SIZE)]
    ResponseTooLarge { size: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl Error {
    /// Errors after which the user has to sign in again.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired(_) | Self::InvalidCredentials(_) | Self::FederatedAuth(_)
        ) || self.is_unauthorized()
    }

    /// True for a raw 401 response.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status, .. } if status.as_u16() == 401)
    }

    /// Message reported by the backend, falling back to the error display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Remap a failure from a read endpoint. Auth failures pass through.
    #[must_use]
    pub fn into_fetch(self) -> Self {
        match self {
            Self::Http { status, .. } if status.as_u16() == 401 => self,
            Self::Http { .. } | Self::Parse(_) | Self::ResponseTooLarge { .. } => {
                Self::Fetch(self.user_message())
            }
            other => other,
        }
    }

    /// Remap a failure from a mutating endpoint. Auth failures pass through.
    #[must_use]
    pub fn into_operation_failed(self) -> Self {
        match self {
            Self::Http { status, .. } if status.as_u16() == 401 => self,
            Self::Http { .. } | Self::Parse(_) | Self::ResponseTooLarge { .. } => {
                Self::OperationFailed(self.user_message())
            }
            other => other,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
