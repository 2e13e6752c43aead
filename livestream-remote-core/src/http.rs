//! Backend connection and response helpers shared by the gateway and the
//! auth endpoints

use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Maximum response body size for backend calls (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Header carrying the fixed client identifier on every request.
pub const CLIENT_APP_HEADER: &str = "X-Mismatch-App";

/// Header scoping a request to one organization.
pub const CLUB_ID_HEADER: &str = "Club-ID";

/// Build the pooled HTTP client used for every backend call.
///
/// Redirects are disabled so credentials are never replayed to another host.
pub fn build_client(config: &ApiConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))
}

/// Connection to the backend shared by the auth endpoints and the gateway
#[derive(Clone)]
pub struct Backend {
    client: Client,
    base_url: String,
    client_app_id: HeaderValue,
}

impl Backend {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_app_id: HeaderValue::from_str(&config.client_app_id)?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/auth/login`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request carrying the fixed client identifier header.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(CLIENT_APP_HEADER, self.client_app_id.clone())
    }
}

/// Read a response body with size limit and deserialize as JSON.
///
/// Checks `Content-Length` hint first (if available), then enforces the
/// limit on the actual body bytes before deserializing.
pub async fn json_with_limit<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    if let Some(cl) = response.content_length() {
        if cl as usize > MAX_RESPONSE_SIZE {
            return Err(Error::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(Error::ResponseTooLarge {
            size: bytes.len() as u64,
        });
    }
    serde_json::from_slice(&bytes).map_err(Into::into)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Check HTTP response status before processing body.
///
/// Non-success responses become [`Error::Http`], keeping the backend's
/// `message` field when the body carries one.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return Ok(resp);
    }

    let url = resp.url().to_string();
    let message = match resp.bytes().await {
        Ok(bytes) if bytes.len() <= MAX_RESPONSE_SIZE => serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty()),
        _ => None,
    };

    Err(Error::Http {
        status,
        url,
        message,
    })
}
