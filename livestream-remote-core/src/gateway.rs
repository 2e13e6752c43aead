//! Authorized request execution
//!
//! Every call goes out with the stored access token. A 401 answer triggers
//! one (shared) refresh and one retry; a 401 on the retry is returned as-is.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::AuthSessionManager;
use crate::error::Result;
use crate::http::{check_response, json_with_limit, Backend, CLUB_ID_HEADER};
use crate::models::OrganizationId;

/// Description of one backend call, replayable for the retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    club_id: Option<OrganizationId>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            club_id: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Scope the request to an organization via the `Club-ID` header.
    #[must_use]
    pub fn club(mut self, organization_id: &OrganizationId) -> Self {
        self.club_id = Some(organization_id.clone());
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

pub struct ApiGateway {
    backend: Backend,
    auth: Arc<AuthSessionManager>,
}

impl ApiGateway {
    pub fn new(backend: Backend, auth: Arc<AuthSessionManager>) -> Self {
        Self { backend, auth }
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthSessionManager> {
        &self.auth
    }

    /// Send `request`, refreshing and retrying once on 401.
    ///
    /// A failed refresh is returned to the caller as-is; the auth manager has
    /// already ended the session by then.
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let access_token = self.auth.access_token().await?;
        let response = self.dispatch(request, access_token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_response(response).await;
        }
        drop(response);

        debug!(method = %request.method, path = %request.path, "Unauthorized, refreshing token");
        let rejected = access_token.unwrap_or_default();
        let tokens = self.auth.refresh_rejected(&rejected).await?;

        // Already retried: a second 401 goes back to the caller.
        let retry = self.dispatch(request, Some(&tokens.access_token)).await?;
        check_response(retry).await
    }

    /// Send and decode a JSON body.
    pub async fn json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        json_with_limit(response).await
    }

    /// Like [`json`](Self::json), with 404 mapped to `None`.
    pub async fn json_optional<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Option<T>> {
        match self.send(request).await {
            Ok(response) => json_with_limit(response).await.map(Some),
            Err(crate::Error::Http { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut builder = self.backend.request(request.method.clone(), &request.path);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(club_id) = &request.club_id {
            builder = builder.header(CLUB_ID_HEADER, club_id.as_str());
        }
        if let Some(token) = access_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }
}
