//! Session and token lifecycle
//!
//! [`AuthSessionManager`] owns sign-in, sign-out and the refresh protocol.
//! Refreshes are single-flight: however many requests are rejected at the
//! same time, one `GET /auth/refresh-token` call is made and every waiter
//! receives its outcome.

mod identity;

pub use identity::{IdentityProvider, NoIdentityProvider, StaticIdTokenProvider};

#[cfg(test)]
pub use identity::MockIdentityProvider;

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::http::{check_response, json_with_limit, Backend};
use crate::models::{
    Credentials, FederatedAssertion, RefreshTokenResponse, Session, TokenPair, User,
};
use crate::singleflight::SingleFlight;
use crate::storage::TokenStore;

pub struct AuthSessionManager {
    backend: Backend,
    store: Arc<dyn TokenStore>,
    identity: Arc<dyn IdentityProvider>,
    refresh_flight: SingleFlight<TokenPair, Error>,
    session: watch::Sender<Session>,
}

impl AuthSessionManager {
    pub fn new(
        backend: Backend,
        store: Arc<dyn TokenStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let (session, _) = watch::channel(Session::loading());
        Self {
            backend,
            store,
            identity,
            refresh_flight: SingleFlight::new("token-refresh"),
            session,
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Receiver notified on every session change, including the forced
    /// sign-out after a failed refresh.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Resolve the initial loading state from persisted tokens.
    pub async fn restore(&self) -> Result<Session> {
        let session = match self.is_signed_in().await {
            Ok(true) => Session::signed_in(None),
            Ok(false) => Session::signed_out(),
            Err(e) => {
                self.session.send_replace(Session::signed_out());
                return Err(e);
            }
        };
        self.session.send_replace(session.clone());
        Ok(session)
    }

    /// Attach the profile of the signed-in user. Ignored while signed out.
    pub fn set_current_user(&self, user: Option<User>) {
        self.session.send_if_modified(|session| {
            if !session.is_authenticated || session.current_user == user {
                return false;
            }
            session.current_user = user;
            true
        });
    }

    /// True iff a token pair is persisted. Expiry is not checked here, an
    /// expired session surfaces on the next authorized call.
    pub async fn is_signed_in(&self) -> Result<bool> {
        self.store.exists().await
    }

    /// Access token to attach to the next request, if signed in.
    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.get().await?.map(|tokens| tokens.access_token))
    }

    /// Sign in with username and password.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .backend
            .request(Method::POST, "/auth/login")
            .json(&credentials)
            .send()
            .await?;

        let tokens: TokenPair = match check_response(response).await {
            Ok(response) => json_with_limit(response).await?,
            Err(Error::Http {
                status, message, ..
            }) if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED => {
                return Err(Error::InvalidCredentials(
                    message.unwrap_or_else(|| "Invalid username or password".to_string()),
                ));
            }
            Err(e) => return Err(e),
        };

        self.establish(&tokens).await?;
        info!(username, "Signed in");
        Ok(self.session())
    }

    /// Sign in through the external identity provider.
    pub async fn federated_sign_in(&self) -> Result<Session> {
        let id_token = self.identity.sign_in().await.map_err(|e| match e {
            Error::FederatedAuth(_) => e,
            other => Error::FederatedAuth(other.to_string()),
        })?;

        let response = self
            .backend
            .request(Method::POST, "/auth/google")
            .json(&FederatedAssertion { id_token })
            .send()
            .await?;

        let tokens: TokenPair = match check_response(response).await {
            Ok(response) => json_with_limit(response).await?,
            Err(e @ Error::Http { .. }) => return Err(Error::FederatedAuth(e.user_message())),
            Err(e) => return Err(e),
        };

        self.establish(&tokens).await?;
        info!("Signed in with identity provider");
        Ok(self.session())
    }

    /// Clear the local session and the provider session.
    ///
    /// Provider errors are logged and swallowed; only a failure to clear the
    /// stored tokens is returned.
    pub async fn sign_out(&self) -> Result<()> {
        let cleared = self.store.clear().await;
        if let Err(e) = self.identity.sign_out().await {
            warn!(error = %e, "Identity provider sign-out failed");
        }
        self.session.send_replace(Session::signed_out());
        cleared?;
        info!("Signed out");
        Ok(())
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Joins the refresh already in flight if there is one.
    pub async fn refresh(&self) -> Result<TokenPair> {
        self.refresh_flight
            .run_or(self.refresh_once(None), || {
                Error::SessionExpired("token refresh was abandoned".to_string())
            })
            .await
    }

    /// Refresh after `rejected_access_token` was answered with 401.
    ///
    /// When the stored access token already differs from the rejected one,
    /// another caller refreshed in the meantime and the stored pair is
    /// returned without a network call.
    pub(crate) async fn refresh_rejected(&self, rejected_access_token: &str) -> Result<TokenPair> {
        self.refresh_flight
            .run_or(self.refresh_once(Some(rejected_access_token)), || {
                Error::SessionExpired("token refresh was abandoned".to_string())
            })
            .await
    }

    /// Body of one flight. Runs at most once at a time.
    async fn refresh_once(&self, rejected_access_token: Option<&str>) -> Result<TokenPair> {
        let result = self.request_new_access_token(rejected_access_token).await;
        if let Err(e) = &result {
            self.end_session_after_failed_refresh(e).await;
        }
        result
    }

    async fn request_new_access_token(
        &self,
        rejected_access_token: Option<&str>,
    ) -> Result<TokenPair> {
        let tokens = self
            .store
            .get()
            .await?
            .ok_or_else(|| Error::SessionExpired("no refresh token available".to_string()))?;

        if let Some(rejected) = rejected_access_token {
            if tokens.access_token != rejected {
                debug!("Access token already refreshed, reusing stored token");
                return Ok(tokens);
            }
        }

        debug!("Refreshing access token");
        let response = self
            .backend
            .request(Method::GET, "/auth/refresh-token")
            .header(AUTHORIZATION, format!("Bearer {}", tokens.refresh_token))
            .send()
            .await?;

        let refreshed: RefreshTokenResponse = match check_response(response).await {
            Ok(response) => json_with_limit(response).await?,
            Err(Error::Http {
                status, message, ..
            }) if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
                return Err(Error::SessionExpired(
                    message.unwrap_or_else(|| format!("refresh rejected with {status}")),
                ));
            }
            Err(e) => return Err(e),
        };

        let updated = tokens.with_access_token(refreshed.access_token);
        self.store.set(&updated).await?;
        debug!("Access token refreshed");
        Ok(updated)
    }

    /// A rejected refresh ends the session; any other failure still drops
    /// the stored pair so the next sign-in starts clean.
    async fn end_session_after_failed_refresh(&self, error: &Error) {
        warn!(error = %error, "Token refresh failed, ending session");
        if matches!(error, Error::SessionExpired(_)) {
            if let Err(e) = self.sign_out().await {
                warn!(error = %e, "Failed to clear tokens after refresh failure");
            }
            return;
        }
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear tokens after refresh failure");
        }
        self.session.send_replace(Session::signed_out());
    }

    async fn establish(&self, tokens: &TokenPair) -> Result<()> {
        self.store.set(tokens).await?;
        self.session.send_replace(Session::signed_in(None));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::storage::MemoryTokenStore;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pair(access: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: "refresh-1".to_string(),
            refresh_token_expiry: Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap(),
        }
    }

    fn token_body(access: &str) -> serde_json::Value {
        serde_json::json!({
            "accessToken": access,
            "refreshToken": "refresh-1",
            "refreshTokenExpiryTime": "2026-12-01T00:00:00Z"
        })
    }

    fn manager(
        server: &MockServer,
        store: Arc<MemoryTokenStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> AuthSessionManager {
        let config = ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        };
        AuthSessionManager::new(Backend::new(&config).unwrap(), store, identity)
    }

    #[tokio::test]
    async fn test_sign_in_stores_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header("X-Mismatch-App", "livestream-remote"))
            .and(body_json(serde_json::json!({"username": "coach", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1")))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = manager(&server, store.clone(), Arc::new(NoIdentityProvider));
        let session = auth.sign_in("coach", "pw").await.unwrap();

        assert!(session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(store.get().await.unwrap(), Some(pair("access-1")));
        assert!(auth.is_signed_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_sign_in_accepts_expiry_without_offset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": "access-1",
                "refreshToken": "refresh-1",
                "refreshTokenExpiryTime": "2026-12-01T00:00:00"
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = manager(&server, store.clone(), Arc::new(NoIdentityProvider));
        let session = auth.sign_in("coach", "pw").await.unwrap();

        assert!(session.is_authenticated);
        assert_eq!(store.get().await.unwrap(), Some(pair("access-1")));
    }

    #[tokio::test]
    async fn test_sign_in_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Wrong password"})),
            )
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = manager(&server, store.clone(), Arc::new(NoIdentityProvider));
        let err = auth.sign_in("coach", "bad").await.unwrap_err();

        assert!(matches!(err, Error::InvalidCredentials(ref msg) if msg == "Wrong password"));
        assert!(!auth.is_signed_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_sign_in_network_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            connect_timeout_seconds: 1,
            request_timeout_seconds: 1,
            ..ApiConfig::default()
        };
        let auth = AuthSessionManager::new(
            Backend::new(&config).unwrap(),
            Arc::new(MemoryTokenStore::new()),
            Arc::new(NoIdentityProvider),
        );
        let err = auth.sign_in("coach", "pw").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_federated_sign_in_exchanges_assertion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/google"))
            .and(body_json(serde_json::json!({"idToken": "google-id"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-g")))
            .expect(1)
            .mount(&server)
            .await;

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .times(1)
            .returning(|| Ok("google-id".to_string()));

        let store = Arc::new(MemoryTokenStore::new());
        let auth = manager(&server, store.clone(), Arc::new(identity));
        let session = auth.federated_sign_in().await.unwrap();

        assert!(session.is_authenticated);
        assert_eq!(store.get().await.unwrap().unwrap().access_token, "access-g");
    }

    #[tokio::test]
    async fn test_federated_sign_in_cancelled() {
        let server = MockServer::start().await;
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .returning(|| Err(Error::FederatedAuth("cancelled by user".to_string())));

        let auth = manager(&server, Arc::new(MemoryTokenStore::new()), Arc::new(identity));
        let err = auth.federated_sign_in().await.unwrap_err();
        assert!(matches!(err, Error::FederatedAuth(ref msg) if msg == "cancelled by user"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_federated_sign_in_exchange_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/google"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .returning(|| Ok("google-id".to_string()));

        let store = Arc::new(MemoryTokenStore::new());
        let auth = manager(&server, store.clone(), Arc::new(identity));
        let err = auth.federated_sign_in().await.unwrap_err();
        assert!(matches!(err, Error::FederatedAuth(_)));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_survives_provider_failure() {
        let server = MockServer::start().await;
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_out()
            .times(1)
            .returning(|| Err(Error::Network("provider unreachable".to_string())));

        let store = Arc::new(MemoryTokenStore::with_tokens(pair("access-1")));
        let auth = manager(&server, store.clone(), Arc::new(identity));
        auth.restore().await.unwrap();
        assert!(auth.session().is_authenticated);

        auth.sign_out().await.unwrap();
        assert!(!auth.is_signed_in().await.unwrap());
        assert!(!auth.session().is_authenticated);
    }

    #[tokio::test]
    async fn test_refresh_updates_only_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/refresh-token"))
            .and(header("Authorization", "Bearer refresh-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"accessToken": "access-2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(pair("access-1")));
        let auth = manager(&server, store.clone(), Arc::new(NoIdentityProvider));
        let refreshed = auth.refresh().await.unwrap();

        assert_eq!(refreshed, pair("access-2"));
        assert_eq!(store.get().await.unwrap(), Some(pair("access-2")));
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/refresh-token"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let mut identity = MockIdentityProvider::new();
        identity.expect_sign_out().times(1).returning(|| Ok(()));

        let store = Arc::new(MemoryTokenStore::with_tokens(pair("access-1")));
        let auth = manager(&server, store.clone(), Arc::new(identity));
        auth.restore().await.unwrap();
        let mut sessions = auth.subscribe();

        let err = auth.refresh().await.unwrap_err();
        assert!(matches!(err, Error::SessionExpired(_)));
        assert!(!auth.is_signed_in().await.unwrap());
        assert!(sessions.has_changed().unwrap());
        assert!(!sessions.borrow_and_update().is_authenticated);
    }

    #[tokio::test]
    async fn test_refresh_server_error_still_clears_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/refresh-token"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(pair("access-1")));
        let auth = manager(&server, store.clone(), Arc::new(NoIdentityProvider));
        let err = auth.refresh().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Http { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
        ));
        assert!(store.get().await.unwrap().is_none());
        assert!(!auth.session().is_authenticated);
    }

    #[tokio::test]
    async fn test_refresh_without_tokens_is_session_expired() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryTokenStore::new());
        let auth = manager(&server, store, Arc::new(NoIdentityProvider));
        let err = auth.refresh().await.unwrap_err();
        assert!(matches!(err, Error::SessionExpired(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rejected_reuses_newer_token() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryTokenStore::with_tokens(pair("access-2")));
        let auth = manager(&server, store, Arc::new(NoIdentityProvider));

        let tokens = auth.refresh_rejected("access-1").await.unwrap();
        assert_eq!(tokens.access_token, "access-2");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_and_current_user() {
        let server = MockServer::start().await;
        let auth = manager(
            &server,
            Arc::new(MemoryTokenStore::with_tokens(pair("access-1"))),
            Arc::new(NoIdentityProvider),
        );
        assert!(auth.session().is_loading);

        let session = auth.restore().await.unwrap();
        assert!(session.is_authenticated);
        assert!(session.current_user.is_none());

        let user: User = serde_json::from_str(r#"{"id": "u1", "email": "coach@club.gr"}"#).unwrap();
        auth.set_current_user(Some(user.clone()));
        assert_eq!(auth.session().current_user, Some(user));
    }

    #[tokio::test]
    async fn test_set_current_user_ignored_when_signed_out() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryTokenStore::new());
        let auth = manager(&server, store, Arc::new(NoIdentityProvider));
        auth.restore().await.unwrap();

        let user: User = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        auth.set_current_user(Some(user));
        assert!(auth.session().current_user.is_none());
    }
}
