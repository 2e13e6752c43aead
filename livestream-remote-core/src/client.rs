//! Entry point wiring the session, the gateway and the services together

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::warn;

use crate::auth::{AuthSessionManager, IdentityProvider};
use crate::config::{Config, EventsConfig};
use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::http::Backend;
use crate::models::{OrganizationId, Session};
use crate::service::{ClassifiedEvents, EventAggregator, GameEventService, OrganizationService};
use crate::storage::TokenStore;

pub struct RemoteClient {
    auth: Arc<AuthSessionManager>,
    gateway: Arc<ApiGateway>,
    organizations: OrganizationService,
    events: EventAggregator,
    game_events: GameEventService,
    window: EventsConfig,
}

impl RemoteClient {
    pub fn new(
        config: &Config,
        store: Arc<dyn TokenStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let backend = Backend::new(&config.api)?;
        let auth = Arc::new(AuthSessionManager::new(backend.clone(), store, identity));
        let gateway = Arc::new(ApiGateway::new(backend, auth.clone()));
        Ok(Self {
            organizations: OrganizationService::new(gateway.clone()),
            events: EventAggregator::new(gateway.clone()),
            game_events: GameEventService::new(gateway.clone()),
            auth,
            gateway,
            window: config.events.clone(),
        })
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthSessionManager> {
        &self.auth
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    #[must_use]
    pub fn organizations(&self) -> &OrganizationService {
        &self.organizations
    }

    #[must_use]
    pub fn events(&self) -> &EventAggregator {
        &self.events
    }

    #[must_use]
    pub fn game_events(&self) -> &GameEventService {
        &self.game_events
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.auth.session()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.auth.subscribe()
    }

    /// Resolve the persisted session and, if signed in, load the user.
    pub async fn restore(&self) -> Result<Session> {
        let session = self.auth.restore().await?;
        if session.is_authenticated {
            self.load_current_user().await;
        }
        Ok(self.auth.session())
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session> {
        self.auth.sign_in(username, password).await?;
        self.load_current_user().await;
        Ok(self.auth.session())
    }

    pub async fn federated_sign_in(&self) -> Result<Session> {
        self.auth.federated_sign_in().await?;
        self.load_current_user().await;
        Ok(self.auth.session())
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await
    }

    /// Classified events of `organization_id` in the configured window
    /// around the current time.
    pub async fn classified_events(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<ClassifiedEvents> {
        self.events
            .list_around(organization_id, Utc::now(), &self.window)
            .await
    }

    /// The profile is informative only; a failure leaves the session
    /// signed in without a user.
    async fn load_current_user(&self) {
        match self.organizations.current_user().await {
            Ok(user) => self.auth.set_current_user(Some(user)),
            Err(e) => warn!(error = %e, "Failed to load current user"),
        }
    }
}
