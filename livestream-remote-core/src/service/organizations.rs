use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::gateway::{ApiGateway, ApiRequest};
use crate::models::{Organization, User};

/// Organizations and profile of the signed-in user
pub struct OrganizationService {
    gateway: Arc<ApiGateway>,
}

impl OrganizationService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Organizations whose broadcasts this client may manage.
    pub async fn list(&self) -> Result<Vec<Organization>> {
        let organizations: Vec<Organization> = self
            .gateway
            .json(&ApiRequest::get("/organizations"))
            .await
            .map_err(Error::into_fetch)?;

        let total = organizations.len();
        let organizations: Vec<Organization> = organizations
            .into_iter()
            .filter(Organization::has_livestream_scope)
            .collect();
        debug!(total, kept = organizations.len(), "Listed organizations");
        Ok(organizations)
    }

    pub async fn current_user(&self) -> Result<User> {
        self.gateway
            .json(&ApiRequest::get("/users/me"))
            .await
            .map_err(Error::into_fetch)
    }
}
