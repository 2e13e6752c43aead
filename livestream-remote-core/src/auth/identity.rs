//! External identity provider used for federated sign-in

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Obtains identity assertions from a third-party provider (e.g. Google).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the provider flow and return its ID token.
    ///
    /// Cancellation by the user is reported as [`Error::FederatedAuth`].
    async fn sign_in(&self) -> Result<String>;

    /// End the provider-side session.
    async fn sign_out(&self) -> Result<()>;
}

/// Placeholder when no provider is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIdentityProvider;

#[async_trait]
impl IdentityProvider for NoIdentityProvider {
    async fn sign_in(&self) -> Result<String> {
        Err(Error::FederatedAuth(
            "no identity provider configured".to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}

/// Provider that hands out an ID token obtained out of band.
#[derive(Clone)]
pub struct StaticIdTokenProvider {
    id_token: String,
}

impl StaticIdTokenProvider {
    pub fn new(id_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdTokenProvider {
    async fn sign_in(&self) -> Result<String> {
        if self.id_token.trim().is_empty() {
            return Err(Error::FederatedAuth("empty ID token".to_string()));
        }
        Ok(self.id_token.clone())
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}
