use async_trait::async_trait;
use parking_lot::RwLock;

use super::TokenStore;
use crate::error::Result;
use crate::models::TokenPair;

/// Process-local store, nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<TokenPair>> {
        Ok(self.tokens.read().clone())
    }

    async fn set(&self, tokens: &TokenPair) -> Result<()> {
        *self.tokens.write() = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.write() = None;
        Ok(())
    }
}
