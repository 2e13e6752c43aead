//! Persistence of the token pair
//!
//! A store holds at most one [`TokenPair`] record. Writes replace the whole
//! record at once; a reader never sees a half-written pair.

mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::TokenPair;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current pair, `None` when signed out.
    async fn get(&self) -> Result<Option<TokenPair>>;

    /// Replace the stored pair.
    async fn set(&self, tokens: &TokenPair) -> Result<()>;

    /// Remove the stored pair. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;

    async fn exists(&self) -> Result<bool> {
        Ok(self.get().await?.is_some())
    }
}
