use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::TokenStore;
use crate::error::{Error, Result};
use crate::models::TokenPair;

/// Stores the token pair as one JSON file.
///
/// Writes go to a sibling temp file that is renamed over the target, so the
/// file always holds either the previous pair or the new one.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Storage(format!("invalid token path {}", self.path.display())))?;
        Ok(self.path.with_file_name(format!(".{file_name}.tmp")))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Result<Option<TokenPair>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                // An unreadable record is treated as signed out.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding corrupt token file"
                );
                Ok(None)
            }
        }
    }

    async fn set(&self, tokens: &TokenPair) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        let content = serde_json::to_vec(tokens)?;
        let tmp_path = self.tmp_path()?;

        let write_result = async {
            let mut options = tokio::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            options.mode(0o600);

            let mut file = options.open(&tmp_path).await?;
            file.write_all(&content).await?;
            file.sync_all().await?;
            drop(file);

            tokio::fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(e) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
