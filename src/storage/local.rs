//! File-backed token storage.
//!
//! The token file holds a single line. Whitespace around it is ignored and
//! an empty file counts as logged out.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::TokenStore;

/// Token storage in a local file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load_token(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::validation("refusing to store an empty token"));
        }
        self.write_bytes(format!("{token}\n").as_bytes()).await?;
        log::debug!("Token saved to {}", self.path.display());
        Ok(())
    }

    async fn clear_token(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_logged_out() {
        let tmp = TempDir::new().unwrap();
        let store = FileTokenStore::new(tmp.path().join("token"));
        assert!(store.load_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_trims() {
        let tmp = TempDir::new().unwrap();
        let store = FileTokenStore::new(tmp.path().join("nested/dir/token"));

        store.save_token("  secret-token \n").await.unwrap();
        assert_eq!(
            store.load_token().await.unwrap().as_deref(),
            Some("secret-token")
        );
        assert!(!tmp.path().join("nested/dir/token.tmp").exists());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = FileTokenStore::new(tmp.path().join("token"));

        store.save_token("abc").await.unwrap();
        store.clear_token().await.unwrap();
        store.clear_token().await.unwrap();
        assert!(store.load_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_token_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = FileTokenStore::new(tmp.path().join("token"));
        assert!(matches!(
            store.save_token("   ").await,
            Err(AppError::Validation(_))
        ));
    }
}
