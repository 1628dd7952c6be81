//! Credential storage.
//!
//! The bearer token attached to API requests is read from local persistent
//! storage on every request, so a login or logout takes effect immediately.

pub mod local;

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::FileTokenStore;

/// Trait for token storage backends.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when logged out.
    async fn load_token(&self) -> Result<Option<String>>;

    async fn save_token(&self, token: &str) -> Result<()>;

    async fn clear_token(&self) -> Result<()>;
}

/// In-process token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> Result<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load_token().await.unwrap().is_none());

        store.save_token("abc").await.unwrap();
        assert_eq!(store.load_token().await.unwrap().as_deref(), Some("abc"));

        store.clear_token().await.unwrap();
        assert!(store.load_token().await.unwrap().is_none());
    }
}
