//! Key provider traits and an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::error::ApiKeyError;
use super::key::{fold_key, ApiKey};

/// Resolves a presented key to a key record.
///
/// Implement this trait to look keys up in a database, a cache or a remote service.
/// Return `Ok(None)` for unknown keys; `Err` is reserved for failures of the backing
/// store.
///
/// # Example
///
/// ```ignore
/// use actix_api_key_core::http::security::{ApiKey, ApiKeyError, ApiKeyProvider};
/// use async_trait::async_trait;
///
/// struct DatabaseApiKeyProvider {
///     pool: DbPool,
/// }
///
/// #[async_trait]
/// impl ApiKeyProvider for DatabaseApiKeyProvider {
///     async fn provide(&self, key: &str) -> Result<Option<ApiKey>, ApiKeyError> {
///         let row = self.pool.find_key(key).await.map_err(|e| ApiKeyError::provider(e.to_string()))?;
///         Ok(row.map(|r| ApiKey::new(r.key).owner(r.owner)))
///     }
/// }
/// ```
#[async_trait]
pub trait ApiKeyProvider: Send + Sync {
    async fn provide(&self, key: &str) -> Result<Option<ApiKey>, ApiKeyError>;
}

/// Creates a key provider for a named scheme.
///
/// Used when several schemes share one registration but need different backing
/// stores. The factory is asked for a provider on every authentication.
pub trait ApiKeyProviderFactory: Send + Sync {
    fn create_provider(&self, scheme_name: &str) -> Arc<dyn ApiKeyProvider>;
}

impl<F> ApiKeyProviderFactory for F
where
    F: Fn(&str) -> Arc<dyn ApiKeyProvider> + Send + Sync,
{
    fn create_provider(&self, scheme_name: &str) -> Arc<dyn ApiKeyProvider> {
        self(scheme_name)
    }
}

/// In-memory key provider.
///
/// Keys are matched ASCII case-insensitively. Intended for development and tests.
///
/// # Example
///
/// ```
/// use actix_api_key_core::http::security::{ApiKey, InMemoryApiKeyProvider};
///
/// let provider = InMemoryApiKeyProvider::new()
///     .with_key(ApiKey::new("Key1").owner("Admin").role("ADMIN"))
///     .with_key(ApiKey::new("Key2").owner("User").role("USER"));
///
/// assert_eq!(provider.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryApiKeyProvider {
    keys: RwLock<HashMap<String, ApiKey>>,
}

impl InMemoryApiKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key (builder pattern).
    pub fn with_key(self, key: ApiKey) -> Self {
        self.add_key(key);
        self
    }

    pub fn add_key(&self, key: ApiKey) {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        keys.insert(fold_key(key.get_key()), key);
    }

    pub fn remove_key(&self, key: &str) -> Option<ApiKey> {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        keys.remove(&fold_key(key))
    }

    pub fn find_key(&self, key: &str) -> Option<ApiKey> {
        let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
        keys.get(&fold_key(key)).cloned()
    }

    pub fn len(&self) -> usize {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ApiKeyProvider for InMemoryApiKeyProvider {
    async fn provide(&self, key: &str) -> Result<Option<ApiKey>, ApiKeyError> {
        Ok(self.find_key(key))
    }
}
