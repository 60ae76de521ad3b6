//! Tag-scoped read cache port.
//!
//! Entries expire after their time to live or as soon as one of their tags is
//! invalidated. A time to live of zero disables caching.

use std::future::Future;

use async_trait::async_trait;
use opsdash_core::{AppError, AppResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Cache port for expensive remote reads.
#[async_trait]
pub trait ReadCache: Send + Sync {
    /// Returns a live cached value for one key.
    async fn get(&self, key: &str) -> AppResult<Option<Value>>;

    /// Stores a value under `key`, tagged with every tag in `tags`.
    async fn set(&self, key: &str, tags: &[String], value: Value, ttl_seconds: u32)
    -> AppResult<()>;

    /// Drops every entry carrying `tag`.
    async fn invalidate_tag(&self, tag: &str) -> AppResult<()>;
}

/// Cache settings shared by services that read through a [`ReadCache`].
#[derive(Clone)]
pub struct CachePolicy {
    cache: Option<std::sync::Arc<dyn ReadCache>>,
    ttl_seconds: u32,
}

impl CachePolicy {
    /// Creates a policy backed by a cache.
    #[must_use]
    pub fn new(cache: std::sync::Arc<dyn ReadCache>, ttl_seconds: u32) -> Self {
        Self {
            cache: Some(cache),
            ttl_seconds,
        }
    }

    /// Creates a policy that always calls the loader.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            cache: None,
            ttl_seconds: 0,
        }
    }

    /// Returns the configured time to live.
    #[must_use]
    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }

    /// Reads `key` through the cache, running `loader` on a miss.
    pub async fn read<T, F, Fut>(&self, key: &str, tags: &[String], loader: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        match &self.cache {
            Some(cache) => cached_read(cache.as_ref(), key, tags, self.ttl_seconds, loader).await,
            None => loader().await,
        }
    }

    /// Invalidates a tag after a remote write.
    ///
    /// The write has already happened, so a cache failure is logged and the
    /// stale entries are left to expire with their time to live.
    pub async fn invalidate(&self, tag: &str) {
        let Some(cache) = &self.cache else {
            return;
        };

        if let Err(error) = cache.invalidate_tag(tag).await {
            tracing::warn!(
                cache_tag = tag,
                error = %error,
                ttl_seconds = self.ttl_seconds,
                "read cache invalidation failed"
            );
        }
    }
}

/// Returns the cached value for `key` or loads, stores and returns a fresh one.
pub async fn cached_read<T, F, Fut>(
    cache: &dyn ReadCache,
    key: &str,
    tags: &[String],
    ttl_seconds: u32,
    loader: F,
) -> AppResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    if ttl_seconds == 0 {
        return loader().await;
    }

    if let Some(value) = cache.get(key).await? {
        match serde_json::from_value::<T>(value) {
            Ok(cached) => return Ok(cached),
            Err(error) => {
                tracing::warn!(cache_key = key, error = %error, "discarding undecodable cache entry");
            }
        }
    }

    let fresh = loader().await?;
    let value = serde_json::to_value(&fresh).map_err(|error| {
        AppError::Internal(format!("failed to serialize cache entry '{key}': {error}"))
    })?;
    cache.set(key, tags, value, ttl_seconds).await?;

    Ok(fresh)
}
