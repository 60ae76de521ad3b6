//! Redis-backed tag-scoped read cache.
//!
//! Each entry is a JSON string stored with `SET EX`. Each tag is a Redis set
//! holding the keys of the entries carrying it, so invalidation deletes the
//! members and then the set itself.

use async_trait::async_trait;
use opsdash_application::ReadCache;
use opsdash_core::{AppError, AppResult};
use redis::AsyncCommands;
use serde_json::Value;

/// Redis implementation of the read cache port.
#[derive(Clone)]
pub struct RedisReadCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisReadCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn entry_key(&self, key: &str) -> String {
        format!("{}:entry:{key}", self.key_prefix)
    }

    fn tag_key(&self, tag: &str) -> String {
        format!("{}:tag:{tag}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl ReadCache for RedisReadCache {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> =
            connection.get(self.entry_key(key)).await.map_err(|error| {
                AppError::Internal(format!("failed to read cache entry '{key}': {error}"))
            })?;

        encoded
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!("invalid cache entry '{key}': {error}"))
            })
    }

    async fn set(
        &self,
        key: &str,
        tags: &[String],
        value: Value,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let entry_key = self.entry_key(key);
        let encoded = value.to_string();
        let mut pipeline = redis::pipe();
        pipeline
            .atomic()
            .set_ex(&entry_key, encoded, u64::from(ttl_seconds))
            .ignore();
        for tag in tags {
            let tag_key = self.tag_key(tag);
            pipeline
                .sadd(&tag_key, &entry_key)
                .ignore()
                .expire(&tag_key, i64::from(ttl_seconds))
                .ignore();
        }

        let mut connection = self.connection().await?;
        pipeline
            .query_async::<()>(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write cache entry '{key}': {error}"))
            })
    }

    async fn invalidate_tag(&self, tag: &str) -> AppResult<()> {
        let tag_key = self.tag_key(tag);
        let mut connection = self.connection().await?;

        let members: Vec<String> = connection.smembers(&tag_key).await.map_err(|error| {
            AppError::Internal(format!("failed to read cache tag '{tag}': {error}"))
        })?;

        let mut doomed = members;
        doomed.push(tag_key);
        let removed: u64 = connection.del(&doomed).await.map_err(|error| {
            AppError::Internal(format!("failed to invalidate cache tag '{tag}': {error}"))
        })?;

        tracing::debug!(tag, removed, "read cache tag invalidated");
        Ok(())
    }
}
