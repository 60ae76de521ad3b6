use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use opsdash_application::ReadCache;
use opsdash_core::AppResult;
use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct ReadCacheEntry {
    value: Value,
    tags: BTreeSet<String>,
    expires_at: Instant,
}

/// In-memory adapter for the tag-scoped read cache.
///
/// Expired entries are removed lazily on read and swept on every write.
#[derive(Default)]
pub struct InMemoryReadCache {
    entries: RwLock<HashMap<String, ReadCacheEntry>>,
}

impl InMemoryReadCache {
    /// Creates an empty in-memory read cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ReadCache for InMemoryReadCache {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.value.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        Ok(None)
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

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_owned(),
            ReadCacheEntry {
                value,
                tags: tags.iter().cloned().collect(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate_tag(&self, tag: &str) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.contains(tag));
        tracing::debug!(tag, removed = before - entries.len(), "read cache tag invalidated");

        Ok(())
    }
}
