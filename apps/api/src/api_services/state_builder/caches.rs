use std::sync::Arc;

use opsdash_application::{CachePolicy, ReadCache};
use opsdash_infrastructure::{InMemoryReadCache, RedisReadCache};
use tracing::info;

use crate::api_config::ApiConfig;

pub(super) fn build_cache_policy(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> CachePolicy {
    if config.cache_ttl_seconds == 0 {
        info!("read cache disabled");
        return CachePolicy::disabled();
    }

    let cache: Arc<dyn ReadCache> = match redis_client {
        Some(redis_client) => {
            info!(ttl_seconds = config.cache_ttl_seconds, "using redis read cache");
            Arc::new(RedisReadCache::new(redis_client, "opsdash:read_cache"))
        }
        None => {
            info!(
                ttl_seconds = config.cache_ttl_seconds,
                "using in-memory read cache"
            );
            Arc::new(InMemoryReadCache::new())
        }
    };

    CachePolicy::new(cache, config.cache_ttl_seconds)
}
