//! Redis-backed counter store for clustered deployments.
//!
//! Global hit counters live in a single hash keyed by product id. Each
//! session's category hit list is a JSON string under its own key, written
//! with the session TTL so Redis expires abandoned sessions.

use crate::store::CounterStore;
use async_trait::async_trait;
use recommend_core::config::RedisConfig;
use recommend_core::{ProductId, RecommendError, RecommendResult, SessionTypeHits};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

/// Counter store shared by every node through Redis.
pub struct RedisCounterStore {
    conn: ConnectionManager,
    hit_counter_key: String,
    session_key_prefix: String,
    session_ttl_secs: u64,
}

impl RedisCounterStore {
    /// Connect to Redis and verify connectivity.
    pub async fn new(config: &RedisConfig, session_ttl_secs: u64) -> RecommendResult<Self> {
        let url = config
            .urls
            .first()
            .cloned()
            .ok_or_else(|| RecommendError::Config("redis.urls is empty".to_string()))?;

        info!(url = %url, "Connecting to Redis");

        let client = redis::Client::open(url.as_str()).map_err(RecommendError::cache)?;
        let mut conn = tokio::time::timeout(
            Duration::from_millis(config.connect_timeout_ms),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| RecommendError::Cache(format!("timed out connecting to {url}")))?
        .map_err(RecommendError::cache)?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(RecommendError::cache)?;
        info!(response = %pong, "Redis connection established");

        Ok(Self {
            conn,
            hit_counter_key: hit_counter_key(&config.key_prefix),
            session_key_prefix: config.key_prefix.clone(),
            session_ttl_secs,
        })
    }

    fn session_key(&self, session_id: &str) -> String {
        session_hits_key(&self.session_key_prefix, session_id)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn hit_count(&self, product_id: ProductId) -> RecommendResult<u64> {
        let mut conn = self.conn.clone();
        let count: Option<u64> = conn
            .hget(&self.hit_counter_key, product_id)
            .await
            .map_err(RecommendError::cache)?;
        metrics::counter!("counters.redis.reads").increment(1);
        Ok(count.unwrap_or(0))
    }

    async fn hit_counts(&self, product_ids: &[ProductId]) -> RecommendResult<Vec<u64>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let counts: Vec<Option<u64>> = redis::cmd("HMGET")
            .arg(&self.hit_counter_key)
            .arg(product_ids)
            .query_async(&mut conn)
            .await
            .map_err(RecommendError::cache)?;
        metrics::counter!("counters.redis.reads").increment(1);
        Ok(counts.into_iter().map(|c| c.unwrap_or(0)).collect())
    }

    async fn set_hit_count(&self, product_id: ProductId, count: u64) -> RecommendResult<()> {
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(&self.hit_counter_key, product_id, count)
            .await
            .map_err(RecommendError::cache)?;
        metrics::counter!("counters.redis.writes").increment(1);
        Ok(())
    }

    async fn increment_hit_count(&self, product_id: ProductId) -> RecommendResult<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = conn
            .hincr(&self.hit_counter_key, product_id, 1)
            .await
            .map_err(RecommendError::cache)?;
        metrics::counter!("counters.redis.writes").increment(1);
        Ok(count)
    }

    async fn session_hits(&self, session_id: &str) -> RecommendResult<Option<SessionTypeHits>> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn
            .get(self.session_key(session_id))
            .await
            .map_err(RecommendError::cache)?;
        metrics::counter!("counters.redis.reads").increment(1);

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => {
                debug!(session_id = session_id, "No category hits for session");
                Ok(None)
            }
        }
    }

    async fn set_session_hits(
        &self,
        session_id: &str,
        hits: &SessionTypeHits,
    ) -> RecommendResult<()> {
        let json = serde_json::to_string(hits)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(self.session_key(session_id), &json, self.session_ttl_secs)
            .await
            .map_err(RecommendError::cache)?;
        metrics::counter!("counters.redis.writes").increment(1);
        Ok(())
    }
}

fn hit_counter_key(prefix: &str) -> String {
    format!("{prefix}:product_hit_counter")
}

fn session_hits_key(prefix: &str, session_id: &str) -> String {
    format!("{prefix}:session_type_hits:{session_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(hit_counter_key("recommend"), "recommend:product_hit_counter");
        assert_eq!(
            session_hits_key("recommend", "abc-123"),
            "recommend:session_type_hits:abc-123"
        );
    }

    #[tokio::test]
    async fn test_empty_url_list_is_config_error() {
        let config = RedisConfig {
            urls: Vec::new(),
            ..RedisConfig::default()
        };
        let err = RedisCounterStore::new(&config, 60).await.err().unwrap();
        assert!(matches!(err, RecommendError::Config(_)));
    }
}
