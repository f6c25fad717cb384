//! In-process counter store backed by DashMap.
//! Used for single-node deployments and tests; state is lost on restart.

use crate::store::CounterStore;
use async_trait::async_trait;
use dashmap::DashMap;
use recommend_core::{ProductId, RecommendResult, SessionTypeHits};
use std::time::{Duration, Instant};

struct SessionEntry {
    hits: SessionTypeHits,
    written_at: Instant,
}

/// Lock-free local counter store.
pub struct LocalCounterStore {
    hit_counts: DashMap<ProductId, u64>,
    sessions: DashMap<String, SessionEntry>,
    session_ttl: Duration,
}

impl LocalCounterStore {
    pub fn new(session_ttl_secs: u64) -> Self {
        Self {
            hit_counts: DashMap::new(),
            sessions: DashMap::new(),
            session_ttl: Duration::from_secs(session_ttl_secs),
        }
    }

    /// Remove sessions idle for longer than the TTL. Call this periodically
    /// from a background task.
    pub fn evict_expired(&self) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.written_at.elapsed() <= self.session_ttl;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl CounterStore for LocalCounterStore {
    async fn hit_count(&self, product_id: ProductId) -> RecommendResult<u64> {
        Ok(self.hit_counts.get(&product_id).map_or(0, |c| *c))
    }

    async fn hit_counts(&self, product_ids: &[ProductId]) -> RecommendResult<Vec<u64>> {
        Ok(product_ids
            .iter()
            .map(|id| self.hit_counts.get(id).map_or(0, |c| *c))
            .collect())
    }

    async fn set_hit_count(&self, product_id: ProductId, count: u64) -> RecommendResult<()> {
        self.hit_counts.insert(product_id, count);
        Ok(())
    }

    async fn increment_hit_count(&self, product_id: ProductId) -> RecommendResult<u64> {
        let mut count = self.hit_counts.entry(product_id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn session_hits(&self, session_id: &str) -> RecommendResult<Option<SessionTypeHits>> {
        if let Some(entry) = self.sessions.get(session_id) {
            if entry.written_at.elapsed() <= self.session_ttl {
                return Ok(Some(entry.hits.clone()));
            }
        }
        // Only the stale value goes; a concurrent rewrite survives.
        self.sessions.remove_if(session_id, |_, entry| {
            entry.written_at.elapsed() > self.session_ttl
        });
        Ok(None)
    }

    async fn set_session_hits(
        &self,
        session_id: &str,
        hits: &SessionTypeHits,
    ) -> RecommendResult<()> {
        self.sessions.insert(
            session_id.to_string(),
            SessionEntry {
                hits: hits.clone(),
                written_at: Instant::now(),
            },
        );
        Ok(())
    }
}
