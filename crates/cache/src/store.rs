//! Counter store contract shared by the visit recorder and the
//! recommendation engine.

use async_trait::async_trait;
use recommend_core::{ProductId, RecommendResult, SessionTypeHits};

/// Concurrently shared key-value storage for hit counters.
///
/// Holds two maps: global per-product view counts, and per-session category
/// hit lists. Values written through `set_*` replace the whole stored value;
/// a read followed by a write is not atomic across callers. Only
/// [`CounterStore::increment_hit_count`] is atomic.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Global view count of a product; zero when it was never viewed.
    async fn hit_count(&self, product_id: ProductId) -> RecommendResult<u64>;

    /// Batch form of [`CounterStore::hit_count`]. The result is aligned with
    /// `product_ids`.
    async fn hit_counts(&self, product_ids: &[ProductId]) -> RecommendResult<Vec<u64>>;

    async fn set_hit_count(&self, product_id: ProductId, count: u64) -> RecommendResult<()>;

    /// Atomically add one to the global count and return the new value.
    async fn increment_hit_count(&self, product_id: ProductId) -> RecommendResult<u64>;

    async fn session_hits(&self, session_id: &str) -> RecommendResult<Option<SessionTypeHits>>;

    async fn set_session_hits(
        &self,
        session_id: &str,
        hits: &SessionTypeHits,
    ) -> RecommendResult<()>;
}
