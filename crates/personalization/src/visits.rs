//! Hit counter updates triggered by product detail views.

use recommend_cache::CounterStore;
use recommend_core::{Product, RecommendResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Records product views into the global and per-session hit counters.
///
/// Both updates are read-modify-write against the shared store, so two
/// concurrent views of the same product or from the same session can lose
/// an increment. Counts only steer ranking, and the loss is accepted. With
/// `atomic_increments` the global counter uses the store's atomic increment;
/// the session list is always rewritten as a whole.
pub struct VisitRecorder {
    counters: Arc<dyn CounterStore>,
    atomic_increments: bool,
}

impl VisitRecorder {
    pub fn new(counters: Arc<dyn CounterStore>, atomic_increments: bool) -> Self {
        Self {
            counters,
            atomic_increments,
        }
    }

    /// Best-effort recording: failures are logged and counted, never
    /// returned, so a detail fetch cannot fail because of counting.
    pub async fn record_view(&self, session_id: &str, product: &Product) {
        if let Err(e) = self.try_record_view(session_id, product).await {
            warn!(
                error = %e,
                session_id = session_id,
                product_id = product.id,
                "Failed to record product view"
            );
            metrics::counter!("visits.failed").increment(1);
        }
    }

    pub async fn try_record_view(&self, session_id: &str, product: &Product) -> RecommendResult<()> {
        self.increase_global_hits(product).await?;
        self.increase_session_hits(session_id, product).await?;
        metrics::counter!("visits.recorded").increment(1);
        Ok(())
    }

    async fn increase_global_hits(&self, product: &Product) -> RecommendResult<u64> {
        let count = if self.atomic_increments {
            self.counters.increment_hit_count(product.id).await?
        } else {
            let count = self.counters.hit_count(product.id).await? + 1;
            self.counters.set_hit_count(product.id, count).await?;
            count
        };
        info!(
            product_id = product.id,
            product_name = %product.name,
            count = count,
            "GLOBAL HIT COUNTER"
        );
        Ok(count)
    }

    async fn increase_session_hits(&self, session_id: &str, product: &Product) -> RecommendResult<u64> {
        let mut hits = self
            .counters
            .session_hits(session_id)
            .await?
            .unwrap_or_default();
        let count = hits.increment(product.product_type);
        self.counters.set_session_hits(session_id, &hits).await?;
        info!(
            session_id = session_id,
            product_type = %product.product_type,
            count = count,
            "PERSONAL HIT COUNTER"
        );
        Ok(count)
    }
}
