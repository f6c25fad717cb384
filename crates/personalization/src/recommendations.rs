//! Product recommendations ranked from hit counters.
//!
//! Two flavours:
//! - per product: other products of the same type, most viewed first,
//!   backfilled with the rest of that type in catalog order;
//! - per session: one random product for each type the session viewed,
//!   most viewed type first, backfilled with one random product for each
//!   type the session has not viewed.
//!
//! Missing products, sessions and empty types contribute nothing; only
//! store failures are returned as errors.

use crate::ranking::rank_by_count;
use recommend_cache::CounterStore;
use recommend_catalog::CatalogStore;
use recommend_core::{Product, ProductId, ProductType, RecommendResult};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogStore>,
    counters: Arc<dyn CounterStore>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, counters: Arc<dyn CounterStore>) -> Self {
        Self { catalog, counters }
    }

    /// Recommend up to `limit` products of the same type as `product_id`,
    /// never including `product_id` itself.
    pub async fn recommend_for(
        &self,
        product_id: ProductId,
        limit: usize,
    ) -> RecommendResult<Vec<Product>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(product) = self.catalog.find_by_id(product_id).await? else {
            debug!(product_id = product_id, "No such product, nothing to recommend");
            return Ok(Vec::new());
        };

        let same_type_ids: Vec<ProductId> = self
            .catalog
            .find_ids_by_type(product.product_type)
            .await?
            .into_iter()
            .filter(|id| *id != product_id)
            .collect();

        // Products never viewed are left to the backfill.
        let counts = self.counters.hit_counts(&same_type_ids).await?;
        let viewed: Vec<(ProductId, u64)> = same_type_ids
            .iter()
            .copied()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .collect();

        let mut selected = rank_by_count(viewed);
        selected.truncate(limit);
        backfill(&mut selected, &same_type_ids, limit);

        let mut by_id: HashMap<ProductId, Product> = self
            .catalog
            .find_by_ids(&selected)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let products: Vec<Product> = selected.iter().filter_map(|id| by_id.remove(id)).collect();

        metrics::counter!("recommendations.served", "kind" => "product").increment(1);
        debug!(
            product_id = product_id,
            product_type = %product.product_type,
            count = products.len(),
            "Product recommendations ranked"
        );
        Ok(products)
    }

    /// Recommend up to `limit` products from the session's viewing history.
    /// The result may be shorter than `limit` when the catalog cannot supply
    /// enough distinct products.
    pub async fn recommend_for_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> RecommendResult<Vec<Product>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let hits = match self.counters.session_hits(session_id).await? {
            Some(hits) if !hits.is_empty() => hits,
            _ => {
                debug!(session_id = session_id, "No hits recorded for session");
                return Ok(Vec::new());
            }
        };

        let ranked_types = rank_by_count(
            hits.entries()
                .iter()
                .map(|hit| (hit.product_type, hit.hit_count))
                .collect(),
        );

        let mut recommended: Vec<Product> = Vec::new();
        for product_type in ranked_types.into_iter().take(limit) {
            debug!(session_id = session_id, product_type = %product_type, "Picking from viewed type");
            if let Some(product) = self.random_product_of(product_type).await? {
                push_unique(&mut recommended, product);
            }
        }

        if recommended.len() < limit {
            let unvisited = self.catalog.find_types_not_in(&hits.types()).await?;
            for product_type in unvisited {
                if recommended.len() >= limit {
                    break;
                }
                if let Some(product) = self.random_product_of(product_type).await? {
                    push_unique(&mut recommended, product);
                }
            }
        }

        metrics::counter!("recommendations.served", "kind" => "session").increment(1);
        Ok(recommended)
    }

    async fn random_product_of(&self, product_type: ProductType) -> RecommendResult<Option<Product>> {
        match self.catalog.find_random_id_by_type(product_type).await? {
            Some(id) => self.catalog.find_by_id(id).await,
            None => Ok(None),
        }
    }
}

/// Append candidates not yet selected, in their given order, until `limit`.
fn backfill(selected: &mut Vec<ProductId>, candidates: &[ProductId], limit: usize) {
    let mut seen: HashSet<ProductId> = selected.iter().copied().collect();
    for id in candidates {
        if selected.len() >= limit {
            break;
        }
        if seen.insert(*id) {
            selected.push(*id);
        }
    }
}

fn push_unique(products: &mut Vec<Product>, product: Product) {
    if !products.iter().any(|p| p.id == product.id) {
        products.push(product);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommend_cache::LocalCounterStore;
    use recommend_catalog::SqliteCatalog;
    use recommend_core::SessionTypeHits;

    fn engine_with(
        products: &[(&str, ProductType)],
    ) -> (RecommendationEngine, Arc<LocalCounterStore>) {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        for (name, product_type) in products {
            catalog.insert_product(name, *product_type).unwrap();
        }
        let counters = Arc::new(LocalCounterStore::new(60));
        (
            RecommendationEngine::new(Arc::new(catalog), counters.clone()),
            counters,
        )
    }

    fn ids(products: &[Product]) -> Vec<ProductId> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_backfill_keeps_order_and_skips_selected() {
        let mut selected = vec![4];
        backfill(&mut selected, &[2, 4, 6, 8], 3);
        assert_eq!(selected, vec![4, 2, 6]);

        let mut full = vec![1, 2];
        backfill(&mut full, &[3], 2);
        assert_eq!(full, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unknown_product_yields_empty() {
        let (engine, _) = engine_with(&[("a", ProductType::Book)]);
        assert!(engine.recommend_for(42, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ranked_by_hits_then_backfilled() {
        let (engine, counters) = engine_with(&[
            ("a", ProductType::Book),
            ("b", ProductType::Book),
            ("c", ProductType::Book),
            ("d", ProductType::Book),
            ("e", ProductType::Toy),
        ]);
        counters.set_hit_count(3, 5).await.unwrap();
        counters.set_hit_count(4, 2).await.unwrap();
        counters.set_hit_count(5, 100).await.unwrap();

        let recs = engine.recommend_for(1, 10).await.unwrap();
        assert_eq!(ids(&recs), vec![3, 4, 2]);

        let top = engine.recommend_for(1, 1).await.unwrap();
        assert_eq!(ids(&top), vec![3]);
    }

    #[tokio::test]
    async fn test_zero_limit() {
        let (engine, counters) = engine_with(&[("a", ProductType::Book), ("b", ProductType::Book)]);
        let mut hits = SessionTypeHits::new();
        hits.increment(ProductType::Book);
        counters.set_session_hits("s1", &hits).await.unwrap();

        assert!(engine.recommend_for(1, 0).await.unwrap().is_empty());
        assert!(engine.recommend_for_session("s1", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_without_hits_is_empty() {
        let (engine, counters) = engine_with(&[("a", ProductType::Book)]);
        assert!(engine.recommend_for_session("nobody", 5).await.unwrap().is_empty());

        counters
            .set_session_hits("empty", &SessionTypeHits::new())
            .await
            .unwrap();
        assert!(engine.recommend_for_session("empty", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_most_viewed_type_first() {
        let (engine, counters) = engine_with(&[
            ("a", ProductType::Book),
            ("b", ProductType::Toy),
            ("c", ProductType::Food),
        ]);
        let mut hits = SessionTypeHits::new();
        hits.increment(ProductType::Book);
        hits.increment(ProductType::Toy);
        hits.increment(ProductType::Toy);
        counters.set_session_hits("s1", &hits).await.unwrap();

        let recs = engine.recommend_for_session("s1", 2).await.unwrap();
        assert_eq!(ids(&recs), vec![2, 1]);

        // Food was never viewed and fills the third slot.
        let recs = engine.recommend_for_session("s1", 5).await.unwrap();
        assert_eq!(ids(&recs), vec![2, 1, 3]);
    }
}
