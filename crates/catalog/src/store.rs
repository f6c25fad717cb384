use async_trait::async_trait;
use recommend_core::{Product, ProductId, ProductType, RecommendResult};

/// Read access to product records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> RecommendResult<Option<Product>>;

    /// Every product, ordered by id.
    async fn find_all(&self) -> RecommendResult<Vec<Product>>;

    /// Ids of every product of a type, ordered by id.
    async fn find_ids_by_type(&self, product_type: ProductType) -> RecommendResult<Vec<ProductId>>;

    /// One uniformly random product id of a type, `None` if the type is empty.
    async fn find_random_id_by_type(
        &self,
        product_type: ProductType,
    ) -> RecommendResult<Option<ProductId>>;

    /// Distinct types present in the catalog, excluding `types`.
    async fn find_types_not_in(&self, types: &[ProductType]) -> RecommendResult<Vec<ProductType>>;

    /// Batch lookup. Unknown ids are omitted; the result order is unspecified.
    async fn find_by_ids(&self, ids: &[ProductId]) -> RecommendResult<Vec<Product>>;
}
