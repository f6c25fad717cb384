use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Catalog-assigned product identifier.
pub type ProductId = i64;

/// Category tag of a product. Stored and serialized as the upper-case tag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Book,
    Electronics,
    Clothing,
    Food,
    Toy,
    Sport,
    Home,
}

/// A catalog product. Immutable from the recommendation side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
}

/// View count of one category within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeHit {
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub hit_count: u64,
}

/// Per-session category hit list.
///
/// Holds at most one entry per [`ProductType`]. Entries keep the order in
/// which their category was first viewed; that order is the tiebreak when
/// ranking. Serialized as a plain JSON list so the stored value stays a
/// list of `{type, hitCount}` pairs; duplicates in a stored list are folded
/// on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductTypeHit>", into = "Vec<ProductTypeHit>")]
pub struct SessionTypeHits {
    entries: Vec<ProductTypeHit>,
}

impl SessionTypeHits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hit for `product_type`, inserting the entry if it is new.
    /// Returns the updated count.
    pub fn increment(&mut self, product_type: ProductType) -> u64 {
        match self
            .entries
            .iter_mut()
            .find(|hit| hit.product_type == product_type)
        {
            Some(hit) => {
                hit.hit_count += 1;
                hit.hit_count
            }
            None => {
                self.entries.push(ProductTypeHit {
                    product_type,
                    hit_count: 1,
                });
                1
            }
        }
    }

    /// Hit count for a category, zero when it was never viewed.
    pub fn count(&self, product_type: ProductType) -> u64 {
        self.entries
            .iter()
            .find(|hit| hit.product_type == product_type)
            .map_or(0, |hit| hit.hit_count)
    }

    /// Categories in first-viewed order.
    pub fn types(&self) -> Vec<ProductType> {
        self.entries.iter().map(|hit| hit.product_type).collect()
    }

    pub fn entries(&self) -> &[ProductTypeHit] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ProductTypeHit> for SessionTypeHits {
    /// Later duplicates of a category are folded into the first entry.
    fn from_iter<I: IntoIterator<Item = ProductTypeHit>>(iter: I) -> Self {
        let mut hits = SessionTypeHits::new();
        for hit in iter {
            match hits
                .entries
                .iter_mut()
                .find(|existing| existing.product_type == hit.product_type)
            {
                Some(existing) => existing.hit_count += hit.hit_count,
                None => hits.entries.push(hit),
            }
        }
        hits
    }
}

impl From<Vec<ProductTypeHit>> for SessionTypeHits {
    fn from(entries: Vec<ProductTypeHit>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<SessionTypeHits> for Vec<ProductTypeHit> {
    fn from(hits: SessionTypeHits) -> Self {
        hits.entries
    }
}
