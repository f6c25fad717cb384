pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{RecommendError, RecommendResult};
pub use types::{Product, ProductId, ProductType, ProductTypeHit, SessionTypeHits};
