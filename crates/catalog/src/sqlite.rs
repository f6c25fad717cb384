//! SQLite-backed product catalog.

use crate::store::CatalogStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use recommend_core::{Product, ProductId, ProductType, RecommendError, RecommendResult};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS product (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS product_type_idx ON product (type);
";

/// A product to be inserted; the id is assigned by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
}

/// Catalog stored in a single SQLite database.
pub struct SqliteCatalog {
    db: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open or create the catalog database at `path`.
    pub fn open(path: impl AsRef<Path>) -> RecommendResult<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let db = Connection::open(path).map_err(RecommendError::catalog)?;
        db.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(RecommendError::catalog)?;
        info!(path = %path.display(), "Catalog database opened");
        Self::with_connection(db)
    }

    pub fn open_in_memory() -> RecommendResult<Self> {
        let db = Connection::open_in_memory().map_err(RecommendError::catalog)?;
        Self::with_connection(db)
    }

    fn with_connection(db: Connection) -> RecommendResult<Self> {
        db.execute_batch(SCHEMA).map_err(RecommendError::catalog)?;
        Ok(Self { db: Mutex::new(db) })
    }

    pub fn insert_product(&self, name: &str, product_type: ProductType) -> RecommendResult<Product> {
        let db = self.db.lock();
        db.execute(
            "INSERT INTO product (name, type) VALUES (?1, ?2)",
            rusqlite::params![name, product_type.as_ref()],
        )
        .map_err(RecommendError::catalog)?;
        Ok(Product {
            id: db.last_insert_rowid(),
            name: name.to_string(),
            product_type,
        })
    }

    pub fn product_count(&self) -> RecommendResult<u64> {
        let db = self.db.lock();
        let count: i64 = db
            .query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))
            .map_err(RecommendError::catalog)?;
        Ok(count as u64)
    }

    /// Load products from a JSON list of `{name, type}` objects.
    /// Does nothing when the catalog already holds products.
    pub fn seed_from_file(&self, path: impl AsRef<Path>) -> RecommendResult<usize> {
        let path = path.as_ref();
        if self.product_count()? > 0 {
            info!(path = %path.display(), "Catalog not empty, skipping seed");
            return Ok(0);
        }
        let data = std::fs::read_to_string(path)?;
        let products: Vec<NewProduct> = serde_json::from_str(&data)?;
        self.insert_all(&products)?;
        info!(path = %path.display(), count = products.len(), "Catalog seeded");
        Ok(products.len())
    }

    pub fn insert_all(&self, products: &[NewProduct]) -> RecommendResult<()> {
        let mut db = self.db.lock();
        let tx = db.transaction().map_err(RecommendError::catalog)?;
        {
            let mut stmt = tx
                .prepare_cached("INSERT INTO product (name, type) VALUES (?1, ?2)")
                .map_err(RecommendError::catalog)?;
            for product in products {
                stmt.execute(rusqlite::params![product.name, product.product_type.as_ref()])
                    .map_err(RecommendError::catalog)?;
            }
        }
        tx.commit().map_err(RecommendError::catalog)
    }

    fn query_products(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RecommendResult<Vec<Product>> {
        let db = self.db.lock();
        let mut stmt = db.prepare_cached(sql).map_err(RecommendError::catalog)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok((
                    row.get::<_, ProductId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(RecommendError::catalog)?;

        let mut products = Vec::new();
        for row in rows {
            let (id, name, tag) = row.map_err(RecommendError::catalog)?;
            if let Some(product_type) = parse_type(&tag) {
                products.push(Product {
                    id,
                    name,
                    product_type,
                });
            }
        }
        Ok(products)
    }
}

fn parse_type(tag: &str) -> Option<ProductType> {
    match ProductType::from_str(tag) {
        Ok(product_type) => Some(product_type),
        Err(_) => {
            warn!(tag = tag, "Skipping catalog row with unknown product type");
            None
        }
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn find_by_id(&self, id: ProductId) -> RecommendResult<Option<Product>> {
        let mut products =
            self.query_products("SELECT id, name, type FROM product WHERE id = ?1", [id])?;
        Ok(products.pop())
    }

    async fn find_all(&self) -> RecommendResult<Vec<Product>> {
        self.query_products("SELECT id, name, type FROM product ORDER BY id", [])
    }

    async fn find_ids_by_type(&self, product_type: ProductType) -> RecommendResult<Vec<ProductId>> {
        let db = self.db.lock();
        let mut stmt = db
            .prepare_cached("SELECT id FROM product WHERE type = ?1 ORDER BY id")
            .map_err(RecommendError::catalog)?;
        let ids = stmt
            .query_map([product_type.as_ref()], |row| row.get(0))
            .map_err(RecommendError::catalog)?
            .collect::<Result<Vec<ProductId>, _>>()
            .map_err(RecommendError::catalog)?;
        Ok(ids)
    }

    async fn find_random_id_by_type(
        &self,
        product_type: ProductType,
    ) -> RecommendResult<Option<ProductId>> {
        let db = self.db.lock();
        db.query_row(
            "SELECT id FROM product WHERE type = ?1 ORDER BY RANDOM() LIMIT 1",
            [product_type.as_ref()],
            |row| row.get(0),
        )
        .optional()
        .map_err(RecommendError::catalog)
    }

    async fn find_types_not_in(&self, types: &[ProductType]) -> RecommendResult<Vec<ProductType>> {
        let db = self.db.lock();
        let mut stmt = db
            .prepare_cached("SELECT type FROM product GROUP BY type ORDER BY MIN(id)")
            .map_err(RecommendError::catalog)?;
        let tags = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(RecommendError::catalog)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(RecommendError::catalog)?;

        Ok(tags
            .iter()
            .filter_map(|tag| parse_type(tag))
            .filter(|t| !types.contains(t))
            .collect())
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> RecommendResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT id, name, type FROM product WHERE id IN ({placeholders})");
        self.query_products(&sql, rusqlite::params_from_iter(ids.iter()))
    }
}
