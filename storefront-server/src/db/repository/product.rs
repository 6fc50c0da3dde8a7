//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, now_millis};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active products
    pub async fn find_all_active(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by record key ("abc", not "product:abc")
    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<Product>> {
        let thing = RecordId::from_table_key("product", key);
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    name = $name,
                    description = $description,
                    category = $category,
                    price = $price,
                    stock_limit = $stock_limit,
                    total_sold = 0,
                    last_purchase_at = NONE,
                    image_url = $image_url,
                    tags = $tags,
                    is_active = true,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("category", data.category))
            .bind(("price", data.price))
            .bind(("stock_limit", data.stock_limit))
            .bind(("image_url", data.image_url))
            .bind(("tags", data.tags))
            .bind(("created_at", now_millis()))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Hard delete a product
    pub async fn delete(&self, key: &str) -> RepoResult<bool> {
        let thing = RecordId::from_table_key("product", key);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Record a settled sale against the catalog row
    ///
    /// 只更新销量统计，不触碰库存计数器。
    pub async fn record_sale(&self, key: &str, quantity: u32, timestamp: i64) -> RepoResult<()> {
        let thing = RecordId::from_table_key("product", key);
        self.base
            .db()
            .query("UPDATE $thing SET total_sold += $quantity, last_purchase_at = $timestamp")
            .bind(("thing", thing))
            .bind(("quantity", quantity as i64))
            .bind(("timestamp", timestamp))
            .await?;
        Ok(())
    }
}
