//! Purchase Repository
//!
//! 只追加：结算成功后写入一条购买记录，之后不再修改。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Purchase;
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PurchaseRepository {
    base: BaseRepository,
}

impl PurchaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append a settled purchase
    pub async fn add(
        &self,
        product_id: &str,
        user_id: &str,
        quantity: u32,
        unit_price: Decimal,
        timestamp: i64,
    ) -> RepoResult<Purchase> {
        let total = unit_price * Decimal::from(quantity);
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE purchase SET
                    product_id = $product_id,
                    user_id = $user_id,
                    quantity = $quantity,
                    unit_price = $unit_price,
                    total = $total,
                    timestamp = $timestamp,
                    status = 'completed'
                RETURN AFTER"#,
            )
            .bind(("product_id", product_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("quantity", quantity))
            .bind(("unit_price", unit_price))
            .bind(("total", total))
            .bind(("timestamp", timestamp))
            .await?;

        let created: Option<Purchase> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to record purchase".to_string()))
    }

    /// All purchases for a user, newest first
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Purchase>> {
        let purchases: Vec<Purchase> = self
            .base
            .db()
            .query("SELECT * FROM purchase WHERE user_id = $user_id ORDER BY timestamp DESC")
            .bind(("user_id", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(purchases)
    }
}
