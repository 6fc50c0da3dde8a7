//! Cart Repository
//!
//! 购物车按用户存储：record key 即用户 key，一人一车。

use super::{BaseRepository, RepoResult};
use crate::db::models::{Cart, CartItem, now_millis};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn thing(user_key: &str) -> RecordId {
        RecordId::from_table_key("cart", user_key)
    }

    /// Fetch the stored cart for a user, if any
    pub async fn get(&self, user_key: &str) -> RepoResult<Option<Cart>> {
        let cart: Option<Cart> = self.base.db().select(Self::thing(user_key)).await?;
        Ok(cart)
    }

    /// Replace the full item list for a user's cart
    ///
    /// Creates the cart record if it does not exist yet.
    pub async fn put_items(&self, user_key: &str, items: Vec<CartItem>) -> RepoResult<()> {
        self.base
            .db()
            .query("UPSERT $thing SET items = $items, updated_at = $updated_at")
            .bind(("thing", Self::thing(user_key)))
            .bind(("items", items))
            .bind(("updated_at", now_millis()))
            .await?;
        Ok(())
    }

    /// Empty the cart (keeps the record around)
    pub async fn clear(&self, user_key: &str) -> RepoResult<()> {
        self.put_items(user_key, Vec::new()).await
    }
}
