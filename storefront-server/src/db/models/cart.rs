//! Cart Model
//!
//! 每个用户一条购物车记录，record key 即用户 key。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One line item in a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product record key ("abc", not "product:abc")
    pub product_id: String,
    pub quantity: u32,
    pub added_at: i64,
}

/// Cart model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub updated_at: i64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line item by product key
    pub fn find_item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
}
