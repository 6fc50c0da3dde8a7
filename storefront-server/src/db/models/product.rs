//! Product Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::ProductView;
use surrealdb::RecordId;

/// Product ID type
pub type ProductId = RecordId;

/// Product model matching SurrealDB schema
///
/// `stock_limit` 是上架时的初始库存，实时库存在独立的计数器存储中，
/// 不在此表维护。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    pub stock_limit: i64,
    #[serde(default)]
    pub total_sold: i64,
    #[serde(default)]
    pub last_purchase_at: Option<i64>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    pub stock_limit: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Product {
    /// Record key without the table prefix ("product:abc" -> "abc")
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }

    /// Build the API view, merging in the live stock counter value
    pub fn to_view(&self, stock: i64) -> ProductView {
        ProductView {
            id: self.key(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            tags: self.tags.clone(),
            is_active: self.is_active,
            stock_limit: self.stock_limit,
            stock,
            is_sold_out: stock <= 0,
            total_sold: self.total_sold,
            last_purchase_at: self.last_purchase_at,
        }
    }
}
