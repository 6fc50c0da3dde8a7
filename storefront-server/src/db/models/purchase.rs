//! Purchase Model
//!
//! 已结算的购买记录，只追加不修改。

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::PurchaseView;
use surrealdb::RecordId;

/// Purchase ID type
pub type PurchaseId = RecordId;

/// Purchase model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PurchaseId>,
    pub product_id: String,
    pub user_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub timestamp: i64,
    pub status: String,
}

impl Purchase {
    pub fn to_view(&self) -> PurchaseView {
        PurchaseView {
            id: self
                .id
                .as_ref()
                .map(|id| id.key().to_string())
                .unwrap_or_default(),
            product_id: self.product_id.clone(),
            user_id: self.user_id.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total: self.total,
            timestamp: self.timestamp,
            status: self.status.clone(),
        }
    }
}
