//! Catalog view model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product as exposed by the API: catalog metadata joined with the
/// live stock counter.
///
/// `stock` is the current counter value, never the static `stockLimit` —
/// once a reservation has happened the two diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub image_url: String,
    pub tags: Vec<String>,
    pub is_active: bool,
    /// Initial/maximum stock from the catalog
    pub stock_limit: i64,
    /// Live stock counter value
    pub stock: i64,
    pub is_sold_out: bool,
    pub total_sold: i64,
    pub last_purchase_at: Option<i64>,
}
