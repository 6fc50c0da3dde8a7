//! Cart request payloads and enriched cart view

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::ProductView;

fn default_quantity() -> u32 {
    1
}

/// Add a product to the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Replace the quantity of a line item (0 removes it)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Payload carrying only a product id (remove from cart)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub product_id: String,
}

/// One cart line joined with live product data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product_id: String,
    pub quantity: u32,
    pub added_at: i64,
    pub product: ProductView,
}

/// Enriched cart read model
///
/// Line items whose product no longer exists in the catalog are dropped
/// from this view (the stored cart document is left untouched).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Σ price × quantity over the items above
    pub total: Decimal,
}
