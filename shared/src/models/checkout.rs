//! Checkout result types
//!
//! The checkout response enumerates exactly which line items settled and
//! which failed, with a machine-readable reason per failure. There is no
//! opaque "checkout failed" once the cart was non-empty and reachable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_quantity() -> u32 {
    1
}

/// Body of the single-product purchase endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// A settled purchase as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub timestamp: i64,
    pub status: String,
}

/// Why a line item did not settle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Product no longer exists in the catalog
    #[serde(rename = "product not found")]
    ProductNotFound,
    /// Reservation lost the race for the remaining units
    #[serde(rename = "insufficient stock")]
    InsufficientStock,
    /// Durable write failed after a successful reservation
    #[serde(rename = "settlement failed")]
    SettlementFailed,
    /// Skipped because an earlier item hit a store outage
    #[serde(rename = "not attempted")]
    NotAttempted,
}

/// One failed line item in a checkout response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    pub product_id: String,
    pub reason: FailureReason,
    /// Stock observed at failure time (only for insufficient stock)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_stock: Option<i64>,
}

/// Result of a cart checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub purchases: Vec<PurchaseView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_items: Vec<FailedItem>,
}

impl CheckoutResult {
    /// True when every line item settled
    pub fn is_complete(&self) -> bool {
        self.failed_items.is_empty()
    }
}

/// Result of the single-product purchase endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinglePurchaseResult {
    pub purchase: PurchaseView,
    pub remaining_stock: i64,
}
