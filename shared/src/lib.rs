//! Shared wire types for the Storefront API
//!
//! Everything a client needs to talk to the server: request payloads,
//! view models and the unified response envelope. Field names follow the
//! public JSON contract (camelCase), not the server's storage layout.

pub mod models;
pub mod response;

pub use models::auth::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};
pub use models::cart::{AddToCartRequest, CartItemView, CartRequest, CartView, UpdateCartRequest};
pub use models::catalog::ProductView;
pub use models::checkout::{
    CheckoutResult, FailedItem, FailureReason, PurchaseRequest, PurchaseView,
    SinglePurchaseResult,
};
pub use response::ApiResponse;
