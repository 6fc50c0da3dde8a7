//! 数据库模型定义
//!
//! 所有表结构的 Rust 映射，字段使用 snake_case，
//! 时间戳统一为 Unix 毫秒 (i64)。

pub mod cart;
pub mod product;
pub mod purchase;
pub mod serde_helpers;
pub mod user;

pub use cart::{Cart, CartItem};
pub use product::{Product, ProductCreate, ProductId};
pub use purchase::{Purchase, PurchaseId};
pub use user::{UserAccount, UserId};

/// Current time as unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
