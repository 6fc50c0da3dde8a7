//! Purchase API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// 结算路由 - 全部需要认证
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/purchase/checkout", post(handler::checkout))
        .route("/api/purchase/{product_id}", post(handler::purchase_single))
}
