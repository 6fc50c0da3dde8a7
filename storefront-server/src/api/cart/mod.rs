//! Cart API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// 购物车路由 - 全部需要认证
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/get", get(handler::get))
        .route("/add", post(handler::add))
        .route("/update", post(handler::update))
        .route("/remove", post(handler::remove))
}
