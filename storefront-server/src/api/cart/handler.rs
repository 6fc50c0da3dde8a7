//! Cart API Handlers

use axum::{Extension, Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResult, ok};
use shared::{AddToCartRequest, ApiResponse, CartRequest, CartView, UpdateCartRequest};

/// GET /api/cart/get - 当前用户购物车视图
pub async fn get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let view = state.cart.view(&user.id).await?;
    Ok(ok(view))
}

/// POST /api/cart/add - 加入购物车 (同商品合并数量)
pub async fn add(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let view = state
        .cart
        .add_item(&user.id, &req.product_id, req.quantity)
        .await?;
    Ok(ok(view))
}

/// POST /api/cart/update - 覆盖行数量 (<= 0 移除)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let view = state
        .cart
        .update_quantity(&user.id, &req.product_id, req.quantity)
        .await?;
    Ok(ok(view))
}

/// POST /api/cart/remove - 幂等移除行
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let view = state.cart.remove_item(&user.id, &req.product_id).await?;
    Ok(ok(view))
}
