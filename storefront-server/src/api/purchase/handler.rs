//! Purchase API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResult, ok, ok_with_message};
use shared::{ApiResponse, CheckoutResult, PurchaseRequest, SinglePurchaseResult};

/// POST /api/purchase/checkout - 结算整个购物车
///
/// 部分失败不是 HTTP 错误：响应体逐项列出成功和失败的行。
pub async fn checkout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<CheckoutResult>>> {
    let result = state.checkout.checkout(&user.id).await?;

    let message = if result.is_complete() {
        "Checkout completed".to_string()
    } else {
        format!(
            "Checkout completed with {} failed item(s)",
            result.failed_items.len()
        )
    };

    Ok(ok_with_message(result, message))
}

/// POST /api/purchase/{product_id} - 直接购买单个商品
pub async fn purchase_single(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<String>,
    Json(req): Json<PurchaseRequest>,
) -> AppResult<Json<ApiResponse<SinglePurchaseResult>>> {
    let result = state
        .checkout
        .purchase_single(&user.id, &product_id, req.quantity)
        .await?;
    Ok(ok(result))
}
