//! Product API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::ProductRepository;
use crate::utils::{AppResult, ok};
use shared::{ApiResponse, ProductView};

/// GET /api/products - 在售商品列表，带实时库存
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<ProductView>>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all_active().await?;

    let mut views = Vec::with_capacity(products.len());
    for product in products {
        // 计数器未播种时退回目录上限
        let stock = state
            .stock
            .available(&product.key())?
            .unwrap_or(product.stock_limit);
        views.push(product.to_view(stock));
    }

    Ok(ok(views))
}
