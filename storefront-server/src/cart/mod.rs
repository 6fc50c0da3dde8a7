//! 购物车模块
//!
//! 购物车只是意向清单：加入购物车不预留库存，库存只在结算时
//! 通过 [`crate::stock::StockLedger`] 扣减。
//!
//! # 操作
//!
//! | 操作 | 语义 |
//! |------|------|
//! | add_item | 同商品合并数量，商品必须存在且在售 |
//! | update_quantity | 覆盖数量，<= 0 视为移除 |
//! | remove_item | 幂等移除 |
//! | view | 关联商品目录和实时库存的读模型 |

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Cart, CartItem, now_millis};
use crate::db::repository::{CartRepository, ProductRepository};
use crate::stock::StockLedger;
use crate::utils::{AppError, AppResult};
use shared::{CartItemView, CartView};

/// Cart operations for a single store
#[derive(Clone)]
pub struct CartService {
    products: ProductRepository,
    carts: CartRepository,
    stock: StockLedger,
}

impl CartService {
    pub fn new(db: Surreal<Db>, stock: StockLedger) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            carts: CartRepository::new(db),
            stock,
        }
    }

    /// Add a product to the user's cart, merging with an existing line item
    pub async fn add_item(
        &self,
        user_key: &str,
        product_id: &str,
        quantity: u32,
    ) -> AppResult<CartView> {
        if quantity == 0 {
            return Err(AppError::validation("Quantity must be greater than 0"));
        }

        // Only existing, active products can enter a cart
        let product = self.products.find_by_key(product_id).await?;
        if !product.map(|p| p.is_active).unwrap_or(false) {
            return Err(AppError::not_found(format!("Product {product_id}")));
        }

        let cart = self.carts.get(user_key).await?;
        let mut items = cart.map(|c| c.items).unwrap_or_default();

        match items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| AppError::validation("Quantity is too large"))?;
            }
            None => items.push(CartItem {
                product_id: product_id.to_string(),
                quantity,
                added_at: now_millis(),
            }),
        }

        self.carts.put_items(user_key, items).await?;
        self.view(user_key).await
    }

    /// Replace the quantity of a line item (zero or negative removes it)
    pub async fn update_quantity(
        &self,
        user_key: &str,
        product_id: &str,
        quantity: i64,
    ) -> AppResult<CartView> {
        let cart = self
            .carts
            .get(user_key)
            .await?
            .ok_or_else(|| AppError::not_found("Cart"))?;

        if cart.find_item(product_id).is_none() {
            return Err(AppError::not_found(format!("Cart item {product_id}")));
        }

        let mut items = cart.items;
        if quantity <= 0 {
            items.retain(|i| i.product_id != product_id);
        } else {
            let quantity = u32::try_from(quantity)
                .map_err(|_| AppError::validation("Quantity is too large"))?;
            if let Some(item) = items.iter_mut().find(|i| i.product_id == product_id) {
                item.quantity = quantity;
            }
        }

        self.carts.put_items(user_key, items).await?;
        self.view(user_key).await
    }

    /// Remove a line item; removing an absent item is a no-op
    pub async fn remove_item(&self, user_key: &str, product_id: &str) -> AppResult<CartView> {
        if let Some(cart) = self.carts.get(user_key).await? {
            let mut items = cart.items;
            items.retain(|i| i.product_id != product_id);
            self.carts.put_items(user_key, items).await?;
        }
        self.view(user_key).await
    }

    /// Enriched read model: line items joined with catalog data and live stock
    ///
    /// 商品已下架或被删除的行在视图中丢弃，存储的购物车保持原样。
    pub async fn view(&self, user_key: &str) -> AppResult<CartView> {
        let cart = self.carts.get(user_key).await?.unwrap_or(Cart {
            id: None,
            items: Vec::new(),
            updated_at: 0,
        });

        let mut items = Vec::with_capacity(cart.items.len());
        let mut total = Decimal::ZERO;

        for item in &cart.items {
            let Some(product) = self.products.find_by_key(&item.product_id).await? else {
                continue;
            };
            // 计数器未播种时退回目录上限 (商品还没开卖)
            let stock = self
                .stock
                .available(&item.product_id)?
                .unwrap_or(product.stock_limit);
            total += product.price * Decimal::from(item.quantity);
            items.push(CartItemView {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                added_at: item.added_at,
                product: product.to_view(stock),
            });
        }

        Ok(CartView { items, total })
    }
}
