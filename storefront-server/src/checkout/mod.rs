//! 结算模块
//!
//! 每个购物车行独立走 查找 → 预留 → 落账 三步，互不影响：
//! 一行失败不回滚其他行，失败原因逐项返回给客户端。
//!
//! # 失败分类
//!
//! | 阶段 | 失败 | 处理 |
//! |------|------|------|
//! | 查找 | 商品不存在/已下架 | 该行标记 `product not found`，继续 |
//! | 查找 | 数据库不可用 | 本行及后续行标记 `not attempted`，中止 |
//! | 预留 | 库存不足 | 该行标记 `insufficient stock` + 实际余量，继续 |
//! | 预留 | 计数器存储错误 | 本行及后续行标记 `not attempted`，中止 |
//! | 落账 | 写入失败 | 释放预留，该行标记 `settlement failed`，中止 |
//!
//! 结算后：全部成功则清空购物车，否则购物车只保留失败的行。

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{error, info, warn};

use crate::db::models::{CartItem, Purchase, now_millis};
use crate::db::repository::{CartRepository, ProductRepository, PurchaseRepository};
use crate::stock::{ReserveOutcome, StockLedger};
use crate::utils::{AppError, AppResult};
use shared::{CheckoutResult, FailedItem, FailureReason, SinglePurchaseResult};

/// Cart checkout and single-product purchase
#[derive(Clone)]
pub struct CheckoutService {
    products: ProductRepository,
    carts: CartRepository,
    purchases: PurchaseRepository,
    stock: StockLedger,
}

impl CheckoutService {
    pub fn new(db: Surreal<Db>, stock: StockLedger) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            carts: CartRepository::new(db.clone()),
            purchases: PurchaseRepository::new(db),
            stock,
        }
    }

    /// Check out the user's stored cart
    ///
    /// Fully successful checkouts empty the cart; otherwise only the failed
    /// line items are written back so the client can retry them.
    pub async fn checkout(&self, user_key: &str) -> AppResult<CheckoutResult> {
        let cart = self
            .carts
            .get(user_key)
            .await?
            .ok_or_else(|| AppError::not_found("Cart"))?;

        if cart.is_empty() {
            return Err(AppError::validation("Cart is empty"));
        }

        let result = self.process_items(user_key, &cart.items).await;

        if result.is_complete() {
            self.carts.clear(user_key).await?;
        } else {
            // Keep only the lines that did not settle, at their original quantities
            let residual: Vec<CartItem> = cart
                .items
                .into_iter()
                .filter(|item| {
                    result
                        .failed_items
                        .iter()
                        .any(|f| f.product_id == item.product_id)
                })
                .collect();
            self.carts.put_items(user_key, residual).await?;
        }

        info!(
            user = %user_key,
            settled = result.purchases.len(),
            failed = result.failed_items.len(),
            "Checkout finished"
        );

        Ok(result)
    }

    /// Buy a single product directly, bypassing the stored cart
    ///
    /// 走同一条 查找 → 预留 → 落账 流水线，但失败直接映射为错误响应，
    /// 用户存储的购物车不受影响。
    pub async fn purchase_single(
        &self,
        user_key: &str,
        product_id: &str,
        quantity: u32,
    ) -> AppResult<SinglePurchaseResult> {
        if quantity == 0 {
            return Err(AppError::validation("Quantity must be greater than 0"));
        }

        let items = vec![CartItem {
            product_id: product_id.to_string(),
            quantity,
            added_at: now_millis(),
        }];

        let result = self.process_items(user_key, &items).await;

        if let Some(failed) = result.failed_items.first() {
            return Err(match failed.reason {
                FailureReason::ProductNotFound => {
                    AppError::not_found(format!("Product {product_id}"))
                }
                FailureReason::InsufficientStock => AppError::InsufficientStock {
                    available: failed.available_stock.unwrap_or(0),
                },
                FailureReason::SettlementFailed | FailureReason::NotAttempted => {
                    AppError::internal("Purchase could not be completed")
                }
            });
        }

        let purchase = result
            .purchases
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Purchase record missing after settlement"))?;
        let remaining_stock = self.stock.available(product_id)?.unwrap_or(0);

        Ok(SinglePurchaseResult {
            purchase,
            remaining_stock,
        })
    }

    /// Run the lookup / reserve / settle pipeline over a list of line items
    async fn process_items(&self, user_key: &str, items: &[CartItem]) -> CheckoutResult {
        let mut result = CheckoutResult {
            purchases: Vec::new(),
            failed_items: Vec::new(),
        };
        // Set once a store outage is detected; remaining lines are skipped
        let mut aborted = false;

        for item in items {
            if aborted {
                result.failed_items.push(FailedItem {
                    product_id: item.product_id.clone(),
                    reason: FailureReason::NotAttempted,
                    available_stock: None,
                });
                continue;
            }

            // Lookup
            let product = match self.products.find_by_key(&item.product_id).await {
                Ok(Some(p)) if p.is_active => p,
                Ok(_) => {
                    result.failed_items.push(FailedItem {
                        product_id: item.product_id.clone(),
                        reason: FailureReason::ProductNotFound,
                        available_stock: None,
                    });
                    continue;
                }
                Err(e) => {
                    error!(product = %item.product_id, error = %e, "Catalog lookup failed, aborting checkout");
                    aborted = true;
                    result.failed_items.push(FailedItem {
                        product_id: item.product_id.clone(),
                        reason: FailureReason::NotAttempted,
                        available_stock: None,
                    });
                    continue;
                }
            };

            // Reserve
            match self.stock.reserve(&item.product_id, item.quantity) {
                Ok(ReserveOutcome::Reserved { .. }) => {}
                Ok(ReserveOutcome::Insufficient { available }) => {
                    result.failed_items.push(FailedItem {
                        product_id: item.product_id.clone(),
                        reason: FailureReason::InsufficientStock,
                        available_stock: Some(available),
                    });
                    continue;
                }
                Err(e) => {
                    error!(product = %item.product_id, error = %e, "Stock reservation failed, aborting checkout");
                    aborted = true;
                    result.failed_items.push(FailedItem {
                        product_id: item.product_id.clone(),
                        reason: FailureReason::NotAttempted,
                        available_stock: None,
                    });
                    continue;
                }
            }

            // Settle
            match self
                .settle(user_key, &item.product_id, item.quantity, product.price)
                .await
            {
                Ok(purchase) => result.purchases.push(purchase.to_view()),
                Err(e) => {
                    error!(product = %item.product_id, error = %e, "Settlement failed after reservation");
                    // Hand the reserved units back before reporting the failure
                    if let Err(re) = self.stock.release(&item.product_id, item.quantity) {
                        error!(
                            product = %item.product_id,
                            quantity = item.quantity,
                            error = %re,
                            "Failed to release reservation, stock counter needs reconciliation"
                        );
                    }
                    aborted = true;
                    result.failed_items.push(FailedItem {
                        product_id: item.product_id.clone(),
                        reason: FailureReason::SettlementFailed,
                        available_stock: None,
                    });
                }
            }
        }

        result
    }

    /// Write the purchase record and update catalog sale statistics
    async fn settle(
        &self,
        user_key: &str,
        product_id: &str,
        quantity: u32,
        unit_price: Decimal,
    ) -> AppResult<Purchase> {
        let timestamp = now_millis();
        let purchase = self
            .purchases
            .add(product_id, user_key, quantity, unit_price, timestamp)
            .await?;

        // Statistics only; the purchase above is already durable
        if let Err(e) = self
            .products
            .record_sale(product_id, quantity, timestamp)
            .await
        {
            warn!(product = %product_id, error = %e, "Failed to update sale statistics");
        }

        Ok(purchase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartService;
    use crate::db;
    use crate::db::models::ProductCreate;
    use crate::db::repository::PurchaseRepository;
    use crate::stock::{
        CounterError, CounterResult, CounterStore, MemoryCounterStore, stock_key,
    };
    use std::sync::Arc;

    /// Counter store whose decrements fail for one key (simulated outage)
    struct FaultyCounterStore {
        inner: MemoryCounterStore,
        fail_key: String,
    }

    impl FaultyCounterStore {
        fn failing_on(product_id: &str) -> Self {
            Self {
                inner: MemoryCounterStore::new(),
                fail_key: stock_key(product_id),
            }
        }

        fn outage() -> CounterError {
            CounterError::Storage(redb::StorageError::Io(std::io::Error::other(
                "simulated counter outage",
            )))
        }
    }

    impl CounterStore for FaultyCounterStore {
        fn decrement_by(&self, key: &str, amount: i64) -> CounterResult<i64> {
            if key == self.fail_key {
                return Err(Self::outage());
            }
            self.inner.decrement_by(key, amount)
        }

        fn increment_by(&self, key: &str, amount: i64) -> CounterResult<i64> {
            self.inner.increment_by(key, amount)
        }

        fn get(&self, key: &str) -> CounterResult<Option<i64>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: i64) -> CounterResult<()> {
            self.inner.set(key, value)
        }

        fn set_if_absent(&self, key: &str, value: i64) -> CounterResult<bool> {
            self.inner.set_if_absent(key, value)
        }
    }

    struct Fixture {
        checkout: CheckoutService,
        cart: CartService,
        products: ProductRepository,
        purchases: PurchaseRepository,
        stock: StockLedger,
    }

    async fn setup() -> Fixture {
        let db = db::connect_memory().await.unwrap();
        let stock = StockLedger::new(Arc::new(MemoryCounterStore::new()));
        Fixture {
            checkout: CheckoutService::new(db.clone(), stock.clone()),
            cart: CartService::new(db.clone(), stock.clone()),
            products: ProductRepository::new(db.clone()),
            purchases: PurchaseRepository::new(db),
            stock,
        }
    }

    async fn seed_product(fx: &Fixture, name: &str, price_cents: i64, units: i64) -> String {
        let product = fx
            .products
            .create(ProductCreate {
                name: name.to_string(),
                description: String::new(),
                category: "apparel".to_string(),
                price: Decimal::new(price_cents, 2),
                stock_limit: units,
                image_url: String::new(),
                tags: vec![],
            })
            .await
            .unwrap();
        let key = product.key();
        fx.stock.initialize(&key, units).unwrap();
        key
    }

    #[tokio::test]
    async fn full_success_clears_the_cart() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;
        let p2 = seed_product(&fx, "Tee", 2500, 10).await;

        fx.cart.add_item("u1", &p1, 2).await.unwrap();
        fx.cart.add_item("u1", &p2, 1).await.unwrap();

        let result = fx.checkout.checkout("u1").await.unwrap();
        assert!(result.is_complete());
        assert_eq!(result.purchases.len(), 2);

        let view = fx.cart.view("u1").await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(fx.stock.available(&p1).unwrap(), Some(8));
        assert_eq!(fx.stock.available(&p2).unwrap(), Some(9));
    }

    #[tokio::test]
    async fn partial_checkout_keeps_only_failed_lines() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;
        let p2 = seed_product(&fx, "Tee", 2500, 3).await;

        fx.cart.add_item("u1", &p1, 2).await.unwrap();
        fx.cart.add_item("u1", &p2, 5).await.unwrap();

        let result = fx.checkout.checkout("u1").await.unwrap();
        assert_eq!(result.purchases.len(), 1);
        assert_eq!(result.failed_items.len(), 1);
        assert_eq!(result.failed_items[0].product_id, p2);
        assert_eq!(
            result.failed_items[0].reason,
            FailureReason::InsufficientStock
        );
        assert_eq!(result.failed_items[0].available_stock, Some(3));

        // Successful line settled, failed line untouched
        assert_eq!(fx.stock.available(&p1).unwrap(), Some(8));
        assert_eq!(fx.stock.available(&p2).unwrap(), Some(3));

        // Residual cart holds only the failed line, at its original quantity
        let view = fx.cart.view("u1").await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_id, p2);
        assert_eq!(view.items[0].quantity, 5);
    }

    #[tokio::test]
    async fn counter_outage_marks_remaining_lines_not_attempted() {
        let db = db::connect_memory().await.unwrap();
        let products = ProductRepository::new(db.clone());

        let mut keys = Vec::new();
        for name in ["Cap", "Tee", "Belt"] {
            let product = products
                .create(ProductCreate {
                    name: name.to_string(),
                    description: String::new(),
                    category: "apparel".to_string(),
                    price: Decimal::new(1500, 2),
                    stock_limit: 10,
                    image_url: String::new(),
                    tags: vec![],
                })
                .await
                .unwrap();
            keys.push(product.key());
        }

        // Second line hits the outage; everything after it must be skipped
        let stock = StockLedger::new(Arc::new(FaultyCounterStore::failing_on(&keys[1])));
        for key in &keys {
            stock.initialize(key, 10).unwrap();
        }
        let cart = CartService::new(db.clone(), stock.clone());
        let checkout = CheckoutService::new(db, stock.clone());

        for key in &keys {
            cart.add_item("u1", key, 1).await.unwrap();
        }

        let result = checkout.checkout("u1").await.unwrap();
        assert_eq!(result.purchases.len(), 1);
        assert_eq!(result.purchases[0].product_id, keys[0]);
        assert_eq!(result.failed_items.len(), 2);
        for failed in &result.failed_items {
            assert_eq!(failed.reason, FailureReason::NotAttempted);
            assert_eq!(failed.available_stock, None);
        }
        assert_eq!(result.failed_items[0].product_id, keys[1]);
        assert_eq!(result.failed_items[1].product_id, keys[2]);

        // Unattempted lines stay in the cart for a retry, at original quantities
        let view = cart.view("u1").await.unwrap();
        let residual: Vec<_> = view.items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(residual, vec![keys[1].as_str(), keys[2].as_str()]);

        // Only the settled line consumed stock
        assert_eq!(stock.available(&keys[0]).unwrap(), Some(9));
        assert_eq!(stock.available(&keys[2]).unwrap(), Some(10));
    }

    #[tokio::test]
    async fn checkout_without_cart_is_not_found() {
        let fx = setup().await;
        let err = fx.checkout.checkout("nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_is_rejected() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;
        fx.cart.add_item("u1", &p1, 1).await.unwrap();
        fx.cart.remove_item("u1", &p1).await.unwrap();

        let err = fx.checkout.checkout("u1").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn vanished_product_fails_its_line_only() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;
        let p2 = seed_product(&fx, "Tee", 2500, 10).await;

        fx.cart.add_item("u1", &p1, 1).await.unwrap();
        fx.cart.add_item("u1", &p2, 1).await.unwrap();

        // Product disappears between add and checkout
        fx.products.delete(&p2).await.unwrap();

        let result = fx.checkout.checkout("u1").await.unwrap();
        assert_eq!(result.purchases.len(), 1);
        assert_eq!(result.failed_items.len(), 1);
        assert_eq!(result.failed_items[0].reason, FailureReason::ProductNotFound);
        assert_eq!(result.failed_items[0].available_stock, None);
    }

    #[tokio::test]
    async fn purchase_records_carry_price_and_total() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;

        fx.cart.add_item("u1", &p1, 3).await.unwrap();
        let result = fx.checkout.checkout("u1").await.unwrap();

        let purchase = &result.purchases[0];
        assert_eq!(purchase.quantity, 3);
        assert_eq!(purchase.unit_price, Decimal::new(1500, 2));
        assert_eq!(purchase.total, Decimal::new(4500, 2));
        assert_eq!(purchase.status, "completed");
        assert_eq!(purchase.user_id, "u1");

        let stored = fx.purchases.find_by_user("u1").await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn settled_sales_update_catalog_statistics() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;

        fx.cart.add_item("u1", &p1, 4).await.unwrap();
        fx.checkout.checkout("u1").await.unwrap();

        let product = fx.products.find_by_key(&p1).await.unwrap().unwrap();
        assert_eq!(product.total_sold, 4);
        assert!(product.last_purchase_at.is_some());
    }

    #[tokio::test]
    async fn single_purchase_reports_remaining_stock() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;

        let result = fx.checkout.purchase_single("u1", &p1, 2).await.unwrap();
        assert_eq!(result.remaining_stock, 8);
        assert_eq!(result.purchase.quantity, 2);
    }

    #[tokio::test]
    async fn single_purchase_insufficient_stock_is_a_conflict() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 2).await;

        let err = fx.checkout.purchase_single("u1", &p1, 5).await.unwrap_err();
        match err {
            AppError::InsufficientStock { available } => assert_eq!(available, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        // Reservation netted out
        assert_eq!(fx.stock.available(&p1).unwrap(), Some(2));
    }

    #[tokio::test]
    async fn single_purchase_does_not_touch_stored_cart() {
        let fx = setup().await;
        let p1 = seed_product(&fx, "Cap", 1500, 10).await;
        let p2 = seed_product(&fx, "Tee", 2500, 10).await;

        fx.cart.add_item("u1", &p2, 1).await.unwrap();
        fx.checkout.purchase_single("u1", &p1, 1).await.unwrap();

        let view = fx.cart.view("u1").await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_id, p2);
    }
}
